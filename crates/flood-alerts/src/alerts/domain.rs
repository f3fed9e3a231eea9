use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinates;

/// Severity ladder reported by the ingestion feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A flood observation ingested once and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloodEvent {
    pub id: Uuid,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rainfall_mm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl FloodEvent {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Insert payload for a flood event; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize)]
pub struct NewFloodEvent {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub severity: Severity,
    pub rainfall_mm: Option<f64>,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// What a citizen reports needing most urgently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedType {
    Rescue,
    Medical,
    Food,
    Water,
    Shelter,
    Other,
}

impl NeedType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rescue" => Some(Self::Rescue),
            "medical" => Some(Self::Medical),
            "food" => Some(Self::Food),
            "water" => Some(Self::Water),
            "shelter" => Some(Self::Shelter),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Rescue => "rescue",
            Self::Medical => "medical",
            Self::Food => "food",
            Self::Water => "water",
            Self::Shelter => "shelter",
            Self::Other => "other",
        }
    }
}

/// Lifecycle of an emergency report. The update operation accepts any parsed
/// status without checking the current one; `Resolved` is terminal by intent
/// only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Responded,
    Resolved,
}

impl ReportStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "responded" => Some(Self::Responded),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Responded => "responded",
            Self::Resolved => "resolved",
        }
    }
}

/// A citizen-submitted emergency report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyReport {
    pub id: Uuid,
    pub reporter_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub need: NeedType,
    pub comments: String,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_note_url: Option<String>,
    /// Human-readable place name resolved at submission time.
    pub location: String,
    pub reported_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl EmergencyReport {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Insert payload for an emergency report.
#[derive(Debug, Clone, Serialize)]
pub struct NewEmergencyReport {
    pub reporter_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub need: NeedType,
    pub comments: String,
    pub status: ReportStatus,
    pub voice_note_url: Option<String>,
    pub location: String,
    pub reported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CenterKind {
    Shelter,
    Hospital,
}

impl CenterKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Shelter => "shelter",
            Self::Hospital => "hospital",
        }
    }
}

/// Static reference data; read-only in this pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyCenter {
    pub id: Uuid,
    pub name: String,
    pub kind: CenterKind,
    pub latitude: f64,
    pub longitude: f64,
    pub email: String,
    pub phone: String,
}

impl EmergencyCenter {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Notification languages the content bundles cover. Unknown codes fall back
/// to English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Yo,
    Ha,
    Ig,
}

impl Language {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
            Some("yo") => Self::Yo,
            Some("ha") => Self::Ha,
            Some("ig") => Self::Ig,
            _ => Self::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Yo => "yo",
            Self::Ha => "ha",
            Self::Ig => "ig",
        }
    }
}

/// The unique key identifying one alert subscription: email when present,
/// otherwise phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactIdentity {
    Email(String),
    Phone(String),
}

impl ContactIdentity {
    /// Blank strings count as absent so a form submitting `""` does not mint
    /// an empty identity.
    pub fn new(email: Option<&str>, phone: Option<&str>) -> Option<Self> {
        let email = email.map(str::trim).filter(|value| !value.is_empty());
        let phone = phone.map(str::trim).filter(|value| !value.is_empty());
        match (email, phone) {
            (Some(email), _) => Some(Self::Email(email.to_string())),
            (None, Some(phone)) => Some(Self::Phone(phone.to_string())),
            (None, None) => None,
        }
    }
}

/// An alert subscriber; at least one of email/phone is guaranteed present by
/// the registry's validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSubscription {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub location: String,
    pub language: Language,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl AlertSubscription {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Insert payload for a subscription.
#[derive(Debug, Clone, Serialize)]
pub struct NewAlertSubscription {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub location: String,
    pub language: Language,
    pub active: bool,
}

/// Driving route summary as returned by the routing service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Encoded polyline of the candidate route.
    pub geometry: String,
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Transient pairing of a nearby shelter with its best-effort road route.
/// Never persisted; `route` is `None` whenever the routing lookup failed.
#[derive(Debug, Clone, Serialize)]
pub struct ShelterRoute {
    pub center: EmergencyCenter,
    pub distance_km: f64,
    pub route: Option<RouteSummary>,
}
