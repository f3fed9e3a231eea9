use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::alerts::domain::{
    AlertSubscription, CenterKind, ContactIdentity, EmergencyCenter, EmergencyReport, FloodEvent,
    Language, NewAlertSubscription, NewEmergencyReport, NewFloodEvent, ReportStatus, RouteSummary,
};
use crate::alerts::service::AlertService;
use crate::alerts::store::{Store, StoreError};
use crate::gateways::email::{EmailError, EmailTransport};
use crate::gateways::geocode::{AddressParts, GeocodeError, GeocodeGateway};
use crate::gateways::routing::{RoutingError, RoutingGateway};
use crate::geo::Coordinates;

/// Lagos Island, the anchor most fixtures are placed around.
pub(super) const ANCHOR: Coordinates = Coordinates {
    lat: 6.5244,
    lon: 3.3792,
};

/// A point roughly `km` kilometers due north of `anchor`.
pub(super) fn point_at_km(anchor: Coordinates, km: f64) -> Coordinates {
    let deg_per_km = 180.0 / (std::f64::consts::PI * 6371.0);
    Coordinates::new(anchor.lat + km * deg_per_km, anchor.lon)
}

#[derive(Default)]
pub(super) struct InMemoryStore {
    pub(super) events: Mutex<Vec<FloodEvent>>,
    pub(super) reports: Mutex<Vec<EmergencyReport>>,
    pub(super) centers: Mutex<Vec<EmergencyCenter>>,
    pub(super) subscriptions: Mutex<Vec<AlertSubscription>>,
    /// When set, center reads fail so degraded paths can be exercised.
    pub(super) fail_center_reads: AtomicBool,
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_flood_event(&self, event: NewFloodEvent) -> Result<FloodEvent, StoreError> {
        let stored = FloodEvent {
            id: Uuid::new_v4(),
            location: event.location,
            latitude: event.latitude,
            longitude: event.longitude,
            severity: event.severity,
            rainfall_mm: event.rainfall_mm,
            description: event.description,
            occurred_at: event.occurred_at,
            created_at: Utc::now(),
        };
        self.events
            .lock()
            .expect("store mutex poisoned")
            .push(stored.clone());
        Ok(stored)
    }

    async fn list_flood_events(&self, limit: usize) -> Result<Vec<FloodEvent>, StoreError> {
        let mut events = self.events.lock().expect("store mutex poisoned").clone();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        events.truncate(limit);
        Ok(events)
    }

    async fn insert_report(
        &self,
        report: NewEmergencyReport,
    ) -> Result<EmergencyReport, StoreError> {
        let stored = EmergencyReport {
            id: Uuid::new_v4(),
            reporter_name: report.reporter_name,
            latitude: report.latitude,
            longitude: report.longitude,
            need: report.need,
            comments: report.comments,
            status: report.status,
            voice_note_url: report.voice_note_url,
            location: report.location,
            reported_at: report.reported_at,
            created_at: Utc::now(),
        };
        self.reports
            .lock()
            .expect("store mutex poisoned")
            .push(stored.clone());
        Ok(stored)
    }

    async fn list_reports(&self, limit: usize) -> Result<Vec<EmergencyReport>, StoreError> {
        let mut reports = self.reports.lock().expect("store mutex poisoned").clone();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reports.truncate(limit);
        Ok(reports)
    }

    async fn update_report_status(
        &self,
        id: Uuid,
        status: ReportStatus,
    ) -> Result<EmergencyReport, StoreError> {
        let mut reports = self.reports.lock().expect("store mutex poisoned");
        let report = reports
            .iter_mut()
            .find(|report| report.id == id)
            .ok_or(StoreError::NotFound)?;
        report.status = status;
        Ok(report.clone())
    }

    async fn list_centers(&self) -> Result<Vec<EmergencyCenter>, StoreError> {
        if self.fail_center_reads.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("center table offline".to_string()));
        }
        Ok(self.centers.lock().expect("store mutex poisoned").clone())
    }

    async fn list_subscriptions(&self) -> Result<Vec<AlertSubscription>, StoreError> {
        Ok(self
            .subscriptions
            .lock()
            .expect("store mutex poisoned")
            .clone())
    }

    async fn find_subscription(
        &self,
        identity: &ContactIdentity,
    ) -> Result<Option<AlertSubscription>, StoreError> {
        let subscriptions = self.subscriptions.lock().expect("store mutex poisoned");
        Ok(subscriptions
            .iter()
            .find(|sub| match identity {
                ContactIdentity::Email(email) => sub.email.as_deref() == Some(email),
                ContactIdentity::Phone(phone) => sub.phone.as_deref() == Some(phone),
            })
            .cloned())
    }

    async fn insert_subscription(
        &self,
        subscription: NewAlertSubscription,
    ) -> Result<AlertSubscription, StoreError> {
        let stored = AlertSubscription {
            id: Uuid::new_v4(),
            email: subscription.email,
            phone: subscription.phone,
            latitude: subscription.latitude,
            longitude: subscription.longitude,
            location: subscription.location,
            language: subscription.language,
            active: subscription.active,
            created_at: Utc::now(),
        };
        self.subscriptions
            .lock()
            .expect("store mutex poisoned")
            .push(stored.clone());
        Ok(stored)
    }

    async fn update_subscription(
        &self,
        subscription: AlertSubscription,
    ) -> Result<AlertSubscription, StoreError> {
        let mut subscriptions = self.subscriptions.lock().expect("store mutex poisoned");
        let slot = subscriptions
            .iter_mut()
            .find(|existing| existing.id == subscription.id)
            .ok_or(StoreError::NotFound)?;
        *slot = subscription.clone();
        Ok(subscription)
    }
}

/// Scripted reverse geocoder: `Some(parts)` succeeds, `None` errors.
pub(super) struct StubGeocoder(pub(super) Option<AddressParts>);

impl StubGeocoder {
    pub(super) fn named(city: &str) -> Self {
        Self(Some(AddressParts {
            city: Some(city.to_string()),
            ..AddressParts::default()
        }))
    }

    pub(super) fn failing() -> Self {
        Self(None)
    }
}

#[async_trait]
impl GeocodeGateway for StubGeocoder {
    async fn reverse(&self, _lat: f64, _lon: f64) -> Result<AddressParts, GeocodeError> {
        match &self.0 {
            Some(parts) => Ok(parts.clone()),
            None => Err(GeocodeError::Status(
                reqwest::StatusCode::SERVICE_UNAVAILABLE,
            )),
        }
    }
}

/// Scripted routing gateway recording call order.
#[derive(Default)]
pub(super) struct StubRouting {
    pub(super) fail: bool,
    pub(super) destinations: Mutex<Vec<Coordinates>>,
}

#[async_trait]
impl RoutingGateway for StubRouting {
    async fn route(
        &self,
        _origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteSummary, RoutingError> {
        self.destinations
            .lock()
            .expect("routing mutex poisoned")
            .push(destination);
        if self.fail {
            return Err(RoutingError::NoRoute);
        }
        Ok(RouteSummary {
            geometry: "_p~iF~ps|U".to_string(),
            distance_m: 4_200.0,
            duration_s: 540.0,
        })
    }
}

/// Records every accepted message; rejects recipients listed in `reject`.
#[derive(Default)]
pub(super) struct RecordingTransport {
    pub(super) sent: Mutex<Vec<(String, String)>>,
    pub(super) reject: Vec<String>,
}

#[async_trait]
impl EmailTransport for RecordingTransport {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> Result<(), EmailError> {
        if self.reject.iter().any(|address| address == to) {
            return Err(EmailError::Rejected("blocked by test".to_string()));
        }
        self.sent
            .lock()
            .expect("transport mutex poisoned")
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

pub(super) type TestService = AlertService<InMemoryStore, StubGeocoder, StubRouting, RecordingTransport>;

pub(super) struct Fixture {
    pub(super) store: Arc<InMemoryStore>,
    pub(super) routing: Arc<StubRouting>,
    pub(super) transport: Option<Arc<RecordingTransport>>,
    pub(super) service: TestService,
}

pub(super) fn fixture(geocoder: StubGeocoder, transport: Option<RecordingTransport>) -> Fixture {
    let store = Arc::new(InMemoryStore::default());
    let routing = Arc::new(StubRouting::default());
    let transport = transport.map(Arc::new);
    let service = AlertService::new(
        store.clone(),
        Arc::new(geocoder),
        routing.clone(),
        transport.clone(),
    );
    Fixture {
        store,
        routing,
        transport,
        service,
    }
}

pub(super) fn center_at(name: &str, kind: CenterKind, coords: Coordinates) -> EmergencyCenter {
    EmergencyCenter {
        id: Uuid::new_v4(),
        name: name.to_string(),
        kind,
        latitude: coords.lat,
        longitude: coords.lon,
        email: format!("{}@centers.example.org", name.to_ascii_lowercase().replace(' ', ".")),
        phone: "+2348000000000".to_string(),
    }
}

pub(super) fn subscriber_at(
    email: Option<&str>,
    coords: Coordinates,
    language: Language,
    active: bool,
) -> AlertSubscription {
    AlertSubscription {
        id: Uuid::new_v4(),
        email: email.map(str::to_string),
        phone: None,
        latitude: coords.lat,
        longitude: coords.lon,
        location: "Lagos".to_string(),
        language,
        active,
        created_at: Utc::now(),
    }
}
