use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::content::{self, FloodContext, ReportContext};
use super::dispatch::{dispatch_all, DispatchOutcome, Notification};
use super::domain::{
    AlertSubscription, EmergencyCenter, EmergencyReport, FloodEvent, NeedType, NewEmergencyReport,
    NewFloodEvent, ReportStatus, RouteSummary, Severity, ShelterRoute,
};
use super::proximity::{
    nearest, nearest_within, within_radius, Ranked, CENTER_RADIUS_KM, MAX_NEARBY,
    SUBSCRIBER_RADIUS_KM,
};
use super::registry::{self, RegisterRequest, RegistrationOutcome};
use super::store::{Store, StoreError};
use crate::gateways::email::EmailTransport;
use crate::gateways::geocode::{resolve_location_name, GeocodeGateway};
use crate::gateways::routing::RoutingGateway;

/// Error raised by the pipeline's public operations. Only the primary
/// persistence write is load-bearing; every other external call degrades to a
/// defined fallback instead of raising one of these.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Explicit fallback-on-failure combinator for best-effort collaborator
/// calls.
fn fallback_on_failure<T, E: std::fmt::Display>(result: Result<T, E>, fallback: T, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "{what} failed, continuing degraded");
            fallback
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFloodEvent {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub severity: String,
    pub rainfall_mm: Option<f64>,
    pub description: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloodEventCreated {
    pub event: FloodEvent,
    pub nearest_shelters: Vec<Ranked<EmergencyCenter>>,
    /// Aligned with `nearest_shelters`; `null` where routing failed.
    pub routes: Vec<Option<RouteSummary>>,
    pub notifications_sent: usize,
    pub total_subscribers: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmergencyReport {
    pub reporter_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub need: String,
    #[serde(default)]
    pub comments: String,
    pub voice_note_url: Option<String>,
    pub reported_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCreated {
    pub report: EmergencyReport,
    pub nearby_centers: Vec<Ranked<EmergencyCenter>>,
    pub notifications: DispatchOutcome,
}

/// Orchestrates the geospatial matching and notification pipeline. All
/// collaborators are injected; nothing here is process-global.
pub struct AlertService<S, G, R, E> {
    store: Arc<S>,
    geocoder: Arc<G>,
    routing: Arc<R>,
    email: Option<Arc<E>>,
}

impl<S, G, R, E> AlertService<S, G, R, E>
where
    S: Store + 'static,
    G: GeocodeGateway + 'static,
    R: RoutingGateway + 'static,
    E: EmailTransport + 'static,
{
    pub fn new(store: Arc<S>, geocoder: Arc<G>, routing: Arc<R>, email: Option<Arc<E>>) -> Self {
        Self {
            store,
            geocoder,
            routing,
            email,
        }
    }

    fn transport(&self) -> Option<&E> {
        self.email.as_deref()
    }

    /// Ingest a flood event: persist it, find the three nearest shelters
    /// (unconditionally), enrich them with best-effort routes, and notify
    /// every active email-bearing subscriber within 20 km in their own
    /// language.
    pub async fn create_flood_event(
        &self,
        request: CreateFloodEvent,
    ) -> Result<FloodEventCreated, ServiceError> {
        let severity = Severity::parse(&request.severity).ok_or_else(|| {
            ServiceError::Validation("severity must be one of low, medium, high".to_string())
        })?;

        let event = self
            .store
            .insert_flood_event(NewFloodEvent {
                location: request.location,
                latitude: request.latitude,
                longitude: request.longitude,
                severity,
                rainfall_mm: request.rainfall_mm,
                description: request.description,
                occurred_at: request.occurred_at.unwrap_or_else(Utc::now),
            })
            .await?;

        let centers = fallback_on_failure(
            self.store.list_centers().await,
            Vec::new(),
            "emergency center lookup",
        );
        let shelters = nearest(
            event.coordinates(),
            centers,
            EmergencyCenter::coordinates,
            MAX_NEARBY,
        );
        let shelter_routes = self.enrich_shelter_routes(&event, shelters).await;

        let subscriptions = fallback_on_failure(
            self.store.list_subscriptions().await,
            Vec::new(),
            "subscriber lookup",
        );
        let recipients: Vec<Ranked<AlertSubscription>> = within_radius(
            event.coordinates(),
            subscriptions,
            AlertSubscription::coordinates,
            SUBSCRIBER_RADIUS_KM,
        )
        .into_iter()
        .filter(|ranked| ranked.item.active && ranked.item.email.is_some())
        .collect();

        let nearest_shelters: Vec<Ranked<EmergencyCenter>> = shelter_routes
            .iter()
            .map(|sr| Ranked {
                item: sr.center.clone(),
                distance_km: sr.distance_km,
            })
            .collect();

        let notifications: Vec<Notification> = recipients
            .iter()
            .filter_map(|ranked| {
                let email = ranked.item.email.clone()?;
                let message = content::flood_notification(
                    ranked.item.language,
                    &FloodContext {
                        severity: event.severity,
                        location: &event.location,
                        description: event.description.as_deref(),
                        distance_km: ranked.distance_km,
                        shelters: &nearest_shelters,
                    },
                );
                Some(Notification {
                    to: email,
                    subject: message.subject,
                    html: message.html,
                })
            })
            .collect();

        let outcome = dispatch_all(self.transport(), notifications).await;
        info!(
            event_id = %event.id,
            severity = severity.label(),
            shelters = nearest_shelters.len(),
            sent = outcome.sent,
            candidates = outcome.total,
            "flood event ingested"
        );

        let routes = shelter_routes.into_iter().map(|sr| sr.route).collect();
        Ok(FloodEventCreated {
            event,
            nearest_shelters,
            routes,
            notifications_sent: outcome.sent,
            total_subscribers: outcome.total,
        })
    }

    /// Routing calls run sequentially, nearest shelter first, to respect the
    /// shared routing service's rate limit. Any failure becomes a `None`
    /// entry and the loop carries on.
    async fn enrich_shelter_routes(
        &self,
        event: &FloodEvent,
        shelters: Vec<Ranked<EmergencyCenter>>,
    ) -> Vec<ShelterRoute> {
        let mut enriched = Vec::with_capacity(shelters.len());
        for shelter in shelters {
            let route = match self
                .routing
                .route(event.coordinates(), shelter.item.coordinates())
                .await
            {
                Ok(route) => Some(route),
                Err(err) => {
                    warn!(
                        event_id = %event.id,
                        shelter = %shelter.item.name,
                        error = %err,
                        "shelter route lookup failed"
                    );
                    None
                }
            };
            enriched.push(ShelterRoute {
                center: shelter.item,
                distance_km: shelter.distance_km,
                route,
            });
        }
        enriched
    }

    /// Ingest a citizen emergency report: resolve a location name
    /// (best-effort), persist the report, and notify the (≤3) emergency
    /// centers within 10 km.
    pub async fn create_report(
        &self,
        request: CreateEmergencyReport,
    ) -> Result<ReportCreated, ServiceError> {
        let need = NeedType::parse(&request.need).ok_or_else(|| {
            ServiceError::Validation(
                "need must be one of rescue, medical, food, water, shelter, other".to_string(),
            )
        })?;
        if request.reporter_name.trim().is_empty() {
            return Err(ServiceError::Validation("reporter name is required".to_string()));
        }

        let location =
            resolve_location_name(self.geocoder.as_ref(), request.latitude, request.longitude)
                .await;

        let report = self
            .store
            .insert_report(NewEmergencyReport {
                reporter_name: request.reporter_name,
                latitude: request.latitude,
                longitude: request.longitude,
                need,
                comments: request.comments,
                status: ReportStatus::Pending,
                voice_note_url: request.voice_note_url,
                location,
                reported_at: request.reported_at.unwrap_or_else(Utc::now),
            })
            .await?;

        let centers = fallback_on_failure(
            self.store.list_centers().await,
            Vec::new(),
            "emergency center lookup",
        );
        let nearby_centers = nearest_within(
            report.coordinates(),
            centers,
            EmergencyCenter::coordinates,
            CENTER_RADIUS_KM,
            MAX_NEARBY,
        );

        let notifications: Vec<Notification> = nearby_centers
            .iter()
            .map(|ranked| {
                let message = content::report_notification(&ReportContext {
                    reporter_name: &report.reporter_name,
                    need: report.need,
                    comments: &report.comments,
                    location: &report.location,
                    distance_km: ranked.distance_km,
                });
                Notification {
                    to: ranked.item.email.clone(),
                    subject: message.subject,
                    html: message.html,
                }
            })
            .collect();

        let outcome = dispatch_all(self.transport(), notifications).await;
        info!(
            report_id = %report.id,
            need = need.label(),
            centers = nearby_centers.len(),
            sent = outcome.sent,
            "emergency report ingested"
        );

        Ok(ReportCreated {
            report,
            nearby_centers,
            notifications: outcome,
        })
    }

    /// Set a report's status. The raw value must parse, but no transition
    /// graph is enforced: the authority UI is trusted with the ordering.
    pub async fn update_report_status(
        &self,
        id: Uuid,
        raw_status: &str,
    ) -> Result<EmergencyReport, ServiceError> {
        let status = ReportStatus::parse(raw_status).ok_or_else(|| {
            ServiceError::Validation(
                "status must be one of pending, responded, resolved".to_string(),
            )
        })?;
        let report = self.store.update_report_status(id, status).await?;
        info!(report_id = %report.id, status = status.label(), "report status updated");
        Ok(report)
    }

    pub async fn register_subscription(
        &self,
        request: RegisterRequest,
    ) -> Result<RegistrationOutcome, ServiceError> {
        registry::register(
            self.store.as_ref(),
            self.geocoder.as_ref(),
            self.transport(),
            request,
        )
        .await
    }

    pub async fn check_subscription(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Option<AlertSubscription>, ServiceError> {
        registry::check(self.store.as_ref(), email, phone).await
    }

    pub async fn list_flood_events(&self, limit: usize) -> Result<Vec<FloodEvent>, ServiceError> {
        Ok(self.store.list_flood_events(limit).await?)
    }

    pub async fn list_reports(&self, limit: usize) -> Result<Vec<EmergencyReport>, ServiceError> {
        Ok(self.store.list_reports(limit).await?)
    }
}
