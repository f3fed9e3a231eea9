//! Geospatial matching and notification pipeline: flood events and citizen
//! emergency reports in, localized notifications to nearby recipients out.

pub mod content;
pub mod dispatch;
pub mod domain;
pub mod proximity;
pub mod registry;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use dispatch::{dispatch_all, DispatchOutcome, Notification};
pub use domain::{
    AlertSubscription, CenterKind, ContactIdentity, EmergencyCenter, EmergencyReport, FloodEvent,
    Language, NeedType, NewAlertSubscription, NewEmergencyReport, NewFloodEvent, ReportStatus,
    RouteSummary, Severity, ShelterRoute,
};
pub use proximity::{Ranked, CENTER_RADIUS_KM, MAX_NEARBY, SUBSCRIBER_RADIUS_KM};
pub use registry::{RegisterRequest, RegistrationOutcome};
pub use router::alert_router;
pub use service::{
    AlertService, CreateEmergencyReport, CreateFloodEvent, FloodEventCreated, ReportCreated,
    ServiceError,
};
pub use store::{Store, StoreError};
