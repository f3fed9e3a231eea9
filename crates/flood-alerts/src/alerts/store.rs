use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{
    AlertSubscription, ContactIdentity, EmergencyCenter, EmergencyReport, FloodEvent,
    NewAlertSubscription, NewEmergencyReport, NewFloodEvent, ReportStatus,
};

/// Storage abstraction so the pipeline can be exercised against an in-memory
/// double in tests while production talks to the hosted store over HTTP.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_flood_event(&self, event: NewFloodEvent) -> Result<FloodEvent, StoreError>;
    async fn list_flood_events(&self, limit: usize) -> Result<Vec<FloodEvent>, StoreError>;

    async fn insert_report(&self, report: NewEmergencyReport)
        -> Result<EmergencyReport, StoreError>;
    async fn list_reports(&self, limit: usize) -> Result<Vec<EmergencyReport>, StoreError>;
    async fn update_report_status(
        &self,
        id: Uuid,
        status: ReportStatus,
    ) -> Result<EmergencyReport, StoreError>;

    async fn list_centers(&self) -> Result<Vec<EmergencyCenter>, StoreError>;

    async fn list_subscriptions(&self) -> Result<Vec<AlertSubscription>, StoreError>;
    async fn find_subscription(
        &self,
        identity: &ContactIdentity,
    ) -> Result<Option<AlertSubscription>, StoreError>;
    async fn insert_subscription(
        &self,
        subscription: NewAlertSubscription,
    ) -> Result<AlertSubscription, StoreError>;
    async fn update_subscription(
        &self,
        subscription: AlertSubscription,
    ) -> Result<AlertSubscription, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
