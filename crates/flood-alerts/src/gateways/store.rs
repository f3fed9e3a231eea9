//! Production `Store` implementation speaking a PostgREST-style HTTP CRUD
//! API: one table per entity, `eq.` filters, `order`/`limit` params, writes
//! echoing the stored row via `Prefer: return=representation`.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::alerts::domain::{
    AlertSubscription, ContactIdentity, EmergencyCenter, EmergencyReport, FloodEvent,
    NewAlertSubscription, NewEmergencyReport, NewFloodEvent, ReportStatus,
};
use crate::alerts::store::{Store, StoreError};

const FLOOD_EVENTS: &str = "flood_events";
const REPORTS: &str = "emergency_reports";
const CENTERS: &str = "emergency_centers";
const SUBSCRIPTIONS: &str = "alert_subscriptions";

pub struct HttpStore {
    client: Client,
    base_url: String,
    service_key: String,
}

impl HttpStore {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            service_key: service_key.into(),
        }
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}/rest/v1/{table}", self.base_url.trim_end_matches('/'));
        self.client
            .request(method, url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn rows<R: DeserializeOwned>(builder: RequestBuilder) -> Result<Vec<R>, StoreError> {
        let response = builder.send().await.map_err(unavailable)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Unavailable(format!("{status}: {body}")));
        }
        response.json().await.map_err(unavailable)
    }

    async fn select<R: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<R>, StoreError> {
        Self::rows(self.request(Method::GET, table).query(query)).await
    }

    async fn insert<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<R, StoreError> {
        let rows: Vec<R> = Self::rows(
            self.request(Method::POST, table)
                .header("Prefer", "return=representation")
                .json(row),
        )
        .await?;
        rows.into_iter().next().ok_or(StoreError::NotFound)
    }

    async fn update_by_id<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        id: Uuid,
        patch: &T,
    ) -> Result<R, StoreError> {
        let rows: Vec<R> = Self::rows(
            self.request(Method::PATCH, table)
                .header("Prefer", "return=representation")
                .query(&[("id", format!("eq.{id}"))])
                .json(patch),
        )
        .await?;
        rows.into_iter().next().ok_or(StoreError::NotFound)
    }
}

fn unavailable(err: reqwest::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

fn identity_filter(identity: &ContactIdentity) -> (&'static str, String) {
    match identity {
        ContactIdentity::Email(email) => ("email", format!("eq.{email}")),
        ContactIdentity::Phone(phone) => ("phone", format!("eq.{phone}")),
    }
}

#[async_trait]
impl Store for HttpStore {
    async fn insert_flood_event(&self, event: NewFloodEvent) -> Result<FloodEvent, StoreError> {
        self.insert(FLOOD_EVENTS, &event).await
    }

    async fn list_flood_events(&self, limit: usize) -> Result<Vec<FloodEvent>, StoreError> {
        self.select(
            FLOOD_EVENTS,
            &[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn insert_report(
        &self,
        report: NewEmergencyReport,
    ) -> Result<EmergencyReport, StoreError> {
        self.insert(REPORTS, &report).await
    }

    async fn list_reports(&self, limit: usize) -> Result<Vec<EmergencyReport>, StoreError> {
        self.select(
            REPORTS,
            &[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn update_report_status(
        &self,
        id: Uuid,
        status: ReportStatus,
    ) -> Result<EmergencyReport, StoreError> {
        self.update_by_id(REPORTS, id, &json!({ "status": status.label() }))
            .await
    }

    async fn list_centers(&self) -> Result<Vec<EmergencyCenter>, StoreError> {
        self.select(CENTERS, &[("select", "*".to_string())]).await
    }

    async fn list_subscriptions(&self) -> Result<Vec<AlertSubscription>, StoreError> {
        self.select(SUBSCRIPTIONS, &[("select", "*".to_string())])
            .await
    }

    async fn find_subscription(
        &self,
        identity: &ContactIdentity,
    ) -> Result<Option<AlertSubscription>, StoreError> {
        let (column, filter) = identity_filter(identity);
        let rows: Vec<AlertSubscription> = self
            .select(
                SUBSCRIPTIONS,
                &[
                    ("select", "*".to_string()),
                    (column, filter),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_subscription(
        &self,
        subscription: NewAlertSubscription,
    ) -> Result<AlertSubscription, StoreError> {
        self.insert(SUBSCRIPTIONS, &subscription).await
    }

    async fn update_subscription(
        &self,
        subscription: AlertSubscription,
    ) -> Result<AlertSubscription, StoreError> {
        let id = subscription.id;
        self.update_by_id(SUBSCRIPTIONS, id, &subscription).await
    }
}
