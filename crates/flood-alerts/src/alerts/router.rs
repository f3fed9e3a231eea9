use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::registry::RegisterRequest;
use super::service::{AlertService, CreateEmergencyReport, CreateFloodEvent, ServiceError};
use super::store::{Store, StoreError};
use crate::gateways::email::EmailTransport;
use crate::gateways::geocode::GeocodeGateway;
use crate::gateways::routing::RoutingGateway;

const DEFAULT_LIST_LIMIT: usize = 50;

/// Router exposing the pipeline's public operations.
pub fn alert_router<S, G, R, E>(service: Arc<AlertService<S, G, R, E>>) -> Router
where
    S: Store + 'static,
    G: GeocodeGateway + 'static,
    R: RoutingGateway + 'static,
    E: EmailTransport + 'static,
{
    Router::new()
        .route(
            "/api/v1/flood-events",
            post(create_flood_event_handler::<S, G, R, E>)
                .get(list_flood_events_handler::<S, G, R, E>)
                .options(preflight),
        )
        .route(
            "/api/v1/reports",
            post(create_report_handler::<S, G, R, E>)
                .get(list_reports_handler::<S, G, R, E>)
                .options(preflight),
        )
        .route(
            "/api/v1/reports/:report_id/status",
            patch(update_report_status_handler::<S, G, R, E>).options(preflight),
        )
        .route(
            "/api/v1/subscriptions",
            post(register_subscription_handler::<S, G, R, E>).options(preflight),
        )
        .route(
            "/api/v1/subscriptions/check",
            get(check_subscription_handler::<S, G, R, E>).options(preflight),
        )
        .fallback(unknown_operation)
        .with_state(service)
}

/// Unknown paths still answer in the wire contract instead of axum's empty
/// 404 body.
async fn unknown_operation() -> Response {
    let body = Json(json!({ "success": false, "message": "unknown operation" }));
    (StatusCode::NOT_FOUND, body).into_response()
}

/// Wire contract for failures: `{"success": false, "message": ...}` with 400
/// for validation, 404 for unknown records, 500 for store failures.
fn error_response(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = Json(json!({ "success": false, "message": err.to_string() }));
    (status, body).into_response()
}

/// Generic permissive answer for CORS preflight probes from the UI.
async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, PATCH, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "authorization, content-type"),
        ],
    )
}

async fn create_flood_event_handler<S, G, R, E>(
    State(service): State<Arc<AlertService<S, G, R, E>>>,
    Json(request): Json<CreateFloodEvent>,
) -> Response
where
    S: Store + 'static,
    G: GeocodeGateway + 'static,
    R: RoutingGateway + 'static,
    E: EmailTransport + 'static,
{
    match service.create_flood_event(request).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<usize>,
}

async fn list_flood_events_handler<S, G, R, E>(
    State(service): State<Arc<AlertService<S, G, R, E>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    S: Store + 'static,
    G: GeocodeGateway + 'static,
    R: RoutingGateway + 'static,
    E: EmailTransport + 'static,
{
    match service
        .list_flood_events(query.limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .await
    {
        Ok(events) => (StatusCode::OK, Json(events)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn create_report_handler<S, G, R, E>(
    State(service): State<Arc<AlertService<S, G, R, E>>>,
    Json(request): Json<CreateEmergencyReport>,
) -> Response
where
    S: Store + 'static,
    G: GeocodeGateway + 'static,
    R: RoutingGateway + 'static,
    E: EmailTransport + 'static,
{
    match service.create_report(request).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn list_reports_handler<S, G, R, E>(
    State(service): State<Arc<AlertService<S, G, R, E>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    S: Store + 'static,
    G: GeocodeGateway + 'static,
    R: RoutingGateway + 'static,
    E: EmailTransport + 'static,
{
    match service
        .list_reports(query.limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .await
    {
        Ok(reports) => (StatusCode::OK, Json(reports)).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct UpdateStatusBody {
    status: String,
}

async fn update_report_status_handler<S, G, R, E>(
    State(service): State<Arc<AlertService<S, G, R, E>>>,
    Path(report_id): Path<Uuid>,
    Json(body): Json<UpdateStatusBody>,
) -> Response
where
    S: Store + 'static,
    G: GeocodeGateway + 'static,
    R: RoutingGateway + 'static,
    E: EmailTransport + 'static,
{
    match service.update_report_status(report_id, &body.status).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn register_subscription_handler<S, G, R, E>(
    State(service): State<Arc<AlertService<S, G, R, E>>>,
    Json(request): Json<RegisterRequest>,
) -> Response
where
    S: Store + 'static,
    G: GeocodeGateway + 'static,
    R: RoutingGateway + 'static,
    E: EmailTransport + 'static,
{
    match service.register_subscription(request).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct CheckQuery {
    email: Option<String>,
    phone: Option<String>,
}

async fn check_subscription_handler<S, G, R, E>(
    State(service): State<Arc<AlertService<S, G, R, E>>>,
    Query(query): Query<CheckQuery>,
) -> Response
where
    S: Store + 'static,
    G: GeocodeGateway + 'static,
    R: RoutingGateway + 'static,
    E: EmailTransport + 'static,
{
    match service
        .check_subscription(query.email.as_deref(), query.phone.as_deref())
        .await
    {
        Ok(subscription) => (StatusCode::OK, Json(subscription)).into_response(),
        Err(err) => error_response(err),
    }
}
