use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use flood_alerts::alerts::{alert_router, AlertService};
use flood_alerts::config::AppConfig;
use flood_alerts::error::AppError;
use flood_alerts::gateways::email::HttpEmailTransport;
use flood_alerts::gateways::geocode::NominatimGateway;
use flood_alerts::gateways::routing::OsrmGateway;
use flood_alerts::gateways::store::HttpStore;
use flood_alerts::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(HttpStore::new(&config.store.url, &config.store.service_key));
    let geocoder = Arc::new(NominatimGateway::new(&config.geocode.base_url));
    let routing = Arc::new(OsrmGateway::new(&config.routing.base_url));
    let email = config
        .email
        .as_ref()
        .map(|email| Arc::new(HttpEmailTransport::new(&email.base_url, &email.api_key, &email.sender)));
    let email_configured = email.is_some();
    let service = Arc::new(AlertService::new(store, geocoder, routing, email));

    let app = with_operational_routes(alert_router(service))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, email_configured, "flood alert pipeline ready");

    axum::serve(listener, app).await?;
    Ok(())
}
