use std::sync::atomic::Ordering;

use super::common::{
    center_at, fixture, point_at_km, subscriber_at, RecordingTransport, StubGeocoder, ANCHOR,
};
use crate::alerts::domain::{CenterKind, Language, NeedType, ReportStatus};
use crate::alerts::service::{CreateEmergencyReport, CreateFloodEvent, ServiceError};

fn flood_request() -> CreateFloodEvent {
    CreateFloodEvent {
        location: "Lagos Island".to_string(),
        latitude: ANCHOR.lat,
        longitude: ANCHOR.lon,
        severity: "high".to_string(),
        rainfall_mm: Some(182.0),
        description: Some("Lagoon overflow after continuous rainfall".to_string()),
        occurred_at: None,
    }
}

fn report_request() -> CreateEmergencyReport {
    CreateEmergencyReport {
        reporter_name: "Ada Obi".to_string(),
        latitude: ANCHOR.lat,
        longitude: ANCHOR.lon,
        need: "rescue".to_string(),
        comments: "Water entering the house".to_string(),
        voice_note_url: None,
        reported_at: None,
    }
}

#[tokio::test]
async fn flood_event_notifies_nearby_subscriber_and_ranks_shelters() {
    let fx = fixture(
        StubGeocoder::named("Lagos"),
        Some(RecordingTransport::default()),
    );
    {
        let mut centers = fx.store.centers.lock().expect("store mutex poisoned");
        centers.push(center_at("Far Camp", CenterKind::Shelter, point_at_km(ANCHOR, 45.0)));
        centers.push(center_at("Near Camp", CenterKind::Shelter, point_at_km(ANCHOR, 2.0)));
        centers.push(center_at("Mid Camp", CenterKind::Shelter, point_at_km(ANCHOR, 9.0)));
        centers.push(center_at("City Hospital", CenterKind::Hospital, point_at_km(ANCHOR, 30.0)));
    }
    {
        let mut subs = fx.store.subscriptions.lock().expect("store mutex poisoned");
        subs.push(subscriber_at(
            Some("nearby@example.com"),
            point_at_km(ANCHOR, 0.9),
            Language::En,
            true,
        ));
        subs.push(subscriber_at(
            Some("faraway@example.com"),
            point_at_km(ANCHOR, 28.0),
            Language::En,
            true,
        ));
        subs.push(subscriber_at(
            Some("inactive@example.com"),
            point_at_km(ANCHOR, 1.5),
            Language::En,
            false,
        ));
        // Within range but unreachable by email, so never a candidate.
        subs.push(subscriber_at(None, point_at_km(ANCHOR, 1.0), Language::En, true));
    }

    let created = fx
        .service
        .create_flood_event(flood_request())
        .await
        .expect("flood event ingests");

    assert_eq!(created.notifications_sent, 1);
    assert_eq!(created.total_subscribers, 1);
    assert_eq!(created.nearest_shelters.len(), 3);
    let names: Vec<&str> = created
        .nearest_shelters
        .iter()
        .map(|ranked| ranked.item.name.as_str())
        .collect();
    assert_eq!(names, ["Near Camp", "Mid Camp", "City Hospital"]);
    assert_eq!(created.routes.len(), 3);
    assert!(created.routes.iter().all(Option::is_some));

    // Routing ran nearest-first.
    let destinations = fx.routing.destinations.lock().expect("routing mutex poisoned");
    assert_eq!(destinations.len(), 3);
    assert!(destinations[0].lat < destinations[1].lat);

    let transport = fx.transport.as_ref().expect("transport present");
    let sent = transport.sent.lock().expect("transport mutex poisoned");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "nearby@example.com");
}

#[tokio::test]
async fn flood_event_succeeds_with_no_transport_configured() {
    let fx = fixture(StubGeocoder::named("Lagos"), None);
    {
        let mut subs = fx.store.subscriptions.lock().expect("store mutex poisoned");
        subs.push(subscriber_at(
            Some("nearby@example.com"),
            point_at_km(ANCHOR, 1.0),
            Language::En,
            true,
        ));
    }

    let created = fx
        .service
        .create_flood_event(flood_request())
        .await
        .expect("write still succeeds");

    assert_eq!(created.notifications_sent, 0);
    assert_eq!(created.total_subscribers, 1);
}

#[tokio::test]
async fn routing_failure_yields_null_routes_not_an_error() {
    let store = std::sync::Arc::new(super::common::InMemoryStore::default());
    store
        .centers
        .lock()
        .expect("store mutex poisoned")
        .push(center_at("Near Camp", CenterKind::Shelter, point_at_km(ANCHOR, 2.0)));
    let routing = std::sync::Arc::new(super::common::StubRouting {
        fail: true,
        ..super::common::StubRouting::default()
    });
    let service = crate::alerts::service::AlertService::new(
        store,
        std::sync::Arc::new(StubGeocoder::named("Lagos")),
        routing,
        Some(std::sync::Arc::new(RecordingTransport::default())),
    );

    let created = service
        .create_flood_event(flood_request())
        .await
        .expect("routing failure never aborts ingestion");

    assert_eq!(created.nearest_shelters.len(), 1);
    assert_eq!(created.routes.len(), 1);
    assert!(created.routes[0].is_none());
}

#[tokio::test]
async fn flood_event_degrades_when_center_reads_fail() {
    let fx = fixture(
        StubGeocoder::named("Lagos"),
        Some(RecordingTransport::default()),
    );
    fx.store.fail_center_reads.store(true, Ordering::Relaxed);

    let created = fx
        .service
        .create_flood_event(flood_request())
        .await
        .expect("center read failure is best-effort");
    assert!(created.nearest_shelters.is_empty());
    assert!(created.routes.is_empty());
}

#[tokio::test]
async fn unknown_severity_is_rejected_without_side_effects() {
    let fx = fixture(
        StubGeocoder::named("Lagos"),
        Some(RecordingTransport::default()),
    );
    let mut request = flood_request();
    request.severity = "catastrophic".to_string();

    let err = fx
        .service
        .create_flood_event(request)
        .await
        .expect_err("unknown severity rejected");
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(fx.store.events.lock().expect("store mutex poisoned").is_empty());
}

#[tokio::test]
async fn report_resolves_location_and_notifies_centers_within_ten_km() {
    let fx = fixture(
        StubGeocoder::named("Lagos"),
        Some(RecordingTransport::default()),
    );
    {
        let mut centers = fx.store.centers.lock().expect("store mutex poisoned");
        centers.push(center_at("Three Km", CenterKind::Shelter, point_at_km(ANCHOR, 3.0)));
        centers.push(center_at("Five Km", CenterKind::Hospital, point_at_km(ANCHOR, 5.0)));
        centers.push(center_at("Eight Km", CenterKind::Shelter, point_at_km(ANCHOR, 8.0)));
        centers.push(center_at("Twelve Km", CenterKind::Shelter, point_at_km(ANCHOR, 12.0)));
    }

    let created = fx
        .service
        .create_report(report_request())
        .await
        .expect("report ingests");

    assert_eq!(created.report.location, "Lagos");
    assert_eq!(created.report.status, ReportStatus::Pending);
    assert_eq!(created.report.need, NeedType::Rescue);
    let names: Vec<&str> = created
        .nearby_centers
        .iter()
        .map(|ranked| ranked.item.name.as_str())
        .collect();
    assert_eq!(names, ["Three Km", "Five Km", "Eight Km"]);
    assert_eq!(created.notifications.sent, 3);
    assert_eq!(created.notifications.total, 3);
}

#[tokio::test]
async fn report_location_falls_back_to_coordinates_when_geocoding_fails() {
    let fx = fixture(StubGeocoder::failing(), Some(RecordingTransport::default()));

    let created = fx
        .service
        .create_report(report_request())
        .await
        .expect("geocode failure is best-effort");
    assert_eq!(created.report.location, "6.5244, 3.3792");
}

#[tokio::test]
async fn report_status_update_accepts_any_parsed_status() {
    let fx = fixture(
        StubGeocoder::named("Lagos"),
        Some(RecordingTransport::default()),
    );
    let created = fx
        .service
        .create_report(report_request())
        .await
        .expect("report ingests");

    let updated = fx
        .service
        .update_report_status(created.report.id, "resolved")
        .await
        .expect("status updates");
    assert_eq!(updated.status, ReportStatus::Resolved);

    // No transition graph: resolved can go back to pending.
    let reverted = fx
        .service
        .update_report_status(created.report.id, "pending")
        .await
        .expect("transition legality is not enforced");
    assert_eq!(reverted.status, ReportStatus::Pending);

    let err = fx
        .service
        .update_report_status(created.report.id, "archived")
        .await
        .expect_err("unknown status rejected");
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn status_update_for_unknown_report_is_not_found() {
    let fx = fixture(
        StubGeocoder::named("Lagos"),
        Some(RecordingTransport::default()),
    );
    let err = fx
        .service
        .update_report_status(uuid::Uuid::new_v4(), "responded")
        .await
        .expect_err("missing report");
    assert!(matches!(
        err,
        ServiceError::Store(crate::alerts::store::StoreError::NotFound)
    ));
}
