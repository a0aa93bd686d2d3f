use crate::helpers::{
    connection_error, get, spawn_app, spawn_app_with, spawn_seeded_app, MockWarehouse,
};
use hyper::StatusCode;
use panel::pipeline::UnmatchedStationPolicy;
use std::sync::Arc;

#[tokio::test]
async fn page_waits_for_generate() {
    let mut warehouse = MockWarehouse::new();
    warehouse.expect_open_session().times(0);
    let test_app = spawn_app_with(Arc::new(warehouse));

    let (status, html) = get(&test_app.app, "/recent?tables=current").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Generate!"));
    assert!(html.contains("468100, 469020"));
    assert!(!html.contains("recent-report"));
    // Every configured table set gets a navigation entry
    assert!(html.contains("/recent?tables=current"));
    assert!(html.contains("/recent?tables=v2"));
}

#[tokio::test]
async fn generate_renders_the_latest_three_hours() {
    let test_app = spawn_app();

    let (status, html) = get(&test_app.app, "/recent?tables=current&generate=true").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("recent-report"));
    assert!(html.contains("2024-01-01 21:10:00 to 2024-01-02 00:10:00"));
    assert!(html.contains("County Map"));
    assert!(html.contains("choroplethmap"));
    assert!(html.contains("properties.COUNTYCODE"));
    assert!(html.contains("Taichung"));
    // Outside the window
    assert!(!html.contains("2024-01-01 00:00:00"));
    // Under maintenance, and not a manned station
    assert!(!html.contains("Decommissioned"));
    assert!(!html.contains("Shanjia"));
    // Banqiao has no geography, so it's dropped and reported
    assert!(html.contains("unmatched-notice"));
    assert!(html.contains("466880"));
}

#[tokio::test]
async fn aggregation_choice_is_kept() {
    let test_app = spawn_app();

    let (status, html) = get(&test_app.app, "/recent?generate=true&agg=latest").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"<option value="latest" selected>"#));
    assert!(html.contains("choroplethmap"));
}

#[tokio::test]
async fn unknown_table_set_is_rejected() {
    let test_app = spawn_app();

    let (status, html) = get(&test_app.app, "/recent?tables=v9&generate=true").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(html.contains("Unknown table set: v9"));
}

#[tokio::test]
async fn missing_tables_are_a_query_error() {
    let test_app = spawn_app();

    let (status, html) = get(&test_app.app, "/recent?tables=v2&generate=true").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(html.contains("Query failed"));
    assert!(html.contains("weather_records_v2"));
}

#[tokio::test]
async fn reject_policy_fails_the_run() {
    let test_app = spawn_seeded_app(UnmatchedStationPolicy::Reject);

    let (status, html) = get(&test_app.app, "/recent?generate=true").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(html.contains("Stations without location data"));
    assert!(html.contains("466880"));
    assert!(!html.contains("recent-report"));
}

#[tokio::test]
async fn unreachable_warehouse_is_unavailable() {
    let mut warehouse = MockWarehouse::new();
    warehouse
        .expect_open_session()
        .times(1)
        .returning(|| Err(connection_error()));
    let test_app = spawn_app_with(Arc::new(warehouse));

    let (status, html) = get(&test_app.app, "/recent?generate=true").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(html.contains("Weather warehouse unavailable"));
}
