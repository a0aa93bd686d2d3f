use crate::helpers::{
    connection_error, get, spawn_app, spawn_app_with, MockWarehouse, MockWarehouseSession,
};
use hyper::StatusCode;
use panel::db::{Coordinates, StationBounds, StationGeo, StationId, WarehouseSession};
use std::sync::Arc;
use time::macros::datetime;

#[tokio::test]
async fn landing_page_lists_counties_and_stations() {
    let test_app = spawn_app();

    let (status, html) = get(&test_app.app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Taipei City"));
    assert!(html.contains("Taichung City"));
    assert!(html.contains("Banqiao (466880)"));
    assert!(html.contains("Taipei (466920)"));
    // No timestamped observations, so not in the catalog
    assert!(!html.contains("Hualien"));
    assert!(!html.contains("station-report"));
}

#[tokio::test]
async fn station_day_renders_chart_map_and_table() {
    let test_app = spawn_app();

    let (status, html) = get(&test_app.app, "/?station=466920&date=2024-01-01").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("station-report"));
    assert!(html.contains("2024-01-01 00:00:00 to 2024-01-02 00:00:00"));
    assert!(html.contains("Temperature"));
    assert!(html.contains("Location"));
    assert!(html.contains("Weather Table"));
    assert!(html.contains("temperature-chart"));
    assert!(html.contains("scattermap"));
    // Both window ends are inclusive
    assert!(html.contains("2024-01-01 00:10:00"));
    assert!(html.contains("2024-01-02 00:00:00"));
    assert!(!html.contains("2024-01-02 00:10:00"));
    assert!(!html.contains("empty-notice"));
}

#[tokio::test]
async fn station_can_be_picked_by_name() {
    let test_app = spawn_app();

    let (status, html) = get(&test_app.app, "/?station=Taipei&date=2024-01-02").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Taipei (466920)"));
    assert!(html.contains("2024-01-02 00:00:00 to 2024-01-03 00:00:00"));
}

#[tokio::test]
async fn invalid_selections_are_shown_next_to_the_form() {
    let test_app = spawn_app();

    let (status, html) = get(&test_app.app, "/?station=Nowhere").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("selection-error"));
    assert!(html.contains("Unknown station: Nowhere"));
    assert!(html.contains("Taipei City"));

    let (_, html) = get(&test_app.app, "/?county=Taichung%20City&station=466920").await;
    assert!(html.contains("is not in Taichung City"));

    let (_, html) = get(&test_app.app, "/?station=467490&date=2024-03-01").await;
    assert!(html.contains("too late"));

    let (_, html) = get(&test_app.app, "/?station=466920&date=2023-12-31").await;
    assert!(html.contains("too early"));

    let (status, html) = get(&test_app.app, "/?station=466920&date=tomorrow").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Invalid date"));
    assert!(!html.contains("station-report"));
}

#[tokio::test]
async fn county_change_refreshes_station_options() {
    let test_app = spawn_app();

    let (status, html) = get(&test_app.app, "/fragments/stations?county=Taichung%20City").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("467490"));
    assert!(html.contains("data-earliest=\"2024-01-01\""));
    assert!(!html.contains("466920"));
    assert!(!html.contains("<html"));
}

#[tokio::test]
async fn unreachable_warehouse_is_a_page_level_error() {
    let mut warehouse = MockWarehouse::new();
    warehouse
        .expect_open_session()
        .times(1)
        .returning(|| Err(connection_error()));
    let test_app = spawn_app_with(Arc::new(warehouse));

    let (status, html) = get(&test_app.app, "/?station=466920").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(html.contains("Weather warehouse unavailable"));
    assert!(html.contains("is-danger"));
}

fn taipei_session() -> MockWarehouseSession {
    let mut session = MockWarehouseSession::new();
    let geo = StationGeo {
        station_id: StationId::new("466920"),
        station_name: String::from("Taipei"),
        county_name: Some(String::from("Taipei City")),
        county_code: Some(String::from("63000")),
        coordinates: Some(Coordinates {
            latitude: 25.0377,
            longitude: 121.5149,
        }),
    };
    let all_geo = geo.clone();
    session.expect_station_bounds().times(1).returning(|_| {
        Ok(vec![StationBounds {
            station_id: StationId::new("466920"),
            station_name: String::from("Taipei"),
            earliest: datetime!(2024-01-01 00:00:00),
            latest: datetime!(2024-01-03 00:00:00),
        }])
    });
    session
        .expect_all_station_geo()
        .times(1)
        .returning(move |_| Ok(vec![all_geo.clone()]));
    session
        .expect_station_geo()
        .returning(move |_, _| Ok(vec![geo.clone()]));
    session
}

#[tokio::test]
async fn day_without_readings_shows_empty_views() {
    let mut session = taipei_session();
    session
        .expect_observations()
        .times(1)
        .withf(|_, window| {
            window.start() == datetime!(2024-01-02 00:00:00)
                && window.end() == datetime!(2024-01-03 00:00:00)
        })
        .returning(|_, _| Ok(vec![]));

    let mut warehouse = MockWarehouse::new();
    warehouse
        .expect_open_session()
        .times(1)
        .return_once(move || Ok(Box::new(session) as Box<dyn WarehouseSession>));
    let test_app = spawn_app_with(Arc::new(warehouse));

    let (status, html) = get(&test_app.app, "/?station=466920&date=2024-01-02").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("empty-notice"));
    assert!(html.contains("station-report"));
    assert!(html.contains("temperature-chart"));
}
