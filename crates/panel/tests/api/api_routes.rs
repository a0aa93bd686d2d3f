use crate::helpers::{
    connection_error, get, get_json, seeded_warehouse, spawn_app, spawn_app_with, test_folder,
    MockWarehouse, MockWarehouseSession,
};
use hyper::StatusCode;
use panel::db::{Warehouse, WarehouseSession};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn stations_are_listed_by_name() {
    let test_app = spawn_app();

    let (status, body) = get_json(&test_app.app, "/api/stations").await;

    assert_eq!(status, StatusCode::OK);
    let stations = body.as_array().unwrap();
    let names: Vec<&str> = stations
        .iter()
        .map(|s| s["station_name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Banqiao", "Decommissioned", "Shanjia", "Taichung", "Taipei"]
    );

    let taipei = &stations[4];
    assert_eq!(taipei["station_id"], "466920");
    assert_eq!(taipei["county_name"], "Taipei City");
    assert_eq!(taipei["earliest"], "2024-01-01 00:00:00");
    assert_eq!(taipei["latest"], "2024-01-02 00:10:00");
    assert_eq!(taipei["coordinates"]["latitude"], 25.0377);
    // No geography: still listed, without a county
    assert!(stations[0]["county_name"].is_null());
    for station in stations {
        assert!(station["earliest"].as_str() <= station["latest"].as_str());
    }
}

#[tokio::test]
async fn station_day_is_a_closed_24_hour_window() {
    let test_app = spawn_app();

    let (status, body) = get_json(
        &test_app.app,
        "/api/stations/Taipei/observations?date=2024-01-01",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["station"]["station_id"], "466920");
    assert_eq!(
        body["window"],
        json!({ "start": "2024-01-01 00:00:00", "end": "2024-01-02 00:00:00" })
    );

    let observations = body["observations"].as_array().unwrap();
    let times: Vec<&str> = observations
        .iter()
        .map(|o| o["observed_at"].as_str().unwrap())
        .collect();
    assert_eq!(
        times,
        vec![
            "2024-01-01 00:00:00",
            "2024-01-01 00:10:00",
            "2024-01-02 00:00:00"
        ]
    );
    for observation in observations {
        assert_eq!(observation["station_id"], "466920");
        assert_eq!(observation["county_code"], "63000");
        assert_eq!(
            observation["coordinates"],
            json!({ "latitude": 25.0377, "longitude": 121.5149 })
        );
    }
    // Feed sentinels come back as missing, not as numbers
    assert!(observations[1]["temperature"].is_null());
    assert!(observations[1]["wind_direction"].is_null());
    assert!(observations[1]["visibility"].is_null());
    assert_eq!(observations[1]["precipitation"], 0.0);
    assert_eq!(body["unmatched"], json!([]));
}

#[tokio::test]
async fn repeated_fetches_return_the_same_rows() {
    let test_app = spawn_app();
    let uri = "/api/stations/466920/observations?date=2024-01-02";

    let (_, first) = get_json(&test_app.app, uri).await;
    let (_, second) = get_json(&test_app.app, uri).await;

    assert_eq!(first, second);
    assert_eq!(first["observations"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn date_defaults_to_the_first_observed_day() {
    let test_app = spawn_app();

    let (status, body) = get_json(&test_app.app, "/api/stations/466920/observations").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["window"]["start"], "2024-01-01 00:00:00");
}

#[tokio::test]
async fn bad_requests_return_400() {
    let test_app = spawn_app();

    let (status, body) = get_json(
        &test_app.app,
        "/api/stations/466920/observations?date=2023-12-31",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("too early"));

    let (status, _) = get_json(&test_app.app, "/api/stations/999999/observations").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get_json(&test_app.app, "/api/recent?tables=v9").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown table set: v9");
}

#[tokio::test]
async fn recent_window_ends_at_the_latest_observation() {
    let test_app = spawn_app();

    let (status, body) = get_json(&test_app.app, "/api/recent?tables=current").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["table_set"], "current");
    assert_eq!(
        body["window"],
        json!({ "start": "2024-01-01 21:10:00", "end": "2024-01-02 00:10:00" })
    );

    let ids: Vec<&str> = body["observations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["station_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["467490", "466920", "466920"]);
    assert!(!ids.contains(&"468100"));
    assert_eq!(body["unmatched"], json!(["466880"]));
}

#[tokio::test]
async fn empty_observation_table_has_no_window() {
    let mut session = MockWarehouseSession::new();
    session
        .expect_latest_observation_time()
        .times(1)
        .returning(|_| Ok(None));
    session.expect_observations().times(0);

    let mut warehouse = MockWarehouse::new();
    warehouse
        .expect_open_session()
        .times(1)
        .return_once(move || Ok(Box::new(session) as Box<dyn WarehouseSession>));
    let test_app = spawn_app_with(Arc::new(warehouse));

    let (status, body) = get_json(&test_app.app, "/api/recent").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["window"].is_null());
    assert_eq!(body["observations"], json!([]));
}

#[tokio::test]
async fn each_request_uses_one_session() {
    let real = seeded_warehouse(&test_folder());
    let mut warehouse = MockWarehouse::new();
    warehouse
        .expect_open_session()
        .times(2)
        .returning(move || real.open_session());
    let test_app = spawn_app_with(Arc::new(warehouse));

    let (status, _) = get_json(
        &test_app.app,
        "/api/stations/466920/observations?date=2024-01-01",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get_json(&test_app.app, "/api/recent").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unreachable_warehouse_returns_503() {
    let mut warehouse = MockWarehouse::new();
    warehouse
        .expect_open_session()
        .times(1)
        .returning(|| Err(connection_error()));
    let test_app = spawn_app_with(Arc::new(warehouse));

    let (status, body) = get_json(&test_app.app, "/api/stations").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Failed to connect to warehouse"));
}

#[tokio::test]
async fn api_docs_are_served() {
    let test_app = spawn_app();

    let (status, html) = get(&test_app.app, "/docs").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("/api/recent"));
}
