use std::{
    fs,
    sync::{Arc, Once},
};

use axum::{
    body::{to_bytes, Body},
    http::Request,
    Router,
};
use hyper::{header, Method, StatusCode};
use log::{info, LevelFilter};
use mockall::mock;
use panel::{
    app, app_state_with,
    db::{
        self, DuckDbWarehouse, Observation, QueryWindow, StationBounds, StationGeo, StationId,
        TableSet, Warehouse, WarehouseConfig, WarehouseSession,
    },
    pipeline::UnmatchedStationPolicy,
    setup_logger, PanelSettings,
};
use rand::Rng;
use time::PrimitiveDateTime;
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
}

static INIT_LOGGER: Once = Once::new();
fn init_logger() {
    INIT_LOGGER.call_once(|| {
        setup_logger().level(LevelFilter::Debug).apply().unwrap();
    });
}

pub fn random_test_number() -> i32 {
    let mut rng = rand::thread_rng();
    rng.gen_range(10000..99999)
}

const SCHEMA_SQL: &str = r#"
    CREATE SCHEMA IF NOT EXISTS cwb_dev_transformed;
    CREATE TABLE cwb_dev_transformed.weather_records (
        STATIONID VARCHAR, STATIONNAME VARCHAR, OBSTIME TIMESTAMP, WEATHER VARCHAR,
        AIRTEMPERATURE DOUBLE, AIRPRESSURE DOUBLE, RELATIVEHUMIDITY DOUBLE, WINDSPEED DOUBLE,
        WINDDIRECTION BIGINT, GUSTDIRECTION BIGINT, PEAKGUSTSPEED DOUBLE, PRECIPITATION DOUBLE,
        SUNSHINEDURATION DOUBLE, VISIBILITY VARCHAR, UVINDEX DOUBLE
    );
    CREATE TABLE cwb_dev_transformed.geoinfo (
        STATIONID VARCHAR, STATIONNAME VARCHAR, COUNTYNAME VARCHAR, COUNTYCODE VARCHAR,
        COORDINATES_TWD67 STRUCT(StationLatitude DOUBLE, StationLongitude DOUBLE)
    );
"#;

const SEED_SQL: &str = r#"
    INSERT INTO cwb_dev_transformed.weather_records VALUES
        ('466920', 'Taipei', '2024-01-01 00:00:00', 'Cloudy', 16.2, 1019.1, 78, 2.1, 90, 100, 5.2, 0.0, 0.0, '10-15', 0),
        ('466920', 'Taipei', '2024-01-01 00:10:00', 'Cloudy', -99, 1019.0, 79, 2.0, -99, 110, 4.8, 0.0, 0.0, '-99', 0),
        ('466920', 'Taipei', '2024-01-02 00:00:00', 'Sunny', 15.1, 1018.7, 80, 1.5, 80, 95, 3.1, 0.5, 0.0, '10-15', 0),
        ('466920', 'Taipei', '2024-01-02 00:10:00', 'Sunny', 15.0, 1018.6, 80, 1.4, 80, 95, 3.0, 0.0, 0.0, '10-15', 0),
        ('467490', 'Taichung', '2024-01-01 00:00:00', 'Clear', 18.4, 1016.0, 70, 1.1, 20, 30, 2.0, 0.0, 0.0, '>30', 0),
        ('467490', 'Taichung', '2024-01-01 23:00:00', 'Clear', 17.9, 1016.2, 72, 1.0, 25, 35, 2.2, 0.0, 0.0, '>30', 0),
        ('466880', 'Banqiao', '2024-01-01 22:00:00', 'Cloudy', 17.0, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL),
        ('468100', 'Decommissioned', '2024-01-01 23:30:00', NULL, 10.0, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL),
        ('C0A520', 'Shanjia', '2024-01-01 23:50:00', NULL, 14.0, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL),
        ('466990', 'Hualien', NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL, NULL);
    INSERT INTO cwb_dev_transformed.geoinfo VALUES
        ('466920', 'Taipei', 'Taipei City', '63000', {'StationLatitude': 25.0377, 'StationLongitude': 121.5149}),
        ('466920', 'Taipei', 'Taipei City', '63000', {'StationLatitude': 25.0377, 'StationLongitude': 121.5149}),
        ('467490', 'Taichung', 'Taichung City', '66000', {'StationLatitude': 24.1457, 'StationLongitude': 120.6840});
"#;

const COUNTIES: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": { "COUNTYCODE": "63000", "COUNTYNAME": "Taipei City" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[121.4, 25.0], [121.7, 25.0], [121.7, 25.2], [121.4, 25.2], [121.4, 25.0]]]
            }
        },
        {
            "type": "Feature",
            "properties": { "COUNTYCODE": "66000", "COUNTYNAME": "Taichung City" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[120.5, 24.0], [121.0, 24.0], [121.0, 24.3], [120.5, 24.3], [120.5, 24.0]]]
            }
        }
    ]
}"#;

/// Fresh per-test folder under ./test_data
pub fn test_folder() -> String {
    let random_test_number = random_test_number();
    info!("test number: {}", random_test_number);
    let test_folder = format!("./test_data/{}", random_test_number);
    fs::create_dir_all(&test_folder).unwrap();
    test_folder
}

/// Writes the seeded warehouse file and returns its config. The seeding
/// connection is closed before returning so the panel can open it read-only.
pub fn seeded_database(test_folder: &str) -> WarehouseConfig {
    let database = format!("{}/weather.duckdb", test_folder);
    let _ = fs::remove_file(&database);
    {
        let conn = duckdb::Connection::open(&database).unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        conn.execute_batch(SEED_SQL).unwrap();
    }
    WarehouseConfig {
        database,
        token: None,
        threads: Some(1),
    }
}

pub fn seeded_warehouse(test_folder: &str) -> DuckDbWarehouse {
    DuckDbWarehouse::new(seeded_database(test_folder))
}

pub fn test_settings(test_folder: &str, warehouse: WarehouseConfig) -> PanelSettings {
    let geometry = format!("{}/county_boundaries.geojson", test_folder);
    fs::write(&geometry, COUNTIES).unwrap();

    PanelSettings {
        host: String::from("127.0.0.1"),
        port: 8501,
        remote_url: String::from("http://127.0.0.1:8501"),
        static_dir: String::from("./static"),
        geometry,
        warehouse,
        table_sets: vec![
            TableSet::new(
                "current",
                "cwb_dev_transformed",
                "weather_records",
                "geoinfo",
                "TWD67",
            )
            .unwrap(),
            TableSet::new(
                "v2",
                "cwb_dev_transformed",
                "weather_records_v2",
                "geoinfo_v2",
                "TWD67",
            )
            .unwrap(),
        ],
        unmatched_stations: UnmatchedStationPolicy::Drop,
    }
}

/// App over the seeded DuckDB file
pub fn spawn_app() -> TestApp {
    spawn_seeded_app(UnmatchedStationPolicy::Drop)
}

pub fn spawn_seeded_app(policy: UnmatchedStationPolicy) -> TestApp {
    init_logger();
    let test_folder = test_folder();
    let config = seeded_database(&test_folder);
    let warehouse = Arc::new(DuckDbWarehouse::new(config.clone()));
    build_app(&test_folder, config, warehouse, policy)
}

/// App over any warehouse, typically a mock
pub fn spawn_app_with(warehouse: Arc<dyn Warehouse>) -> TestApp {
    init_logger();
    let test_folder = test_folder();
    let config = WarehouseConfig {
        database: format!("{}/weather.duckdb", test_folder),
        token: None,
        threads: None,
    };
    build_app(&test_folder, config, warehouse, UnmatchedStationPolicy::Drop)
}

fn build_app(
    test_folder: &str,
    config: WarehouseConfig,
    warehouse: Arc<dyn Warehouse>,
    policy: UnmatchedStationPolicy,
) -> TestApp {
    let mut settings = test_settings(test_folder, config);
    settings.unmatched_stations = policy;

    TestApp {
        app: app(app_state_with(settings, warehouse)),
    }
}

/// A connection error as DuckDB reports it for an unreachable database
pub fn connection_error() -> db::Error {
    let database = String::from("/nonexistent/dir/weather.duckdb");
    let source = duckdb::Connection::open(&database).unwrap_err();
    db::Error::Connection { database, source }
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::ACCEPT, "text/html")
        .body(Body::empty())
        .unwrap();

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::ACCEPT, "application/json")
        .body(Body::empty())
        .unwrap();

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

mock! {
    pub Warehouse {}
    impl Warehouse for Warehouse {
        fn open_session(&self) -> Result<Box<dyn WarehouseSession>, db::Error>;
    }
}

mock! {
    pub WarehouseSession {}
    impl WarehouseSession for WarehouseSession {
        fn station_bounds(&self, tables: &TableSet) -> Result<Vec<StationBounds>, db::Error>;
        fn all_station_geo(&self, tables: &TableSet) -> Result<Vec<StationGeo>, db::Error>;
        fn station_geo(
            &self,
            tables: &TableSet,
            station_ids: &[StationId],
        ) -> Result<Vec<StationGeo>, db::Error>;
        fn latest_observation_time(
            &self,
            tables: &TableSet,
        ) -> Result<Option<PrimitiveDateTime>, db::Error>;
        fn observations(
            &self,
            tables: &TableSet,
            window: &QueryWindow,
        ) -> Result<Vec<Observation>, db::Error>;
    }
}
