use crate::{
    db::{self, DuckDbWarehouse, Warehouse},
    get_stations, pipeline, recent_handler, recent_observations, render, routes,
    station_handler, station_observations, stations_fragment_handler, PanelSettings,
};
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use log::info;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub static_dir: String,
    pub warehouse: Arc<dyn Warehouse>,
    pub settings: Arc<PanelSettings>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::api::station_routes::get_stations,
        routes::api::station_routes::station_observations,
        routes::api::recent_routes::recent_observations,
    ),
    components(
        schemas(
                db::Station,
                db::StationId,
                db::Coordinates,
                db::Observation,
                db::TimeRange,
                pipeline::JoinedRow,
                render::Aggregation,
                routes::api::station_routes::StationObservations,
                routes::api::recent_routes::RecentObservations
            )
    ),
    tags(
        (name = "taiwan weather panel api", description = "station catalog and 10-minute observations from the Taiwan weather warehouse")
    )
)]
struct ApiDoc;

/// State backed by the DuckDB warehouse the settings point at
pub fn build_app_state(settings: PanelSettings) -> AppState {
    let warehouse = Arc::new(DuckDbWarehouse::new(settings.warehouse.clone()));
    app_state_with(settings, warehouse)
}

/// State over any warehouse, used by tests to swap in mocks
pub fn app_state_with(settings: PanelSettings, warehouse: Arc<dyn Warehouse>) -> AppState {
    AppState {
        static_dir: settings.static_dir.clone(),
        warehouse,
        settings: Arc::new(settings),
    }
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let serve_static = ServeDir::new(&app_state.static_dir);
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        // UI routes
        .route("/", get(station_handler))
        .route("/recent", get(recent_handler))
        // HTMX fragment routes
        .route("/fragments/stations", get(stations_fragment_handler))
        // API routes
        .route("/api/stations", get(get_stations))
        .route(
            "/api/stations/{station_id}/observations",
            get(station_observations),
        )
        .route("/api/recent", get(recent_observations))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .nest_service("/static", serve_static)
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default()
        .to_owned();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, {} code: {}, time: {}", path, response.status().as_str(), response_time);

    response
}
