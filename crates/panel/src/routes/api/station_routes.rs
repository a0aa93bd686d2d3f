use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    db::{Station, StationId, TimeRange},
    pipeline::{
        load_catalog, parse_date, run_station_pipeline, JoinedRow, StationRequest, ValidationError,
    },
    routes::run_blocking,
    AppError, AppState,
};

use super::TableSetQuery;

#[utoipa::path(
    get,
    path = "/api/stations",
    params(
        TableSetQuery
    ),
    responses(
        (status = OK, description = "Stations with at least one observation, sorted by name", body = Vec<Station>),
        (status = BAD_REQUEST, description = "Unknown table set"),
        (status = SERVICE_UNAVAILABLE, description = "Weather warehouse unavailable"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query the station catalog")
    ))]
pub async fn get_stations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TableSetQuery>,
) -> Result<Json<Vec<Station>>, AppError> {
    let tables = query.resolve(&state)?;
    let warehouse = state.warehouse.clone();

    let catalog = run_blocking(move || Ok(load_catalog(warehouse.as_ref(), &tables)?)).await?;
    Ok(Json(catalog.stations().to_vec()))
}

#[derive(Clone, Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ObservationQuery {
    /// Day to report, YYYY-MM-DD; defaults to the station's first day
    pub date: Option<String>,
    /// Configured table set name, the first one when absent
    pub tables: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StationObservations {
    pub station: Station,
    pub window: TimeRange,
    pub observations: Vec<JoinedRow>,
    /// Stations left out for lack of geography
    pub unmatched: Vec<StationId>,
}

#[utoipa::path(
    get,
    path = "/api/stations/{station_id}/observations",
    params(
        ("station_id" = String, Path, description = "Station identifier or display name"),
        ObservationQuery
    ),
    responses(
        (status = OK, description = "One day of 10-minute observations for the station", body = StationObservations),
        (status = BAD_REQUEST, description = "Unknown station or table set, or date outside the station's range"),
        (status = SERVICE_UNAVAILABLE, description = "Weather warehouse unavailable"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query observations")
    ))]
pub async fn station_observations(
    State(state): State<Arc<AppState>>,
    Path(station_id): Path<String>,
    Query(query): Query<ObservationQuery>,
) -> Result<Json<StationObservations>, AppError> {
    let tables = TableSetQuery {
        tables: query.tables.clone(),
    }
    .resolve(&state)?;
    let date = query
        .date
        .as_deref()
        .filter(|d| !d.is_empty())
        .map(parse_date)
        .transpose()?;
    let request = StationRequest {
        county: None,
        station: station_id.clone(),
        date,
    };
    let warehouse = state.warehouse.clone();
    let policy = state.settings.unmatched_stations;

    let report = run_blocking(move || {
        Ok(run_station_pipeline(warehouse.as_ref(), &tables, Some(&request), policy)?
            .into_report()?)
    })
    .await?
    .ok_or(ValidationError::UnknownStation(station_id))?;

    Ok(Json(StationObservations {
        station: report.station,
        window: TimeRange::from(&report.window),
        observations: report.rows,
        unmatched: report.unmatched,
    }))
}
