use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    db::{StationId, TimeRange},
    pipeline::{run_recent_pipeline, JoinedRow},
    routes::run_blocking,
    AppError, AppState,
};

use super::TableSetQuery;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RecentObservations {
    pub table_set: String,
    /// Absent when the observation table is empty
    pub window: Option<TimeRange>,
    pub observations: Vec<JoinedRow>,
    /// Stations left out for lack of geography
    pub unmatched: Vec<StationId>,
}

#[utoipa::path(
    get,
    path = "/api/recent",
    params(
        TableSetQuery
    ),
    responses(
        (status = OK, description = "The latest three hours of observations from the manned stations", body = RecentObservations),
        (status = BAD_REQUEST, description = "Unknown table set"),
        (status = SERVICE_UNAVAILABLE, description = "Weather warehouse unavailable"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query observations")
    ))]
pub async fn recent_observations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TableSetQuery>,
) -> Result<Json<RecentObservations>, AppError> {
    let tables = query.resolve(&state)?;
    let warehouse = state.warehouse.clone();
    let policy = state.settings.unmatched_stations;

    let report =
        run_blocking(move || Ok(run_recent_pipeline(warehouse.as_ref(), &tables, policy)?))
            .await?;

    Ok(Json(RecentObservations {
        table_set: report.table_set,
        window: report.window.as_ref().map(TimeRange::from),
        observations: report.rows,
        unmatched: report.unmatched,
    }))
}
