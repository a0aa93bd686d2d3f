use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use log::error;
use serde::Deserialize;

use crate::{
    pipeline::{load_catalog, ValidationError},
    routes::run_blocking,
    templates::{station_options, StationOption},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct StationsFragmentQuery {
    pub county: Option<String>,
}

/// Handler for the station dropdown options (GET /fragments/stations)
pub async fn stations_fragment_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StationsFragmentQuery>,
) -> (StatusCode, Html<String>) {
    let county = query.county.filter(|c| !c.trim().is_empty());
    let tables = state.settings.table_set(None).cloned();
    let warehouse = state.warehouse.clone();

    let options = run_blocking(move || {
        let tables =
            tables.ok_or_else(|| ValidationError::UnknownTableSet(String::from("default")))?;
        let catalog = load_catalog(warehouse.as_ref(), &tables)?;
        Ok(catalog
            .stations_in(county.as_deref())
            .into_iter()
            .map(StationOption::from)
            .collect::<Vec<_>>())
    })
    .await;

    match options {
        Ok(options) => {
            let selected = options.first().map(|s| s.station_id.clone());
            (
                StatusCode::OK,
                Html(station_options(&options, selected.as_deref()).into_string()),
            )
        }
        Err(e) => {
            error!("error loading station options: {}", e);
            (
                e.status_code(),
                Html(station_options(&[], None).into_string()),
            )
        }
    }
}
