use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use log::error;
use serde::Deserialize;

use crate::{
    pipeline::{run_recent_pipeline, ValidationError},
    render::{Aggregation, CountyGeometry, RenderError},
    routes::run_blocking,
    templates::{recent_page, RecentOutcome, RecentSection},
    AppError, AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    /// Table set name, the first configured set when absent
    pub tables: Option<String>,
    pub agg: Option<Aggregation>,
    /// The pipeline only runs once the user asks for it
    #[serde(default)]
    pub generate: bool,
}

/// Handler for the recent-window page (GET /recent)
pub async fn recent_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentQuery>,
) -> (StatusCode, Html<String>) {
    let table_sets = state.settings.table_set_names();
    let aggregation = query.agg.unwrap_or_default();
    let table_set = query
        .tables
        .clone()
        .filter(|t| !t.is_empty())
        .or_else(|| table_sets.first().cloned())
        .unwrap_or_default();

    let (status, outcome) = match build_recent_view(&state, &query, aggregation).await {
        Ok(outcome) => (StatusCode::OK, outcome),
        Err(e) => {
            error!("error building recent page for {}: {}", table_set, e);
            let outcome = RecentOutcome::Failed {
                title: e.title().to_owned(),
                message: e.to_string(),
            };
            (e.status_code(), outcome)
        }
    };

    (
        status,
        Html(recent_page(&table_sets, &table_set, aggregation, &outcome).into_string()),
    )
}

async fn build_recent_view(
    state: &Arc<AppState>,
    query: &RecentQuery,
    aggregation: Aggregation,
) -> Result<RecentOutcome, AppError> {
    let tables = state
        .settings
        .table_set(query.tables.as_deref())
        .cloned()
        .ok_or_else(|| {
            ValidationError::UnknownTableSet(query.tables.clone().unwrap_or_default())
        })?;

    if !query.generate {
        return Ok(RecentOutcome::Idle);
    }

    let warehouse = state.warehouse.clone();
    let settings = state.settings.clone();
    run_blocking(move || {
        let report = run_recent_pipeline(warehouse.as_ref(), &tables, settings.unmatched_stations)?;
        let geometry = CountyGeometry::load(&settings.geometry).map_err(RenderError::from)?;
        let section = RecentSection::build(&report, &geometry, aggregation)?;
        Ok(RecentOutcome::Report(section))
    })
    .await
}
