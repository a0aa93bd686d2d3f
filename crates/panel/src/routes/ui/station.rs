use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};
use log::error;
use serde::Deserialize;

use crate::{
    pipeline::{
        parse_date, run_station_pipeline, StationRequest, StationRun, ValidationError,
    },
    routes::run_blocking,
    templates::{station_page, SelectionForm, StationOption, StationOutcome, StationSection},
    AppError, AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct StationQuery {
    pub county: Option<String>,
    /// Station identifier or display name
    pub station: Option<String>,
    /// YYYY-MM-DD
    pub date: Option<String>,
}

impl StationQuery {
    fn county(&self) -> Option<String> {
        self.county.clone().filter(|c| !c.trim().is_empty())
    }

    /// `None` until a station is submitted
    fn request(&self) -> Result<Option<StationRequest>, ValidationError> {
        let Some(station) = self.station.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };
        let date = self
            .date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(parse_date)
            .transpose()?;

        Ok(Some(StationRequest {
            county: self.county(),
            station: station.to_owned(),
            date,
        }))
    }
}

/// Handler for the station page (GET /)
pub async fn station_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StationQuery>,
) -> (StatusCode, Html<String>) {
    let table_sets = state.settings.table_set_names();

    match build_station_view(&state, query).await {
        Ok((form, outcome)) => (
            StatusCode::OK,
            Html(station_page(&table_sets, &form, &outcome).into_string()),
        ),
        Err(e) => {
            error!("error building station page: {}", e);
            let outcome = StationOutcome::Failed {
                title: e.title().to_owned(),
                message: e.to_string(),
            };
            (
                e.status_code(),
                Html(station_page(&table_sets, &SelectionForm::default(), &outcome).into_string()),
            )
        }
    }
}

async fn build_station_view(
    state: &Arc<AppState>,
    query: StationQuery,
) -> Result<(SelectionForm, StationOutcome), AppError> {
    let tables = state
        .settings
        .table_set(None)
        .cloned()
        .ok_or_else(|| ValidationError::UnknownTableSet(String::from("default")))?;
    let warehouse = state.warehouse.clone();
    let policy = state.settings.unmatched_stations;

    // A bad date still shows the form, so it's reported next to the catalog
    let (request, date_error) = match query.request() {
        Ok(request) => (request, None),
        Err(e) => (None, Some(e)),
    };

    let StationRun { catalog, report } = run_blocking(move || {
        Ok(run_station_pipeline(
            warehouse.as_ref(),
            &tables,
            request.as_ref(),
            policy,
        )?)
    })
    .await?;

    let county = query.county();
    let mut form = SelectionForm {
        counties: catalog.counties().into_iter().map(String::from).collect(),
        stations: catalog
            .stations_in(county.as_deref())
            .into_iter()
            .map(StationOption::from)
            .collect(),
        county,
        station: query.station.clone(),
        date: query
            .date
            .as_deref()
            .and_then(|d| parse_date(d).ok()),
        error: date_error.map(|e| e.to_string()),
    };

    let outcome = match report {
        None => StationOutcome::Idle,
        Some(Err(e)) => {
            form.error = Some(e.to_string());
            StationOutcome::Idle
        }
        Some(Ok(report)) => {
            form.station = Some(report.station.station_id.to_string());
            form.date = Some(report.window.start().date());
            StationOutcome::Report(StationSection::build(&report)?)
        }
    };

    Ok((form, outcome))
}
