//! Catalog, selection, fetch and geo join for one page load.
//!
//! Each run opens a single warehouse session up front and every query of the
//! run goes through it; the session closes when the run returns.

mod catalog;
mod geo_join;
mod selection;

pub use catalog::StationCatalog;
pub use geo_join::{
    distinct_station_ids, join_geo, JoinError, JoinOutcome, JoinedRow, UnmatchedStationPolicy,
};
pub use selection::{
    parse_date, recent_window, resolve_station_window, StationRequest, ValidationError,
    EXCLUDED_STATIONS, RECENT_PREFIX, RECENT_WINDOW_HOURS, STATION_WINDOW_HOURS,
};

#[cfg(test)]
pub(crate) use geo_join::fixtures;

use log::{debug, info};

use crate::db::{self, QueryWindow, Station, StationId, TableSet, Warehouse, WarehouseSession};

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Warehouse(#[from] db::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Join(#[from] JoinError),
}

/// Observations of one station for one day, joined to its geography
#[derive(Debug, Clone, PartialEq)]
pub struct StationReport {
    pub station: Station,
    pub window: QueryWindow,
    pub rows: Vec<JoinedRow>,
    pub unmatched: Vec<StationId>,
}

/// Result of a station page run. The catalog is always loaded so the form can
/// be drawn; a rejected selection is kept next to it instead of failing the run.
#[derive(Debug)]
pub struct StationRun {
    pub catalog: StationCatalog,
    pub report: Option<Result<StationReport, ValidationError>>,
}

impl StationRun {
    pub fn into_report(self) -> Result<Option<StationReport>, PipelineError> {
        match self.report {
            None => Ok(None),
            Some(Ok(report)) => Ok(Some(report)),
            Some(Err(e)) => Err(PipelineError::Validation(e)),
        }
    }
}

/// Observations of all recent-scope stations over the last three hours
#[derive(Debug, Clone, PartialEq)]
pub struct RecentReport {
    pub table_set: String,
    /// `None` when the observation table is empty
    pub window: Option<QueryWindow>,
    pub rows: Vec<JoinedRow>,
    pub unmatched: Vec<StationId>,
}

pub fn load_catalog(
    warehouse: &dyn Warehouse,
    tables: &TableSet,
) -> Result<StationCatalog, PipelineError> {
    let session = warehouse.open_session()?;
    Ok(StationCatalog::load(session.as_ref(), tables)?)
}

pub fn run_station_pipeline(
    warehouse: &dyn Warehouse,
    tables: &TableSet,
    request: Option<&StationRequest>,
    policy: UnmatchedStationPolicy,
) -> Result<StationRun, PipelineError> {
    let session = warehouse.open_session()?;
    let catalog = StationCatalog::load(session.as_ref(), tables)?;

    let Some(request) = request else {
        return Ok(StationRun {
            catalog,
            report: None,
        });
    };

    let (station, window) = match resolve_station_window(&catalog, request) {
        Ok((station, window)) => (station.clone(), window),
        Err(e) => {
            info!("rejected station selection {:?}: {}", request, e);
            return Ok(StationRun {
                catalog,
                report: Some(Err(e)),
            });
        }
    };

    let observations = session.observations(tables, &window)?;
    let geo = session.station_geo(tables, std::slice::from_ref(&station.station_id))?;
    let outcome = join_geo(observations, &geo, policy)?;
    info!(
        "station {} on {}: {} rows",
        station.station_id,
        window.start().date(),
        outcome.rows.len()
    );

    let report = StationReport {
        station,
        window,
        rows: outcome.rows,
        unmatched: outcome.unmatched,
    };
    Ok(StationRun {
        catalog,
        report: Some(Ok(report)),
    })
}

pub fn run_recent_pipeline(
    warehouse: &dyn Warehouse,
    tables: &TableSet,
    policy: UnmatchedStationPolicy,
) -> Result<RecentReport, PipelineError> {
    let session = warehouse.open_session()?;
    fetch_recent(session.as_ref(), tables, policy)
}

fn fetch_recent(
    session: &dyn WarehouseSession,
    tables: &TableSet,
    policy: UnmatchedStationPolicy,
) -> Result<RecentReport, PipelineError> {
    let Some(latest) = session.latest_observation_time(tables)? else {
        info!("{} has no observations", tables.observation_table());
        return Ok(RecentReport {
            table_set: tables.name().to_owned(),
            window: None,
            rows: vec![],
            unmatched: vec![],
        });
    };

    let window = recent_window(latest).map_err(ValidationError::from)?;
    let observations = session.observations(tables, &window)?;
    let station_ids = distinct_station_ids(&observations);
    debug!(
        "recent window {} - {}: {} rows from {} stations",
        window.start(),
        window.end(),
        observations.len(),
        station_ids.len()
    );

    let geo = session.station_geo(tables, &station_ids)?;
    let outcome = join_geo(observations, &geo, policy)?;

    Ok(RecentReport {
        table_set: tables.name().to_owned(),
        window: Some(window),
        rows: outcome.rows,
        unmatched: outcome.unmatched,
    })
}
