use time::{macros::format_description, Date, Duration, PrimitiveDateTime};

use super::StationCatalog;
use crate::db::{InvertedWindow, QueryWindow, Station, WindowScope};

pub const STATION_WINDOW_HOURS: i64 = 24;
pub const RECENT_WINDOW_HOURS: i64 = 3;
/// Recent views cover the manned weather stations, whose identifiers start with this prefix
pub const RECENT_PREFIX: &str = "46";
/// Stations under maintenance, left out of the recent views
pub const EXCLUDED_STATIONS: [&str; 2] = ["468100", "469020"];

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Unknown station: {0}")]
    UnknownStation(String),
    #[error("Station {station} is not in {county}")]
    StationNotInCounty { station: String, county: String },
    #[error("No observations before {earliest}, {date} is too early")]
    DateBeforeEarliest { date: Date, earliest: Date },
    #[error("No observations after {latest}, {date} is too late")]
    DateAfterLatest { date: Date, latest: Date },
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Unknown table set: {0}")]
    UnknownTableSet(String),
    #[error(transparent)]
    Window(#[from] InvertedWindow),
}

/// What the user picked on the station page
#[derive(Debug, Clone, PartialEq)]
pub struct StationRequest {
    pub county: Option<String>,
    /// Station identifier or display name
    pub station: String,
    /// Defaults to the station's first observation date
    pub date: Option<Date>,
}

pub fn parse_date(value: &str) -> Result<Date, ValidationError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| ValidationError::InvalidDate(value.to_owned()))
}

/// Resolves a station request against the catalog into a 24 hour window
/// starting at midnight of the chosen date
pub fn resolve_station_window<'a>(
    catalog: &'a StationCatalog,
    request: &StationRequest,
) -> Result<(&'a Station, QueryWindow), ValidationError> {
    let station = catalog
        .find(&request.station)
        .ok_or_else(|| ValidationError::UnknownStation(request.station.clone()))?;

    if let Some(county) = request.county.as_deref().filter(|c| !c.is_empty()) {
        if station.county_name.as_deref() != Some(county) {
            return Err(ValidationError::StationNotInCounty {
                station: station.station_name.clone(),
                county: county.to_owned(),
            });
        }
    }

    let earliest = station.earliest.date();
    let latest = station.latest.date();
    let date = request.date.unwrap_or(earliest);
    if date < earliest {
        return Err(ValidationError::DateBeforeEarliest { date, earliest });
    }
    if date > latest {
        return Err(ValidationError::DateAfterLatest { date, latest });
    }

    let start = date.midnight();
    let end = start + Duration::hours(STATION_WINDOW_HOURS);
    let window = QueryWindow::new(WindowScope::Station(station.station_id.clone()), start, end)?;
    Ok((station, window))
}

/// The three hours up to and including the latest observation
pub fn recent_window(latest: PrimitiveDateTime) -> Result<QueryWindow, InvertedWindow> {
    QueryWindow::new(
        WindowScope::Prefix {
            prefix: RECENT_PREFIX,
            excluded: &EXCLUDED_STATIONS,
        },
        latest - Duration::hours(RECENT_WINDOW_HOURS),
        latest,
    )
}
