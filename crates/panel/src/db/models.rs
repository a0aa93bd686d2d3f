use serde::{Deserialize, Serialize};
use std::fmt;
use time::{macros::format_description, PrimitiveDateTime};
use utoipa::ToSchema;

// Warehouse timestamps are Taiwan local wall-clock time without an offset
time::serde::format_description!(
    timestamp_format,
    PrimitiveDateTime,
    "[year]-[month]-[day] [hour]:[minute]:[second]"
);

pub fn parse_timestamp(value: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(
        value,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
}

pub fn format_timestamp(value: PrimitiveDateTime) -> Result<String, time::error::Format> {
    value.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
}

/// Identifier of a weather station as published by the feed (e.g. `466920`, `C0A520`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StationId {
    fn from(value: &str) -> Self {
        StationId::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Earliest and latest observation time of one station
#[derive(Debug, Clone, PartialEq)]
pub struct StationBounds {
    pub station_id: StationId,
    pub station_name: String,
    pub earliest: PrimitiveDateTime,
    pub latest: PrimitiveDateTime,
}

/// Geography reference row for one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StationGeo {
    pub station_id: StationId,
    pub station_name: String,
    pub county_name: Option<String>,
    pub county_code: Option<String>,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Station {
    pub station_id: StationId,
    pub station_name: String,
    pub county_name: Option<String>,
    pub county_code: Option<String>,
    pub coordinates: Option<Coordinates>,
    #[serde(with = "timestamp_format")]
    #[schema(value_type = String, example = "2024-01-01 00:00:00")]
    pub earliest: PrimitiveDateTime,
    #[serde(with = "timestamp_format")]
    #[schema(value_type = String, example = "2024-06-01 12:00:00")]
    pub latest: PrimitiveDateTime,
}

impl Station {
    pub fn from_parts(bounds: StationBounds, geo: Option<&StationGeo>) -> Self {
        Station {
            station_id: bounds.station_id,
            station_name: bounds.station_name,
            county_name: geo.and_then(|g| g.county_name.clone()),
            county_code: geo.and_then(|g| g.county_code.clone()),
            coordinates: geo.and_then(|g| g.coordinates),
            earliest: bounds.earliest,
            latest: bounds.latest,
        }
    }
}

/// Closed time interval as reported by the API
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimeRange {
    #[serde(with = "timestamp_format")]
    #[schema(value_type = String, example = "2024-06-01 09:00:00")]
    pub start: PrimitiveDateTime,
    #[serde(with = "timestamp_format")]
    #[schema(value_type = String, example = "2024-06-01 12:00:00")]
    pub end: PrimitiveDateTime,
}

/// One 10-minute reading. Every measurement is optional; the feed's missing
/// values stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Observation {
    pub station_id: StationId,
    pub station_name: String,
    #[serde(with = "timestamp_format")]
    #[schema(value_type = String, example = "2024-01-01 00:10:00")]
    pub observed_at: PrimitiveDateTime,
    pub weather: Option<String>,
    pub temperature: Option<f64>,
    pub pressure: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<i64>,
    pub gust_direction: Option<i64>,
    pub peak_gust_speed: Option<f64>,
    pub precipitation: Option<f64>,
    pub sunshine_duration: Option<f64>,
    pub visibility: Option<String>,
    pub uv_index: Option<f64>,
}
