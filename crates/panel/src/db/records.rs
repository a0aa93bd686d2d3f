//! Decoding of warehouse result batches into typed rows.
//!
//! Every query casts its columns to a fixed arrow type, so a column that does
//! not downcast means the query and this module disagree about the shape.

use duckdb::arrow::array::{Array, Float64Array, Int64Array, RecordBatch, StringArray};
use log::warn;
use time::PrimitiveDateTime;

use super::{
    parse_timestamp, warehouse::Error, Coordinates, Observation, StationBounds, StationGeo,
    StationId,
};

/// Codes the observation feed uses in place of a missing reading
const MISSING_SENTINELS: [f64; 3] = [-99.0, -999.0, -9999.0];
const MISSING_TEXT: [&str; 4] = ["", "-99", "-999", "-9999"];

struct Columns<'a> {
    batch: &'a RecordBatch,
    context: &'static str,
}

impl<'a> Columns<'a> {
    fn new(batch: &'a RecordBatch, context: &'static str, expected: usize) -> Result<Self, Error> {
        if batch.num_columns() != expected {
            return Err(Error::Shape {
                context,
                reason: format!(
                    "expected {} columns, got {}",
                    expected,
                    batch.num_columns()
                ),
            });
        }
        Ok(Columns { batch, context })
    }

    fn strings(&self, index: usize) -> Result<&'a StringArray, Error> {
        self.batch
            .column(index)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| self.mismatch(index, "StringArray"))
    }

    fn floats(&self, index: usize) -> Result<&'a Float64Array, Error> {
        self.batch
            .column(index)
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| self.mismatch(index, "Float64Array"))
    }

    fn ints(&self, index: usize) -> Result<&'a Int64Array, Error> {
        self.batch
            .column(index)
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| self.mismatch(index, "Int64Array"))
    }

    fn mismatch(&self, index: usize, expected: &str) -> Error {
        Error::Shape {
            context: self.context,
            reason: format!(
                "expected {} in column {}, got {}",
                expected,
                index,
                self.batch.column(index).data_type()
            ),
        }
    }

    fn required(&self, array: &StringArray, row: usize, column: &str) -> Result<String, Error> {
        if array.is_null(row) {
            return Err(Error::Shape {
                context: self.context,
                reason: format!("row {} has no {}", row, column),
            });
        }
        Ok(array.value(row).to_owned())
    }
}

fn text(array: &StringArray, row: usize) -> Option<String> {
    if array.is_null(row) {
        return None;
    }
    let value = array.value(row).trim();
    if MISSING_TEXT.contains(&value) {
        None
    } else {
        Some(value.to_owned())
    }
}

fn measurement(array: &Float64Array, row: usize) -> Option<f64> {
    if array.is_null(row) {
        return None;
    }
    let value = array.value(row);
    if value.is_nan() || MISSING_SENTINELS.contains(&value) {
        None
    } else {
        Some(value)
    }
}

fn direction(array: &Int64Array, row: usize) -> Option<i64> {
    if array.is_null(row) {
        return None;
    }
    let value = array.value(row);
    if MISSING_SENTINELS.contains(&(value as f64)) {
        None
    } else {
        Some(value)
    }
}

fn timestamp(array: &StringArray, row: usize) -> Result<Option<PrimitiveDateTime>, Error> {
    if array.is_null(row) {
        return Ok(None);
    }
    Ok(Some(parse_timestamp(array.value(row))?))
}

/// station_id, station_name, earliest, latest
pub fn station_bounds(batches: &[RecordBatch]) -> Result<Vec<StationBounds>, Error> {
    let mut stations = Vec::new();
    for batch in batches {
        let cols = Columns::new(batch, "station catalog", 4)?;
        let ids = cols.strings(0)?;
        let names = cols.strings(1)?;
        let earliest_col = cols.strings(2)?;
        let latest_col = cols.strings(3)?;

        for row in 0..batch.num_rows() {
            let station_id = StationId::new(cols.required(ids, row, "station id")?);
            let (Some(earliest), Some(latest)) =
                (timestamp(earliest_col, row)?, timestamp(latest_col, row)?)
            else {
                warn!(
                    "skipping station {} without observation bounds",
                    station_id
                );
                continue;
            };
            if earliest > latest {
                warn!(
                    "skipping station {} with inverted bounds {} > {}",
                    station_id, earliest, latest
                );
                continue;
            }
            let station_name = text(names, row).unwrap_or_else(|| station_id.to_string());
            stations.push(StationBounds {
                station_id,
                station_name,
                earliest,
                latest,
            });
        }
    }
    Ok(stations)
}

/// station_id, station_name, county_name, county_code, latitude, longitude
pub fn station_geo(batches: &[RecordBatch]) -> Result<Vec<StationGeo>, Error> {
    let mut geo = Vec::new();
    for batch in batches {
        let cols = Columns::new(batch, "station geography", 6)?;
        let ids = cols.strings(0)?;
        let names = cols.strings(1)?;
        let county_names = cols.strings(2)?;
        let county_codes = cols.strings(3)?;
        let latitudes = cols.floats(4)?;
        let longitudes = cols.floats(5)?;

        for row in 0..batch.num_rows() {
            let station_id = StationId::new(cols.required(ids, row, "station id")?);
            let coordinates = match (measurement(latitudes, row), measurement(longitudes, row)) {
                (Some(latitude), Some(longitude)) => Some(Coordinates {
                    latitude,
                    longitude,
                }),
                _ => None,
            };
            geo.push(StationGeo {
                station_name: text(names, row).unwrap_or_else(|| station_id.to_string()),
                station_id,
                county_name: text(county_names, row),
                county_code: text(county_codes, row),
                coordinates,
            });
        }
    }
    Ok(geo)
}

/// Single `latest` column, at most one row
pub fn latest_timestamp(batches: &[RecordBatch]) -> Result<Option<PrimitiveDateTime>, Error> {
    for batch in batches {
        let cols = Columns::new(batch, "latest observation", 1)?;
        let latest = cols.strings(0)?;
        if batch.num_rows() > 0 {
            return timestamp(latest, 0);
        }
    }
    Ok(None)
}

/// Canonical observation column order, see `warehouse::OBSERVATION_COLUMNS`
pub fn observations(batches: &[RecordBatch]) -> Result<Vec<Observation>, Error> {
    let mut rows = Vec::new();
    for batch in batches {
        let cols = Columns::new(batch, "observations", 15)?;
        let ids = cols.strings(0)?;
        let names = cols.strings(1)?;
        let times = cols.strings(2)?;
        let weather = cols.strings(3)?;
        let temperature = cols.floats(4)?;
        let pressure = cols.floats(5)?;
        let humidity = cols.floats(6)?;
        let wind_speed = cols.floats(7)?;
        let wind_direction = cols.ints(8)?;
        let gust_direction = cols.ints(9)?;
        let peak_gust_speed = cols.floats(10)?;
        let precipitation = cols.floats(11)?;
        let sunshine_duration = cols.floats(12)?;
        let visibility = cols.strings(13)?;
        let uv_index = cols.floats(14)?;

        for row in 0..batch.num_rows() {
            let station_id = StationId::new(cols.required(ids, row, "station id")?);
            let observed_at = parse_timestamp(&cols.required(times, row, "observation time")?)?;
            rows.push(Observation {
                station_name: text(names, row).unwrap_or_else(|| station_id.to_string()),
                station_id,
                observed_at,
                weather: text(weather, row),
                temperature: measurement(temperature, row),
                pressure: measurement(pressure, row),
                humidity: measurement(humidity, row),
                wind_speed: measurement(wind_speed, row),
                wind_direction: direction(wind_direction, row),
                gust_direction: direction(gust_direction, row),
                peak_gust_speed: measurement(peak_gust_speed, row),
                precipitation: measurement(precipitation, row),
                sunshine_duration: measurement(sunshine_duration, row),
                visibility: text(visibility, row),
                uv_index: measurement(uv_index, row),
            });
        }
    }
    Ok(rows)
}
