use crate::db::{format_timestamp, Observation};

/// Shown for a reading the station did not report
pub const ABSENT: &str = "–";

pub const COLUMNS: [&str; 15] = [
    "Station ID",
    "Station Name",
    "Time",
    "Weather",
    "Temperature (°C)",
    "Pressure (hPa)",
    "Humidity (%)",
    "Wind Speed (m/s)",
    "Wind Direction (°)",
    "Gust Direction (°)",
    "Peak Gust Speed (m/s)",
    "Precipitation (mm)",
    "Sunshine (10 min)",
    "Visibility",
    "UV Index",
];

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| ABSENT.to_owned(), |v| v.to_string())
}

fn whole(value: Option<i64>) -> String {
    value.map_or_else(|| ABSENT.to_owned(), |v| v.to_string())
}

fn label(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| ABSENT.to_owned())
}

/// Table cells in `COLUMNS` order
pub fn row_cells(observation: &Observation) -> Result<[String; 15], time::error::Format> {
    Ok([
        observation.station_id.to_string(),
        observation.station_name.clone(),
        format_timestamp(observation.observed_at)?,
        label(&observation.weather),
        number(observation.temperature),
        number(observation.pressure),
        number(observation.humidity),
        number(observation.wind_speed),
        whole(observation.wind_direction),
        whole(observation.gust_direction),
        number(observation.peak_gust_speed),
        number(observation.precipitation),
        number(observation.sunshine_duration),
        label(&observation.visibility),
        number(observation.uv_index),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures::observation;
    use time::macros::datetime;

    #[test]
    fn absent_values_show_a_dash_and_zero_stays_zero() {
        let mut obs = observation("466920", datetime!(2024-01-01 00:10:00), None);
        obs.precipitation = Some(0.0);
        obs.wind_direction = Some(90);

        let cells = row_cells(&obs).unwrap();
        assert_eq!(cells.len(), COLUMNS.len());
        assert_eq!(cells[2], "2024-01-01 00:10:00");
        assert_eq!(cells[4], ABSENT);
        assert_eq!(cells[8], "90");
        assert_eq!(cells[9], ABSENT);
        assert_eq!(cells[11], "0");
        assert_eq!(cells[13], ABSENT);
    }

    #[test]
    fn readings_keep_their_reported_precision() {
        let mut obs = observation("466920", datetime!(2024-01-01 00:10:00), Some(16.25));
        obs.pressure = Some(1012.34);
        obs.precipitation = Some(0.04);
        obs.uv_index = Some(3.0);

        let cells = row_cells(&obs).unwrap();
        assert_eq!(cells[4], "16.25");
        assert_eq!(cells[5], "1012.34");
        assert_eq!(cells[11], "0.04");
        assert_eq!(cells[14], "3");
    }
}
