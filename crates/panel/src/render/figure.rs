use serde::Serialize;
use serde_json::{json, Value};

use crate::db::{format_timestamp, Coordinates, Station};
use crate::pipeline::JoinedRow;

/// Taiwan, as seen from the county overview
pub const TAIWAN_CENTER: Coordinates = Coordinates {
    latitude: 23.97,
    longitude: 120.97,
};
pub const OVERVIEW_ZOOM: f64 = 5.0;
pub const STATION_ZOOM: f64 = 10.0;

/// A Plotly figure as handed to `Plotly.newPlot`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<Value>,
}

impl Figure {
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|trace| {
            ["x", "lat", "locations"]
                .iter()
                .filter_map(|key| trace.get(*key))
                .all(|values| values.as_array().map_or(true, |v| v.is_empty()))
        })
    }

    /// JSON for embedding in a `<script type="application/json">` block
    pub fn to_script_json(&self) -> Result<String, serde_json::Error> {
        // `</` would close the surrounding script element
        Ok(serde_json::to_string(self)?.replace("</", "<\\/"))
    }
}

/// Temperature over time for one station. Missing readings stay `null`, so
/// the line has a gap instead of dropping to zero.
pub fn temperature_chart(rows: &[JoinedRow]) -> Result<Figure, time::error::Format> {
    let x = rows
        .iter()
        .map(|r| format_timestamp(r.observation.observed_at))
        .collect::<Result<Vec<_>, _>>()?;
    let y: Vec<Option<f64>> = rows.iter().map(|r| r.observation.temperature).collect();

    Ok(Figure {
        data: vec![json!({
            "type": "scatter",
            "mode": "lines",
            "name": "Temperature",
            "x": x,
            "y": y,
            "connectgaps": false,
        })],
        layout: json!({
            "showlegend": false,
            "margin": { "t": 24, "r": 16 },
            "xaxis": { "title": { "text": "Time" } },
            "yaxis": { "title": { "text": "Temperature (°C)" } },
        }),
        frames: vec![],
    })
}

/// A single marker at the station's coordinate
pub fn station_map(station: &Station) -> Figure {
    let Some(coordinates) = station.coordinates else {
        return Figure {
            data: vec![json!({ "type": "scattermap", "lat": [], "lon": [] })],
            layout: map_layout(TAIWAN_CENTER, OVERVIEW_ZOOM),
            frames: vec![],
        };
    };

    Figure {
        data: vec![json!({
            "type": "scattermap",
            "mode": "markers",
            "lat": [coordinates.latitude],
            "lon": [coordinates.longitude],
            "text": [station.station_name],
            "hoverinfo": "text",
            "marker": { "size": 14 },
        })],
        layout: map_layout(coordinates, STATION_ZOOM),
        frames: vec![],
    }
}

pub(crate) fn map_layout(center: Coordinates, zoom: f64) -> Value {
    json!({
        "showlegend": false,
        "margin": { "t": 0, "r": 0, "b": 0, "l": 0 },
        "map": {
            "style": "carto-positron",
            "center": { "lat": center.latitude, "lon": center.longitude },
            "zoom": zoom,
        },
    })
}
