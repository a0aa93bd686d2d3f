use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use log::warn;
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};
use time::PrimitiveDateTime;
use utoipa::ToSchema;

use super::{
    figure::{map_layout, Figure, OVERVIEW_ZOOM, TAIWAN_CENTER},
    geometry::{CountyGeometry, COUNTY_KEY},
};
use crate::db::format_timestamp;
use crate::pipeline::JoinedRow;

/// Colour range of the county overlay, in °C
pub const COLOR_RANGE: (f64, f64) = (0.0, 40.0);
pub const OPACITY: f64 = 0.5;
/// Plotly express' sequential "Rainbow" scale
const RAINBOW: [&str; 9] = [
    "rgb(150,0,90)",
    "rgb(0,0,200)",
    "rgb(0,25,255)",
    "rgb(0,152,255)",
    "rgb(44,255,150)",
    "rgb(151,255,0)",
    "rgb(255,234,0)",
    "rgb(255,111,0)",
    "rgb(255,0,0)",
];
const FRAME_DURATION_MS: u64 = 500;

/// How station readings in one county collapse into the county colour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Mean of the readings present at the frame's timestamp
    #[default]
    Mean,
    /// Most recent reading at or before the frame, carried forward
    Latest,
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Mean => write!(f, "mean"),
            Aggregation::Latest => write!(f, "latest"),
        }
    }
}

/// County values at one timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct CountyFrame {
    pub observed_at: PrimitiveDateTime,
    pub values: BTreeMap<String, f64>,
}

/// One frame per distinct timestamp, ascending
pub fn county_frames(rows: &[JoinedRow], aggregation: Aggregation) -> Vec<CountyFrame> {
    let by_time = rows
        .iter()
        .map(|r| (r.observation.observed_at, r))
        .into_group_map();

    let mut carried: BTreeMap<String, f64> = BTreeMap::new();
    by_time
        .into_iter()
        .sorted_by_key(|(observed_at, _)| *observed_at)
        .map(|(observed_at, rows)| {
            let means = county_means(&rows);
            let values = match aggregation {
                Aggregation::Mean => means,
                Aggregation::Latest => {
                    carried.extend(means);
                    carried.clone()
                }
            };
            CountyFrame {
                observed_at,
                values,
            }
        })
        .collect()
}

fn county_means(rows: &[&JoinedRow]) -> BTreeMap<String, f64> {
    rows.iter()
        .filter_map(|r| Some((r.county_code.clone()?, r.observation.temperature?)))
        .into_group_map()
        .into_iter()
        .map(|(county, readings)| {
            let mean = readings.iter().sum::<f64>() / readings.len() as f64;
            (county, mean)
        })
        .collect()
}

/// County codes with readings but no polygon in `geometry`
pub fn counties_without_boundaries(
    frames: &[CountyFrame],
    geometry: &CountyGeometry,
) -> BTreeSet<String> {
    let known = geometry.county_codes();
    frames
        .iter()
        .flat_map(|f| f.values.keys())
        .filter(|code| !known.contains(*code))
        .cloned()
        .collect()
}

/// Animated county overlay with one frame per timestamp and a slider to step through them
pub fn county_choropleth(
    rows: &[JoinedRow],
    geometry: &CountyGeometry,
    aggregation: Aggregation,
) -> Result<Figure, time::error::Format> {
    let frames = county_frames(rows, aggregation);
    let unmapped = counties_without_boundaries(&frames, geometry);
    if !unmapped.is_empty() {
        warn!(
            "no boundary polygon for counties {}, their readings are not drawn",
            unmapped.iter().join(", ")
        );
    }
    let names = frames
        .iter()
        .map(|f| format_timestamp(f.observed_at))
        .collect::<Result<Vec<_>, _>>()?;

    let mut base = json!({
        "type": "choroplethmap",
        "geojson": geometry.to_json(),
        "featureidkey": format!("properties.{}", COUNTY_KEY),
        "zmin": COLOR_RANGE.0,
        "zmax": COLOR_RANGE.1,
        "colorscale": colorscale(),
        "marker": { "opacity": OPACITY, "line": { "width": 0.5 } },
        "colorbar": { "title": { "text": "°C" } },
        "hovertemplate": "%{location}: %{z:.1f} °C<extra></extra>",
    });
    let (locations, z) = frames.first().map(frame_values).unwrap_or_default();
    base["locations"] = json!(locations);
    base["z"] = json!(z);

    let mut layout = map_layout(TAIWAN_CENTER, OVERVIEW_ZOOM);
    if frames.len() > 1 {
        layout["sliders"] = json!([slider(&names)]);
        layout["updatemenus"] = json!([play_controls()]);
    }

    let animation_frames = frames
        .iter()
        .zip(&names)
        .map(|(frame, name)| {
            let (locations, z) = frame_values(frame);
            json!({
                "name": name,
                "data": [{ "locations": locations, "z": z }],
            })
        })
        .collect();

    Ok(Figure {
        data: vec![base],
        layout,
        frames: if names.len() > 1 {
            animation_frames
        } else {
            vec![]
        },
    })
}

fn frame_values(frame: &CountyFrame) -> (Vec<String>, Vec<f64>) {
    frame
        .values
        .iter()
        .map(|(county, value)| (county.clone(), *value))
        .unzip()
}

fn colorscale() -> Value {
    let last = (RAINBOW.len() - 1) as f64;
    RAINBOW
        .iter()
        .enumerate()
        .map(|(i, color)| json!([i as f64 / last, color]))
        .collect()
}

fn slider(names: &[String]) -> Value {
    let steps: Vec<Value> = names
        .iter()
        .map(|name| {
            json!({
                "label": name,
                "method": "animate",
                "args": [[name], {
                    "mode": "immediate",
                    "frame": { "duration": FRAME_DURATION_MS, "redraw": true },
                    "transition": { "duration": 0 },
                }],
            })
        })
        .collect();
    json!({
        "active": 0,
        "currentvalue": { "prefix": "Time: " },
        "pad": { "t": 40 },
        "steps": steps,
    })
}

fn play_controls() -> Value {
    json!({
        "type": "buttons",
        "showactive": false,
        "x": 0.05,
        "y": 0,
        "xanchor": "right",
        "yanchor": "top",
        "pad": { "t": 40, "r": 10 },
        "buttons": [
            {
                "label": "▶",
                "method": "animate",
                "args": [null, {
                    "fromcurrent": true,
                    "frame": { "duration": FRAME_DURATION_MS, "redraw": true },
                    "transition": { "duration": 0 },
                }],
            },
            {
                "label": "❚❚",
                "method": "animate",
                "args": [[null], {
                    "mode": "immediate",
                    "frame": { "duration": 0, "redraw": false },
                }],
            },
        ],
    })
}
