//! Server-side view models: table cells, Plotly figures and county geometry.

mod choropleth;
mod figure;
mod geometry;
mod table;

pub use choropleth::{
    counties_without_boundaries, county_choropleth, county_frames, Aggregation, CountyFrame,
    COLOR_RANGE,
};
pub use figure::{station_map, temperature_chart, Figure, TAIWAN_CENTER};
pub use geometry::{CountyGeometry, GeometryError, COUNTY_KEY, SIMPLIFY_TOLERANCE};
pub use table::{row_cells, ABSENT, COLUMNS};

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("Failed to format time string: {0}")]
    TimeFormat(#[from] time::error::Format),
    #[error("Failed to serialize figure: {0}")]
    Figure(#[from] serde_json::Error),
}
