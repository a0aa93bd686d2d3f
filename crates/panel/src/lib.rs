//! Taiwan Weather Panel
//!
//! A read-only web panel over the Taiwan 10-minute weather warehouse: a
//! per-station day view and a county choropleth of the latest three hours.

mod app_error;
pub mod db;
pub mod pipeline;
pub mod render;
pub mod routes;
mod startup;
pub mod templates;
mod utils;

pub use app_error::*;
pub use routes::*;
pub use startup::*;
pub use utils::*;
