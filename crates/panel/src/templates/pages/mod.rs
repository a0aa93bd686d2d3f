pub mod recent;
pub mod station;

pub use recent::{recent_content, recent_page, RecentOutcome, RecentSection};
pub use station::{station_content, station_page, StationOutcome, StationSection};
