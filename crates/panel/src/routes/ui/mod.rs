mod fragments;
mod recent;
mod station;

pub use fragments::stations_fragment_handler;
pub use recent::{recent_handler, RecentQuery};
pub use station::{station_handler, StationQuery};
