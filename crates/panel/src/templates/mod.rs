pub mod components;
pub mod fragments;
pub mod layouts;
pub mod pages;

pub use fragments::{station_options, SelectionForm, StationOption};
pub use layouts::{CurrentPage, PageConfig};
pub use pages::{
    recent_page, station_page, RecentOutcome, RecentSection, StationOutcome, StationSection,
};
