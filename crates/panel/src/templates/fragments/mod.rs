mod figure_panel;
mod notices;
mod observation_table;
mod selection_form;

pub use figure_panel::{figure_panel, tabs};
pub use notices::{empty_notice, error_notice, maintenance_notice, unmatched_notice};
pub use observation_table::observation_table;
pub use selection_form::{selection_form, station_options, SelectionForm, StationOption};
