pub mod recent_routes;
pub mod station_routes;

pub use recent_routes::*;
pub use station_routes::*;

use serde::Deserialize;
use utoipa::IntoParams;

use crate::{db::TableSet, pipeline::ValidationError, AppState};

#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TableSetQuery {
    /// Configured table set name, the first one when absent
    pub tables: Option<String>,
}

impl TableSetQuery {
    pub fn resolve(&self, state: &AppState) -> Result<TableSet, ValidationError> {
        state
            .settings
            .table_set(self.tables.as_deref())
            .cloned()
            .ok_or_else(|| ValidationError::UnknownTableSet(self.tables.clone().unwrap_or_default()))
    }
}
