mod models;
mod records;
mod tables;
mod warehouse;
mod window;

pub use models::*;
pub use tables::{default_table_sets, validate_identifier, InvalidIdentifier, TableSet, TableSetConfig};
pub use warehouse::{
    DuckDbSession, DuckDbWarehouse, Error, Warehouse, WarehouseConfig, WarehouseSession,
};
pub use window::{InvertedWindow, QueryWindow, WindowScope};

#[cfg(test)]
pub(crate) use warehouse::fixtures;
