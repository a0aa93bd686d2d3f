//! Taiwan Weather Panel Core Library
//!
//! Shared utilities for the panel service:
//! - Configuration file discovery and loading (XDG-compliant)
//! - File system helpers
//! - Application constants

mod config;
pub mod fs;

pub use config::{find_config_file, load_config, ConfigSource};
pub use fs::is_file;

/// Application name used for XDG paths
pub const APP_NAME: &str = "taiwan-weather-panel";

/// Default panel port
pub const DEFAULT_PANEL_PORT: u16 = 8501;

/// Schema holding the transformed weather tables
pub const DEFAULT_WAREHOUSE_SCHEMA: &str = "cwb_dev_transformed";

/// Geodetic datum the station coordinates are published in
pub const DEFAULT_COORDINATE_DATUM: &str = "TWD67";
