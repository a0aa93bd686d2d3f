use clap::Parser;
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;
use std::{collections::HashSet, env};
use taiwan_weather_core::{
    find_config_file, is_file, load_config, ConfigSource, DEFAULT_COORDINATE_DATUM,
    DEFAULT_PANEL_PORT, DEFAULT_WAREHOUSE_SCHEMA,
};
use time::{format_description::well_known::Iso8601, OffsetDateTime};

use crate::{
    db::{default_table_sets, InvalidIdentifier, TableSet, TableSetConfig, WarehouseConfig},
    pipeline::UnmatchedStationPolicy,
};

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "Taiwan Weather Panel - station and county weather views over a DuckDB warehouse"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $TWP_PANEL_CONFIG, ./panel.toml,
    /// $XDG_CONFIG_HOME/taiwan-weather-panel/panel.toml, /etc/taiwan-weather-panel/panel.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "TWP_PANEL_LEVEL")]
    pub level: Option<String>,

    /// Host to listen on (use 0.0.0.0 for all interfaces)
    #[arg(short, long, env = "TWP_PANEL_HOST")]
    #[serde(alias = "host")]
    pub domain: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "TWP_PANEL_PORT")]
    pub port: Option<String>,

    /// Public URL for the UI
    #[arg(short, long, env = "TWP_PANEL_REMOTE_URL")]
    pub remote_url: Option<String>,

    /// Directory containing UI static files
    #[arg(short, long, env = "TWP_PANEL_UI_DIR")]
    pub ui_dir: Option<String>,

    /// County boundaries GeoJSON, features keyed by properties.COUNTYCODE
    #[arg(short, long, env = "TWP_PANEL_GEOMETRY")]
    pub geometry: Option<String>,

    /// DuckDB database file or MotherDuck `md:` database
    #[arg(long, env = "TWP_WAREHOUSE_DATABASE")]
    pub warehouse_database: Option<String>,

    /// MotherDuck token, required for `md:` databases
    #[arg(long, env = "TWP_WAREHOUSE_TOKEN", hide_env_values = true)]
    pub warehouse_token: Option<String>,

    /// Worker threads per query
    #[arg(long, env = "TWP_WAREHOUSE_THREADS")]
    pub warehouse_threads: Option<String>,

    /// Schema holding the observation and geography tables
    #[arg(long, env = "TWP_WAREHOUSE_SCHEMA")]
    pub warehouse_schema: Option<String>,

    /// Datum suffix of the geography coordinate column (COORDINATES_<DATUM>)
    #[arg(long, env = "TWP_COORDINATE_DATUM")]
    pub coordinate_datum: Option<String>,

    /// What to do with observations whose station has no geography: drop or reject
    #[arg(long, env = "TWP_UNMATCHED_STATIONS")]
    pub unmatched_stations: Option<String>,

    /// Observation/geography table pairs; config file only
    #[arg(skip)]
    pub table_sets: Option<Vec<TableSetConfig>>,
}

impl Cli {
    pub fn host(&self) -> String {
        self.domain
            .clone()
            .unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port(&self) -> String {
        self.port
            .clone()
            .unwrap_or_else(|| DEFAULT_PANEL_PORT.to_string())
    }

    pub fn remote_url(&self) -> String {
        self.remote_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host(), self.port()))
    }

    pub fn static_dir(&self) -> String {
        self.ui_dir
            .clone()
            .unwrap_or_else(|| "./static".to_string())
    }

    pub fn geometry(&self) -> String {
        self.geometry
            .clone()
            .unwrap_or_else(|| "./taiwan_geo/county_boundaries.geojson".to_string())
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Result<Cli, ConfigError> {
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("TWP_PANEL_CONFIG", "panel.toml")
    };

    let file_config: Cli = load_config(&source)
        .map_err(|e| ConfigError::File(format!("{}: {:#}", source, e)))?;
    Ok(merge(cli_args, file_config))
}

/// CLI args and env vars win over the config file
pub fn merge(cli_args: Cli, file_config: Cli) -> Cli {
    Cli {
        config: cli_args.config,
        level: cli_args.level.or(file_config.level),
        domain: cli_args.domain.or(file_config.domain),
        port: cli_args.port.or(file_config.port),
        remote_url: cli_args.remote_url.or(file_config.remote_url),
        ui_dir: cli_args.ui_dir.or(file_config.ui_dir),
        geometry: cli_args.geometry.or(file_config.geometry),
        warehouse_database: cli_args
            .warehouse_database
            .or(file_config.warehouse_database),
        warehouse_token: cli_args.warehouse_token.or(file_config.warehouse_token),
        warehouse_threads: cli_args.warehouse_threads.or(file_config.warehouse_threads),
        warehouse_schema: cli_args.warehouse_schema.or(file_config.warehouse_schema),
        coordinate_datum: cli_args.coordinate_datum.or(file_config.coordinate_datum),
        unmatched_stations: cli_args
            .unmatched_stations
            .or(file_config.unmatched_stations),
        table_sets: cli_args.table_sets.or(file_config.table_sets),
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Failed to read config file {0}")]
    File(String),
    #[error("Missing required setting {0}")]
    Missing(&'static str),
    #[error("Invalid value for {setting}: {reason}")]
    Invalid {
        setting: &'static str,
        reason: String,
    },
    #[error("Invalid table name: {0}")]
    Identifier(#[from] InvalidIdentifier),
}

/// Everything the panel needs at runtime, resolved and checked once at startup
#[derive(Debug, Clone)]
pub struct PanelSettings {
    pub host: String,
    pub port: u16,
    pub remote_url: String,
    pub static_dir: String,
    pub geometry: String,
    pub warehouse: WarehouseConfig,
    /// Never empty; the first set is the default
    pub table_sets: Vec<TableSet>,
    pub unmatched_stations: UnmatchedStationPolicy,
}

impl PanelSettings {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let port = cli
            .port()
            .parse::<u16>()
            .map_err(|e| ConfigError::Invalid {
                setting: "port",
                reason: e.to_string(),
            })?;

        let database = cli
            .warehouse_database
            .clone()
            .filter(|d| !d.trim().is_empty())
            .ok_or(ConfigError::Missing("TWP_WAREHOUSE_DATABASE"))?;
        let token = cli.warehouse_token.clone().filter(|t| !t.trim().is_empty());
        let threads = cli
            .warehouse_threads
            .as_deref()
            .map(|t| match t.trim().parse::<u32>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(ConfigError::Invalid {
                    setting: "TWP_WAREHOUSE_THREADS",
                    reason: format!("'{}' is not a positive number", t),
                }),
            })
            .transpose()?;
        let warehouse = WarehouseConfig {
            database,
            token,
            threads,
        };
        if warehouse.is_remote() && warehouse.token.is_none() {
            return Err(ConfigError::Missing("TWP_WAREHOUSE_TOKEN"));
        }

        let schema = cli
            .warehouse_schema
            .clone()
            .unwrap_or_else(|| DEFAULT_WAREHOUSE_SCHEMA.to_string());
        let datum = cli
            .coordinate_datum
            .clone()
            .unwrap_or_else(|| DEFAULT_COORDINATE_DATUM.to_string());
        let configs = cli.table_sets.clone().unwrap_or_else(default_table_sets);
        let table_sets = configs
            .iter()
            .map(|config| TableSet::from_config(config, &schema, &datum))
            .collect::<Result<Vec<_>, _>>()?;
        if table_sets.is_empty() {
            return Err(ConfigError::Missing("table_sets"));
        }
        let mut names = HashSet::new();
        if let Some(duplicate) = table_sets.iter().find(|t| !names.insert(t.name())) {
            return Err(ConfigError::Invalid {
                setting: "table_sets",
                reason: format!("'{}' is configured twice", duplicate.name()),
            });
        }

        let unmatched_stations = cli
            .unmatched_stations
            .as_deref()
            .map(str::parse::<UnmatchedStationPolicy>)
            .transpose()
            .map_err(|reason| ConfigError::Invalid {
                setting: "TWP_UNMATCHED_STATIONS",
                reason,
            })?
            .unwrap_or_default();

        let geometry = cli.geometry();
        if !is_file(&geometry) {
            return Err(ConfigError::Invalid {
                setting: "TWP_PANEL_GEOMETRY",
                reason: format!("{} is not a readable file", geometry),
            });
        }

        Ok(PanelSettings {
            host: cli.host(),
            port,
            remote_url: cli.remote_url(),
            static_dir: cli.static_dir(),
            geometry,
            warehouse,
            table_sets,
            unmatched_stations,
        })
    }

    /// The named table set, or the default one when no name is given
    pub fn table_set(&self, name: Option<&str>) -> Option<&TableSet> {
        match name.filter(|n| !n.is_empty()) {
            Some(name) => self.table_sets.iter().find(|t| t.name() == name),
            None => self.table_sets.first(),
        }
    }

    pub fn table_set_names(&self) -> Vec<String> {
        self.table_sets.iter().map(|t| t.name().to_owned()).collect()
    }
}

pub fn get_log_level(cli: &Cli) -> LevelFilter {
    let level_str = cli
        .level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    match level_str.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

pub fn setup_logger() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let now = OffsetDateTime::now_utc()
                .format(&Iso8601::DEFAULT)
                .unwrap_or_default();
            out.finish(format_args!(
                "[{} {}] {}: {}",
                now,
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .chain(std::io::stdout())
}
