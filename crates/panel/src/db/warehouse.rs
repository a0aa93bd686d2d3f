use duckdb::{arrow::array::RecordBatch, params_from_iter, AccessMode, Config, Connection};
use log::{debug, info};
use regex::Regex;
use scooby::postgres::{select, Aliasable, Orderable, Parameters, Select};
use std::{fmt, sync::LazyLock};
use time::PrimitiveDateTime;

use super::{
    format_timestamp, records, Observation, QueryWindow, StationBounds, StationGeo, StationId,
    TableSet, WindowScope,
};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d+)").expect("valid placeholder regex"));

const SQL_TIMESTAMP: &str = "'%Y-%m-%d %H:%M:%S'";

/// Canonical observation columns, cast to the arrow types `records::observations` expects
const OBSERVATION_COLUMNS: [&str; 15] = [
    "CAST(STATIONID AS VARCHAR) AS station_id",
    "CAST(STATIONNAME AS VARCHAR) AS station_name",
    "strftime(OBSTIME, '%Y-%m-%d %H:%M:%S') AS observed_at",
    "CAST(WEATHER AS VARCHAR) AS weather",
    "CAST(AIRTEMPERATURE AS DOUBLE) AS temperature",
    "CAST(AIRPRESSURE AS DOUBLE) AS pressure",
    "CAST(RELATIVEHUMIDITY AS DOUBLE) AS humidity",
    "CAST(WINDSPEED AS DOUBLE) AS wind_speed",
    "CAST(WINDDIRECTION AS BIGINT) AS wind_direction",
    "CAST(GUSTDIRECTION AS BIGINT) AS gust_direction",
    "CAST(PEAKGUSTSPEED AS DOUBLE) AS peak_gust_speed",
    "CAST(PRECIPITATION AS DOUBLE) AS precipitation",
    "CAST(SUNSHINEDURATION AS DOUBLE) AS sunshine_duration",
    "CAST(VISIBILITY AS VARCHAR) AS visibility",
    "CAST(UVINDEX AS DOUBLE) AS uv_index",
];

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to connect to warehouse {database}: {source}")]
    Connection {
        database: String,
        #[source]
        source: duckdb::Error,
    },
    #[error("Failed to query {context}: {source}")]
    Query {
        context: String,
        #[source]
        source: duckdb::Error,
    },
    #[error("Unexpected {context} result: {reason}")]
    Shape {
        context: &'static str,
        reason: String,
    },
    #[error("Failed to parse warehouse timestamp: {0}")]
    TimeParse(#[from] time::error::Parse),
    #[error("Failed to format time string: {0}")]
    TimeFormat(#[from] time::error::Format),
}

impl Error {
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }
}

/// Where the warehouse lives and how to authenticate against it
#[derive(Clone, PartialEq)]
pub struct WarehouseConfig {
    /// DuckDB database file or MotherDuck `md:` URI
    pub database: String,
    /// MotherDuck token, required for `md:` databases
    pub token: Option<String>,
    /// Worker threads the engine may use for one query
    pub threads: Option<u32>,
}

impl WarehouseConfig {
    pub fn is_remote(&self) -> bool {
        self.database.starts_with("md:")
    }
}

impl fmt::Debug for WarehouseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarehouseConfig")
            .field("database", &self.database)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("threads", &self.threads)
            .finish()
    }
}

/// Opens sessions against the warehouse. One session serves one pipeline run.
pub trait Warehouse: Send + Sync {
    fn open_session(&self) -> Result<Box<dyn WarehouseSession>, Error>;
}

/// An open warehouse connection; closed when dropped.
pub trait WarehouseSession {
    /// First and last observation time per station, stations without observations left out
    fn station_bounds(&self, tables: &TableSet) -> Result<Vec<StationBounds>, Error>;
    /// Geography for every station, one row per station id
    fn all_station_geo(&self, tables: &TableSet) -> Result<Vec<StationGeo>, Error>;
    /// Geography for the given stations, one row per station id
    fn station_geo(
        &self,
        tables: &TableSet,
        station_ids: &[StationId],
    ) -> Result<Vec<StationGeo>, Error>;
    fn latest_observation_time(&self, tables: &TableSet)
        -> Result<Option<PrimitiveDateTime>, Error>;
    /// Observations inside the window (both ends inclusive), ascending by time
    fn observations(
        &self,
        tables: &TableSet,
        window: &QueryWindow,
    ) -> Result<Vec<Observation>, Error>;
}

pub struct DuckDbWarehouse {
    config: WarehouseConfig,
}

impl DuckDbWarehouse {
    pub fn new(config: WarehouseConfig) -> Self {
        Self { config }
    }

    fn connect(&self) -> Result<Connection, duckdb::Error> {
        let mut flags = Config::default();
        if let Some(threads) = self.config.threads {
            flags = flags.threads(i64::from(threads))?;
        }
        if self.config.is_remote() {
            if let Some(token) = &self.config.token {
                flags = flags.with("motherduck_token", token)?;
            }
        } else {
            flags = flags.access_mode(AccessMode::ReadOnly)?;
        }
        Connection::open_with_flags(&self.config.database, flags)
    }
}

impl Warehouse for DuckDbWarehouse {
    fn open_session(&self) -> Result<Box<dyn WarehouseSession>, Error> {
        let conn = self.connect().map_err(|source| Error::Connection {
            database: self.config.database.clone(),
            source,
        })?;
        debug!("opened warehouse session on {}", self.config.database);
        Ok(Box::new(DuckDbSession::new(
            conn,
            self.config.database.clone(),
        )))
    }
}

pub struct DuckDbSession {
    conn: Connection,
    database: String,
}

impl DuckDbSession {
    pub fn new(conn: Connection, database: String) -> Self {
        Self { conn, database }
    }

    fn run_select(
        &self,
        context: &str,
        query: Select,
        params: Vec<String>,
    ) -> Result<Vec<RecordBatch>, Error> {
        let binding = query.to_string();
        let sql = PLACEHOLDER.replace_all(&binding, "?");
        self.run(context, &sql, params)
    }

    fn run(&self, context: &str, sql: &str, params: Vec<String>) -> Result<Vec<RecordBatch>, Error> {
        debug!("{} query: {} params: {:?}", context, sql, params);
        let query_error = |source| Error::Query {
            context: context.to_owned(),
            source,
        };
        let mut stmt = self.conn.prepare(sql).map_err(query_error)?;
        let batches: Vec<RecordBatch> = stmt
            .query_arrow(params_from_iter(params.iter()))
            .map_err(query_error)?
            .collect();
        Ok(batches)
    }

    fn geo_query(
        &self,
        tables: &TableSet,
        station_ids: Option<&[StationId]>,
    ) -> Result<Vec<StationGeo>, Error> {
        let mut placeholders = Parameters::new();
        let mut values: Vec<String> = vec![];
        let coordinates = tables.coordinate_column();

        let filter = match station_ids {
            Some(ids) => {
                let clause = format!(
                    "WHERE CAST(STATIONID AS VARCHAR) IN ({})",
                    placeholders.next_n(ids.len())
                );
                values.extend(ids.iter().map(|id| id.to_string()));
                clause
            }
            None => String::new(),
        };

        // Geography tables may carry one row per station version; keep the lowest county code
        let sql = format!(
            r#"
            SELECT DISTINCT ON (CAST(STATIONID AS VARCHAR))
                CAST(STATIONID AS VARCHAR) AS station_id,
                CAST(STATIONNAME AS VARCHAR) AS station_name,
                CAST(COUNTYNAME AS VARCHAR) AS county_name,
                CAST(COUNTYCODE AS VARCHAR) AS county_code,
                CAST(struct_extract({coordinates}, 'StationLatitude') AS DOUBLE) AS latitude,
                CAST(struct_extract({coordinates}, 'StationLongitude') AS DOUBLE) AS longitude
            FROM {table}
            {filter}
            ORDER BY CAST(STATIONID AS VARCHAR), county_code, latitude, longitude, station_name
            "#,
            table = tables.geo_table(),
        );
        let sql = PLACEHOLDER.replace_all(&sql, "?");
        let records = self.run(
            &format!("station geography ({})", tables.geo_table()),
            &sql,
            values,
        )?;
        records::station_geo(&records)
    }
}

impl Drop for DuckDbSession {
    fn drop(&mut self) {
        debug!("closing warehouse session on {}", self.database);
    }
}

impl WarehouseSession for DuckDbSession {
    fn station_bounds(&self, tables: &TableSet) -> Result<Vec<StationBounds>, Error> {
        let query = select((
            "CAST(STATIONID AS VARCHAR)".as_("station_id"),
            "CAST(STATIONNAME AS VARCHAR)".as_("station_name"),
            format!("strftime(MIN(OBSTIME), {})", SQL_TIMESTAMP).as_("earliest"),
            format!("strftime(MAX(OBSTIME), {})", SQL_TIMESTAMP).as_("latest"),
        ))
        .from(tables.observation_table())
        .where_("OBSTIME IS NOT NULL")
        .group_by(("CAST(STATIONID AS VARCHAR)", "CAST(STATIONNAME AS VARCHAR)"))
        .order_by("station_id".asc());

        let records = self.run_select(
            &format!("station catalog ({})", tables.observation_table()),
            query,
            vec![],
        )?;
        let stations = records::station_bounds(&records)?;
        info!(
            "loaded {} stations from {}",
            stations.len(),
            tables.observation_table()
        );
        Ok(stations)
    }

    fn all_station_geo(&self, tables: &TableSet) -> Result<Vec<StationGeo>, Error> {
        self.geo_query(tables, None)
    }

    fn station_geo(
        &self,
        tables: &TableSet,
        station_ids: &[StationId],
    ) -> Result<Vec<StationGeo>, Error> {
        if station_ids.is_empty() {
            return Ok(vec![]);
        }
        self.geo_query(tables, Some(station_ids))
    }

    fn latest_observation_time(
        &self,
        tables: &TableSet,
    ) -> Result<Option<PrimitiveDateTime>, Error> {
        let query = select(format!("strftime(MAX(OBSTIME), {})", SQL_TIMESTAMP).as_("latest"))
            .from(tables.observation_table());
        let records = self.run_select(
            &format!("latest observation ({})", tables.observation_table()),
            query,
            vec![],
        )?;
        records::latest_timestamp(&records)
    }

    fn observations(
        &self,
        tables: &TableSet,
        window: &QueryWindow,
    ) -> Result<Vec<Observation>, Error> {
        let mut placeholders = Parameters::new();
        let mut values: Vec<String> = vec![];

        let mut query = select(OBSERVATION_COLUMNS.join(", ")).from(tables.observation_table());

        match window.scope() {
            WindowScope::Station(station_id) => {
                query = query.where_(format!(
                    "CAST(STATIONID AS VARCHAR) = {}",
                    placeholders.next()
                ));
                values.push(station_id.to_string());
            }
            WindowScope::Prefix { prefix, excluded } => {
                query = query.where_(format!(
                    "starts_with(CAST(STATIONID AS VARCHAR), {})",
                    placeholders.next()
                ));
                values.push(prefix.to_string());

                if !excluded.is_empty() {
                    query = query.where_(format!(
                        "CAST(STATIONID AS VARCHAR) NOT IN ({})",
                        placeholders.next_n(excluded.len())
                    ));
                    values.extend(excluded.iter().map(|id| id.to_string()));
                }
            }
        }

        query = query.where_(format!(
            "OBSTIME BETWEEN CAST({} AS TIMESTAMP) AND CAST({} AS TIMESTAMP)",
            placeholders.next(),
            placeholders.next()
        ));
        values.push(format_timestamp(window.start())?);
        values.push(format_timestamp(window.end())?);

        query = query.order_by(("OBSTIME".asc(), "station_id".asc()));

        let records = self.run_select(
            &format!("observations ({})", tables.observation_table()),
            query,
            values,
        )?;
        let observations = records::observations(&records)?;
        debug!(
            "fetched {} observations for {:?} between {} and {}",
            observations.len(),
            window.scope(),
            window.start(),
            window.end()
        );
        Ok(observations)
    }
}
