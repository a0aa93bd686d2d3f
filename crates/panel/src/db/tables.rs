use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("'{0}' is not a plain SQL identifier")]
pub struct InvalidIdentifier(pub String);

/// Table names as they appear in `panel.toml`
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TableSetConfig {
    pub name: String,
    pub observations: String,
    pub geo: String,
}

/// A named observation/geography table pair inside one warehouse schema.
///
/// Table identifiers can't be bound as query parameters, so every piece is
/// checked against a plain identifier pattern before it reaches SQL text.
#[derive(Clone, Debug, PartialEq)]
pub struct TableSet {
    name: String,
    schema: String,
    observations: String,
    geo: String,
    coordinate_column: String,
}

impl TableSet {
    pub fn new(
        name: &str,
        schema: &str,
        observations: &str,
        geo: &str,
        datum: &str,
    ) -> Result<Self, InvalidIdentifier> {
        let coordinate_column = format!("COORDINATES_{}", datum);
        for ident in [name, schema, observations, geo, coordinate_column.as_str()] {
            validate_identifier(ident)?;
        }
        Ok(TableSet {
            name: name.to_owned(),
            schema: schema.to_owned(),
            observations: observations.to_owned(),
            geo: geo.to_owned(),
            coordinate_column,
        })
    }

    pub fn from_config(
        config: &TableSetConfig,
        schema: &str,
        datum: &str,
    ) -> Result<Self, InvalidIdentifier> {
        TableSet::new(&config.name, schema, &config.observations, &config.geo, datum)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified observation table
    pub fn observation_table(&self) -> String {
        format!("{}.{}", self.schema, self.observations)
    }

    /// Fully qualified geography table
    pub fn geo_table(&self) -> String {
        format!("{}.{}", self.schema, self.geo)
    }

    pub fn coordinate_column(&self) -> &str {
        &self.coordinate_column
    }
}

pub fn default_table_sets() -> Vec<TableSetConfig> {
    vec![
        TableSetConfig {
            name: String::from("current"),
            observations: String::from("weather_records"),
            geo: String::from("geoinfo"),
        },
        TableSetConfig {
            name: String::from("v2"),
            observations: String::from("weather_records_v2"),
            geo: String::from("geoinfo_v2"),
        },
    ]
}

pub fn validate_identifier(ident: &str) -> Result<(), InvalidIdentifier> {
    if IDENTIFIER.is_match(ident) {
        Ok(())
    } else {
        Err(InvalidIdentifier(ident.to_owned()))
    }
}
