use itertools::Itertools;
use log::warn;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};
use utoipa::ToSchema;

use crate::db::{Coordinates, Observation, StationGeo, StationId};

/// What happens to observations whose station has no geography row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedStationPolicy {
    /// Leave the rows out, log them and report the station ids
    #[default]
    Drop,
    /// Fail the run
    Reject,
}

impl FromStr for UnmatchedStationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drop" => Ok(UnmatchedStationPolicy::Drop),
            "reject" => Ok(UnmatchedStationPolicy::Reject),
            other => Err(format!(
                "unknown unmatched station policy '{}', expected drop or reject",
                other
            )),
        }
    }
}

impl fmt::Display for UnmatchedStationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedStationPolicy::Drop => write!(f, "drop"),
            UnmatchedStationPolicy::Reject => write!(f, "reject"),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
#[error("No geography for stations: {}", .unmatched.iter().join(", "))]
pub struct JoinError {
    pub unmatched: Vec<StationId>,
}

/// An observation with its station's county and coordinates attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct JoinedRow {
    #[serde(flatten)]
    pub observation: Observation,
    pub county_name: Option<String>,
    pub county_code: Option<String>,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinOutcome {
    pub rows: Vec<JoinedRow>,
    /// Stations whose observations were left out, sorted
    pub unmatched: Vec<StationId>,
}

/// Sorted distinct station ids of a fetched observation set
pub fn distinct_station_ids(observations: &[Observation]) -> Vec<StationId> {
    observations
        .iter()
        .map(|o| o.station_id.clone())
        .sorted()
        .dedup()
        .collect()
}

/// Inner join of observations to geography on station id, order preserved
pub fn join_geo(
    observations: Vec<Observation>,
    geo: &[StationGeo],
    policy: UnmatchedStationPolicy,
) -> Result<JoinOutcome, JoinError> {
    let geo_by_id: HashMap<&StationId, &StationGeo> =
        geo.iter().map(|g| (&g.station_id, g)).collect();

    let unmatched: Vec<StationId> = distinct_station_ids(&observations)
        .into_iter()
        .filter(|id| !geo_by_id.contains_key(id))
        .collect();

    if !unmatched.is_empty() {
        if policy == UnmatchedStationPolicy::Reject {
            return Err(JoinError { unmatched });
        }
        warn!(
            "dropping observations for {} stations without geography: {}",
            unmatched.len(),
            unmatched.iter().join(", ")
        );
    }

    let rows = observations
        .into_iter()
        .filter_map(|observation| {
            let geo = geo_by_id.get(&observation.station_id)?;
            Some(JoinedRow {
                county_name: geo.county_name.clone(),
                county_code: geo.county_code.clone(),
                coordinates: geo.coordinates,
                observation,
            })
        })
        .collect();

    Ok(JoinOutcome { rows, unmatched })
}
