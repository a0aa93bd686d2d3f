use itertools::Itertools;
use log::debug;
use std::collections::HashMap;

use crate::db::{Error, Station, StationId, TableSet, WarehouseSession};

/// Every station with at least one observation, with geography merged in where known
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationCatalog {
    stations: Vec<Station>,
}

impl StationCatalog {
    pub fn load(session: &dyn WarehouseSession, tables: &TableSet) -> Result<Self, Error> {
        let bounds = session.station_bounds(tables)?;
        let geo = session.all_station_geo(tables)?;
        let geo_by_id: HashMap<&StationId, _> = geo.iter().map(|g| (&g.station_id, g)).collect();

        let stations: Vec<Station> = bounds
            .into_iter()
            .map(|b| {
                let geo = geo_by_id.get(&b.station_id).copied();
                Station::from_parts(b, geo)
            })
            .collect();

        debug!(
            "catalog for {}: {} stations, {} with geography",
            tables.name(),
            stations.len(),
            stations.iter().filter(|s| s.county_name.is_some()).count()
        );
        Ok(Self::from_stations(stations))
    }

    pub fn from_stations(mut stations: Vec<Station>) -> Self {
        stations.sort_by(|a, b| a.station_name.cmp(&b.station_name));
        Self { stations }
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Sorted distinct county names
    pub fn counties(&self) -> Vec<&str> {
        self.stations
            .iter()
            .filter_map(|s| s.county_name.as_deref())
            .sorted()
            .dedup()
            .collect()
    }

    /// Stations in `county`, or all stations when no county is given
    pub fn stations_in(&self, county: Option<&str>) -> Vec<&Station> {
        self.stations
            .iter()
            .filter(|s| county.is_none() || s.county_name.as_deref() == county)
            .collect()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.station_name == name)
    }

    pub fn find_by_id(&self, id: &StationId) -> Option<&Station> {
        self.stations.iter().find(|s| &s.station_id == id)
    }

    /// Looks a station up by identifier first, then by display name
    pub fn find(&self, key: &str) -> Option<&Station> {
        self.find_by_id(&StationId::from(key))
            .or_else(|| self.find_by_name(key.trim()))
    }
}
