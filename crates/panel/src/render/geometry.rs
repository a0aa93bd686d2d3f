use geo::Simplify;
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};
use log::{debug, warn};
use std::{collections::BTreeSet, fs, path::Path};

/// Property the county polygons are keyed by
pub const COUNTY_KEY: &str = "COUNTYCODE";
/// Ramer-Douglas-Peucker tolerance, in degrees
pub const SIMPLIFY_TOLERANCE: f64 = 0.01;

#[derive(thiserror::Error, Debug)]
pub enum GeometryError {
    #[error("Failed to read county boundaries {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse county boundaries: {0}")]
    Parse(#[from] geojson::Error),
    #[error("County boundaries must be a FeatureCollection")]
    NotACollection,
}

/// Simplified county polygons, ready to hand to the map as GeoJSON
#[derive(Debug, Clone)]
pub struct CountyGeometry {
    collection: FeatureCollection,
}

impl CountyGeometry {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GeometryError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| GeometryError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let geometry = Self::parse(&raw)?;
        if geometry.is_empty() {
            warn!("no {} features in {}", COUNTY_KEY, path.display());
        }
        debug!(
            "loaded {} county polygons from {}",
            geometry.len(),
            path.display()
        );
        Ok(geometry)
    }

    pub fn parse(raw: &str) -> Result<Self, GeometryError> {
        let GeoJson::FeatureCollection(collection) = raw.parse::<GeoJson>()? else {
            return Err(GeometryError::NotACollection);
        };

        let features = collection
            .features
            .into_iter()
            .filter_map(|feature| {
                let Some(code) = county_code(&feature) else {
                    warn!("skipping boundary feature without {}", COUNTY_KEY);
                    return None;
                };
                Some(simplify_feature(feature, code))
            })
            .collect();

        Ok(CountyGeometry {
            collection: FeatureCollection {
                bbox: None,
                features,
                foreign_members: None,
            },
        })
    }

    pub fn county_codes(&self) -> BTreeSet<String> {
        self.collection
            .features
            .iter()
            .filter_map(county_code)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.collection.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.features.is_empty()
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(JsonObject::from(&self.collection))
    }
}

/// County code as a string, whether the file stores it as text or a number
fn county_code(feature: &Feature) -> Option<String> {
    match feature.property(COUNTY_KEY)? {
        JsonValue::String(code) if !code.trim().is_empty() => Some(code.trim().to_owned()),
        JsonValue::Number(code) => Some(code.to_string()),
        _ => None,
    }
}

fn simplify_feature(feature: Feature, code: String) -> Feature {
    let geometry = feature.geometry.map(|geometry| {
        match geo::Geometry::<f64>::try_from(geometry.value.clone()) {
            Ok(geo::Geometry::Polygon(polygon)) => {
                geojson::Geometry::new(geojson::Value::from(&polygon.simplify(&SIMPLIFY_TOLERANCE)))
            }
            Ok(geo::Geometry::MultiPolygon(multi)) => {
                geojson::Geometry::new(geojson::Value::from(&multi.simplify(&SIMPLIFY_TOLERANCE)))
            }
            _ => geometry,
        }
    });

    // Only the key is kept; the other properties would ride along in every page
    let mut properties = JsonObject::new();
    properties.insert(COUNTY_KEY.to_owned(), JsonValue::String(code));

    Feature {
        bbox: None,
        geometry,
        id: feature.id,
        properties: Some(properties),
        foreign_members: None,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Two counties, one of them as a finely sampled square, plus a feature without a code
    pub const COUNTIES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "COUNTYCODE": "63000", "COUNTYNAME": "Taipei City" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [121.0, 25.0], [121.001, 25.0], [121.002, 25.0], [121.5, 25.0],
                        [121.5, 25.5], [121.0, 25.5], [121.0, 25.0]
                    ]]
                }
            },
            {
                "type": "Feature",
                "properties": { "COUNTYCODE": 66000 },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[
                        [120.5, 24.0], [121.0, 24.0], [121.0, 24.3], [120.5, 24.3], [120.5, 24.0]
                    ]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "COUNTYNAME": "Nowhere" },
                "geometry": null
            }
        ]
    }"#;
}
