use serde::{Deserialize, Serialize};

/// Inclusive lon/lat rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// Region and fuel constants used by the fuel resolver.
/// Defaults reproduce FINN v2 global processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Region whose fuels come from the land-cover fuel table (FCCS loadings).
    pub north_america_region: i32,
    /// Region where boreal forest takes the temperate forest fuel density.
    pub southern_asia_region: i32,
    /// Cropland fuel density in g/m².
    pub cropland_fuel: f64,
    /// Cropland fuel density inside the sugarcane box, g/m².
    pub sugarcane_fuel: f64,
    /// São Paulo sugarcane belt.
    pub sugarcane_bbox: BoundingBox,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            north_america_region: 1,
            southern_asia_region: 11,
            cropland_fuel: 902.0,
            sugarcane_fuel: 1100.0,
            sugarcane_bbox: BoundingBox {
                min_lon: -49.156,
                max_lon: -47.323,
                min_lat: -22.708,
                max_lat: -20.356,
            },
        }
    }
}
