//! Emission factor lookup and per-species emitted mass.
//!
//! Emissions (kg) = EF (g/kg) × burnable area (m²) × burned DM (kg/m²) / 1000.

use crate::error::EngineError;
use crate::record::{GenericVegetationClass, Species, SpeciesMasses};
use crate::tables::ReferenceTables;

/// Emission-factor row reserved for temperate evergreen forest.
pub const TEMPERATE_EVERGREEN_INDEX: usize = 14;

/// Emission-factor row for a land-cover code. Temperate evergreen forest
/// has its own row whatever the code; urban (13) and snow/ice (15) have
/// none.
pub fn emission_index(land_cover_code: i32, class: Option<GenericVegetationClass>) -> Option<usize> {
    if class == Some(GenericVegetationClass::TemperateEvergreenForest) {
        return Some(TEMPERATE_EVERGREEN_INDEX);
    }
    match land_cover_code {
        1..=12 => Some((land_cover_code - 1) as usize),
        14 => Some(12),
        16 => Some(13),
        _ => None,
    }
}

/// Burnable area in m². Bare ground does not burn.
pub fn usable_area_m2(area_km2: f64, bare_pct: f64) -> f64 {
    let area = area_km2 * 1.0e6;
    area - area * (bare_pct / 100.0)
}

/// One record's inputs to the emission step.
#[derive(Debug, Clone, Copy)]
pub struct EmissionQuery {
    /// Input position, for error reporting.
    pub record: usize,
    pub land_cover_code: i32,
    pub class: Option<GenericVegetationClass>,
    pub tree_pct: f64,
    pub bare_pct: f64,
    pub area_km2: f64,
    /// Burned dry matter, kg/m².
    pub biomass_kg_m2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emissions {
    pub area_m2: f64,
    pub masses: SpeciesMasses,
}

/// Compute emitted mass of every species.
///
/// A record without an emission-factor row means the classifier let
/// something through it should not have; that aborts the run.
pub fn calculate_emissions(
    query: &EmissionQuery,
    tables: &ReferenceTables,
) -> Result<Emissions, EngineError> {
    let factors = emission_index(query.land_cover_code, query.class)
        .and_then(|i| tables.emission_factors(i))
        .ok_or_else(|| EngineError::UnmappedEmissionIndex {
            record: query.record,
            land_cover_code: query.land_cover_code,
            class: query.class,
            tree_pct: query.tree_pct,
        })?;

    let area_m2 = usable_area_m2(query.area_km2, query.bare_pct);
    let masses =
        SpeciesMasses::from_fn(|s: Species| factors[s.index()] * area_m2 * query.biomass_kg_m2 / 1000.0);

    Ok(Emissions { area_m2, masses })
}
