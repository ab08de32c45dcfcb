//! Immutable reference tables: regional fuel loads, North-America
//! land-cover fuel loads and emission factors.
//!
//! Validated once at construction; every lookup afterwards is
//! bounds-checked and returns `Option` instead of indexing blindly.

use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::record::Species;

/// Highest 0-based region index the regional fuel table may be addressed with.
pub const MAX_REGION_INDEX: usize = 100;

/// Fuel density sentinel meaning "no loading for this class in this region".
pub const FUEL_UNASSIGNED: f64 = -1.0;

/// Land-cover codes 0..=16 must be present in the land-cover fuel table.
pub const LAND_COVER_ROWS: usize = 17;

/// Emission-factor indices 0..=14 must be present.
pub const EMISSION_INDEX_ROWS: usize = 15;

/// Negative densities (the -1 sentinel included) mark an unassigned fuel.
#[inline]
pub fn is_unassigned_fuel(density: f64) -> bool {
    density < 0.0
}

// ── Row types ─────────────────────────────────────────────────────────────────

/// Fuel density per generic vegetation family for one global region, g/m².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionFuel {
    #[serde(rename = "Tropical Forest")]
    pub tropical_forest: f64,
    #[serde(rename = "Temperate Forest")]
    pub temperate_forest: f64,
    #[serde(rename = "Boreal Forest")]
    pub boreal_forest: f64,
    #[serde(rename = "Woody Savanna")]
    pub woody_savanna: f64,
    #[serde(rename = "Savanna and Grasslands")]
    pub grassland: f64,
}

impl RegionFuel {
    fn columns(&self) -> [(&'static str, f64); 5] {
        [
            ("Tropical Forest", self.tropical_forest),
            ("Temperate Forest", self.temperate_forest),
            ("Boreal Forest", self.boreal_forest),
            ("Woody Savanna", self.woody_savanna),
            ("Savanna and Grasslands", self.grassland),
        ]
    }
}

/// Tree and herb fuel density for one land-cover code, g/m².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandCoverFuel {
    #[serde(rename = "final TREE")]
    pub tree: f64,
    #[serde(rename = "final HERB")]
    pub herb: f64,
}

/// Emission factors for one land-cover index, g species / kg dry matter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactorRow {
    #[serde(rename = "CO")]
    pub co: f64,
    #[serde(rename = "NMOC")]
    pub nmoc: f64,
    #[serde(rename = "NOXasNO")]
    pub nox: f64,
    #[serde(rename = "NO")]
    pub no: f64,
    #[serde(rename = "NO2")]
    pub no2: f64,
    #[serde(rename = "SO2")]
    pub so2: f64,
    #[serde(rename = "PM25")]
    pub pm25: f64,
    #[serde(rename = "OC")]
    pub oc: f64,
    #[serde(rename = "BC")]
    pub bc: f64,
    #[serde(rename = "NH3")]
    pub nh3: f64,
    #[serde(rename = "PM10")]
    pub pm10: f64,
}

impl EmissionFactorRow {
    /// Factors in [`Species::ALL`] order.
    pub fn factors(&self) -> [f64; Species::COUNT] {
        [
            self.co, self.nmoc, self.nox, self.no, self.no2, self.so2, self.pm25, self.oc,
            self.bc, self.nh3, self.pm10,
        ]
    }
}

// ── Tables ────────────────────────────────────────────────────────────────────

/// All lookup tables for a run. Shared read-only across records (and
/// threads, with the `threading` feature).
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    regional_fuel: Vec<RegionFuel>,
    land_cover_fuel: Vec<LandCoverFuel>,
    emission_factors: Vec<[f64; Species::COUNT]>,
}

impl ReferenceTables {
    pub fn new(
        regional_fuel: Vec<RegionFuel>,
        land_cover_fuel: Vec<LandCoverFuel>,
        emission_factors: Vec<EmissionFactorRow>,
    ) -> Result<Self, TableError> {
        if regional_fuel.is_empty() {
            return Err(TableError::Empty { table: "regional fuel" });
        }
        for (row, r) in regional_fuel.iter().enumerate() {
            for (column, v) in r.columns() {
                check_finite("regional fuel", row, column, v)?;
            }
        }

        check_rows("land-cover fuel", LAND_COVER_ROWS, land_cover_fuel.len())?;
        for (row, r) in land_cover_fuel.iter().enumerate() {
            check_finite("land-cover fuel", row, "final TREE", r.tree)?;
            check_finite("land-cover fuel", row, "final HERB", r.herb)?;
        }

        check_rows("emission factor", EMISSION_INDEX_ROWS, emission_factors.len())?;
        let emission_factors: Vec<[f64; Species::COUNT]> =
            emission_factors.iter().map(EmissionFactorRow::factors).collect();
        for (row, factors) in emission_factors.iter().enumerate() {
            for s in Species::ALL {
                check_finite("emission factor", row, s.label(), factors[s.index()])?;
            }
        }

        Ok(Self {
            regional_fuel,
            land_cover_fuel,
            emission_factors,
        })
    }

    pub fn region_count(&self) -> usize {
        self.regional_fuel.len()
    }

    /// Fuel row for a 0-based region index.
    pub fn region_fuel(&self, region_index: usize) -> Option<&RegionFuel> {
        self.regional_fuel.get(region_index)
    }

    pub fn land_cover_fuel(&self, land_cover_code: i32) -> Option<&LandCoverFuel> {
        usize::try_from(land_cover_code)
            .ok()
            .and_then(|i| self.land_cover_fuel.get(i))
    }

    pub fn emission_factors(&self, index: usize) -> Option<&[f64; Species::COUNT]> {
        self.emission_factors.get(index)
    }
}

fn check_rows(table: &'static str, expected: usize, found: usize) -> Result<(), TableError> {
    if found < expected {
        return Err(TableError::TooFewRows { table, expected, found });
    }
    Ok(())
}

fn check_finite(
    table: &'static str,
    row: usize,
    column: &'static str,
    v: f64,
) -> Result<(), TableError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(TableError::NonFinite { table, row, column })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    fn land_cover(n: usize) -> Vec<LandCoverFuel> {
        vec![LandCoverFuel { tree: 1.0, herb: 1.0 }; n]
    }

    #[test]
    fn empty_regional_table_is_rejected() {
        let err = ReferenceTables::new(vec![], land_cover(17), vec![factors(1.0); 15]).unwrap_err();
        assert!(matches!(err, TableError::Empty { .. }), "{err}");
    }

    #[test]
    fn short_emission_table_is_rejected() {
        let err = ReferenceTables::new(vec![region(1.0)], land_cover(17), vec![factors(1.0); 14])
            .unwrap_err();
        assert!(
            matches!(err, TableError::TooFewRows { expected: 15, found: 14, .. }),
            "{err}"
        );
    }

    #[test]
    fn short_land_cover_table_is_rejected() {
        let err = ReferenceTables::new(vec![region(1.0)], land_cover(16), vec![factors(1.0); 15])
            .unwrap_err();
        assert!(matches!(err, TableError::TooFewRows { expected: 17, .. }), "{err}");
    }

    #[test]
    fn nan_fuel_is_rejected_with_location() {
        let mut r = region(1.0);
        r.boreal_forest = f64::NAN;
        let err = ReferenceTables::new(vec![region(1.0), r], land_cover(17), vec![factors(1.0); 15])
            .unwrap_err();
        match err {
            TableError::NonFinite { row, column, .. } => {
                assert_eq!(row, 1);
                assert_eq!(column, "Boreal Forest");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn unassigned_sentinel_is_a_legal_table_value() {
        let t = ReferenceTables::new(
            vec![region(FUEL_UNASSIGNED)],
            land_cover(17),
            vec![factors(1.0); 15],
        );
        assert!(t.is_ok());
    }

    #[test]
    fn lookups_are_bounds_checked() {
        let t = tables(3);
        assert!(t.region_fuel(2).is_some());
        assert!(t.region_fuel(3).is_none());
        assert!(t.land_cover_fuel(-1).is_none());
        assert!(t.land_cover_fuel(16).is_some());
        assert!(t.land_cover_fuel(17).is_none());
        assert!(t.emission_factors(14).is_some());
        assert!(t.emission_factors(15).is_none());
    }

    #[test]
    fn emission_row_reads_finn_columns() {
        let json = r#"{"CO": 80.0, "NMOC": 5.0, "NOXasNO": 3.0, "NO": 1.0, "NO2": 2.0,
            "SO2": 0.5, "PM25": 8.0, "OC": 3.0, "BC": 0.5, "NH3": 1.2, "PM10": 9.0}"#;
        let row: EmissionFactorRow = serde_json::from_str(json).unwrap();
        let f = row.factors();
        assert_eq!(f[Species::Co.index()], 80.0);
        assert_eq!(f[Species::Nox.index()], 3.0);
        assert_eq!(f[Species::Pm10.index()], 9.0);
    }
}
