//! Fuel load resolution: regional fuel density for the assigned class,
//! with the cropland, Southern Asia and North America overrides.

use crate::config::EngineConfig;
use crate::record::GenericVegetationClass;
use crate::summary::SkipReason;
use crate::tables::{is_unassigned_fuel, ReferenceTables, MAX_REGION_INDEX};

/// Fuel densities feeding the combustion model, g dry matter / m².
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelLoad {
    /// Woody fuel for the class and region.
    pub coarse: f64,
    /// Herbaceous / litter fuel. The region's grassland loading unless the
    /// North America table overrides it.
    pub herb: f64,
}

/// Map a 1-based region code to a 0-based table index, or `None` when
/// it falls outside `0..=MAX_REGION_INDEX`.
pub fn region_index(region_code: i32) -> Option<usize> {
    region_code
        .checked_sub(1)
        .and_then(|i| usize::try_from(i).ok())
        .filter(|i| *i <= MAX_REGION_INDEX)
}

/// Cropland fuel density, with the Brazilian sugarcane override.
pub fn cropland_fuel(config: &EngineConfig, lon: f64, lat: f64) -> f64 {
    if config.sugarcane_bbox.contains(lon, lat) {
        config.sugarcane_fuel
    } else {
        config.cropland_fuel
    }
}

/// Everything the resolver needs to know about the record.
#[derive(Debug, Clone, Copy)]
pub struct FuelQuery {
    pub class: Option<GenericVegetationClass>,
    pub region_code: i32,
    /// Land-cover code after urban reclassification.
    pub land_cover_code: i32,
    pub lon: f64,
    pub lat: f64,
}

/// Resolve fuel densities, or the reason the record has to be skipped.
///
/// Checks run in this order: region range, assigned class, then the
/// unassigned-fuel sentinel on the regional class fuel. The sentinel is
/// tested before the North America override, so a North America record
/// with an unassigned regional fuel is skipped and land-cover table values
/// are taken as given.
pub fn resolve_fuel(
    query: &FuelQuery,
    tables: &ReferenceTables,
    config: &EngineConfig,
) -> Result<FuelLoad, SkipReason> {
    let region = region_index(query.region_code)
        .and_then(|i| tables.region_fuel(i))
        .ok_or(SkipReason::RegionOutOfRange)?;
    let class = query.class.ok_or(SkipReason::UnassignedClass)?;

    use GenericVegetationClass::*;
    let coarse = match class {
        Grassland => region.grassland,
        Shrub => region.woody_savanna,
        TropicalForest => region.tropical_forest,
        TemperateForest | TemperateEvergreenForest => region.temperate_forest,
        BorealForest if query.region_code == config.southern_asia_region => {
            region.temperate_forest
        }
        BorealForest => region.boreal_forest,
        Crop | Wheat | Cotton | Soy | Corn | Sorghum | SugarCane => {
            cropland_fuel(config, query.lon, query.lat)
        }
    };
    if is_unassigned_fuel(coarse) {
        return Err(SkipReason::FuelUnassigned);
    }
    let mut fuel = FuelLoad {
        coarse,
        herb: region.grassland,
    };

    // FCCS loadings from the Texas study replace both densities.
    if query.region_code == config.north_america_region {
        let lc = tables
            .land_cover_fuel(query.land_cover_code)
            .ok_or(SkipReason::FuelUnassigned)?;
        fuel = FuelLoad {
            coarse: lc.tree,
            herb: lc.herb,
        };
    }
    Ok(fuel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::test_support::{distinct_region, factors, tables};
    use crate::tables::{LandCoverFuel, FUEL_UNASSIGNED};

    use GenericVegetationClass::*;

    fn query(class: GenericVegetationClass, region_code: i32) -> FuelQuery {
        FuelQuery {
            class: Some(class),
            region_code,
            land_cover_code: 10,
            lon: 0.0,
            lat: 0.0,
        }
    }

    #[test]
    fn region_index_bounds() {
        assert_eq!(region_index(0), None);
        assert_eq!(region_index(1), Some(0));
        assert_eq!(region_index(101), Some(100));
        assert_eq!(region_index(102), None);
        assert_eq!(region_index(-5), None);
        assert_eq!(region_index(i32::MIN), None);
        assert_eq!(region_index(i32::MAX), None);
    }

    #[test]
    fn class_selects_fuel_family() {
        let t = tables(14);
        let cfg = EngineConfig::default();
        let r = distinct_region();
        let cases = [
            (Grassland, r.grassland),
            (Shrub, r.woody_savanna),
            (TropicalForest, r.tropical_forest),
            (TemperateForest, r.temperate_forest),
            (TemperateEvergreenForest, r.temperate_forest),
            (BorealForest, r.boreal_forest),
            (Crop, 902.0),
        ];
        for (class, expected) in cases {
            let fuel = resolve_fuel(&query(class, 3), &t, &cfg).unwrap();
            assert_eq!(fuel.coarse, expected, "{class:?}");
            assert_eq!(fuel.herb, r.grassland, "{class:?}");
        }
    }

    #[test]
    fn southern_asia_boreal_uses_temperate_fuel() {
        let t = tables(14);
        let fuel = resolve_fuel(&query(BorealForest, 11), &t, &EngineConfig::default()).unwrap();
        assert_eq!(fuel.coarse, distinct_region().temperate_forest);
    }

    #[test]
    fn sugarcane_box_raises_cropland_fuel() {
        let t = tables(14);
        let mut q = query(Crop, 3);
        q.lon = -48.0;
        q.lat = -21.5;
        let fuel = resolve_fuel(&q, &t, &EngineConfig::default()).unwrap();
        assert_eq!(fuel.coarse, 1100.0);
    }

    #[test]
    fn north_america_uses_land_cover_table() {
        let t = tables(14);
        let mut q = query(TemperateForest, 1);
        q.land_cover_code = 4;
        let fuel = resolve_fuel(&q, &t, &EngineConfig::default()).unwrap();
        assert_eq!(fuel, FuelLoad { coarse: 400.0, herb: 40.0 });
    }

    #[test]
    fn out_of_range_regions_skip() {
        let t = tables(101);
        let cfg = EngineConfig::default();
        for code in [0, 102] {
            assert_eq!(
                resolve_fuel(&query(Grassland, code), &t, &cfg),
                Err(SkipReason::RegionOutOfRange),
                "region {code}"
            );
        }
        assert!(resolve_fuel(&query(Grassland, 101), &t, &cfg).is_ok());
    }

    #[test]
    fn region_beyond_table_rows_skips() {
        let t = tables(14);
        assert_eq!(
            resolve_fuel(&query(Grassland, 15), &t, &EngineConfig::default()),
            Err(SkipReason::RegionOutOfRange)
        );
    }

    #[test]
    fn missing_class_skips_after_region_check() {
        let t = tables(14);
        let cfg = EngineConfig::default();
        let mut q = query(Grassland, 3);
        q.class = None;
        assert_eq!(resolve_fuel(&q, &t, &cfg), Err(SkipReason::UnassignedClass));
        q.region_code = 0;
        assert_eq!(resolve_fuel(&q, &t, &cfg), Err(SkipReason::RegionOutOfRange));
    }

    #[test]
    fn unassigned_sentinel_skips() {
        let mut r = distinct_region();
        r.boreal_forest = FUEL_UNASSIGNED;
        let land_cover = vec![LandCoverFuel { tree: 1.0, herb: 1.0 }; 17];
        let t = ReferenceTables::new(vec![r; 14], land_cover, vec![factors(1.0); 15]).unwrap();
        let cfg = EngineConfig::default();
        assert_eq!(
            resolve_fuel(&query(BorealForest, 3), &t, &cfg),
            Err(SkipReason::FuelUnassigned)
        );
        assert!(resolve_fuel(&query(TemperateForest, 3), &t, &cfg).is_ok());
    }

    #[test]
    fn north_america_checks_regional_fuel_before_override() {
        let mut r = distinct_region();
        r.tropical_forest = FUEL_UNASSIGNED;
        let land_cover = vec![LandCoverFuel { tree: 500.0, herb: 50.0 }; 17];
        let t = ReferenceTables::new(vec![r; 14], land_cover, vec![factors(1.0); 15]).unwrap();
        let cfg = EngineConfig::default();
        let mut q = query(TropicalForest, 1);
        q.land_cover_code = 2;
        assert_eq!(resolve_fuel(&q, &t, &cfg), Err(SkipReason::FuelUnassigned));
    }

    #[test]
    fn land_cover_table_values_are_not_sentinel_checked() {
        let mut land_cover = vec![LandCoverFuel { tree: 500.0, herb: 50.0 }; 17];
        land_cover[4] = LandCoverFuel {
            tree: FUEL_UNASSIGNED,
            herb: FUEL_UNASSIGNED,
        };
        let t = ReferenceTables::new(
            vec![distinct_region(); 14],
            land_cover,
            vec![factors(1.0); 15],
        )
        .unwrap();
        let mut q = query(TemperateForest, 1);
        q.land_cover_code = 4;
        let fuel = resolve_fuel(&q, &t, &EngineConfig::default()).unwrap();
        assert_eq!(fuel, FuelLoad { coarse: FUEL_UNASSIGNED, herb: FUEL_UNASSIGNED });
    }

    #[test]
    fn regional_herb_fuel_is_not_sentinel_checked() {
        let mut r = distinct_region();
        r.grassland = FUEL_UNASSIGNED;
        let land_cover = vec![LandCoverFuel { tree: 1.0, herb: 1.0 }; 17];
        let t = ReferenceTables::new(vec![r; 14], land_cover, vec![factors(1.0); 15]).unwrap();
        let fuel = resolve_fuel(&query(BorealForest, 3), &t, &EngineConfig::default()).unwrap();
        assert_eq!(fuel.herb, FUEL_UNASSIGNED);
    }
}
