//! Generic vegetation classification from MODIS land cover, latitude and
//! tree cover.
//!
//! The rules run as a fixed, ordered chain. A later rule may overwrite the
//! class chosen by an earlier one, and the urban rule rewrites the land
//! cover code that the forest rules after it test against. Keep the chain
//! in this order: outputs depend on it.

use crate::record::GenericVegetationClass;

use GenericVegetationClass::{
    BorealForest, Crop, Grassland, Shrub, TemperateEvergreenForest, TemperateForest,
    TropicalForest,
};

// ── Land-cover codes (MODIS IGBP) ────────────────────────────────────────────

pub const EVERGREEN_NEEDLELEAF: i32 = 1;
pub const EVERGREEN_BROADLEAF: i32 = 2;
pub const DECIDUOUS_NEEDLELEAF: i32 = 3;
pub const DECIDUOUS_BROADLEAF: i32 = 4;
pub const MIXED_FOREST: i32 = 5;
pub const WOODY_SAVANNA: i32 = 8;
pub const SAVANNA: i32 = 10;
pub const CROPLAND: i32 = 12;
pub const URBAN: i32 = 13;
pub const SNOW_ICE: i32 = 15;

/// Poleward of this latitude needleleaf and mixed forests count as boreal.
pub const BOREAL_LAT: f64 = 50.0;
/// Tropical band half-width for broadleaf and mixed forest.
pub const TROPIC_LAT: f64 = 23.5;
/// Tropical band half-width used by the urban forest rule.
pub const URBAN_TROPIC_LAT: f64 = 30.0;

const URBAN_GRASS_BELOW: f64 = 40.0;
const URBAN_FOREST_FROM: f64 = 60.0;

/// Classifier output. `land_cover_code` is the code later stages must use
/// (rewritten for urban pixels); `class` is `None` only if no rule fired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub class: Option<GenericVegetationClass>,
    pub land_cover_code: i32,
    pub urban: bool,
}

/// True for codes the classifier accepts: 1–16 except snow/ice.
pub fn is_valid_land_cover(code: i32) -> bool {
    (1..=16).contains(&code) && code != SNOW_ICE
}

/// Classify one record. Returns `None` for land-cover codes outside the
/// valid range (no data, water, snow/ice).
#[allow(unused_assignments)]
pub fn classify(land_cover_code: i32, tree_pct: f64, lat: f64) -> Option<Classification> {
    if !is_valid_land_cover(land_cover_code) {
        return None;
    }

    let mut code = land_cover_code;
    let mut class = None;
    let mut urban = false;

    // Grasslands and savanna.
    if matches!(code, 9 | 10 | 11 | 14 | 16) {
        class = Some(Grassland);
    }

    // Woody savanna and shrubs.
    if (6..=8).contains(&code) {
        class = Some(Shrub);
    }

    if code == CROPLAND {
        class = Some(Crop);
    }

    // Urban: classify by tree cover and take on a natural land-cover code so
    // the emission factors come from that cover type.
    if code == URBAN {
        urban = true;
        if tree_pct < URBAN_GRASS_BELOW {
            class = Some(Grassland);
            code = SAVANNA;
        }
        if (URBAN_GRASS_BELOW..URBAN_FOREST_FROM).contains(&tree_pct) {
            class = Some(Shrub);
            code = WOODY_SAVANNA;
        }
        if tree_pct >= URBAN_FOREST_FROM {
            if lat.abs() > BOREAL_LAT {
                class = Some(BorealForest);
                code = EVERGREEN_NEEDLELEAF;
            } else {
                class = Some(if lat.abs() <= URBAN_TROPIC_LAT {
                    TropicalForest
                } else {
                    TemperateForest
                });
                code = MIXED_FOREST;
            }
        }
    }

    if code == EVERGREEN_BROADLEAF {
        class = Some(if lat.abs() <= TROPIC_LAT {
            TropicalForest
        } else {
            TemperateForest
        });
    }

    if code == DECIDUOUS_BROADLEAF {
        class = Some(TemperateForest);
    }

    if code == EVERGREEN_NEEDLELEAF {
        class = Some(if lat > BOREAL_LAT {
            BorealForest
        } else {
            TemperateEvergreenForest
        });
    }

    if code == DECIDUOUS_NEEDLELEAF {
        class = Some(if lat > BOREAL_LAT {
            BorealForest
        } else {
            TemperateForest
        });
    }

    // Mixed forest: the boreal assignment is always overwritten by the
    // tropical/temperate branch that follows it.
    if code == MIXED_FOREST {
        if lat > BOREAL_LAT {
            class = Some(BorealForest);
        }
        class = Some(if lat.abs() <= TROPIC_LAT {
            TropicalForest
        } else {
            TemperateForest
        });
    }

    Some(Classification {
        class,
        land_cover_code: code,
        urban,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_of(code: i32, tree: f64, lat: f64) -> GenericVegetationClass {
        classify(code, tree, lat)
            .and_then(|c| c.class)
            .unwrap_or_else(|| panic!("code {code} tree {tree} lat {lat} unclassified"))
    }

    #[test]
    fn invalid_codes_are_rejected() {
        for code in [-1, 0, 15, 17, 254] {
            assert!(classify(code, 50.0, 10.0).is_none(), "code {code}");
        }
    }

    #[test]
    fn grass_shrub_and_crop_codes() {
        for code in [9, 10, 11, 14, 16] {
            assert_eq!(class_of(code, 10.0, 0.0), Grassland, "code {code}");
        }
        for code in 6..=8 {
            assert_eq!(class_of(code, 10.0, 0.0), Shrub, "code {code}");
        }
        assert_eq!(class_of(12, 10.0, 0.0), Crop);
    }

    #[test]
    fn evergreen_broadleaf_splits_on_tropics() {
        assert_eq!(class_of(2, 80.0, 23.5), TropicalForest);
        assert_eq!(class_of(2, 80.0, -23.5), TropicalForest);
        assert_eq!(class_of(2, 80.0, 23.6), TemperateForest);
    }

    #[test]
    fn deciduous_broadleaf_is_always_temperate() {
        for lat in [-60.0, 0.0, 60.0] {
            assert_eq!(class_of(4, 80.0, lat), TemperateForest);
        }
    }

    #[test]
    fn needleleaf_boreal_above_50_north_only() {
        assert_eq!(class_of(1, 80.0, 50.1), BorealForest);
        assert_eq!(class_of(1, 80.0, 50.0), TemperateEvergreenForest);
        assert_eq!(class_of(1, 80.0, -60.0), TemperateEvergreenForest);
        assert_eq!(class_of(3, 80.0, 55.0), BorealForest);
        assert_eq!(class_of(3, 80.0, -55.0), TemperateForest);
    }

    #[test]
    fn mixed_forest_boreal_is_shadowed() {
        assert_eq!(class_of(5, 80.0, 65.0), TemperateForest);
        assert_eq!(class_of(5, 80.0, 10.0), TropicalForest);
        assert_eq!(class_of(5, 80.0, -40.0), TemperateForest);
    }

    #[test]
    fn urban_low_tree_cover_becomes_grassland() {
        let c = classify(URBAN, 20.0, 40.0).unwrap();
        assert_eq!(c.class, Some(Grassland));
        assert_eq!(c.land_cover_code, SAVANNA);
        assert!(c.urban);
    }

    #[test]
    fn urban_mid_tree_cover_becomes_woody_savanna() {
        let c = classify(URBAN, 40.0, 40.0).unwrap();
        assert_eq!(c.class, Some(Shrub));
        assert_eq!(c.land_cover_code, WOODY_SAVANNA);
    }

    #[test]
    fn urban_forest_north_of_50_becomes_boreal_needleleaf() {
        let c = classify(URBAN, 70.0, 55.0).unwrap();
        assert_eq!(c.class, Some(BorealForest));
        assert_eq!(c.land_cover_code, EVERGREEN_NEEDLELEAF);
    }

    #[test]
    fn urban_forest_takes_mixed_forest_latitude_rule() {
        // Rewritten to mixed forest, so the 23.5° band decides in the end.
        let c = classify(URBAN, 70.0, 27.0).unwrap();
        assert_eq!(c.land_cover_code, MIXED_FOREST);
        assert_eq!(c.class, Some(TemperateForest));
        let c = classify(URBAN, 70.0, 5.0).unwrap();
        assert_eq!(c.class, Some(TropicalForest));
    }

    #[test]
    fn urban_forest_far_south_ends_as_temperate_evergreen() {
        let c = classify(URBAN, 70.0, -55.0).unwrap();
        assert_eq!(c.land_cover_code, EVERGREEN_NEEDLELEAF);
        assert_eq!(c.class, Some(TemperateEvergreenForest));
    }

    #[test]
    fn non_urban_codes_are_not_rewritten() {
        for code in (1..=16).filter(|c| *c != SNOW_ICE && *c != URBAN) {
            let c = classify(code, 70.0, 45.0).unwrap();
            assert_eq!(c.land_cover_code, code);
            assert!(!c.urban);
        }
    }
}
