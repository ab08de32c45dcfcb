//! Combustion factors and burned biomass.
//!
//! Factors follow Ito & Penner (2004) Table 3 for forest and woodland,
//! and the upper end of the grassland range (0.44–0.98).

use crate::fuel::FuelLoad;
use crate::record::VegetationCover;

/// Coarse (woody) combustion factor in forest and woodland.
pub const COARSE_CF: f64 = 0.30;
/// Herbaceous combustion factor under a closed canopy.
pub const FOREST_HERB_CF: f64 = 0.90;
/// Herbaceous combustion factor in open grassland.
pub const GRASSLAND_HERB_CF: f64 = 0.98;
/// Decay rate of the woodland herbaceous factor with tree cover (per %).
pub const WOODLAND_HERB_DECAY: f64 = 0.013;

const FOREST_ABOVE: f64 = 60.0;
const WOODLAND_ABOVE: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombustionRegime {
    /// Tree cover > 60 %.
    Forest,
    /// Tree cover in (40, 60] %.
    Woodland,
    /// Tree cover ≤ 40 %.
    Grassland,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombustionFactors {
    pub regime: CombustionRegime,
    pub herb: f64,
    /// `None` in the grassland regime: woody fuel does not burn.
    pub coarse: Option<f64>,
}

pub fn combustion_factors(tree_pct: f64) -> CombustionFactors {
    if tree_pct > FOREST_ABOVE {
        CombustionFactors {
            regime: CombustionRegime::Forest,
            herb: FOREST_HERB_CF,
            coarse: Some(COARSE_CF),
        }
    } else if tree_pct > WOODLAND_ABOVE {
        CombustionFactors {
            regime: CombustionRegime::Woodland,
            herb: (-WOODLAND_HERB_DECAY * tree_pct).exp(),
            coarse: Some(COARSE_CF),
        }
    } else {
        CombustionFactors {
            regime: CombustionRegime::Grassland,
            herb: GRASSLAND_HERB_CF,
            coarse: None,
        }
    }
}

/// Burned dry matter in kg/m².
///
/// Litter under the trees burns like the herbaceous layer, so the tree
/// fraction contributes herbaceous fuel in every regime and coarse fuel
/// only where a coarse factor exists.
pub fn burned_biomass(cover: &VegetationCover, fuel: &FuelLoad, cf: &CombustionFactors) -> f64 {
    let herb_frac = cover.herb / 100.0;
    let tree_frac = cover.tree / 100.0;
    let herb_burn = fuel.herb * cf.herb;
    let coarse_burn = cf.coarse.map_or(0.0, |c| fuel.coarse * c);
    let grams = herb_frac * herb_burn + tree_frac * (herb_burn + coarse_burn);
    grams / 1000.0
}
