//! Run-level skip counters and emission totals.
//!
//! [`SummaryAccumulator`] holds raw running sums (kg, m²). Totals only
//! ever grow; unit conversion to Tg / km² happens once, in
//! [`SummaryAccumulator::finalize`]. `merge` is a field-wise sum, so
//! accumulators built over any partition of the input combine to the
//! same result as a single pass (up to floating-point rounding).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cover::{CoverCorrection, Rescale};
use crate::record::{EmissionResult, GenericVegetationClass, Species};

const KG_PER_TG: f64 = 1.0e9;
const M2_PER_KM2: f64 = 1.0e6;
const CLASS_COUNT: usize = GenericVegetationClass::ALL.len();

/// Why a record was left out of the output. Skips never abort a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Land-cover code ≤ 0, ≥ 17, or snow/ice.
    InvalidLandCover,
    /// Unusable cover data and a land-cover code with no default cover.
    NoCoverFallback,
    /// Region code outside the fuel table.
    RegionOutOfRange,
    /// No classification rule fired.
    UnassignedClass,
    /// Resolved fuel density is the unassigned sentinel.
    FuelUnassigned,
}

impl SkipReason {
    pub const COUNT: usize = 5;

    pub const ALL: [SkipReason; Self::COUNT] = [
        Self::InvalidLandCover,
        Self::NoCoverFallback,
        Self::RegionOutOfRange,
        Self::UnassignedClass,
        Self::FuelUnassigned,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryAccumulator {
    pub total_input: u64,
    pub processed: u64,
    skipped: [u64; SkipReason::COUNT],
    /// Records that entered the all-bare / no-data fallback, skipped or not.
    pub bare_cover: u64,
    pub scaled_to_100: u64,
    pub scaled_below_50: u64,
    pub urban: u64,
    /// Burned dry matter, kg.
    pub biomass_kg: f64,
    pub area_m2: f64,
    class_biomass_kg: [f64; CLASS_COUNT],
    class_area_m2: [f64; CLASS_COUNT],
    species_kg: [f64; Species::COUNT],
    pub cropland_co_kg: f64,
    pub cropland_pm25_kg: f64,
}

impl SummaryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_input(&mut self) {
        self.total_input += 1;
    }

    pub fn record_skip(&mut self, reason: SkipReason) {
        self.skipped[reason.index()] += 1;
    }

    pub fn record_cover(&mut self, qc: &CoverCorrection) {
        match qc.rescale {
            Some(Rescale::ToHundred) => self.scaled_to_100 += 1,
            Some(Rescale::BelowFifty) => self.scaled_below_50 += 1,
            None => {}
        }
        if qc.fallback.is_some() {
            self.bare_cover += 1;
        }
    }

    pub fn record_urban(&mut self) {
        self.urban += 1;
    }

    pub fn record_emission(&mut self, row: &EmissionResult) {
        self.processed += 1;

        let burned_kg = row.biomass_kg_m2 * row.area_m2;
        self.biomass_kg += burned_kg;
        self.area_m2 += row.area_m2;

        let c = row.class.ordinal();
        self.class_biomass_kg[c] += burned_kg;
        self.class_area_m2[c] += row.area_m2;

        for s in Species::ALL {
            self.species_kg[s.index()] += row.emissions.get(s);
        }
        if row.class.is_cropland() {
            self.cropland_co_kg += row.emissions.co;
            self.cropland_pm25_kg += row.emissions.pm25;
        }
    }

    pub fn skipped(&self, reason: SkipReason) -> u64 {
        self.skipped[reason.index()]
    }

    pub fn skipped_total(&self) -> u64 {
        self.skipped.iter().sum()
    }

    /// Burned dry matter for one class, kg.
    pub fn class_biomass_kg(&self, class: GenericVegetationClass) -> f64 {
        self.class_biomass_kg[class.ordinal()]
    }

    pub fn class_area_m2(&self, class: GenericVegetationClass) -> f64 {
        self.class_area_m2[class.ordinal()]
    }

    pub fn species_kg(&self, species: Species) -> f64 {
        self.species_kg[species.index()]
    }

    /// Fold another accumulator into this one.
    pub fn merge(&mut self, other: &SummaryAccumulator) {
        self.total_input += other.total_input;
        self.processed += other.processed;
        for (a, b) in self.skipped.iter_mut().zip(other.skipped) {
            *a += b;
        }
        self.bare_cover += other.bare_cover;
        self.scaled_to_100 += other.scaled_to_100;
        self.scaled_below_50 += other.scaled_below_50;
        self.urban += other.urban;
        self.biomass_kg += other.biomass_kg;
        self.area_m2 += other.area_m2;
        for (a, b) in self.class_biomass_kg.iter_mut().zip(other.class_biomass_kg) {
            *a += b;
        }
        for (a, b) in self.class_area_m2.iter_mut().zip(other.class_area_m2) {
            *a += b;
        }
        for (a, b) in self.species_kg.iter_mut().zip(other.species_kg) {
            *a += b;
        }
        self.cropland_co_kg += other.cropland_co_kg;
        self.cropland_pm25_kg += other.cropland_pm25_kg;
    }

    fn cropland_sum(values: &[f64; CLASS_COUNT]) -> f64 {
        GenericVegetationClass::ALL
            .iter()
            .filter(|c| c.is_cropland())
            .map(|c| values[c.ordinal()])
            .sum()
    }

    /// Convert to the reported summary (Tg and km²).
    pub fn finalize(&self) -> Summary {
        use GenericVegetationClass::*;
        let tg = |kg: f64| kg / KG_PER_TG;
        let km2 = |m2: f64| m2 / M2_PER_KM2;
        let class_tg = |c: GenericVegetationClass| tg(self.class_biomass_kg(c));
        let class_km2 = |c: GenericVegetationClass| km2(self.class_area_m2(c));

        Summary {
            num_fires_total: self.total_input,
            num_fires_processed: self.processed,
            num_urban_fires: self.urban,
            num_invalid_land_cover: self.skipped(SkipReason::InvalidLandCover),
            num_bare_cover: self.bare_cover,
            num_skipped_bare_no_land_cover: self.skipped(SkipReason::NoCoverFallback),
            num_skipped_region: self.skipped(SkipReason::RegionOutOfRange),
            num_skipped_class: self.skipped(SkipReason::UnassignedClass),
            num_skipped_fuel: self.skipped(SkipReason::FuelUnassigned),
            num_scaled_to_100: self.scaled_to_100,
            num_scaled_below_50: self.scaled_below_50,
            num_fires_skipped: self.skipped_total(),
            biomass_tg: tg(self.biomass_kg),
            temperate_tg: class_tg(TemperateForest),
            temperate_evergreen_tg: class_tg(TemperateEvergreenForest),
            tropical_tg: class_tg(TropicalForest),
            boreal_tg: class_tg(BorealForest),
            shrub_tg: class_tg(Shrub),
            grassland_tg: class_tg(Grassland),
            cropland_tg: tg(Self::cropland_sum(&self.class_biomass_kg)),
            area_km2: km2(self.area_m2),
            temperate_km2: class_km2(TemperateForest),
            temperate_evergreen_km2: class_km2(TemperateEvergreenForest),
            tropical_km2: class_km2(TropicalForest),
            boreal_km2: class_km2(BorealForest),
            shrub_km2: class_km2(Shrub),
            grassland_km2: class_km2(Grassland),
            cropland_km2: km2(Self::cropland_sum(&self.class_area_m2)),
            cropland_co_kg: self.cropland_co_kg,
            cropland_pm25_kg: self.cropland_pm25_kg,
            species_tg: Species::ALL
                .iter()
                .map(|s| (s.label().to_string(), tg(self.species_kg(*s))))
                .collect(),
        }
    }
}

/// Finalized run summary, keyed by the labels FINN reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub num_fires_total: u64,
    pub num_fires_processed: u64,
    pub num_urban_fires: u64,
    #[serde(rename = "num_lct<=0|lct>17")]
    pub num_invalid_land_cover: u64,
    pub num_bare_cover: u64,
    #[serde(rename = "num_skipped_bare_no_lct")]
    pub num_skipped_bare_no_land_cover: u64,
    pub num_skipped_region: u64,
    #[serde(rename = "num_skipped_genveg_problem")]
    pub num_skipped_class: u64,
    #[serde(rename = "num_skipped_bmass_assignment")]
    pub num_skipped_fuel: u64,
    pub num_scaled_to_100: u64,
    #[serde(rename = "num_vcf<50")]
    pub num_scaled_below_50: u64,
    pub num_fires_skipped: u64,

    #[serde(rename = "GLOBAL TOTAL (Tg) biomass burned (Tg)")]
    pub biomass_tg: f64,
    #[serde(rename = "Total Temperate Forests (Tg)")]
    pub temperate_tg: f64,
    #[serde(rename = "Total Temperate Evergreen Forests (Tg)")]
    pub temperate_evergreen_tg: f64,
    #[serde(rename = "Total Tropical Forests (Tg)")]
    pub tropical_tg: f64,
    #[serde(rename = "Total Boreal Forests (Tg)")]
    pub boreal_tg: f64,
    #[serde(rename = "Total Shrublands/Woody Savannah(Tg)")]
    pub shrub_tg: f64,
    #[serde(rename = "Total Grasslands/Savannas (Tg)")]
    pub grassland_tg: f64,
    #[serde(rename = "Total Croplands (Tg)")]
    pub cropland_tg: f64,

    #[serde(rename = "TOTAL AREA BURNED (km2)")]
    pub area_km2: f64,
    #[serde(rename = "Total Temperate Forests (km2)")]
    pub temperate_km2: f64,
    #[serde(rename = "Total Temperate Evergreen Forests (km2)")]
    pub temperate_evergreen_km2: f64,
    #[serde(rename = "Total Tropical Forests (km2)")]
    pub tropical_km2: f64,
    #[serde(rename = "Total Boreal Forests (km2)")]
    pub boreal_km2: f64,
    #[serde(rename = "Total Shrublands/Woody Savannah(km2)")]
    pub shrub_km2: f64,
    #[serde(rename = "Total Grasslands/Savannas (km2)")]
    pub grassland_km2: f64,
    #[serde(rename = "Total Croplands (km2)")]
    pub cropland_km2: f64,

    #[serde(rename = "TOTAL CROPLANDS CO (kg)")]
    pub cropland_co_kg: f64,
    #[serde(rename = "TOTAL CROPLANDS PM2.5 (kg)")]
    pub cropland_pm25_kg: f64,

    /// Global emitted mass per species, Tg.
    #[serde(flatten)]
    pub species_tg: BTreeMap<String, f64>,
}
