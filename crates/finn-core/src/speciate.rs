//! Speciation of per-fire emissions for chemical transport models.
//!
//! NMOC is split into model species with a per-vegetation profile of
//! coefficients (mol species / kg NMOC). CO, NH3, NO, NO2 and SO2 are
//! converted from kg to mol; the aerosol species and NOx pass through in kg.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::record::{EmissionResult, GenericVegetationClass};

/// Molecular weights, g/mol.
pub const MW_CO: f64 = 28.01;
pub const MW_NH3: f64 = 17.03;
pub const MW_NO: f64 = 30.01;
pub const MW_NO2: f64 = 46.01;
pub const MW_SO2: f64 = 64.06;

#[inline]
fn kg_to_mol(kg: f64, molecular_weight: f64) -> f64 {
    kg * 1000.0 / molecular_weight
}

/// Coefficient column used for a vegetation class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeciationProfile {
    Savanna,
    Boreal,
    TemperateForest,
    TropicalForest,
    Shrub,
    Crop,
}

impl SpeciationProfile {
    pub fn for_class(class: GenericVegetationClass) -> Self {
        use GenericVegetationClass::*;
        match class {
            Grassland => Self::Savanna,
            Shrub => Self::Shrub,
            TropicalForest => Self::TropicalForest,
            TemperateForest | TemperateEvergreenForest => Self::TemperateForest,
            BorealForest => Self::Boreal,
            // Only `Crop` is assigned today; the subtypes share its profile.
            Crop | Wheat | Cotton | Soy | Corn | Sorghum | SugarCane => Self::Crop,
        }
    }
}

/// One model species and its coefficient under each profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciationRow {
    pub species: String,
    #[serde(rename = "Savanna")]
    pub savanna: f64,
    #[serde(rename = "Boreal")]
    pub boreal: f64,
    #[serde(rename = "TempFor")]
    pub temperate_forest: f64,
    #[serde(rename = "TropFor")]
    pub tropical_forest: f64,
    #[serde(rename = "Shrub")]
    pub shrub: f64,
    #[serde(rename = "Crop")]
    pub crop: f64,
}

impl SpeciationRow {
    pub fn coefficient(&self, profile: SpeciationProfile) -> f64 {
        match profile {
            SpeciationProfile::Savanna => self.savanna,
            SpeciationProfile::Boreal => self.boreal,
            SpeciationProfile::TemperateForest => self.temperate_forest,
            SpeciationProfile::TropicalForest => self.tropical_forest,
            SpeciationProfile::Shrub => self.shrub,
            SpeciationProfile::Crop => self.crop,
        }
    }

    fn values(&self) -> [(&'static str, f64); 6] {
        [
            ("Savanna", self.savanna),
            ("Boreal", self.boreal),
            ("TempFor", self.temperate_forest),
            ("TropFor", self.tropical_forest),
            ("Shrub", self.shrub),
            ("Crop", self.crop),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct SpeciationTable {
    rows: Vec<SpeciationRow>,
}

impl SpeciationTable {
    pub fn new(rows: Vec<SpeciationRow>) -> Result<Self, TableError> {
        if rows.is_empty() {
            return Err(TableError::Empty { table: "speciation" });
        }
        for (row, r) in rows.iter().enumerate() {
            for (column, v) in r.values() {
                if !v.is_finite() {
                    return Err(TableError::NonFinite {
                        table: "speciation",
                        row,
                        column,
                    });
                }
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[SpeciationRow] {
        &self.rows
    }
}

/// Speciated emissions for one fire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciatedFire {
    #[serde(rename = "longi")]
    pub lon: f64,
    pub lat: f64,
    #[serde(rename = "polyid")]
    pub poly_id: i64,
    #[serde(rename = "fireid")]
    pub fire_id: i64,
    #[serde(rename = "jd")]
    pub day_of_year: u32,
    #[serde(rename = "lct")]
    pub land_cover_code: i32,
    #[serde(rename = "genLC")]
    pub class: GenericVegetationClass,
    #[serde(rename = "area")]
    pub area_m2: f64,
    #[serde(rename = "bmass")]
    pub biomass_kg_m2: f64,
    /// mol
    #[serde(rename = "CO")]
    pub co_mol: f64,
    #[serde(rename = "NH3")]
    pub nh3_mol: f64,
    #[serde(rename = "NO")]
    pub no_mol: f64,
    #[serde(rename = "NO2")]
    pub no2_mol: f64,
    #[serde(rename = "SO2")]
    pub so2_mol: f64,
    /// kg
    #[serde(rename = "NOx")]
    pub nox_kg: f64,
    #[serde(rename = "VOC")]
    pub voc_kg: f64,
    #[serde(rename = "OC")]
    pub oc_kg: f64,
    #[serde(rename = "BC")]
    pub bc_kg: f64,
    #[serde(rename = "PM25")]
    pub pm25_kg: f64,
    #[serde(rename = "PM10")]
    pub pm10_kg: f64,
    /// mol of each model species.
    #[serde(flatten)]
    pub voc_species: BTreeMap<String, f64>,
}

pub fn speciate(row: &EmissionResult, table: &SpeciationTable) -> SpeciatedFire {
    let e = &row.emissions;
    let profile = SpeciationProfile::for_class(row.class);
    let voc_species = table
        .rows()
        .iter()
        .map(|r| (r.species.clone(), e.nmoc * r.coefficient(profile)))
        .collect();

    SpeciatedFire {
        lon: row.lon,
        lat: row.lat,
        poly_id: row.poly_id,
        fire_id: row.fire_id,
        day_of_year: row.day_of_year,
        land_cover_code: row.land_cover_code,
        class: row.class,
        area_m2: row.area_m2,
        biomass_kg_m2: row.biomass_kg_m2,
        co_mol: kg_to_mol(e.co, MW_CO),
        nh3_mol: kg_to_mol(e.nh3, MW_NH3),
        no_mol: kg_to_mol(e.no, MW_NO),
        no2_mol: kg_to_mol(e.no2, MW_NO2),
        so2_mol: kg_to_mol(e.so2, MW_SO2),
        nox_kg: e.nox,
        voc_kg: e.nmoc,
        oc_kg: e.oc,
        bc_kg: e.bc,
        pm25_kg: e.pm25,
        pm10_kg: e.pm10,
        voc_species,
    }
}
