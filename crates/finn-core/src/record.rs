//! Per-fire input and output rows, plus the vegetation and species enums
//! shared by every pipeline stage.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::UnknownClassCode;

// ── Input ────────────────────────────────────────────────────────────────────

/// Tree / herbaceous / bare percentages from the VCF cover product (0–100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VegetationCover {
    pub tree: f64,
    pub herb: f64,
    pub bare: f64,
}

impl VegetationCover {
    pub fn new(tree: f64, herb: f64, bare: f64) -> Self {
        Self { tree, herb, bare }
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.tree + self.herb + self.bare
    }

    /// Scale all three fractions so they sum to 100.
    pub fn rescaled(&self) -> Self {
        let total = self.total();
        Self {
            tree: self.tree * 100.0 / total,
            herb: self.herb * 100.0 / total,
            bare: self.bare * 100.0 / total,
        }
    }
}

/// One detected fire, as handed over by the input loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FireRecord {
    #[serde(rename = "polyid")]
    pub poly_id: i64,
    #[serde(rename = "fireid")]
    pub fire_id: i64,
    #[serde(rename = "cen_lat")]
    pub lat: f64,
    #[serde(rename = "cen_lon")]
    pub lon: f64,
    #[serde(rename = "acq_date_lst")]
    pub acquisition_date: NaiveDate,
    #[serde(rename = "area_sqkm")]
    pub area_km2: f64,
    #[serde(rename = "v_tree")]
    pub tree_pct: f64,
    #[serde(rename = "v_herb")]
    pub herb_pct: f64,
    #[serde(rename = "v_bare")]
    pub bare_pct: f64,
    /// MODIS land-cover type (1–17). Out-of-range values are skipped.
    #[serde(rename = "v_lct")]
    pub land_cover_code: i32,
    /// Secondary land-cover flag. Carried through, never read.
    #[serde(rename = "f_lct")]
    pub land_cover_flag: i32,
    /// 1-based index into the regional fuel table.
    #[serde(rename = "v_regnum")]
    pub region_code: i32,
}

impl FireRecord {
    pub fn cover(&self) -> VegetationCover {
        VegetationCover::new(self.tree_pct, self.herb_pct, self.bare_pct)
    }

    pub fn day_of_year(&self) -> u32 {
        self.acquisition_date.ordinal()
    }
}

// ── Generic vegetation ───────────────────────────────────────────────────────

/// Coarse vegetation taxonomy used to pick fuel loads.
///
/// Serialized as its numeric code (the `genLC` output column). The
/// cropland subtypes exist for downstream products; the classifier itself
/// only ever assigns [`GenericVegetationClass::Crop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum GenericVegetationClass {
    Grassland,
    Shrub,
    TropicalForest,
    TemperateForest,
    BorealForest,
    TemperateEvergreenForest,
    Crop,
    Wheat,
    Cotton,
    Soy,
    Corn,
    Sorghum,
    SugarCane,
}

impl GenericVegetationClass {
    pub const ALL: [GenericVegetationClass; 13] = [
        Self::Grassland,
        Self::Shrub,
        Self::TropicalForest,
        Self::TemperateForest,
        Self::BorealForest,
        Self::TemperateEvergreenForest,
        Self::Crop,
        Self::Wheat,
        Self::Cotton,
        Self::Soy,
        Self::Corn,
        Self::Sorghum,
        Self::SugarCane,
    ];

    pub fn code(self) -> u8 {
        match self {
            Self::Grassland => 1,
            Self::Shrub => 2,
            Self::TropicalForest => 3,
            Self::TemperateForest => 4,
            Self::BorealForest => 5,
            Self::TemperateEvergreenForest => 6,
            Self::Crop => 9,
            Self::Wheat => 10,
            Self::Cotton => 11,
            Self::Soy => 12,
            Self::Corn => 13,
            Self::Sorghum => 14,
            Self::SugarCane => 15,
        }
    }

    pub fn is_cropland(self) -> bool {
        self.code() >= 9
    }

    /// Position in per-class accumulator arrays.
    #[inline]
    pub(crate) fn ordinal(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or_default()
    }
}

impl From<GenericVegetationClass> for u8 {
    fn from(class: GenericVegetationClass) -> u8 {
        class.code()
    }
}

impl TryFrom<u8> for GenericVegetationClass {
    type Error = UnknownClassCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or(UnknownClassCode(code))
    }
}

// ── Species ──────────────────────────────────────────────────────────────────

/// The eleven species carried by the emission-factor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    Co,
    Nmoc,
    Nox,
    No,
    No2,
    So2,
    Pm25,
    Oc,
    Bc,
    Nh3,
    Pm10,
}

impl Species {
    pub const COUNT: usize = 11;

    pub const ALL: [Species; Self::COUNT] = [
        Self::Co,
        Self::Nmoc,
        Self::Nox,
        Self::No,
        Self::No2,
        Self::So2,
        Self::Pm25,
        Self::Oc,
        Self::Bc,
        Self::Nh3,
        Self::Pm10,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Label used in the run summary.
    pub fn label(self) -> &'static str {
        match self {
            Self::Co => "CO",
            Self::Nmoc => "NMOC",
            Self::Nox => "NOx",
            Self::No => "NO",
            Self::No2 => "NO2",
            Self::So2 => "SO2",
            Self::Pm25 => "PM2.5",
            Self::Oc => "OC",
            Self::Bc => "BC",
            Self::Nh3 => "NH3",
            Self::Pm10 => "PM10",
        }
    }
}

/// Emitted mass per species for one fire, in kg.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesMasses {
    #[serde(rename = "CO")]
    pub co: f64,
    #[serde(rename = "NOx")]
    pub nox: f64,
    #[serde(rename = "NO")]
    pub no: f64,
    #[serde(rename = "NO2")]
    pub no2: f64,
    #[serde(rename = "NH3")]
    pub nh3: f64,
    #[serde(rename = "SO2")]
    pub so2: f64,
    #[serde(rename = "NMOC")]
    pub nmoc: f64,
    #[serde(rename = "PM25")]
    pub pm25: f64,
    #[serde(rename = "PM10")]
    pub pm10: f64,
    #[serde(rename = "OC")]
    pub oc: f64,
    #[serde(rename = "BC")]
    pub bc: f64,
}

impl SpeciesMasses {
    /// Build from a per-species function, visited in [`Species::ALL`] order.
    pub fn from_fn(mut f: impl FnMut(Species) -> f64) -> Self {
        let mut out = Self::default();
        for s in Species::ALL {
            *out.get_mut(s) = f(s);
        }
        out
    }

    pub fn get(&self, species: Species) -> f64 {
        match species {
            Species::Co => self.co,
            Species::Nmoc => self.nmoc,
            Species::Nox => self.nox,
            Species::No => self.no,
            Species::No2 => self.no2,
            Species::So2 => self.so2,
            Species::Pm25 => self.pm25,
            Species::Oc => self.oc,
            Species::Bc => self.bc,
            Species::Nh3 => self.nh3,
            Species::Pm10 => self.pm10,
        }
    }

    pub fn get_mut(&mut self, species: Species) -> &mut f64 {
        match species {
            Species::Co => &mut self.co,
            Species::Nmoc => &mut self.nmoc,
            Species::Nox => &mut self.nox,
            Species::No => &mut self.no,
            Species::No2 => &mut self.no2,
            Species::So2 => &mut self.so2,
            Species::Pm25 => &mut self.pm25,
            Species::Oc => &mut self.oc,
            Species::Bc => &mut self.bc,
            Species::Nh3 => &mut self.nh3,
            Species::Pm10 => &mut self.pm10,
        }
    }
}

// ── Output ───────────────────────────────────────────────────────────────────

/// One surviving fire after the full pipeline. Column names follow the
/// FINN output table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionResult {
    /// Position of the source record in the input table.
    pub index: usize,
    #[serde(rename = "longi")]
    pub lon: f64,
    pub lat: f64,
    #[serde(rename = "polyid")]
    pub poly_id: i64,
    #[serde(rename = "fireid")]
    pub fire_id: i64,
    pub date: NaiveDate,
    #[serde(rename = "jd")]
    pub day_of_year: u32,
    /// Land-cover code after urban reclassification.
    #[serde(rename = "lct")]
    pub land_cover_code: i32,
    #[serde(rename = "globreg")]
    pub region_code: i32,
    #[serde(rename = "genLC")]
    pub class: GenericVegetationClass,
    #[serde(rename = "pcttree")]
    pub tree_pct: f64,
    #[serde(rename = "pctherb")]
    pub herb_pct: f64,
    #[serde(rename = "pctbare")]
    pub bare_pct: f64,
    /// Burnable area in m², bare ground excluded.
    #[serde(rename = "area")]
    pub area_m2: f64,
    /// Burned dry matter in kg/m².
    #[serde(rename = "bmass")]
    pub biomass_kg_m2: f64,
    #[serde(flatten)]
    pub emissions: SpeciesMasses,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_codes_round_trip_through_u8() {
        for class in GenericVegetationClass::ALL {
            let code: u8 = class.into();
            assert_eq!(GenericVegetationClass::try_from(code).unwrap(), class);
        }
        assert!(GenericVegetationClass::try_from(0).is_err());
        assert!(GenericVegetationClass::try_from(7).is_err());
    }

    #[test]
    fn cropland_subtypes_are_cropland() {
        assert!(GenericVegetationClass::Crop.is_cropland());
        assert!(GenericVegetationClass::SugarCane.is_cropland());
        assert!(!GenericVegetationClass::TemperateEvergreenForest.is_cropland());
    }

    #[test]
    fn species_index_matches_all_order() {
        for (i, s) in Species::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
        }
    }

    #[test]
    fn species_masses_get_and_from_fn_agree() {
        let m = SpeciesMasses::from_fn(|s| s.index() as f64 + 0.5);
        for s in Species::ALL {
            assert_eq!(m.get(s), s.index() as f64 + 0.5);
        }
    }

    #[test]
    fn rescaled_cover_sums_to_100() {
        let c = VegetationCover::new(30.0, 20.0, 10.0).rescaled();
        assert!((c.total() - 100.0).abs() < 1e-9, "total={}", c.total());
        assert!((c.tree - 50.0).abs() < 1e-9);
    }

    #[test]
    fn fire_record_reads_finn_column_names() {
        let json = r#"{
            "polyid": 7, "fireid": 12, "cen_lat": 40.0, "cen_lon": -100.0,
            "acq_date_lst": "2019-02-01", "area_sqkm": 1.0,
            "v_tree": 10.0, "v_herb": 85.0, "v_bare": 5.0,
            "v_lct": 10, "f_lct": 1, "v_regnum": 1
        }"#;
        let r: FireRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.day_of_year(), 32);
        assert_eq!(r.land_cover_code, 10);
        assert_eq!(r.cover(), VegetationCover::new(10.0, 85.0, 5.0));
    }
}
