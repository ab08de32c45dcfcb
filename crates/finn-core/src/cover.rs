//! VCF cover quality control.
//!
//! Repairs tree/herb/bare percentages so they sum to ~100, or falls back
//! to land-cover defaults when the cover product has nothing usable.
//!
//! Order of checks (each sees the output of the previous one):
//!   1. clamp "no data" negatives to 0
//!   2. total in (101, 240)  → rescale            (scaled to 100)
//!   3. total in [50, 99)    → rescale            (scaled to 100)
//!   4. total in [1, 50)     → rescale            (scaled below 50)
//!   5. total ≥ 240, < 1, or bare == 100 → land-cover defaults

use crate::record::VegetationCover;

/// Totals at or above this are processing artifacts (water reads as 253).
const TOTAL_INVALID: f64 = 240.0;
const TOTAL_HIGH: f64 = 101.0;
const TOTAL_LOW: f64 = 99.0;
const TOTAL_SPARSE: f64 = 50.0;
const TOTAL_EMPTY: f64 = 1.0;

/// Which rescale branch fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rescale {
    /// Total was in (101, 240) or [50, 99).
    ToHundred,
    /// Total was in [1, 50).
    BelowFifty,
}

/// Default cover assigned when the VCF data is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverFallback {
    /// Codes ≤ 5: 60 / 40 / 0.
    Forest,
    /// Codes 6–8, 11, 14: 50 / 50 / 0.
    WoodySavanna,
    /// Codes 9, 10, 12, 13: 20 / 80 / 0.
    Grassland,
    /// Codes ≥ 15 have no vegetation to fall back on; the record is skipped.
    Unavailable,
}

impl CoverFallback {
    pub fn for_land_cover(land_cover_code: i32) -> Self {
        match land_cover_code {
            c if c >= 15 => Self::Unavailable,
            c if c <= 5 => Self::Forest,
            6..=8 | 11 | 14 => Self::WoodySavanna,
            _ => Self::Grassland,
        }
    }

    pub fn cover(self) -> Option<VegetationCover> {
        match self {
            Self::Forest => Some(VegetationCover::new(60.0, 40.0, 0.0)),
            Self::WoodySavanna => Some(VegetationCover::new(50.0, 50.0, 0.0)),
            Self::Grassland => Some(VegetationCover::new(20.0, 80.0, 0.0)),
            Self::Unavailable => None,
        }
    }
}

/// Outcome of cover QC for one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverCorrection {
    /// Corrected cover. When `fallback` is `Unavailable` this is the
    /// (unusable) cover as it stood when QC gave up.
    pub cover: VegetationCover,
    pub rescale: Option<Rescale>,
    /// Set when the all-bare / no-data branch was taken.
    pub fallback: Option<CoverFallback>,
}

impl CoverCorrection {
    /// False when the record has to be skipped.
    pub fn is_usable(&self) -> bool {
        self.fallback != Some(CoverFallback::Unavailable)
    }
}

/// Run cover QC on raw VCF percentages.
pub fn correct_cover(raw: VegetationCover, land_cover_code: i32) -> CoverCorrection {
    let mut cover = VegetationCover::new(raw.tree.max(0.0), raw.herb.max(0.0), raw.bare.max(0.0));
    let mut rescale = None;

    let total = cover.total();
    if total > TOTAL_HIGH && total < TOTAL_INVALID {
        cover = cover.rescaled();
        rescale = Some(Rescale::ToHundred);
    }

    let total = cover.total();
    if (TOTAL_SPARSE..TOTAL_LOW).contains(&total) {
        cover = cover.rescaled();
        rescale = Some(Rescale::ToHundred);
    }

    let total = cover.total();
    if (TOTAL_EMPTY..TOTAL_SPARSE).contains(&total) {
        cover = cover.rescaled();
        rescale = Some(Rescale::BelowFifty);
    }

    let total = cover.total();
    let mut fallback = None;
    if total >= TOTAL_INVALID || total < TOTAL_EMPTY || cover.bare == 100.0 {
        let f = CoverFallback::for_land_cover(land_cover_code);
        if let Some(defaults) = f.cover() {
            cover = defaults;
        }
        fallback = Some(f);
    }

    CoverCorrection {
        cover,
        rescale,
        fallback,
    }
}
