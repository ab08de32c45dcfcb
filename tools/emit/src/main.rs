//! Fire emissions tool: reads fire detections and FINN reference tables as
//! JSON, runs the emissions engine, and writes per-fire emissions plus a
//! run summary.
//!
//! Input rows:   polyid, fireid, cen_lat, cen_lon, acq_date_lst, area_sqkm,
//!               v_tree, v_herb, v_bare, v_lct, f_lct, v_regnum
//! Output rows:  sorted by day of year (see finn_core::EmissionResult).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use finn_core::tables::{EmissionFactorRow, LandCoverFuel, RegionFuel};
use finn_core::{EngineConfig, FireRecord, ReferenceTables, Summary};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "finn-emit", about = "Estimate per-fire emissions from fire detections and land cover")]
struct Args {
    /// Fire detection table (JSON array of rows).
    #[arg(short, long)]
    input: PathBuf,

    /// Output emissions file. Defaults to `<input>_out.json`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Regional fuel loading table (g/m²).
    #[arg(long, default_value = "data/fuel-loads.json")]
    fuel: PathBuf,

    /// North America land-cover fuel loading table (g/m²).
    #[arg(long, default_value = "data/land-cover-gm2.json")]
    land_cover_fuel: PathBuf,

    /// Emission factor table (g/kg DM).
    #[arg(long, default_value = "data/emission-factors.json")]
    emission_factors: PathBuf,

    /// Engine configuration overrides (JSON). Omitted keys keep defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Process fires across all cores.
    #[arg(long)]
    parallel: bool,
}

// ── Input rows ───────────────────────────────────────────────────────────────

/// Fire row as exported from the preprocessor. Integer columns with gaps
/// come through as floats, so codes are read as f64 and truncated.
#[derive(Debug, Deserialize)]
struct FireRow {
    polyid: i64,
    fireid: i64,
    cen_lat: f64,
    cen_lon: f64,
    acq_date_lst: NaiveDate,
    area_sqkm: f64,
    v_tree: f64,
    v_herb: f64,
    v_bare: f64,
    v_lct: f64,
    #[serde(default)]
    f_lct: Option<f64>,
    #[serde(default)]
    v_regnum: Option<f64>,
}

impl FireRow {
    /// `None` when the region is missing; such fires never reach the engine.
    fn into_record(self) -> Option<FireRecord> {
        let region = self.v_regnum.filter(|r| r.is_finite())?;
        Some(FireRecord {
            poly_id: self.polyid,
            fire_id: self.fireid,
            lat: self.cen_lat,
            lon: self.cen_lon,
            acquisition_date: self.acq_date_lst,
            area_km2: self.area_sqkm,
            tree_pct: self.v_tree,
            herb_pct: self.v_herb,
            bare_pct: self.v_bare,
            land_cover_code: self.v_lct as i32,
            land_cover_flag: self.f_lct.unwrap_or_default() as i32,
            region_code: region as i32,
        })
    }
}

// ── Report ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct RunReport<'a> {
    input_file: String,
    output_file: String,
    emissions_file: String,
    fuel_load_file: String,
    num_dropped_no_region: usize,
    #[serde(flatten)]
    summary: &'a Summary,
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Load fires, dropping rows without a region. Returns the kept records
/// and the number dropped.
fn load_fires(path: &Path) -> Result<(Vec<FireRecord>, usize)> {
    let rows: Vec<FireRow> = read_json(path)?;
    let n = rows.len();
    let records: Vec<FireRecord> = rows.into_iter().filter_map(FireRow::into_record).collect();
    let dropped = n - records.len();
    Ok((records, dropped))
}

fn load_tables(args: &Args) -> Result<ReferenceTables> {
    let fuel: Vec<RegionFuel> = read_json(&args.fuel)?;
    let land_cover: Vec<LandCoverFuel> = read_json(&args.land_cover_fuel)?;
    let factors: Vec<EmissionFactorRow> = read_json(&args.emission_factors)?;
    ReferenceTables::new(fuel, land_cover, factors).context("validating reference tables")
}

/// `fires.json` → `fires_out.json`.
fn default_output(input: &Path) -> PathBuf {
    with_suffix(input, "_out")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}{suffix}.json"))
}

// ── main ─────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let tables = load_tables(&args)?;
    info!(regions = tables.region_count(), "finished reading fuel and emission factor tables");

    let config: EngineConfig = match &args.config {
        Some(path) => read_json(path)?,
        None => EngineConfig::default(),
    };

    let (fires, dropped) = load_fires(&args.input)?;
    if dropped > 0 {
        info!(dropped, "dropped fires without a global region");
    }

    let output = if args.parallel {
        finn_core::run_parallel(&fires, &tables, &config)?
    } else {
        finn_core::run(&fires, &tables, &config)?
    };

    let out_path = args.output.clone().unwrap_or_else(|| default_output(&args.input));
    fs::write(&out_path, serde_json::to_string_pretty(&output.rows)?)
        .with_context(|| format!("writing {}", out_path.display()))?;
    info!(rows = output.rows.len(), path = %out_path.display(), "wrote emissions");

    let summary = output.summary.finalize();
    let report = RunReport {
        input_file: args.input.display().to_string(),
        output_file: out_path.display().to_string(),
        emissions_file: args.emission_factors.display().to_string(),
        fuel_load_file: args.fuel.display().to_string(),
        num_dropped_no_region: dropped,
        summary: &summary,
    };
    let report_json = serde_json::to_string_pretty(&report)?;
    let summary_path = with_suffix(&out_path, "_summary");
    fs::write(&summary_path, &report_json)
        .with_context(|| format!("writing {}", summary_path.display()))?;
    println!("{report_json}");

    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
