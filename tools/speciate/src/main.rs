//! Speciation tool: converts finn-emit output into model species.
//! NMOC is split with per-vegetation speciation profiles; CO, NH3, NO,
//! NO2 and SO2 are converted to moles.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use finn_core::speciate::{speciate, SpeciatedFire, SpeciationRow, SpeciationTable};
use finn_core::EmissionResult;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "speciate", about = "Speciate per-fire emissions for chemical transport models")]
struct Args {
    /// Emissions file written by finn-emit.
    #[arg(short, long)]
    input: PathBuf,

    /// Speciation coefficient table (JSON array of rows).
    #[arg(short, long, default_value = "data/speciation.json")]
    speciation: PathBuf,

    /// Output file. Defaults to `<input>_speciated.json`.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let text = fs::read_to_string(&args.speciation)
        .with_context(|| format!("reading {}", args.speciation.display()))?;
    let rows: Vec<SpeciationRow> = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", args.speciation.display()))?;
    let table = SpeciationTable::new(rows).context("validating speciation table")?;

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let fires: Vec<EmissionResult> = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", args.input.display()))?;
    info!(fires = fires.len(), species = table.rows().len(), "speciating");

    let speciated: Vec<SpeciatedFire> = fires.iter().map(|f| speciate(f, &table)).collect();

    let out_path = args.output.clone().unwrap_or_else(|| {
        let stem = args
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        args.input.with_file_name(format!("{stem}_speciated.json"))
    });
    fs::write(&out_path, serde_json::to_string_pretty(&speciated)?)
        .with_context(|| format!("writing {}", out_path.display()))?;
    info!(path = %out_path.display(), "wrote speciated emissions");

    Ok(())
}
