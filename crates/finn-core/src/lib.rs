//! FINN fire emissions engine.
//!
//! Turns satellite fire detections plus land-cover observations into
//! per-fire emissions of eleven pollutant species.
//!
//! Pipeline per record:
//!   cover QC → land-cover classification → fuel resolution →
//!   combustion → emission factors → summary accumulation.

pub mod classify;
pub mod combustion;
pub mod config;
pub mod cover;
pub mod emission;
pub mod engine;
pub mod error;
pub mod fuel;
pub mod record;
pub mod speciate;
pub mod summary;
pub mod tables;

pub use config::EngineConfig;
pub use engine::{process_record, run, RunOutput};
pub use error::{EngineError, TableError};
pub use record::{EmissionResult, FireRecord, GenericVegetationClass, Species, SpeciesMasses};
pub use summary::{SkipReason, Summary, SummaryAccumulator};
pub use tables::ReferenceTables;

#[cfg(feature = "threading")]
pub use engine::run_parallel;
