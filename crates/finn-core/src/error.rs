use crate::record::GenericVegetationClass;

/// A reference table that cannot back the lookups the engine performs.
/// Raised once, at load time, before any record is processed.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("{table} table is empty")]
    Empty { table: &'static str },
    #[error("{table} table has {found} rows, needs at least {expected}")]
    TooFewRows {
        table: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{table} table row {row} column {column} is not finite")]
    NonFinite {
        table: &'static str,
        row: usize,
        column: &'static str,
    },
}

/// Run-aborting failure. Signals a gap in the classification rules rather
/// than bad input, so no partial output is produced.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(
        "no emission-factor index for record {record}: land cover {land_cover_code}, \
         class {class:?}, tree cover {tree_pct}%"
    )]
    UnmappedEmissionIndex {
        record: usize,
        land_cover_code: i32,
        class: Option<GenericVegetationClass>,
        tree_pct: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown generic vegetation code {0}")]
pub struct UnknownClassCode(pub u8);
