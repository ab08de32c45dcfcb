//! Pipeline orchestrator: runs every stage for each fire record and folds
//! the results into a [`SummaryAccumulator`].
//!
//! Record stages:
//!   cover QC → classification → fuel → combustion → emissions.
//!
//! Any stage may skip a record; only an emission-factor gap aborts the run.

use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::combustion::{burned_biomass, combustion_factors};
use crate::config::EngineConfig;
use crate::cover::correct_cover;
use crate::emission::{calculate_emissions, EmissionQuery};
use crate::error::EngineError;
use crate::fuel::{resolve_fuel, FuelQuery};
use crate::record::{EmissionResult, FireRecord};
use crate::summary::{SkipReason, SummaryAccumulator};
use crate::tables::ReferenceTables;

/// Result of pushing one record through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Emitted(EmissionResult),
    Skipped(SkipReason),
}

/// Output rows (ordered by day of year) plus the run accumulator.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub rows: Vec<EmissionResult>,
    pub summary: SummaryAccumulator,
}

/// Process one record. `index` is its position in the input table.
/// Counters and totals are added to `acc` whatever the outcome.
pub fn process_record(
    index: usize,
    record: &FireRecord,
    tables: &ReferenceTables,
    config: &EngineConfig,
    acc: &mut SummaryAccumulator,
) -> Result<RecordOutcome, EngineError> {
    acc.record_input();
    let outcome = evaluate(index, record, tables, config, acc)?;
    match &outcome {
        RecordOutcome::Emitted(row) => acc.record_emission(row),
        RecordOutcome::Skipped(reason) => {
            acc.record_skip(*reason);
            log_skip(index, record, *reason);
        }
    }
    Ok(outcome)
}

fn evaluate(
    index: usize,
    record: &FireRecord,
    tables: &ReferenceTables,
    config: &EngineConfig,
    acc: &mut SummaryAccumulator,
) -> Result<RecordOutcome, EngineError> {
    let qc = correct_cover(record.cover(), record.land_cover_code);
    acc.record_cover(&qc);
    if !qc.is_usable() {
        return Ok(RecordOutcome::Skipped(SkipReason::NoCoverFallback));
    }
    let cover = qc.cover;

    let Some(classification) = classify(record.land_cover_code, cover.tree, record.lat) else {
        return Ok(RecordOutcome::Skipped(SkipReason::InvalidLandCover));
    };
    if classification.urban {
        acc.record_urban();
    }

    let fuel_query = FuelQuery {
        class: classification.class,
        region_code: record.region_code,
        land_cover_code: classification.land_cover_code,
        lon: record.lon,
        lat: record.lat,
    };
    let fuel = match resolve_fuel(&fuel_query, tables, config) {
        Ok(fuel) => fuel,
        Err(reason) => return Ok(RecordOutcome::Skipped(reason)),
    };
    // resolve_fuel rejects a missing class, so this only unwraps the type.
    let Some(class) = classification.class else {
        return Ok(RecordOutcome::Skipped(SkipReason::UnassignedClass));
    };

    let cf = combustion_factors(cover.tree);
    let biomass_kg_m2 = burned_biomass(&cover, &fuel, &cf);

    let emissions = calculate_emissions(
        &EmissionQuery {
            record: index,
            land_cover_code: classification.land_cover_code,
            class: Some(class),
            tree_pct: cover.tree,
            bare_pct: cover.bare,
            area_km2: record.area_km2,
            biomass_kg_m2,
        },
        tables,
    )?;

    Ok(RecordOutcome::Emitted(EmissionResult {
        index,
        lon: record.lon,
        lat: record.lat,
        poly_id: record.poly_id,
        fire_id: record.fire_id,
        date: record.acquisition_date,
        day_of_year: record.day_of_year(),
        land_cover_code: classification.land_cover_code,
        region_code: record.region_code,
        class,
        tree_pct: cover.tree,
        herb_pct: cover.herb,
        bare_pct: cover.bare,
        area_m2: emissions.area_m2,
        biomass_kg_m2,
        emissions: emissions.masses,
    }))
}

fn log_skip(index: usize, record: &FireRecord, reason: SkipReason) {
    match reason {
        SkipReason::RegionOutOfRange => warn!(
            record = index,
            region_code = record.region_code,
            "region code outside fuel table, fire removed"
        ),
        SkipReason::FuelUnassigned => warn!(
            record = index,
            region_code = record.region_code,
            land_cover = record.land_cover_code,
            "fuel load unassigned, fire removed"
        ),
        _ => debug!(record = index, ?reason, "fire skipped"),
    }
}

/// Order output rows by day of year; ties keep input order.
pub fn sort_by_day(rows: &mut [EmissionResult]) {
    rows.sort_by_key(|r| (r.day_of_year, r.index));
}

fn log_completion(acc: &SummaryAccumulator) {
    info!(
        total = acc.total_input,
        processed = acc.processed,
        skipped = acc.skipped_total(),
        urban = acc.urban,
        "emissions run complete"
    );
}

/// Process every record in order.
pub fn run(
    records: &[FireRecord],
    tables: &ReferenceTables,
    config: &EngineConfig,
) -> Result<RunOutput, EngineError> {
    info!(records = records.len(), "starting emissions run");
    let mut summary = SummaryAccumulator::new();
    let mut rows = Vec::new();
    for (i, record) in records.iter().enumerate() {
        if let RecordOutcome::Emitted(row) = process_record(i, record, tables, config, &mut summary)? {
            rows.push(row);
        }
    }
    sort_by_day(&mut rows);
    log_completion(&summary);
    Ok(RunOutput { rows, summary })
}

/// Process records across the rayon pool. Per-thread accumulators are
/// merged by summation, and rows are sorted by day afterwards, so the
/// output matches [`run`] up to floating-point summation order.
#[cfg(feature = "threading")]
pub fn run_parallel(
    records: &[FireRecord],
    tables: &ReferenceTables,
    config: &EngineConfig,
) -> Result<RunOutput, EngineError> {
    use rayon::prelude::*;

    info!(records = records.len(), "starting parallel emissions run");
    let (mut rows, summary) = records
        .par_iter()
        .enumerate()
        .try_fold(
            || (Vec::new(), SummaryAccumulator::new()),
            |(mut rows, mut acc), (i, record)| {
                if let RecordOutcome::Emitted(row) = process_record(i, record, tables, config, &mut acc)? {
                    rows.push(row);
                }
                Ok::<_, EngineError>((rows, acc))
            },
        )
        .try_reduce(
            || (Vec::new(), SummaryAccumulator::new()),
            |(mut rows, mut acc), (other_rows, other_acc)| {
                rows.extend(other_rows);
                acc.merge(&other_acc);
                Ok((rows, acc))
            },
        )?;
    sort_by_day(&mut rows);
    log_completion(&summary);
    Ok(RunOutput { rows, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::GenericVegetationClass;
    use crate::tables::test_support::tables;
    use chrono::NaiveDate;

    fn record(day: u32, land_cover_code: i32, tree: f64, herb: f64, bare: f64) -> FireRecord {
        FireRecord {
            poly_id: 1,
            fire_id: 1,
            lat: 40.0,
            lon: -100.0,
            acquisition_date: NaiveDate::from_yo_opt(2019, day).unwrap(),
            area_km2: 1.0,
            tree_pct: tree,
            herb_pct: herb,
            bare_pct: bare,
            land_cover_code,
            land_cover_flag: 0,
            region_code: 2,
        }
    }

    #[test]
    fn skip_reasons_are_counted() {
        let t = tables(14);
        let cfg = EngineConfig::default();
        let mut acc = SummaryAccumulator::new();

        let mut out_of_region = record(1, 10, 10.0, 85.0, 5.0);
        out_of_region.region_code = 0;
        let cases = [
            (record(1, 17, 10.0, 85.0, 5.0), SkipReason::InvalidLandCover),
            (record(1, 15, 10.0, 85.0, 5.0), SkipReason::InvalidLandCover),
            (record(1, 16, 0.0, 0.0, 100.0), SkipReason::NoCoverFallback),
            (out_of_region, SkipReason::RegionOutOfRange),
        ];
        for (i, (r, expected)) in cases.iter().enumerate() {
            let outcome = process_record(i, r, &t, &cfg, &mut acc).unwrap();
            assert_eq!(outcome, RecordOutcome::Skipped(*expected), "case {i}");
        }
        assert_eq!(acc.total_input, 4);
        assert_eq!(acc.processed, 0);
        assert_eq!(acc.skipped(SkipReason::InvalidLandCover), 2);
        assert_eq!(acc.bare_cover, 1);
    }

    #[test]
    fn urban_record_is_counted_and_rewritten() {
        let t = tables(14);
        let mut acc = SummaryAccumulator::new();
        let r = record(1, 13, 30.0, 70.0, 0.0);
        let outcome = process_record(0, &r, &t, &EngineConfig::default(), &mut acc).unwrap();
        let RecordOutcome::Emitted(row) = outcome else {
            panic!("urban record skipped: {outcome:?}");
        };
        assert_eq!(row.land_cover_code, 10);
        assert_eq!(row.class, GenericVegetationClass::Grassland);
        assert_eq!(acc.urban, 1);
    }

    #[test]
    fn rows_are_sorted_by_day_then_input_order() {
        let t = tables(14);
        let records = vec![
            record(200, 10, 10.0, 85.0, 5.0),
            record(3, 10, 10.0, 85.0, 5.0),
            record(200, 7, 50.0, 50.0, 0.0),
            record(1, 17, 10.0, 85.0, 5.0),
        ];
        let out = run(&records, &t, &EngineConfig::default()).unwrap();
        let order: Vec<(u32, usize)> = out.rows.iter().map(|r| (r.day_of_year, r.index)).collect();
        assert_eq!(order, vec![(3, 1), (200, 0), (200, 2)]);
        assert_eq!(out.summary.total_input, 4);
        assert_eq!(
            out.summary.processed,
            out.summary.total_input - out.summary.skipped_total()
        );
    }

    #[cfg(feature = "threading")]
    #[test]
    fn parallel_run_matches_sequential() {
        let t = tables(14);
        let records: Vec<FireRecord> = (0..500)
            .map(|i| {
                let code = (i % 17) as i32;
                record(1 + (i * 7 % 365) as u32, code, (i % 90) as f64, 50.0, (i % 10) as f64)
            })
            .collect();
        let cfg = EngineConfig::default();
        let seq = run(&records, &t, &cfg).unwrap();
        let par = run_parallel(&records, &t, &cfg).unwrap();
        assert_eq!(seq.rows, par.rows);
        assert_eq!(seq.summary.total_input, par.summary.total_input);
        assert_eq!(seq.summary.skipped_total(), par.summary.skipped_total());
        let rel = (seq.summary.biomass_kg - par.summary.biomass_kg).abs() / seq.summary.biomass_kg;
        assert!(rel < 1e-12, "biomass differs by {rel}");
    }
}
