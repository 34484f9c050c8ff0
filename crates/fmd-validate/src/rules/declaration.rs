//! Rules over a whole declaration.

use fmd_model::Record;

use super::within;
use crate::aggregate::BatchAggregates;

pub const COMPONENT_PERCENTAGE_RANGE: (f64, f64) = (99.0, 101.0);

pub const COMPONENT_PPM_RANGE: (f64, f64) = (990_000.0, 1_010_000.0);

/// A missing `RowsCount` leaves the gap undefined, which counts as a
/// mismatch.
pub(super) fn rows_count_mismatch(record: &Record, aggregates: &BatchAggregates<'_>) -> bool {
    match record.rows_count {
        Some(declared) => declared - aggregates.actual_rows(record) as f64 != 0.0,
        None => true,
    }
}

pub(super) fn percentage_out_of_range(record: &Record, aggregates: &BatchAggregates<'_>) -> bool {
    !within(COMPONENT_PERCENTAGE_RANGE, aggregates.component_percentage(record))
}

pub(super) fn ppm_out_of_range(record: &Record, aggregates: &BatchAggregates<'_>) -> bool {
    !within(COMPONENT_PPM_RANGE, aggregates.component_ppm(record))
}

/// The declared total is the first record's `TotalComponentMassSummation`;
/// a missing one never reconciles.
pub(super) fn mass_sum_unreconciled(record: &Record, aggregates: &BatchAggregates<'_>) -> bool {
    let summed = round_to_4_places(aggregates.component_mass(record));
    match aggregates.declared_summation(record) {
        Some(declared) => summed != declared,
        None => true,
    }
}

/// Round half away from zero to four decimal places.
pub fn round_to_4_places(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
