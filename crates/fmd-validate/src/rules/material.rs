//! Rules over one homogeneous material within a declaration.

use fmd_model::Record;

use super::within;
use crate::aggregate::BatchAggregates;

/// Absolute difference between summed substance mass and the declared
/// material mass that counts as a mismatch.
pub const MASS_TOLERANCE: f64 = 1.0;

pub const MATERIAL_PERCENTAGE_RANGE: (f64, f64) = (99.9, 100.10);

pub const MATERIAL_PPM_RANGE: (f64, f64) = (999_000.0, 1_001_000.0);

pub(super) fn mass_variation(record: &Record, aggregates: &BatchAggregates<'_>) -> bool {
    aggregates.material_mass_variants(record) > 1
}

/// A record without a declared material mass cannot be checked.
pub(super) fn mass_mismatch(record: &Record, aggregates: &BatchAggregates<'_>) -> bool {
    record
        .homogeneous_material_mass
        .is_some_and(|declared| (aggregates.material_mass(record) - declared).abs() >= MASS_TOLERANCE)
}

pub(super) fn percentage_out_of_range(record: &Record, aggregates: &BatchAggregates<'_>) -> bool {
    !within(MATERIAL_PERCENTAGE_RANGE, aggregates.material_percentage(record))
}

pub(super) fn ppm_out_of_range(record: &Record, aggregates: &BatchAggregates<'_>) -> bool {
    !within(MATERIAL_PPM_RANGE, aggregates.material_ppm(record))
}
