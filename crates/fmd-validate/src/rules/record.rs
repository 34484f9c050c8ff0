//! Rules decided by a single record's own fields.

use fmd_model::Record;

/// `FMDRevFlag` value marking a superseded declaration.
pub const NOT_LATEST: &str = "Not Latest";

/// Relative gap, in percent of the profile total, at which profile and
/// summation are considered inconsistent.
pub const PROFILE_GAP_PERCENT: f64 = 50.0;

pub(super) fn revision_flag(record: &Record) -> bool {
    record.fmd_rev_flag == NOT_LATEST
}

/// Zero or missing profile never fires.
pub(super) fn profile_gap(record: &Record) -> bool {
    let (Some(profile), Some(summation)) = (
        record.total_component_mass_profile,
        record.total_component_mass_summation,
    ) else {
        return false;
    };
    if profile == 0.0 {
        return false;
    }
    (profile - summation).abs() / profile * 100.0 >= PROFILE_GAP_PERCENT
}
