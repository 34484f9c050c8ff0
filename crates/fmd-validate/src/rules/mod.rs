//! The compiled-in consistency rules.
//!
//! Each rule is a pure predicate over one record and the batch's group
//! tables. Rules never read each other's output; their order only decides
//! the order of phrases in the comment.

mod declaration;
mod material;
mod record;

use std::fmt;

use fmd_model::{Field, Record};
use serde::{Deserialize, Serialize};

use crate::aggregate::BatchAggregates;

pub use declaration::{
    COMPONENT_PERCENTAGE_RANGE, COMPONENT_PPM_RANGE, round_to_4_places,
};
pub use material::{MASS_TOLERANCE, MATERIAL_PERCENTAGE_RANGE, MATERIAL_PPM_RANGE};
pub use record::{NOT_LATEST, PROFILE_GAP_PERCENT};

/// Group level a rule aggregates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleScope {
    Record,
    Material,
    Declaration,
}

impl fmt::Display for RuleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RuleScope::Record => "record",
            RuleScope::Material => "material",
            RuleScope::Declaration => "declaration",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QaRule {
    RevisionFlag,
    MaterialMassVariation,
    RowsCountMatch,
    HomogeneousMassBalance,
    MaterialPercentageTotal,
    MaterialPpmTotal,
    ComponentPercentageTotal,
    ComponentPpmTotal,
    ProfileSummationGap,
    MassSumReconciliation,
}

impl QaRule {
    /// Execution order.
    pub const ALL: [QaRule; 10] = [
        QaRule::RevisionFlag,
        QaRule::MaterialMassVariation,
        QaRule::RowsCountMatch,
        QaRule::HomogeneousMassBalance,
        QaRule::MaterialPercentageTotal,
        QaRule::MaterialPpmTotal,
        QaRule::ComponentPercentageTotal,
        QaRule::ComponentPpmTotal,
        QaRule::ProfileSummationGap,
        QaRule::MassSumReconciliation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            QaRule::RevisionFlag => "revision-flag",
            QaRule::MaterialMassVariation => "material-mass-variation",
            QaRule::RowsCountMatch => "rows-count-match",
            QaRule::HomogeneousMassBalance => "homogeneous-mass-balance",
            QaRule::MaterialPercentageTotal => "material-percentage-total",
            QaRule::MaterialPpmTotal => "material-ppm-total",
            QaRule::ComponentPercentageTotal => "component-percentage-total",
            QaRule::ComponentPpmTotal => "component-ppm-total",
            QaRule::ProfileSummationGap => "profile-summation-gap",
            QaRule::MassSumReconciliation => "mass-sum-reconciliation",
        }
    }

    /// Comment text written onto every violating record.
    pub fn phrase(self) -> &'static str {
        match self {
            QaRule::RevisionFlag => "FMDRevFlag is Not Latest",
            QaRule::MaterialMassVariation => "Multiple masses for the same homogeneous material",
            QaRule::RowsCountMatch => "Rows count mismatch",
            QaRule::HomogeneousMassBalance => "Fail: Mass mismatch",
            QaRule::MaterialPercentageTotal => "Fail: homogeneousPercentage sum != 100",
            QaRule::MaterialPpmTotal => "Fail: homogeneousPPM sum != 1000000",
            QaRule::ComponentPercentageTotal => "Fail: Component level percentage sum != 100",
            QaRule::ComponentPpmTotal => "Fail: Component level PPM sum != 1000000",
            QaRule::ProfileSummationGap => "Total VS Summation Gap is more than 50%",
            QaRule::MassSumReconciliation => "Software issue",
        }
    }

    pub fn scope(self) -> RuleScope {
        match self {
            QaRule::RevisionFlag | QaRule::ProfileSummationGap => RuleScope::Record,
            QaRule::MaterialMassVariation
            | QaRule::HomogeneousMassBalance
            | QaRule::MaterialPercentageTotal
            | QaRule::MaterialPpmTotal => RuleScope::Material,
            QaRule::RowsCountMatch
            | QaRule::ComponentPercentageTotal
            | QaRule::ComponentPpmTotal
            | QaRule::MassSumReconciliation => RuleScope::Declaration,
        }
    }

    /// Input columns the rule reads, beyond the key fields.
    pub fn required_fields(self) -> &'static [Field] {
        match self {
            QaRule::RevisionFlag => &[Field::FmdRevFlag],
            QaRule::MaterialMassVariation => {
                &[Field::HomogeneousMaterialName, Field::HomogeneousMaterialMass]
            }
            QaRule::RowsCountMatch => &[Field::RowsCount],
            QaRule::HomogeneousMassBalance => &[
                Field::HomogeneousMaterialName,
                Field::HomogeneousMaterialMass,
                Field::Mass,
            ],
            QaRule::MaterialPercentageTotal => &[
                Field::HomogeneousMaterialName,
                Field::SubstanceHomogeneousMaterialPercentage,
            ],
            QaRule::MaterialPpmTotal => &[
                Field::HomogeneousMaterialName,
                Field::SubstanceHomogeneousMaterialPercentagePpm,
            ],
            QaRule::ComponentPercentageTotal => &[Field::SubstanceComponentLevelPercentage],
            QaRule::ComponentPpmTotal => &[Field::SubstanceComponentLevelPpm],
            QaRule::ProfileSummationGap => &[
                Field::TotalComponentMassProfile,
                Field::TotalComponentMassSummation,
            ],
            QaRule::MassSumReconciliation => &[Field::Mass, Field::TotalComponentMassSummation],
        }
    }

    /// Whether `record` violates the rule.
    pub fn is_violated(self, record: &Record, aggregates: &BatchAggregates<'_>) -> bool {
        match self {
            QaRule::RevisionFlag => record::revision_flag(record),
            QaRule::MaterialMassVariation => material::mass_variation(record, aggregates),
            QaRule::RowsCountMatch => declaration::rows_count_mismatch(record, aggregates),
            QaRule::HomogeneousMassBalance => material::mass_mismatch(record, aggregates),
            QaRule::MaterialPercentageTotal => material::percentage_out_of_range(record, aggregates),
            QaRule::MaterialPpmTotal => material::ppm_out_of_range(record, aggregates),
            QaRule::ComponentPercentageTotal => {
                declaration::percentage_out_of_range(record, aggregates)
            }
            QaRule::ComponentPpmTotal => declaration::ppm_out_of_range(record, aggregates),
            QaRule::ProfileSummationGap => record::profile_gap(record),
            QaRule::MassSumReconciliation => declaration::mass_sum_unreconciled(record, aggregates),
        }
    }

    /// The rule's phrase when `record` violates it.
    pub fn check(self, record: &Record, aggregates: &BatchAggregates<'_>) -> Option<&'static str> {
        self.is_violated(record, aggregates).then(|| self.phrase())
    }
}

impl fmt::Display for QaRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inclusive bounds check. NaN is never in range.
pub(crate) fn within(range: (f64, f64), value: f64) -> bool {
    value >= range.0 && value <= range.1
}
