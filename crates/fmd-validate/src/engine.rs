//! Rule engine for one batch of records.
//!
//! The engine runs every configured rule against every record of a batch,
//! using group tables computed once up front, and folds the resulting phrases
//! into each record's comment in rule order.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use fmd_model::{ColumnMap, CommentPolicy, QaError, Record};

use crate::aggregate::BatchAggregates;
use crate::annotate::QaComment;
use crate::rules::QaRule;

/// Rule engine evaluating a fixed, ordered rule list.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<QaRule>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self {
            rules: QaRule::ALL.to_vec(),
        }
    }
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the engine to `rules`, kept in execution order.
    pub fn with_rules(rules: impl IntoIterator<Item = QaRule>) -> Self {
        let mut rules: Vec<QaRule> = rules.into_iter().collect();
        rules.sort_unstable();
        rules.dedup();
        Self { rules }
    }

    pub fn rules(&self) -> &[QaRule] {
        &self.rules
    }

    /// Fail when a rule reads a field that `columns` does not map.
    pub fn check_fields(&self, columns: &ColumnMap, batch: usize) -> Result<(), QaError> {
        for rule in &self.rules {
            if let Some(field) = rule
                .required_fields()
                .iter()
                .find(|field| !columns.contains(**field))
            {
                return Err(QaError::FieldMissing {
                    rule: rule.name(),
                    column: field.name(),
                    batch,
                });
            }
        }
        Ok(())
    }

    /// Evaluate one batch. `records` must hold complete declarations.
    pub fn evaluate(
        &self,
        records: Vec<Record>,
        columns: &ColumnMap,
        policy: CommentPolicy,
        batch: usize,
    ) -> Result<BatchOutcome, QaError> {
        self.check_fields(columns, batch)?;

        let mut tally = RuleTally::default();
        let annotations: Vec<(DerivedValues, QaComment)> = {
            let aggregates = BatchAggregates::compute(&records);
            records
                .iter()
                .map(|record| {
                    let mut comment = QaComment::new(record.existing_comment.as_str());
                    let mut flagged = false;
                    for rule in &self.rules {
                        if let Some(phrase) = rule.check(record, &aggregates)
                            && comment.append(phrase, policy)
                        {
                            tally.record_violation(*rule);
                            flagged = true;
                        }
                    }
                    if flagged {
                        tally.records_flagged += 1;
                    }
                    (DerivedValues::compute(record, &aggregates), comment)
                })
                .collect()
        };
        tally.records_checked = records.len();

        debug!(
            batch,
            records = tally.records_checked,
            flagged = tally.records_flagged,
            "batch evaluated"
        );

        let records = records
            .into_iter()
            .zip(annotations)
            .map(|(record, (derived, comment))| AnnotatedRecord {
                record,
                derived,
                comment,
            })
            .collect();
        Ok(BatchOutcome { records, tally })
    }
}

/// Per-record values written next to the source cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedValues {
    /// `RowsCount − ActualRowsCount`; undefined without a `RowsCount`.
    pub rows_count_gap: Option<f64>,
    /// `sum(Mass) − HomogeneousMaterialMass`; undefined without a material mass.
    pub homogeneous_mass_gap: Option<f64>,
    pub homogeneous_percentage_sum: f64,
    pub homogeneous_ppm_sum: f64,
    pub component_percentage_sum: f64,
    pub component_ppm_sum: f64,
}

impl DerivedValues {
    pub fn compute(record: &Record, aggregates: &BatchAggregates<'_>) -> Self {
        Self {
            rows_count_gap: record
                .rows_count
                .map(|declared| declared - aggregates.actual_rows(record) as f64),
            homogeneous_mass_gap: record
                .homogeneous_material_mass
                .map(|declared| aggregates.material_mass(record) - declared),
            homogeneous_percentage_sum: aggregates.material_percentage(record),
            homogeneous_ppm_sum: aggregates.material_ppm(record),
            component_percentage_sum: aggregates.component_percentage(record),
            component_ppm_sum: aggregates.component_ppm(record),
        }
    }

    /// Values in output column order.
    pub fn to_array(&self) -> [Option<f64>; 6] {
        [
            self.rows_count_gap,
            self.homogeneous_mass_gap,
            Some(self.homogeneous_percentage_sum),
            Some(self.homogeneous_ppm_sum),
            Some(self.component_percentage_sum),
            Some(self.component_ppm_sum),
        ]
    }
}

/// A record with its derived values and final comment.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRecord {
    pub record: Record,
    pub derived: DerivedValues,
    pub comment: QaComment,
}

/// Evaluated batch, in input order.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub records: Vec<AnnotatedRecord>,
    pub tally: RuleTally,
}

/// Violation counts accumulated across batches. Only phrases actually
/// written count, so under `SkipExisting` a violation already noted in the
/// seeded comment is not tallied again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleTally {
    /// Records whose comment gained each rule's phrase.
    pub violations: BTreeMap<QaRule, usize>,
    /// Records whose comment gained at least one phrase.
    pub records_flagged: usize,
    pub records_checked: usize,
}

impl RuleTally {
    pub fn record_violation(&mut self, rule: QaRule) {
        *self.violations.entry(rule).or_insert(0) += 1;
    }

    pub fn count(&self, rule: QaRule) -> usize {
        self.violations.get(&rule).copied().unwrap_or(0)
    }

    pub fn total_violations(&self) -> usize {
        self.violations.values().sum()
    }

    pub fn merge(&mut self, other: &RuleTally) {
        for (rule, count) in &other.violations {
            *self.violations.entry(*rule).or_insert(0) += count;
        }
        self.records_flagged += other.records_flagged;
        self.records_checked += other.records_checked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmd_model::{Field, SourceTable};

    fn headers_without(skip: Field) -> Vec<String> {
        Field::ALL
            .iter()
            .filter(|field| **field != skip)
            .map(|field| field.name().to_string())
            .collect()
    }

    #[test]
    fn missing_field_is_reported_with_rule() {
        let columns = ColumnMap::scan(&headers_without(Field::RowsCount)).unwrap();
        let err = RuleEngine::new().check_fields(&columns, 3).unwrap_err();
        match err {
            QaError::FieldMissing {
                rule,
                column,
                batch,
            } => {
                assert_eq!(rule, "rows-count-match");
                assert_eq!(column, "RowsCount");
                assert_eq!(batch, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn restricted_engine_skips_unneeded_fields() {
        let columns = ColumnMap::scan(&headers_without(Field::RowsCount)).unwrap();
        let engine = RuleEngine::with_rules([QaRule::ProfileSummationGap, QaRule::RevisionFlag]);
        assert_eq!(
            engine.rules(),
            [QaRule::RevisionFlag, QaRule::ProfileSummationGap]
        );
        assert!(engine.check_fields(&columns, 0).is_ok());
    }

    #[test]
    fn empty_batch_yields_empty_outcome() {
        let headers: Vec<String> = Field::ALL.iter().map(|f| f.name().to_string()).collect();
        let table = SourceTable::new(&headers, Vec::new()).unwrap();
        let outcome = RuleEngine::new()
            .evaluate(Vec::new(), &table.columns, CommentPolicy::Append, 0)
            .unwrap();
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.tally, RuleTally::default());
    }

    #[test]
    fn tally_merge_adds_counts() {
        let mut left = RuleTally::default();
        left.record_violation(QaRule::RowsCountMatch);
        left.records_flagged = 1;
        left.records_checked = 2;
        let mut right = RuleTally::default();
        right.record_violation(QaRule::RowsCountMatch);
        right.record_violation(QaRule::MassSumReconciliation);
        right.records_flagged = 1;
        right.records_checked = 1;

        left.merge(&right);
        assert_eq!(left.count(QaRule::RowsCountMatch), 2);
        assert_eq!(left.count(QaRule::MassSumReconciliation), 1);
        assert_eq!(left.total_violations(), 3);
        assert_eq!(left.records_flagged, 2);
        assert_eq!(left.records_checked, 3);
    }
}
