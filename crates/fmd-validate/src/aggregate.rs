//! Per-batch group reductions.
//!
//! Groups are built fresh for every batch; a declaration never spans two
//! batches, so every table here sees complete groups. Each reduction is one
//! pass over the batch and yields a hash table keyed by group, so rules do
//! O(1) lookups per record instead of rescanning.

use std::collections::{HashMap, HashSet};

use fmd_model::{DeclarationKey, MaterialKey, NumericField, Record};

/// Reductions over the declaration and declaration×material groups of one
/// batch.
#[derive(Debug, Clone, Copy)]
pub struct GroupAggregator<'a> {
    records: &'a [Record],
}

impl<'a> GroupAggregator<'a> {
    pub fn new(records: &'a [Record]) -> Self {
        Self { records }
    }

    /// Cardinality of each declaration group.
    pub fn count_by_key(&self) -> HashMap<&'a DeclarationKey, usize> {
        let mut counts = HashMap::new();
        for record in self.records {
            *counts.entry(&record.key).or_insert(0) += 1;
        }
        counts
    }

    /// Sum of `field` per declaration. Empty cells are skipped; a group with
    /// no values sums to zero.
    pub fn sum_by_key(&self, field: NumericField) -> HashMap<&'a DeclarationKey, f64> {
        let mut sums: HashMap<&'a DeclarationKey, CompensatedSum> = HashMap::new();
        for record in self.records {
            sums.entry(&record.key)
                .or_default()
                .add(record.value(field).unwrap_or(0.0));
        }
        sums.into_iter().map(|(key, sum)| (key, sum.total())).collect()
    }

    /// Sum of `field` per material within a declaration.
    pub fn sum_by_key_and_material(&self, field: NumericField) -> HashMap<MaterialKey<'a>, f64> {
        let mut sums: HashMap<MaterialKey<'a>, CompensatedSum> = HashMap::new();
        for record in self.records {
            sums.entry(material_key(record))
                .or_default()
                .add(record.value(field).unwrap_or(0.0));
        }
        sums.into_iter().map(|(key, sum)| (key, sum.total())).collect()
    }

    /// Number of distinct non-empty values of `field` per material.
    pub fn distinct_count_by_key_and_material(
        &self,
        field: NumericField,
    ) -> HashMap<MaterialKey<'a>, usize> {
        let mut distinct: HashMap<MaterialKey<'a>, HashSet<u64>> = HashMap::new();
        for record in self.records {
            let values = distinct.entry(material_key(record)).or_default();
            if let Some(bits) = record.value(field).and_then(value_bits) {
                values.insert(bits);
            }
        }
        distinct
            .into_iter()
            .map(|(key, values)| (key, values.len()))
            .collect()
    }

    /// Value of `field` on the first record of each declaration.
    pub fn first_by_key(&self, field: NumericField) -> HashMap<&'a DeclarationKey, Option<f64>> {
        let mut first = HashMap::new();
        for record in self.records {
            first.entry(&record.key).or_insert_with(|| record.value(field));
        }
        first
    }
}

/// Group key of the material a record belongs to.
pub fn material_key(record: &Record) -> MaterialKey<'_> {
    (&record.key, record.material.as_str())
}

/// Neumaier-compensated running sum. Decimal inputs such as ten lines of
/// `9.99` total exactly `99.9` instead of drifting below an inclusive bound.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    fn add(&mut self, value: f64) {
        let next = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - next) + value;
        } else {
            self.compensation += (value - next) + self.sum;
        }
        self.sum = next;
    }

    fn total(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Hashable identity of a float: `-0.0` folds into `0.0`, NaN is dropped.
fn value_bits(value: f64) -> Option<u64> {
    if value.is_nan() {
        None
    } else if value == 0.0 {
        Some(0.0f64.to_bits())
    } else {
        Some(value.to_bits())
    }
}

/// Every group table the rules read, computed once per batch.
#[derive(Debug, Clone)]
pub struct BatchAggregates<'a> {
    pub actual_rows: HashMap<&'a DeclarationKey, usize>,
    pub material_mass: HashMap<MaterialKey<'a>, f64>,
    pub material_mass_variants: HashMap<MaterialKey<'a>, usize>,
    pub material_percentage: HashMap<MaterialKey<'a>, f64>,
    pub material_ppm: HashMap<MaterialKey<'a>, f64>,
    pub component_percentage: HashMap<&'a DeclarationKey, f64>,
    pub component_ppm: HashMap<&'a DeclarationKey, f64>,
    pub component_mass: HashMap<&'a DeclarationKey, f64>,
    pub declared_summation: HashMap<&'a DeclarationKey, Option<f64>>,
}

impl<'a> BatchAggregates<'a> {
    pub fn compute(records: &'a [Record]) -> Self {
        let groups = GroupAggregator::new(records);
        Self {
            actual_rows: groups.count_by_key(),
            material_mass: groups.sum_by_key_and_material(NumericField::Mass),
            material_mass_variants: groups
                .distinct_count_by_key_and_material(NumericField::HomogeneousMaterialMass),
            material_percentage: groups
                .sum_by_key_and_material(NumericField::SubstanceHomogeneousMaterialPercentage),
            material_ppm: groups
                .sum_by_key_and_material(NumericField::SubstanceHomogeneousMaterialPercentagePpm),
            component_percentage: groups
                .sum_by_key(NumericField::SubstanceComponentLevelPercentage),
            component_ppm: groups.sum_by_key(NumericField::SubstanceComponentLevelPpm),
            component_mass: groups.sum_by_key(NumericField::Mass),
            declared_summation: groups.first_by_key(NumericField::TotalComponentMassSummation),
        }
    }

    pub fn actual_rows(&self, record: &Record) -> usize {
        self.actual_rows.get(&record.key).copied().unwrap_or(0)
    }

    pub fn material_mass(&self, record: &Record) -> f64 {
        sum_or_zero(self.material_mass.get(&material_key(record)))
    }

    pub fn material_mass_variants(&self, record: &Record) -> usize {
        self.material_mass_variants
            .get(&material_key(record))
            .copied()
            .unwrap_or(0)
    }

    pub fn material_percentage(&self, record: &Record) -> f64 {
        sum_or_zero(self.material_percentage.get(&material_key(record)))
    }

    pub fn material_ppm(&self, record: &Record) -> f64 {
        sum_or_zero(self.material_ppm.get(&material_key(record)))
    }

    pub fn component_percentage(&self, record: &Record) -> f64 {
        sum_or_zero(self.component_percentage.get(&record.key))
    }

    pub fn component_ppm(&self, record: &Record) -> f64 {
        sum_or_zero(self.component_ppm.get(&record.key))
    }

    pub fn component_mass(&self, record: &Record) -> f64 {
        sum_or_zero(self.component_mass.get(&record.key))
    }

    pub fn declared_summation(&self, record: &Record) -> Option<f64> {
        self.declared_summation.get(&record.key).copied().flatten()
    }
}

fn sum_or_zero(value: Option<&f64>) -> f64 {
    value.copied().unwrap_or(0.0)
}
