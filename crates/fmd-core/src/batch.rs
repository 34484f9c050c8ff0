//! Key-aligned batch planning.
//!
//! A batch is a window of consecutive declaration keys, taken in the order
//! the keys first appear in the input. Every row of a key lands in the same
//! window, so group reductions inside a batch always see whole declarations.

use std::collections::HashMap;

use fmd_model::{DeclarationKey, SourceRow};

/// One window of declaration keys and the rows that carry them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchWindow {
    /// Zero-based position in the plan.
    pub index: usize,
    pub keys: Vec<DeclarationKey>,
    /// Row indices into the source table, ascending.
    pub rows: Vec<usize>,
}

/// Ordered windows covering every row exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchPlan {
    windows: Vec<BatchWindow>,
    key_count: usize,
}

impl BatchPlan {
    /// Plan windows of at most `batch_size` keys; zero is treated as one.
    pub fn new(rows: &[SourceRow], batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);

        let mut order: Vec<&DeclarationKey> = Vec::new();
        let mut rows_by_key: HashMap<&DeclarationKey, Vec<usize>> = HashMap::new();
        for (position, row) in rows.iter().enumerate() {
            rows_by_key
                .entry(&row.key)
                .or_insert_with(|| {
                    order.push(&row.key);
                    Vec::new()
                })
                .push(position);
        }

        let windows = order
            .chunks(batch_size)
            .enumerate()
            .map(|(index, keys)| {
                let mut window_rows: Vec<usize> = keys
                    .iter()
                    .filter_map(|key| rows_by_key.remove(*key))
                    .flatten()
                    .collect();
                window_rows.sort_unstable();
                BatchWindow {
                    index,
                    keys: keys.iter().map(|key| (*key).clone()).collect(),
                    rows: window_rows,
                }
            })
            .collect();

        Self {
            windows,
            key_count: order.len(),
        }
    }

    pub fn windows(&self) -> &[BatchWindow] {
        &self.windows
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Distinct declaration keys across all windows.
    pub fn key_count(&self) -> usize {
        self.key_count
    }
}
