use thiserror::Error;

/// Input schema problems detected before any batch runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("required column '{column}' not found")]
    MissingColumn { column: String },

    #[error("column '{column}' appears more than once in the header")]
    DuplicateColumn { column: String },

    #[error("row {row}: '{column}' is empty, cannot derive declaration key")]
    EmptyKeyField { column: String, row: usize },
}

/// Errors raised while evaluating a batch.
#[derive(Debug, Error)]
pub enum QaError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A rule references a column the batch does not carry.
    #[error("rule '{rule}' requires column '{column}', which is absent from batch {batch}")]
    FieldMissing {
        rule: &'static str,
        column: &'static str,
        batch: usize,
    },

    /// A numeric field holds text that cannot be summed.
    #[error("row {row}: column '{column}' holds non-numeric value '{value}'")]
    Aggregation {
        column: String,
        row: usize,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, QaError>;
