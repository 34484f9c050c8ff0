//! Data model for Full Material Declaration QA.
//!
//! A declaration export is a flat table of substance lines. This crate names
//! its columns, derives the declaration key that groups lines together, and
//! defines the error taxonomy shared by the loader and the check engine.

pub mod columns;
pub mod error;
pub mod key;
pub mod options;
pub mod record;

pub use columns::{COMMENT_COLUMN, ColumnMap, DERIVED_COLUMNS, Field, KEY_COLUMN, NumericField};
pub use error::{QaError, Result, SchemaError};
pub use key::{DeclarationKey, KEY_SEPARATOR, MaterialKey, derive_key};
pub use options::{CommentPolicy, DEFAULT_BATCH_SIZE, QaOptions};
pub use record::{Record, SourceRow, SourceTable};
