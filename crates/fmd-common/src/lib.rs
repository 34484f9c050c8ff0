//! Shared utilities for FMD QA crates.
//!
//! Polars `AnyValue` conversion used by the loader, and the numeric cell
//! formatting used by the sink.

pub mod polars;

pub use crate::polars::{any_to_string, format_numeric, format_optional};
