//! Declaration export ingestion.
//!
//! Reads a CSV export of Full Material Declaration lines into a keyed
//! [`fmd_model::SourceTable`], rejecting inputs whose header or key fields do
//! not satisfy the schema.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use fmd_ingest::load_declarations;
//!
//! let table = load_declarations(Path::new("exports/fmd.csv"))?;
//! println!("{} rows", table.len());
//! ```

mod csv;
mod error;
mod loader;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use crate::csv::{
    MAX_CSV_FILE_SIZE, check_file_size, check_file_size_with_limit, read_csv_frame,
    read_csv_headers, validate_encoding,
};

// === Loading ===
pub use loader::load_declarations;
