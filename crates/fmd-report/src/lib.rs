//! Output writers for a QA run: the annotated CSV and the JSON run report.

pub mod annotated;
pub mod checksum;
pub mod error;
pub mod run_report;

pub use annotated::{CsvSink, output_headers, output_row, staging_path};
pub use checksum::compute_file_sha256;
pub use error::{ReportError, Result};
pub use run_report::{RuleCount, RunContext, RunReport, write_run_report};
