//! Annotated CSV output.
//!
//! The file is built next to its destination under a temporary name and only
//! renamed into place by [`CsvSink::finish`]. A sink dropped before that
//! removes its temporary file, so a failed run leaves no partial output.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use fmd_common::format_optional;
use fmd_core::RecordSink;
use fmd_model::{ColumnMap, DERIVED_COLUMNS};
use fmd_validate::AnnotatedRecord;

use crate::error::{ReportError, Result};

/// Output header: source headers without any existing comment column,
/// followed by the derived columns.
pub fn output_headers(columns: &ColumnMap) -> Vec<String> {
    let comment = columns.comment_index();
    columns
        .headers()
        .iter()
        .enumerate()
        .filter(|(idx, _)| Some(*idx) != comment)
        .map(|(_, header)| header.clone())
        .chain(DERIVED_COLUMNS.iter().map(|name| (*name).to_string()))
        .collect()
}

/// One output row for `annotated`.
pub fn output_row(annotated: &AnnotatedRecord, comment_index: Option<usize>) -> Vec<String> {
    let mut row: Vec<String> = annotated
        .record
        .cells
        .iter()
        .enumerate()
        .filter(|(idx, _)| Some(*idx) != comment_index)
        .map(|(_, cell)| cell.clone())
        .collect();
    row.extend(annotated.derived.to_array().into_iter().map(format_optional));
    row.push(annotated.comment.as_str().to_string());
    row
}

/// Sibling path the output is staged under.
pub fn staging_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".partial");
    destination.with_file_name(name)
}

/// [`RecordSink`] writing the annotated CSV.
pub struct CsvSink {
    destination: PathBuf,
    staging: PathBuf,
    writer: Option<csv::Writer<File>>,
    comment_index: Option<usize>,
    rows_written: usize,
    finished: bool,
}

impl CsvSink {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        let destination = destination.into();
        let staging = staging_path(&destination);
        Self {
            destination,
            staging,
            writer: None,
            comment_index: None,
            rows_written: 0,
            finished: false,
        }
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    fn csv_error(&self, source: csv::Error) -> ReportError {
        ReportError::Csv {
            path: self.staging.clone(),
            source,
        }
    }
}

impl RecordSink for CsvSink {
    type Error = ReportError;

    fn begin(&mut self, columns: &ColumnMap) -> Result<()> {
        let file = File::create(&self.staging).map_err(|source| ReportError::Io {
            path: self.staging.clone(),
            source,
        })?;
        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(output_headers(columns))
            .map_err(|source| self.csv_error(source))?;
        self.comment_index = columns.comment_index();
        self.writer = Some(writer);
        debug!(path = %self.staging.display(), "output started");
        Ok(())
    }

    fn write_batch(&mut self, records: &[AnnotatedRecord]) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(ReportError::NotStarted {
                path: self.destination.clone(),
            });
        };
        for annotated in records {
            if let Err(source) = writer.write_record(output_row(annotated, self.comment_index)) {
                return Err(ReportError::Csv {
                    path: self.staging.clone(),
                    source,
                });
            }
        }
        self.rows_written += records.len();
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let Some(mut writer) = self.writer.take() else {
            return Err(ReportError::NotStarted {
                path: self.destination.clone(),
            });
        };
        writer.flush().map_err(|source| ReportError::Io {
            path: self.staging.clone(),
            source,
        })?;
        drop(writer);
        fs::rename(&self.staging, &self.destination).map_err(|source| ReportError::Rename {
            from: self.staging.clone(),
            to: self.destination.clone(),
            source,
        })?;
        self.finished = true;
        info!(
            path = %self.destination.display(),
            rows = self.rows_written,
            "annotated output written"
        );
        Ok(())
    }
}

impl Drop for CsvSink {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.writer = None;
        if self.staging.exists()
            && let Err(error) = fs::remove_file(&self.staging)
        {
            warn!(path = %self.staging.display(), %error, "could not remove partial output");
        }
    }
}
