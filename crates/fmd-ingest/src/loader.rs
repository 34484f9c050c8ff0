//! Loads a declaration export into a keyed [`SourceTable`].

use std::path::Path;

use fmd_model::{ColumnMap, SourceTable};
use tracing::{debug, info, warn};

use crate::csv::{
    check_file_size, frame_rows, read_csv_frame, read_csv_headers, validate_encoding,
};
use crate::error::{IngestError, Result};

/// Read a CSV export, resolve its columns and derive every row's key.
///
/// Schema problems (missing columns, blank key fields) fail here, before any
/// batch is evaluated.
pub fn load_declarations(path: &Path) -> Result<SourceTable> {
    check_file_size(path)?;
    validate_encoding(path)?;

    let headers = read_csv_headers(path)?;
    let columns = ColumnMap::resolve(&headers).map_err(|source| IngestError::Schema {
        path: path.to_path_buf(),
        source,
    })?;
    if columns.comment_index().is_some() {
        warn!(
            path = %path.display(),
            "input already has an Automated QA Comment column; new phrases are appended"
        );
    }

    let df = read_csv_frame(path)?;
    let rows = frame_rows(&df, headers.len(), path)?;
    drop(df);
    debug!(rows = rows.len(), columns = headers.len(), "read export");

    let table = SourceTable::from_parts(columns, rows).map_err(|source| IngestError::Schema {
        path: path.to_path_buf(),
        source,
    })?;
    if table.is_empty() {
        warn!(path = %path.display(), "export has a header but no data rows");
    }
    info!(path = %path.display(), rows = table.len(), "loaded declaration export");
    Ok(table)
}
