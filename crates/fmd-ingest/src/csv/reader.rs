//! CSV file reading for declaration exports.
//!
//! Headers are read with the `csv` crate so their exact spelling survives
//! (trailing spaces included). Data is read with Polars with every column typed
//! as text: identifiers such as `PartNumber` must never be coerced to numbers.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use fmd_common::any_to_string;
use polars::prelude::{AnyValue, CsvReadOptions, DataFrame, SerReader};

use crate::error::{IngestError, Result};

/// Maximum file size for CSV loading (500 MB default).
pub const MAX_CSV_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Check file size before loading.
pub fn check_file_size(path: &Path) -> Result<()> {
    check_file_size_with_limit(path, MAX_CSV_FILE_SIZE)
}

/// Check file size against a custom limit.
pub fn check_file_size_with_limit(path: &Path, max_size: u64) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| file_error(path, e))?;

    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }

    Ok(())
}

/// Detect encoding and validate it's supported (UTF-8 only).
///
/// Checks for UTF-16 BOM markers which are not supported.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| file_error(path, e))?;

    let mut buffer = [0u8; 4];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes_read >= 2 {
        if buffer[0..2] == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer[0..2] == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }

    // UTF-8 BOM is acceptable (stripped in read_csv_headers)
    Ok(())
}

/// Reads the header row verbatim. A UTF-8 BOM is dropped; nothing else is
/// trimmed.
pub fn read_csv_headers(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, &e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, &e))?
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            if idx == 0 {
                value.trim_start_matches('\u{feff}').to_string()
            } else {
                value.to_string()
            }
        })
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    if let Some(position) = headers.iter().position(|h| h.trim().is_empty()) {
        return Err(IngestError::EmptyColumnName {
            path: path.to_path_buf(),
            position: position + 1,
        });
    }

    Ok(headers)
}

/// Reads the data rows into a DataFrame with every column typed as text.
pub fn read_csv_frame(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Extracts cell text row by row, addressing columns by position.
pub fn frame_rows(df: &DataFrame, width: usize, path: &Path) -> Result<Vec<Vec<String>>> {
    if df.width() != width {
        return Err(IngestError::CsvParse {
            path: path.to_path_buf(),
            message: format!(
                "header has {width} columns but data has {}",
                df.width()
            ),
        });
    }

    if df.width() > 500 {
        tracing::warn!(
            path = %path.display(),
            columns = df.width(),
            "Export has more than 500 columns - may impact performance"
        );
    }

    let columns = df.get_columns();
    let mut rows = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|column| any_to_string(column.get(idx).unwrap_or(AnyValue::Null)))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn file_error(path: &Path, e: std::io::Error) -> IngestError {
    if e.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        }
    }
}

fn csv_error(path: &Path, e: &csv::Error) -> IngestError {
    IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_read_headers_keeps_trailing_space() {
        let file = create_temp_csv("ChemicalID,Mass ,RowsCount \nC1,1,2\n");
        let headers = read_csv_headers(file.path()).unwrap();
        assert_eq!(headers, vec!["ChemicalID", "Mass ", "RowsCount "]);
    }

    #[test]
    fn test_read_headers_with_bom() {
        let file = create_temp_csv("\u{feff}A,B,C\n1,2,3\n");
        let headers = read_csv_headers(file.path()).unwrap();
        assert_eq!(headers, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_read_headers_empty_file() {
        let file = create_temp_csv("");
        let result = read_csv_headers(file.path());
        assert!(matches!(result, Err(IngestError::EmptyCsv { .. })));
    }

    #[test]
    fn test_read_headers_empty_name() {
        let file = create_temp_csv("A,,C\n1,2,3\n");
        let result = read_csv_headers(file.path());
        assert!(matches!(
            result,
            Err(IngestError::EmptyColumnName { position: 2, .. })
        ));
    }

    #[test]
    fn test_frame_keeps_identifiers_textual() {
        let file = create_temp_csv("ChemicalID,PartNumber\n007,1.50\n,X\n");
        let df = read_csv_frame(file.path()).unwrap();
        let rows = frame_rows(&df, 2, file.path()).unwrap();
        assert_eq!(rows[0], vec!["007", "1.50"]);
        assert_eq!(rows[1], vec!["", "X"]);
    }

    #[test]
    fn test_utf16_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xFE, b'A', 0]).unwrap();
        let result = validate_encoding(file.path());
        assert!(matches!(
            result,
            Err(IngestError::UnsupportedEncoding { .. })
        ));
    }

    #[test]
    fn test_file_size_limit() {
        let file = create_temp_csv("A\n1\n");
        let result = check_file_size_with_limit(file.path(), 1);
        assert!(matches!(result, Err(IngestError::FileTooLarge { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = check_file_size(Path::new("/nonexistent/fmd.csv"));
        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }
}
