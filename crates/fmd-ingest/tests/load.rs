//! Integration tests for loading declaration exports.

use std::io::Write;

use fmd_ingest::{IngestError, load_declarations};
use fmd_model::{Field, SchemaError};
use tempfile::NamedTempFile;

/// Header as exported by the source workbook, trailing spaces included.
const HEADER: &str = "ChemicalID,PartNumber,FMDRevFlag,HomogeneousMaterialName,\
HomogeneousMaterialMass ,Mass ,SubstanceHomogeneousMaterialPercentage ,\
SubstanceHomogeneousMaterialPercentagePPM ,SubstanceComponentLevelPercentage ,\
SubstanceComponentLevelPPM ,TotalComponentMassProfile ,TotalComponentMassSummation ,RowsCount ";

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
fn loads_rows_and_derives_keys() {
    let file = write_csv(&format!(
        "{HEADER}\n\
         C1,P1,Latest,Steel,10,10,100,1000000,100,1000000,10,10,1\n\
         C2,0042,Latest,Glass,5,5,100,1000000,100,1000000,5,5,1\n"
    ));

    let table = load_declarations(file.path()).unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.rows[0].key.as_str(), "C1_P1");
    assert_eq!(table.rows[1].key.as_str(), "C2_0042");
    assert_eq!(table.columns.header(Field::Mass), Some("Mass "));
    assert_eq!(table.headers().len(), 13);
}

#[test]
fn header_only_export_is_empty_table() {
    let file = write_csv(&format!("{HEADER}\n"));
    let table = load_declarations(file.path()).unwrap();
    assert!(table.is_empty());
}

#[test]
fn missing_column_is_schema_error() {
    let header = HEADER.replace(",RowsCount ", "");
    let file = write_csv(&format!(
        "{header}\nC1,P1,Latest,Steel,10,10,100,1000000,100,1000000,10,10\n"
    ));

    let err = load_declarations(file.path()).unwrap_err();

    match err {
        IngestError::Schema { source, .. } => assert_eq!(
            source,
            SchemaError::MissingColumn {
                column: "RowsCount".to_string()
            }
        ),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn blank_chemical_id_is_schema_error() {
    let file = write_csv(&format!(
        "{HEADER}\n\
         C1,P1,Latest,Steel,10,10,100,1000000,100,1000000,10,10,1\n\
         ,P2,Latest,Steel,10,10,100,1000000,100,1000000,10,10,1\n"
    ));

    let err = load_declarations(file.path()).unwrap_err();

    assert!(matches!(
        err,
        IngestError::Schema {
            source: SchemaError::EmptyKeyField { row: 2, .. },
            ..
        }
    ));
}

#[test]
fn existing_key_column_is_overwritten() {
    let file = write_csv(&format!(
        "{HEADER},Key\nC1,P1,Latest,Steel,10,10,100,1000000,100,1000000,10,10,1,old\n"
    ));

    let table = load_declarations(file.path()).unwrap();

    assert_eq!(table.rows[0].cells[13], "C1_P1");
}

#[test]
fn missing_file_is_reported() {
    let err = load_declarations(std::path::Path::new("/nonexistent/fmd.csv")).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}
