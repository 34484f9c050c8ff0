//! Raw and typed representations of one declaration line.

use crate::columns::{ColumnMap, Field, NumericField};
use crate::error::{QaError, SchemaError};
use crate::key::{DeclarationKey, derive_key};

/// One input row as loaded: source cells plus the derived declaration key.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    /// Zero-based position in the input.
    pub index: usize,
    pub key: DeclarationKey,
    pub cells: Vec<String>,
}

impl SourceRow {
    /// Derive the key for a loaded row. A `Key` column already present in the
    /// source is overwritten with the derived value.
    pub fn new(
        index: usize,
        mut cells: Vec<String>,
        columns: &ColumnMap,
    ) -> Result<Self, SchemaError> {
        let chemical_id = required_cell(&cells, columns, Field::ChemicalId)?;
        let part_number = required_cell(&cells, columns, Field::PartNumber)?;
        let key = derive_key(chemical_id, part_number, index + 1)?;
        if let Some(slot) = columns.key_index().and_then(|idx| cells.get_mut(idx)) {
            *slot = key.to_string();
        }
        Ok(Self { index, key, cells })
    }

    /// 1-based data row number used in diagnostics.
    pub fn row_number(&self) -> usize {
        self.index + 1
    }
}

fn required_cell<'a>(
    cells: &'a [String],
    columns: &ColumnMap,
    field: Field,
) -> Result<&'a str, SchemaError> {
    let idx = columns.index(field).ok_or_else(|| SchemaError::MissingColumn {
        column: field.name().to_string(),
    })?;
    Ok(cells.get(idx).map(String::as_str).unwrap_or(""))
}

/// A loaded declaration export: resolved columns and keyed rows.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub columns: ColumnMap,
    pub rows: Vec<SourceRow>,
}

impl SourceTable {
    /// Resolve the header strictly and key every row.
    pub fn new(headers: &[String], rows: Vec<Vec<String>>) -> Result<Self, SchemaError> {
        Self::from_parts(ColumnMap::resolve(headers)?, rows)
    }

    /// Key every row against an already resolved column map.
    pub fn from_parts(columns: ColumnMap, rows: Vec<Vec<String>>) -> Result<Self, SchemaError> {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, cells)| SourceRow::new(index, cells, &columns))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { columns, rows })
    }

    pub fn headers(&self) -> &[String] {
        self.columns.headers()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Typed view of a row, materialised per batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub index: usize,
    pub key: DeclarationKey,
    pub fmd_rev_flag: String,
    /// Lower-cased homogeneous material name used for grouping.
    pub material: String,
    pub homogeneous_material_mass: Option<f64>,
    pub mass: Option<f64>,
    pub substance_homogeneous_material_percentage: Option<f64>,
    pub substance_homogeneous_material_percentage_ppm: Option<f64>,
    pub substance_component_level_percentage: Option<f64>,
    pub substance_component_level_ppm: Option<f64>,
    pub total_component_mass_profile: Option<f64>,
    pub total_component_mass_summation: Option<f64>,
    pub rows_count: Option<f64>,
    /// Comment text carried in from the source, empty when there was none.
    pub existing_comment: String,
    /// Source cells, written back unchanged by the sink.
    pub cells: Vec<String>,
}

impl Record {
    /// Parse the typed fields out of a loaded row. Fields without a mapped
    /// column come out empty; the engine rejects rules that need them.
    pub fn from_row(row: SourceRow, columns: &ColumnMap) -> Result<Self, QaError> {
        let row_number = row.row_number();
        let text = |field: Field| -> String {
            columns
                .index(field)
                .and_then(|idx| row.cells.get(idx))
                .map(|value| value.trim().to_string())
                .unwrap_or_default()
        };
        let number = |field: NumericField| -> Result<Option<f64>, QaError> {
            parse_numeric(&row.cells, columns, field, row_number)
        };

        let existing_comment = columns
            .comment_index()
            .and_then(|idx| row.cells.get(idx))
            .map(|value| value.trim().to_string())
            .unwrap_or_default();

        Ok(Self {
            index: row.index,
            fmd_rev_flag: text(Field::FmdRevFlag),
            material: text(Field::HomogeneousMaterialName).to_lowercase(),
            homogeneous_material_mass: number(NumericField::HomogeneousMaterialMass)?,
            mass: number(NumericField::Mass)?,
            substance_homogeneous_material_percentage: number(
                NumericField::SubstanceHomogeneousMaterialPercentage,
            )?,
            substance_homogeneous_material_percentage_ppm: number(
                NumericField::SubstanceHomogeneousMaterialPercentagePpm,
            )?,
            substance_component_level_percentage: number(
                NumericField::SubstanceComponentLevelPercentage,
            )?,
            substance_component_level_ppm: number(NumericField::SubstanceComponentLevelPpm)?,
            total_component_mass_profile: number(NumericField::TotalComponentMassProfile)?,
            total_component_mass_summation: number(NumericField::TotalComponentMassSummation)?,
            rows_count: number(NumericField::RowsCount)?,
            existing_comment,
            key: row.key,
            cells: row.cells,
        })
    }

    pub fn value(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::HomogeneousMaterialMass => self.homogeneous_material_mass,
            NumericField::Mass => self.mass,
            NumericField::SubstanceHomogeneousMaterialPercentage => {
                self.substance_homogeneous_material_percentage
            }
            NumericField::SubstanceHomogeneousMaterialPercentagePpm => {
                self.substance_homogeneous_material_percentage_ppm
            }
            NumericField::SubstanceComponentLevelPercentage => {
                self.substance_component_level_percentage
            }
            NumericField::SubstanceComponentLevelPpm => self.substance_component_level_ppm,
            NumericField::TotalComponentMassProfile => self.total_component_mass_profile,
            NumericField::TotalComponentMassSummation => self.total_component_mass_summation,
            NumericField::RowsCount => self.rows_count,
        }
    }
}

fn parse_numeric(
    cells: &[String],
    columns: &ColumnMap,
    field: NumericField,
    row: usize,
) -> Result<Option<f64>, QaError> {
    let Some(raw) = columns.index(field.field()).and_then(|idx| cells.get(idx)) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    // `NaN` and `inf` parse as f64 but are not quantities.
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(QaError::Aggregation {
            column: columns
                .header(field.field())
                .unwrap_or(field.field().name())
                .to_string(),
            row,
            value: trimmed.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::COMMENT_COLUMN;

    fn columns(extra: &[&str]) -> ColumnMap {
        let mut headers: Vec<String> = Field::ALL.iter().map(|f| f.name().to_string()).collect();
        headers.extend(extra.iter().map(|name| (*name).to_string()));
        ColumnMap::resolve(&headers).unwrap()
    }

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    const ROW: [&str; 13] = [
        "C1", "P1", "Latest", "Steel", "10", "4", "40", "400000", "40", "400000", "10", "10", "3",
    ];

    #[test]
    fn from_row_parses_typed_fields() {
        let map = columns(&[]);
        let row = SourceRow::new(0, cells(&ROW), &map).unwrap();
        let record = Record::from_row(row, &map).unwrap();
        assert_eq!(record.key.as_str(), "C1_P1");
        assert_eq!(record.material, "steel");
        assert_eq!(record.mass, Some(4.0));
        assert_eq!(record.value(NumericField::RowsCount), Some(3.0));
        assert!(record.existing_comment.is_empty());
    }

    #[test]
    fn empty_numeric_cell_is_none() {
        let map = columns(&[]);
        let mut values = ROW;
        values[5] = " ";
        let row = SourceRow::new(0, cells(&values), &map).unwrap();
        let record = Record::from_row(row, &map).unwrap();
        assert_eq!(record.mass, None);
    }

    #[test]
    fn non_numeric_cell_is_aggregation_error() {
        let map = columns(&[]);
        let mut values = ROW;
        values[5] = "four";
        let row = SourceRow::new(2, cells(&values), &map).unwrap();
        let err = Record::from_row(row, &map).unwrap_err();
        match err {
            QaError::Aggregation { column, row, value } => {
                assert_eq!(column, "Mass");
                assert_eq!(row, 3);
                assert_eq!(value, "four");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_finite_text_is_aggregation_error() {
        let map = columns(&[]);
        for text in ["NaN", "inf", "-Infinity"] {
            let mut values = ROW;
            values[6] = text;
            let row = SourceRow::new(0, cells(&values), &map).unwrap();
            match Record::from_row(row, &map).unwrap_err() {
                QaError::Aggregation { column, value, .. } => {
                    assert_eq!(column, "SubstanceHomogeneousMaterialPercentage");
                    assert_eq!(value, text);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn source_table_reports_blank_key_row() {
        let headers: Vec<String> = Field::ALL.iter().map(|f| f.name().to_string()).collect();
        let mut second = ROW;
        second[0] = "";
        let err = SourceTable::new(&headers, vec![cells(&ROW), cells(&second)]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::EmptyKeyField {
                column: "ChemicalID".to_string(),
                row: 2
            }
        );
    }

    #[test]
    fn existing_key_cell_is_overwritten() {
        let map = columns(&["Key", COMMENT_COLUMN]);
        let mut values: Vec<&str> = ROW.to_vec();
        values.push("stale");
        values.push("Checked by hand");
        let row = SourceRow::new(0, cells(&values), &map).unwrap();
        assert_eq!(row.cells[13], "C1_P1");
        let record = Record::from_row(row, &map).unwrap();
        assert_eq!(record.existing_comment, "Checked by hand");
    }
}
