//! Column schema of a declaration export.
//!
//! Source workbooks spell several headers with a trailing space (`"Mass "`,
//! `"RowsCount "`). Lookups therefore tolerate trailing whitespace but keep the
//! exact source spelling so output headers round-trip unchanged.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Header of the comment column, both on input and output.
pub const COMMENT_COLUMN: &str = "Automated QA Comment";

/// Header of the derived declaration key.
pub const KEY_COLUMN: &str = "Key";

/// Columns appended after the source columns, in output order.
pub const DERIVED_COLUMNS: [&str; 7] = [
    "RowsCountGap",
    "Homogeneous Mass Gap",
    "homogeneousPercentageSum",
    "homogeneousPPMSum",
    "ComponentPercentageSum",
    "ComponentPPMSum",
    COMMENT_COLUMN,
];

/// Logical input fields required by the checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    ChemicalId,
    PartNumber,
    FmdRevFlag,
    HomogeneousMaterialName,
    HomogeneousMaterialMass,
    Mass,
    SubstanceHomogeneousMaterialPercentage,
    SubstanceHomogeneousMaterialPercentagePpm,
    SubstanceComponentLevelPercentage,
    SubstanceComponentLevelPpm,
    TotalComponentMassProfile,
    TotalComponentMassSummation,
    RowsCount,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::ChemicalId,
        Field::PartNumber,
        Field::FmdRevFlag,
        Field::HomogeneousMaterialName,
        Field::HomogeneousMaterialMass,
        Field::Mass,
        Field::SubstanceHomogeneousMaterialPercentage,
        Field::SubstanceHomogeneousMaterialPercentagePpm,
        Field::SubstanceComponentLevelPercentage,
        Field::SubstanceComponentLevelPpm,
        Field::TotalComponentMassProfile,
        Field::TotalComponentMassSummation,
        Field::RowsCount,
    ];

    /// Canonical header name, without any trailing whitespace.
    pub fn name(self) -> &'static str {
        match self {
            Field::ChemicalId => "ChemicalID",
            Field::PartNumber => "PartNumber",
            Field::FmdRevFlag => "FMDRevFlag",
            Field::HomogeneousMaterialName => "HomogeneousMaterialName",
            Field::HomogeneousMaterialMass => "HomogeneousMaterialMass",
            Field::Mass => "Mass",
            Field::SubstanceHomogeneousMaterialPercentage => {
                "SubstanceHomogeneousMaterialPercentage"
            }
            Field::SubstanceHomogeneousMaterialPercentagePpm => {
                "SubstanceHomogeneousMaterialPercentagePPM"
            }
            Field::SubstanceComponentLevelPercentage => "SubstanceComponentLevelPercentage",
            Field::SubstanceComponentLevelPpm => "SubstanceComponentLevelPPM",
            Field::TotalComponentMassProfile => "TotalComponentMassProfile",
            Field::TotalComponentMassSummation => "TotalComponentMassSummation",
            Field::RowsCount => "RowsCount",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric subset of [`Field`], the only fields the aggregator reduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericField {
    HomogeneousMaterialMass,
    Mass,
    SubstanceHomogeneousMaterialPercentage,
    SubstanceHomogeneousMaterialPercentagePpm,
    SubstanceComponentLevelPercentage,
    SubstanceComponentLevelPpm,
    TotalComponentMassProfile,
    TotalComponentMassSummation,
    RowsCount,
}

impl NumericField {
    pub const ALL: [NumericField; 9] = [
        NumericField::HomogeneousMaterialMass,
        NumericField::Mass,
        NumericField::SubstanceHomogeneousMaterialPercentage,
        NumericField::SubstanceHomogeneousMaterialPercentagePpm,
        NumericField::SubstanceComponentLevelPercentage,
        NumericField::SubstanceComponentLevelPpm,
        NumericField::TotalComponentMassProfile,
        NumericField::TotalComponentMassSummation,
        NumericField::RowsCount,
    ];

    pub fn field(self) -> Field {
        match self {
            NumericField::HomogeneousMaterialMass => Field::HomogeneousMaterialMass,
            NumericField::Mass => Field::Mass,
            NumericField::SubstanceHomogeneousMaterialPercentage => {
                Field::SubstanceHomogeneousMaterialPercentage
            }
            NumericField::SubstanceHomogeneousMaterialPercentagePpm => {
                Field::SubstanceHomogeneousMaterialPercentagePpm
            }
            NumericField::SubstanceComponentLevelPercentage => {
                Field::SubstanceComponentLevelPercentage
            }
            NumericField::SubstanceComponentLevelPpm => Field::SubstanceComponentLevelPpm,
            NumericField::TotalComponentMassProfile => Field::TotalComponentMassProfile,
            NumericField::TotalComponentMassSummation => Field::TotalComponentMassSummation,
            NumericField::RowsCount => Field::RowsCount,
        }
    }
}

/// Resolved positions of the logical fields within a source header.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    headers: Vec<String>,
    fields: HashMap<Field, usize>,
    comment: Option<usize>,
    key: Option<usize>,
}

impl ColumnMap {
    /// Resolve every field, failing on the first one the header lacks.
    pub fn resolve(headers: &[String]) -> Result<Self, SchemaError> {
        let map = Self::scan(headers)?;
        if let Some(field) = map.missing().first() {
            return Err(SchemaError::MissingColumn {
                column: field.name().to_string(),
            });
        }
        Ok(map)
    }

    /// Resolve whatever fields are present; absent ones are left unmapped.
    pub fn scan(headers: &[String]) -> Result<Self, SchemaError> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if seen.insert(header.as_str(), idx).is_some() {
                return Err(SchemaError::DuplicateColumn {
                    column: header.clone(),
                });
            }
        }

        let mut fields = HashMap::new();
        for field in Field::ALL {
            if let Some(idx) = find_header(headers, field.name()) {
                fields.insert(field, idx);
            }
        }

        Ok(Self {
            headers: headers.to_vec(),
            fields,
            comment: find_header(headers, COMMENT_COLUMN),
            key: find_header(headers, KEY_COLUMN),
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn index(&self, field: Field) -> Option<usize> {
        self.fields.get(&field).copied()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    /// Exact source spelling of the header mapped to `field`.
    pub fn header(&self, field: Field) -> Option<&str> {
        self.index(field).map(|idx| self.headers[idx].as_str())
    }

    pub fn comment_index(&self) -> Option<usize> {
        self.comment
    }

    pub fn key_index(&self) -> Option<usize> {
        self.key
    }

    /// Fields with no matching header, in canonical order.
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| !self.fields.contains_key(field))
            .collect()
    }
}

/// Exact match wins; otherwise a header equal to `name` once trailing
/// whitespace is trimmed.
fn find_header(headers: &[String], name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header == name)
        .or_else(|| headers.iter().position(|header| header.trim_end() == name))
}
