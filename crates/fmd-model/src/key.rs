use std::fmt;

use serde::{Deserialize, Serialize};

use crate::columns::Field;
use crate::error::SchemaError;

/// Separator between `ChemicalID` and `PartNumber` in a declaration key.
pub const KEY_SEPARATOR: &str = "_";

/// Identifies one declaration: `ChemicalID` and `PartNumber` joined as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeclarationKey(String);

impl DeclarationKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeclarationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One homogeneous material inside a declaration. The material name is
/// already lower-cased.
pub type MaterialKey<'a> = (&'a DeclarationKey, &'a str);

/// Build the declaration key for the data row numbered `row` (1-based).
pub fn derive_key(
    chemical_id: &str,
    part_number: &str,
    row: usize,
) -> Result<DeclarationKey, SchemaError> {
    let chemical_id = non_blank(chemical_id, Field::ChemicalId, row)?;
    let part_number = non_blank(part_number, Field::PartNumber, row)?;
    Ok(DeclarationKey(format!(
        "{chemical_id}{KEY_SEPARATOR}{part_number}"
    )))
}

fn non_blank(value: &str, field: Field, row: usize) -> Result<&str, SchemaError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SchemaError::EmptyKeyField {
            column: field.name().to_string(),
            row,
        });
    }
    Ok(trimmed)
}
