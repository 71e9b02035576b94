use crate::schema::IdentifierSchema;
use crate::table::{RawTable, TableColumn};

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("The file must have a '{expected}' column and at least one numeric condition column.")]
    MissingIdentifierColumn { expected: String },

    #[error("The file must have at least 2 columns (an identifier and one condition), found {found}.")]
    InsufficientColumns { found: usize },
}

/// A table known to carry an identifier column plus at least one measurement column.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedTable {
    table: RawTable,
    id_index: usize,
    schema: IdentifierSchema,
}

impl ValidatedTable {
    pub fn table(&self) -> &RawTable {
        &self.table
    }

    pub fn schema(&self) -> IdentifierSchema {
        self.schema
    }

    pub fn identifier(&self) -> &TableColumn {
        &self.table.columns()[self.id_index]
    }

    /// Non-identifier columns in upload order.
    pub fn measurements(&self) -> impl Iterator<Item = &TableColumn> + '_ {
        self.table
            .columns()
            .iter()
            .enumerate()
            .filter(move |(idx, _)| *idx != self.id_index)
            .map(|(_, column)| column)
    }

    pub fn into_inner(self) -> RawTable {
        self.table
    }
}

pub fn validate(
    table: RawTable,
    schema: IdentifierSchema,
) -> Result<ValidatedTable, ValidationError> {
    if table.width() < 2 {
        return Err(ValidationError::InsufficientColumns {
            found: table.width(),
        });
    }
    let expected = schema.column_name();
    let id_index = table
        .columns()
        .iter()
        .position(|c| c.name.trim() == expected)
        .ok_or_else(|| ValidationError::MissingIdentifierColumn {
            expected: expected.to_string(),
        })?;
    Ok(ValidatedTable {
        table,
        id_index,
        schema,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn column(name: &str, cells: Vec<Cell>) -> TableColumn {
        TableColumn::new(name, cells)
    }

    #[test]
    fn missing_identifier_column() {
        let table = RawTable::new(vec![
            column("Name", vec!["A".into()]),
            column("t0", vec![1.0.into()]),
        ])
        .unwrap();
        let err = validate(table, IdentifierSchema::Molecule).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingIdentifierColumn {
                expected: "Molecule".to_string()
            }
        );
    }

    #[test]
    fn single_column_is_insufficient() {
        let table = RawTable::new(vec![column("Molecule", vec!["A".into()])]).unwrap();
        let err = validate(table, IdentifierSchema::Molecule).unwrap_err();
        assert_eq!(err, ValidationError::InsufficientColumns { found: 1 });
    }

    #[test]
    fn empty_table_is_insufficient() {
        let err = validate(RawTable::default(), IdentifierSchema::Gene).unwrap_err();
        assert_eq!(err, ValidationError::InsufficientColumns { found: 0 });
    }

    #[test]
    fn schema_selects_identifier() {
        let table = RawTable::new(vec![
            column("t0", vec![1.0.into()]),
            column("Gene", vec!["TP53".into()]),
            column("Molecule", vec!["m1".into()]),
        ])
        .unwrap();
        let validated = validate(table.clone(), IdentifierSchema::Gene).unwrap();
        assert_eq!(validated.identifier().name, "Gene");
        let names: Vec<&str> = validated.measurements().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["t0", "Molecule"]);
        assert_eq!(validated.into_inner(), table);
    }

    #[test]
    fn header_whitespace_is_ignored() {
        let table = RawTable::new(vec![
            column(" Molecule ", vec!["A".into()]),
            column("t0", vec![1.0.into()]),
        ])
        .unwrap();
        assert!(validate(table, IdentifierSchema::Molecule).is_ok());
    }

    #[test]
    fn identifier_match_is_case_sensitive() {
        let table = RawTable::new(vec![
            column("molecule", vec!["A".into()]),
            column("t0", vec![1.0.into()]),
        ])
        .unwrap();
        assert!(matches!(
            validate(table, IdentifierSchema::Molecule),
            Err(ValidationError::MissingIdentifierColumn { .. })
        ));
    }
}
