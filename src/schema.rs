use std::fmt;

/// Which column name labels the rows of an upload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
pub enum IdentifierSchema {
    #[default]
    Molecule,
    Gene,
}

impl IdentifierSchema {
    pub const ALL: [IdentifierSchema; 2] = [IdentifierSchema::Molecule, IdentifierSchema::Gene];

    pub fn column_name(&self) -> &'static str {
        match self {
            IdentifierSchema::Molecule => "Molecule",
            IdentifierSchema::Gene => "Gene",
        }
    }
}

impl fmt::Display for IdentifierSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}
