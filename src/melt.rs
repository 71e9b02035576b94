use crate::table::Cell;
use crate::validate::ValidatedTable;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("The file has no condition values to plot.")]
    EmptyAfterUnpivot,

    #[error(
        "Non-numeric value '{value}' for '{entity}' in column '{column}' (row {row}){}",
        more_suffix(.total)
    )]
    MalformedCell {
        row: usize,
        entity: String,
        column: String,
        value: String,
        total: usize,
    },
}

fn more_suffix(total: &usize) -> String {
    match *total {
        0 | 1 => String::new(),
        n => format!(", {} malformed cells in total", n),
    }
}

/// One (entity, condition, value) triple of the long form. `column` is the
/// condition's position among the measurement columns, so repeated headers
/// stay apart.
#[derive(Clone, Debug, PartialEq)]
pub struct LongRecord {
    pub entity: String,
    pub condition: String,
    pub column: usize,
    pub value: Option<f64>,
}

/// Spreadsheet placeholders read as a missing value.
pub const NA_TOKENS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A", "#NA",
    "<NA>", "#N/A N/A", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

/// Numeric reading of a measurement cell. `Err` carries the offending text.
/// Text that parses to an infinite value is malformed.
pub fn resolve_cell(cell: &Cell) -> Result<Option<f64>, &str> {
    match cell {
        Cell::Number(v) => Ok(Some(*v)),
        Cell::Empty => Ok(None),
        Cell::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || NA_TOKENS.contains(&trimmed) {
                return Ok(None);
            }
            match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Some(v)),
                _ => Err(s.as_str()),
            }
        }
    }
}

/// Melts every measurement column against the identifier column, row-major.
pub fn unpivot(table: &ValidatedTable) -> Result<Vec<LongRecord>, BuildError> {
    let measurements: Vec<_> = table.measurements().collect();
    let identifier = table.identifier();
    let height = table.table().height();
    if measurements.is_empty() || height == 0 {
        return Err(BuildError::EmptyAfterUnpivot);
    }

    let mut records = Vec::with_capacity(height * measurements.len());
    let mut malformed: Vec<(usize, String, String, String)> = Vec::new();
    for row in 0..height {
        let entity = identifier.cells[row].label();
        for (index, column) in measurements.iter().enumerate() {
            match resolve_cell(&column.cells[row]) {
                Ok(value) => records.push(LongRecord {
                    entity: entity.clone(),
                    condition: column.name.clone(),
                    column: index,
                    value,
                }),
                Err(text) => {
                    malformed.push((row, entity.clone(), column.name.clone(), text.to_string()))
                }
            }
        }
    }

    let total = malformed.len();
    match malformed.into_iter().next() {
        Some((row, entity, column, value)) => Err(BuildError::MalformedCell {
            row,
            entity,
            column,
            value,
            total,
        }),
        None => Ok(records),
    }
}
