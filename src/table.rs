use polars::prelude::*;
use std::fmt;

/// A single value as read from the upload, before any numeric resolution.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    /// Display text used when the cell labels a row.
    pub fn label(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(v) => v.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TableError {
    #[error("column '{column}' has {found} rows, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        found: usize,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableColumn {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl TableColumn {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }
}

/// Uploaded table: named columns in upload order, all of the same height.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct RawTable {
    columns: Vec<TableColumn>,
    height: usize,
}

impl RawTable {
    pub fn new(columns: Vec<TableColumn>) -> Result<Self, TableError> {
        let height = columns.first().map(|c| c.cells.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.cells.len() != height) {
            return Err(TableError::RaggedColumns {
                column: bad.name.clone(),
                expected: height,
                found: bad.cells.len(),
            });
        }
        Ok(Self { columns, height })
    }

    /// Builds a table from a header and records, padding short records with
    /// `Cell::Empty` and dropping cells past the header width.
    pub fn from_rows(header: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut columns: Vec<TableColumn> = header
            .into_iter()
            .map(|name| TableColumn::new(name, Vec::with_capacity(rows.len())))
            .collect();
        for row in &rows {
            for (idx, column) in columns.iter_mut().enumerate() {
                column.cells.push(row.get(idx).cloned().unwrap_or(Cell::Empty));
            }
        }
        let height = if columns.is_empty() { 0 } else { rows.len() };
        Self { columns, height }
    }

    /// Converts every series of a polars frame into a column of cells.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self, PolarsError> {
        let mut columns = Vec::with_capacity(df.width());
        for series in df.get_columns() {
            let mut cells = Vec::with_capacity(series.len());
            for row_index in 0..series.len() {
                cells.push(any_value_to_cell(series.get(row_index)?));
            }
            columns.push(TableColumn::new(series.name().to_string(), cells));
        }
        Ok(Self {
            columns,
            height: df.height(),
        })
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.columns.len())
    }
}

fn any_value_to_cell(value: AnyValue<'_>) -> Cell {
    match value {
        AnyValue::Null => Cell::Empty,
        AnyValue::String(s) => Cell::Text(s.to_string()),
        AnyValue::StringOwned(s) => Cell::Text(s.to_string()),
        AnyValue::Boolean(b) => Cell::Text(b.to_string()),
        other => match other.extract::<f64>() {
            Some(v) => Cell::Number(v),
            None => Cell::Text(format!("{}", other).replace('"', "")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_ragged_columns() {
        let result = RawTable::new(vec![
            TableColumn::new("Molecule", vec!["A".into(), "B".into()]),
            TableColumn::new("t0", vec![1.0.into()]),
        ]);
        assert_eq!(
            result,
            Err(TableError::RaggedColumns {
                column: "t0".to_string(),
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn from_rows_pads_short_records() {
        let table = RawTable::from_rows(
            vec!["Molecule".to_string(), "t0".to_string(), "t1".to_string()],
            vec![vec!["A".into(), 1.0.into()], vec!["B".into(), 2.0.into(), 3.0.into()]],
        );
        assert_eq!(table.shape(), (2, 3));
        assert_eq!(table.columns()[2].cells, vec![Cell::Empty, Cell::Number(3.0)]);
    }

    #[test]
    fn from_dataframe_keeps_column_order_and_types() {
        let df = df!(
            "Molecule" => &["A", "B"],
            "t0" => &[Some(1.5), None],
            "t1" => &[2i64, 3],
        )
        .unwrap();
        let table = RawTable::from_dataframe(&df).unwrap();
        assert_eq!(table.column_names(), vec!["Molecule", "t0", "t1"]);
        assert_eq!(table.columns()[0].cells, vec![Cell::from("A"), Cell::from("B")]);
        assert_eq!(table.columns()[1].cells, vec![Cell::Number(1.5), Cell::Empty]);
        assert_eq!(table.columns()[2].cells, vec![Cell::Number(2.0), Cell::Number(3.0)]);
    }

    #[test]
    fn number_labels_use_display() {
        assert_eq!(Cell::Number(7.0).label(), "7");
        assert_eq!(Cell::Number(0.25).label(), "0.25");
        assert_eq!(Cell::Empty.label(), "");
    }
}
