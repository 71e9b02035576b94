use crate::table::{Cell, RawTable};
use calamine::{open_workbook_auto, Data, Reader};
use log::info;
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;

/// File extensions offered in the open dialog.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];
pub const CSV_EXTENSIONS: &[&str] = &["csv"];

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel error: {0}")]
    Excel(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] PolarsError),

    #[error("The workbook has no worksheets")]
    NoWorksheet,

    #[error("Unsupported file type '{0}', expected .xlsx, .xls, .ods or .csv")]
    UnsupportedFormat(String),
}

pub fn load_table(path: &Path) -> Result<RawTable, LoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let table = if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
        load_spreadsheet(path)?
    } else if CSV_EXTENSIONS.contains(&extension.as_str()) {
        load_csv(path)?
    } else {
        return Err(LoadError::UnsupportedFormat(extension));
    };
    info!("loaded {}: {:?} (rows, columns)", path.display(), table.shape());
    Ok(table)
}

/// First worksheet, first row as header.
pub fn load_spreadsheet(path: &Path) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoWorksheet)??;
    let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
    Ok(table_from_sheet_rows(&rows))
}

pub fn load_csv(path: &Path) -> Result<RawTable, LoadError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(RawTable::from_dataframe(&df)?)
}

pub fn table_from_sheet_rows(rows: &[Vec<Data>]) -> RawTable {
    let Some((header_row, records)) = rows.split_first() else {
        return RawTable::default();
    };
    let header = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| match cell {
            Data::Empty => format!("column_{}", idx + 1),
            Data::String(s) if s.trim().is_empty() => format!("column_{}", idx + 1),
            Data::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    let header = dedupe_headers(header);
    let records = records
        .iter()
        .map(|row| row.iter().map(sheet_cell).collect())
        .collect();
    RawTable::from_rows(header, records)
}

/// Repeated header names get a `.1`, `.2`, ... suffix, first one untouched.
fn dedupe_headers(header: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(header.len());
    let mut renamed = Vec::with_capacity(header.len());
    for name in header {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", name, suffix);
            suffix += 1;
        }
        seen.insert(candidate.clone());
        renamed.push(candidate);
    }
    renamed
}

fn sheet_cell(cell: &Data) -> Cell {
    match cell {
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::Number(*v),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Empty => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sheet_rows_use_first_row_as_header() {
        let rows = vec![
            vec![
                Data::String("Molecule".to_string()),
                Data::String("t0".to_string()),
                Data::Empty,
            ],
            vec![Data::String("A".to_string()), Data::Float(1.5), Data::Int(2)],
            vec![Data::String("B".to_string()), Data::Empty],
        ];
        let table = table_from_sheet_rows(&rows);
        assert_eq!(table.column_names(), vec!["Molecule", "t0", "column_3"]);
        assert_eq!(table.shape(), (2, 3));
        assert_eq!(table.columns()[1].cells, vec![Cell::Number(1.5), Cell::Empty]);
        assert_eq!(table.columns()[2].cells, vec![Cell::Number(2.0), Cell::Empty]);
    }

    #[test]
    fn repeated_sheet_headers_are_suffixed() {
        let header = |name: &str| Data::String(name.to_string());
        let rows = vec![
            vec![header("Molecule"), header("t0"), header("t0"), header("t0.1"), header("t0")],
            vec![header("A"), Data::Int(1), Data::Int(2), Data::Int(3), Data::Int(4)],
        ];
        let table = table_from_sheet_rows(&rows);
        assert_eq!(
            table.column_names(),
            vec!["Molecule", "t0", "t0.1", "t0.1.1", "t0.2"]
        );
        assert_eq!(table.columns()[2].cells, vec![Cell::Number(2.0)]);
    }

    #[test]
    fn sheet_booleans_stay_text() {
        let rows = vec![
            vec![Data::String("Molecule".to_string()), Data::String("t0".to_string())],
            vec![Data::String("A".to_string()), Data::Bool(true)],
        ];
        let table = table_from_sheet_rows(&rows);
        assert_eq!(table.columns()[1].cells, vec![Cell::Text("true".to_string())]);
    }

    #[test]
    fn empty_sheet_has_no_columns() {
        assert_eq!(table_from_sheet_rows(&[]).width(), 0);
    }

    #[test]
    fn csv_upload_is_read_with_header() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Molecule,cond1,cond2").unwrap();
        writeln!(file, "A,1,2.5").unwrap();
        writeln!(file, "B,3,-4").unwrap();
        file.flush().unwrap();

        let table = load_table(file.path()).unwrap();
        assert_eq!(table.column_names(), vec!["Molecule", "cond1", "cond2"]);
        assert_eq!(table.columns()[0].cells, vec![Cell::from("A"), Cell::from("B")]);
        assert_eq!(table.columns()[2].cells, vec![Cell::Number(2.5), Cell::Number(-4.0)]);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_table(Path::new("measurements.json")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "json"));
    }
}
