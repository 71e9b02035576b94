use crate::cluster::{cluster_rows, ClusteringError};
use crate::melt::{unpivot, BuildError, LongRecord};
use crate::validate::ValidatedTable;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;

/// Entity x condition grid. `None` marks a pair absent from the upload.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl Matrix {
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    pub fn values(&self) -> &[Vec<Option<f64>>] {
        &self.values
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.row_labels.len(), self.col_labels.len())
    }

    pub fn row(&self, index: usize) -> &[Option<f64>] {
        &self.values[index]
    }

    pub fn get(&self, entity: &str, condition: &str) -> Option<f64> {
        let row = self.row_labels.iter().position(|r| r == entity)?;
        let col = self.col_labels.iter().position(|c| c == condition)?;
        self.values[row][col]
    }

    /// Present values, row-major.
    pub fn present_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().flatten().filter_map(|v| *v)
    }

    fn reorder_rows(self, order: &[usize]) -> Self {
        let Matrix {
            row_labels,
            col_labels,
            values,
        } = self;
        Matrix {
            row_labels: order.iter().map(|&i| row_labels[i].clone()).collect(),
            col_labels,
            values: order.iter().map(|&i| values[i].clone()).collect(),
        }
    }
}

/// Places long records into a grid. Rows follow first-seen entity order,
/// columns are addressed by `LongRecord::column` into `conditions`. The first
/// record for a cell wins; entities that came back a second time are returned
/// alongside the matrix.
pub fn pivot(records: &[LongRecord], conditions: &[String]) -> (Matrix, Vec<String>) {
    let mut row_index: HashMap<&str, usize> = HashMap::new();
    let mut row_labels: Vec<String> = Vec::new();
    let mut values: Vec<Vec<Option<f64>>> = Vec::new();
    let mut filled: Vec<Vec<bool>> = Vec::new();
    let mut duplicates: Vec<String> = Vec::new();

    for record in records {
        let col = record.column;
        if col >= conditions.len() {
            continue;
        }
        let row = *row_index.entry(record.entity.as_str()).or_insert_with(|| {
            row_labels.push(record.entity.clone());
            values.push(vec![None; conditions.len()]);
            filled.push(vec![false; conditions.len()]);
            row_labels.len() - 1
        });
        if filled[row][col] {
            if !duplicates.contains(&record.entity) {
                duplicates.push(record.entity.clone());
            }
            continue;
        }
        filled[row][col] = true;
        values[row][col] = record.value;
    }

    (
        Matrix {
            row_labels,
            col_labels: conditions.to_vec(),
            values,
        },
        duplicates,
    )
}

/// Overlay text for each cell, same shape as the matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotations(Vec<Vec<String>>);

impl Annotations {
    pub fn from_matrix(matrix: &Matrix) -> Self {
        Self(
            matrix
                .values()
                .iter()
                .map(|row| row.iter().map(|v| format_annotation(*v)).collect())
                .collect(),
        )
    }

    pub fn get(&self, row: usize, col: usize) -> &str {
        self.0
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.0
    }
}

/// Two decimals; anything that rounds to zero prints without a sign.
pub fn format_annotation(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let text = format!("{:.2}", v);
            if text == "-0.00" {
                "0.00".to_string()
            } else {
                text
            }
        }
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowOrder {
    Original,
    Clustered,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BuildWarning {
    ClusteringFailed(ClusteringError),
    DuplicateEntities(Vec<String>),
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::ClusteringFailed(e) => {
                write!(f, "Clustering skipped, rows kept in file order: {}", e)
            }
            BuildWarning::DuplicateEntities(labels) => write!(
                f,
                "Duplicate identifiers, only the first row of each is shown: {}",
                labels.join(", ")
            ),
        }
    }
}

/// Everything the rendering surface needs for one upload.
#[derive(Clone, Debug, PartialEq)]
pub struct Heatmap {
    pub matrix: Matrix,
    pub annotations: Annotations,
    pub row_order: RowOrder,
    pub warnings: Vec<BuildWarning>,
}

fn clustered_order(matrix: &Matrix) -> Result<Vec<usize>, ClusteringError> {
    let rows: Vec<Vec<f64>> = matrix
        .values()
        .iter()
        .map(|row| row.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
        .collect();
    Ok(cluster_rows(&rows)?.leaf_order())
}

pub fn build(table: &ValidatedTable, cluster: bool) -> Result<Heatmap, BuildError> {
    let conditions: Vec<String> = table.measurements().map(|c| c.name.clone()).collect();
    let records = unpivot(table)?;
    let (mut matrix, duplicates) = pivot(&records, &conditions);
    debug!(
        "pivoted {} records into a {:?} matrix",
        records.len(),
        matrix.shape()
    );

    let mut warnings = Vec::new();
    if !duplicates.is_empty() {
        warn!("duplicate identifiers kept first occurrence: {:?}", duplicates);
        warnings.push(BuildWarning::DuplicateEntities(duplicates));
    }

    let mut row_order = RowOrder::Original;
    if cluster {
        match clustered_order(&matrix) {
            Ok(order) => {
                matrix = matrix.reorder_rows(&order);
                row_order = RowOrder::Clustered;
            }
            Err(e) => {
                warn!("clustering failed, keeping original row order: {}", e);
                warnings.push(BuildWarning::ClusteringFailed(e));
            }
        }
    }

    let annotations = Annotations::from_matrix(&matrix);
    Ok(Heatmap {
        matrix,
        annotations,
        row_order,
        warnings,
    })
}
