#![warn(clippy::all, rust_2018_idioms)]

mod app;
pub mod cluster;
pub mod heatmap;
pub mod loader;
pub mod matrix;
pub mod melt;
pub mod palette;
pub mod pipeline;
pub mod schema;
pub mod table;
mod utils;
pub mod validate;

pub use app::App;
pub use cluster::{cluster_rows, ClusteringError, Dendrogram, Merge};
pub use loader::{load_table, LoadError};
pub use matrix::{build, pivot, Annotations, BuildWarning, Heatmap, Matrix, RowOrder};
pub use melt::{unpivot, BuildError, LongRecord};
pub use pipeline::{render, HeatmapError, RenderRequest, Rendering};
pub use schema::IdentifierSchema;
pub use table::{Cell, RawTable, TableColumn, TableError};
pub use validate::{validate, ValidatedTable, ValidationError};
