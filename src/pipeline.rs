use crate::loader::LoadError;
use crate::matrix::{build, BuildWarning, Heatmap};
use crate::melt::BuildError;
use crate::schema::IdentifierSchema;
use crate::table::RawTable;
use crate::validate::{validate, ValidationError};
use log::info;

/// Errors shown to the user for a single upload.
#[derive(Debug, thiserror::Error)]
pub enum HeatmapError {
    #[error("{0}")]
    Load(#[from] LoadError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Build(#[from] BuildError),
}

/// Host-supplied parameters for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderRequest {
    pub title: String,
    pub cluster: bool,
    pub schema: IdentifierSchema,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            title: "Heatmap".to_owned(),
            cluster: false,
            schema: IdentifierSchema::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rendering {
    pub title: String,
    pub heatmap: Heatmap,
}

impl Rendering {
    pub fn warnings(&self) -> &[BuildWarning] {
        &self.heatmap.warnings
    }
}

pub fn render(table: RawTable, request: &RenderRequest) -> Result<Rendering, HeatmapError> {
    let validated = validate(table, request.schema)?;
    let heatmap = build(&validated, request.cluster)?;
    info!(
        "rendered '{}': {:?} matrix, {:?} rows, {} warning(s)",
        request.title,
        heatmap.matrix.shape(),
        heatmap.row_order,
        heatmap.warnings.len()
    );
    Ok(Rendering {
        title: request.title.clone(),
        heatmap,
    })
}
