use std::io;
use std::path::PathBuf;

use crate::layout::AttributeGroup;

/// All error types for the plytogx conversion.
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("PLY contains no vertex position info (expected any of x, y, z)")]
    MissingRequiredAttribute,
    #[error("Attribute group {group} is incomplete: missing {}", .missing.join(", "))]
    IncompleteAttributeGroup {
        group: AttributeGroup,
        missing: Vec<&'static str>,
    },
    #[error("Input error: {0}")]
    Input(String),
    #[error("Field '{field}' has no value for vertex {index} (column holds {len} values)")]
    FieldRead {
        field: String,
        index: usize,
        len: usize,
    },
    #[error("Face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("Field '{field}' of vertex {index} holds {value}, which does not fit in an unsigned byte")]
    ValueRange {
        field: String,
        index: usize,
        value: f64,
    },
    #[error("{vertex_count} vertices cannot be addressed with 16-bit indices")]
    IndexOverflow { vertex_count: usize },
    #[error("Output error writing {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Report error: {0}")]
    Report(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConvertError>;
