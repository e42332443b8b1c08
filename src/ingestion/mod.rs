pub mod ply_loader;

use std::path::Path;

use tracing::{debug, info};

use crate::error::{ConvertError, Result};
use crate::types::PlyMesh;

/// Object name for an input path: the file name with its extension removed.
pub fn object_name(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| {
            ConvertError::Input(format!(
                "Cannot derive an object name from {}",
                path.display()
            ))
        })
}

/// Run the ingestion stage: read the PLY file and check its face indices.
pub fn ingest(input: &Path) -> Result<PlyMesh> {
    if !input.exists() {
        return Err(ConvertError::Input(format!(
            "Input file not found: {}",
            input.display()
        )));
    }

    let name = object_name(input)?;
    info!(path = %input.display(), object = %name, "Reading PLY");

    let mesh = ply_loader::load_ply(input, name)?;
    mesh.validate_indices()?;

    debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        properties = ?mesh.vertices.names(),
        "Ingestion stats"
    );

    Ok(mesh)
}
