use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property, PropertyType};
use tracing::debug;

use crate::error::{ConvertError, Result};
use crate::types::{PlyMesh, Scalar, VertexTable};

/// Load a triangulated PLY file into a `PlyMesh`.
///
/// Every scalar property of the `vertex` element becomes a column, keyed by
/// its header name. Faces must be triangles.
pub fn load_ply(path: &Path, name: String) -> Result<PlyMesh> {
    let file =
        File::open(path).map_err(|e| ConvertError::Input(format!("Failed to open PLY: {e}")))?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| ConvertError::Input(format!("Failed to parse PLY: {e}")))?;

    let vertex_def = ply
        .header
        .elements
        .get("vertex")
        .ok_or_else(|| ConvertError::Input("PLY file missing 'vertex' element".into()))?;
    let face_def = ply
        .header
        .elements
        .get("face")
        .ok_or_else(|| ConvertError::Input("PLY file missing 'face' element".into()))?;

    let vertices = ply
        .payload
        .get("vertex")
        .map(Vec::as_slice)
        .unwrap_or_default();
    debug!(
        declared = vertex_def.count,
        parsed = vertices.len(),
        "Parsing PLY vertices"
    );

    let mut table = VertexTable::new(vertex_def.count);
    for (key, def) in vertex_def.properties.iter() {
        if let PropertyType::List(..) = def.data_type {
            debug!(property = %key, "Skipping list property on vertex element");
            continue;
        }
        let column = vertices
            .iter()
            .filter_map(|vertex| vertex.get(key))
            .map(|prop| get_scalar_property(prop, key))
            .collect::<Result<Vec<_>>>()?;
        table.push_column(key.clone(), column);
    }

    let faces = ply
        .payload
        .get("face")
        .map(Vec::as_slice)
        .unwrap_or_default();
    debug!(declared = face_def.count, parsed = faces.len(), "Parsing PLY faces");

    let mut indices = Vec::with_capacity(faces.len() * 3);
    for (i, face) in faces.iter().enumerate() {
        let corners = get_index_list(face)?;
        if corners.len() != 3 {
            return Err(ConvertError::Input(format!(
                "Face {i} has {} vertices; only triangles are supported",
                corners.len()
            )));
        }
        indices.extend_from_slice(&corners);
    }

    Ok(PlyMesh {
        name,
        vertices: table,
        indices,
    })
}

/// Convert a scalar PLY property, keeping integer and float kinds apart.
fn get_scalar_property(prop: &Property, key: &str) -> Result<Scalar> {
    match prop {
        Property::Char(v) => Ok(Scalar::Int(i64::from(*v))),
        Property::UChar(v) => Ok(Scalar::Int(i64::from(*v))),
        Property::Short(v) => Ok(Scalar::Int(i64::from(*v))),
        Property::UShort(v) => Ok(Scalar::Int(i64::from(*v))),
        Property::Int(v) => Ok(Scalar::Int(i64::from(*v))),
        Property::UInt(v) => Ok(Scalar::Int(i64::from(*v))),
        Property::Float(v) => Ok(Scalar::Float(f64::from(*v))),
        Property::Double(v) => Ok(Scalar::Float(*v)),
        _ => Err(ConvertError::Input(format!(
            "PLY property '{key}' has unsupported type"
        ))),
    }
}

/// Extract the index list from a face element.
fn get_index_list(face: &DefaultElement) -> Result<Vec<u32>> {
    // Try "vertex_indices" first, then "vertex_index"
    let key = if face.contains_key("vertex_indices") {
        "vertex_indices"
    } else {
        "vertex_index"
    };

    let prop = face
        .get(key)
        .ok_or_else(|| ConvertError::Input("PLY face missing vertex_indices property".into()))?;

    let negative = || ConvertError::Input("PLY face has a negative vertex index".into());
    match prop {
        Property::ListUInt(v) => Ok(v.clone()),
        Property::ListUShort(v) => Ok(v.iter().map(|&i| u32::from(i)).collect()),
        Property::ListUChar(v) => Ok(v.iter().map(|&i| u32::from(i)).collect()),
        Property::ListInt(v) => v
            .iter()
            .map(|&i| u32::try_from(i).map_err(|_| negative()))
            .collect(),
        Property::ListShort(v) => v
            .iter()
            .map(|&i| u32::try_from(i).map_err(|_| negative()))
            .collect(),
        Property::ListChar(v) => v
            .iter()
            .map(|&i| u32::try_from(i).map_err(|_| negative()))
            .collect(),
        _ => Err(ConvertError::Input(
            "PLY face vertex_indices has unsupported type".into(),
        )),
    }
}
