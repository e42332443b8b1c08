use std::collections::HashMap;

use crate::error::{ConvertError, Result};
use crate::packer::VertexFieldReader;

/// A single numeric PLY property value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
}

impl Scalar {
    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Int(v) => v as f64,
            Scalar::Float(v) => v,
        }
    }

    pub fn as_f32(self) -> f32 {
        match self {
            Scalar::Int(v) => v as f32,
            Scalar::Float(v) => v as f32,
        }
    }

    /// The value as an unsigned byte, if it is a whole number in `0..=255`.
    pub fn to_u8(self) -> Option<u8> {
        match self {
            Scalar::Int(v) => u8::try_from(v).ok(),
            Scalar::Float(v) if v.fract() == 0.0 && (0.0..=255.0).contains(&v) => Some(v as u8),
            Scalar::Float(_) => None,
        }
    }
}

/// Column-oriented vertex element: one scalar array per declared property.
#[derive(Debug, Clone, Default)]
pub struct VertexTable {
    /// Property names in header declaration order.
    names: Vec<String>,
    columns: HashMap<String, Vec<Scalar>>,
    /// Vertex count declared by the element header.
    count: usize,
}

impl VertexTable {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            ..Default::default()
        }
    }

    /// Append a property column. A repeated name replaces the earlier column.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Scalar>) {
        let name = name.into();
        if !self.columns.contains_key(&name) {
            self.names.push(name.clone());
        }
        self.columns.insert(name, values);
    }

    /// Declared property names, in header order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&[Scalar]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl VertexFieldReader for VertexTable {
    fn vertex_count(&self) -> usize {
        self.count
    }

    fn scalar(&self, field: &str, index: usize) -> Result<Scalar> {
        let column = self.column(field).unwrap_or_default();
        column
            .get(index)
            .copied()
            .ok_or_else(|| ConvertError::FieldRead {
                field: field.to_string(),
                index,
                len: column.len(),
            })
    }
}

/// A triangulated PLY mesh ready for conversion.
#[derive(Debug, Clone, Default)]
pub struct PlyMesh {
    /// Object name: the input file stem.
    pub name: String,
    pub vertices: VertexTable,
    /// Flat triangle corner indices, three per face.
    pub indices: Vec<u32>,
}

impl PlyMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles (indices / 3).
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of triangle corners, i.e. draw calls issued per mesh.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Check that every index addresses an existing vertex.
    pub fn validate_indices(&self) -> Result<()> {
        let vertex_count = self.vertex_count();
        match self
            .indices
            .iter()
            .position(|&i| i as usize >= vertex_count)
        {
            Some(pos) => Err(ConvertError::FaceIndexOutOfRange {
                face: pos / 3,
                index: self.indices[pos],
                vertex_count,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(values: &[f64]) -> Vec<Scalar> {
        values.iter().map(|&v| Scalar::Float(v)).collect()
    }

    #[test]
    fn empty_mesh() {
        let mesh = PlyMesh::default();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(mesh.index_count(), 0);
        assert!(mesh.vertices.names().is_empty());
        assert!(mesh.validate_indices().is_ok());
    }

    #[test]
    fn single_triangle() {
        let mut vertices = VertexTable::new(3);
        vertices.push_column("x", floats(&[0.0, 1.0, 0.0]));
        vertices.push_column("y", floats(&[0.0, 0.0, 1.0]));
        vertices.push_column("z", floats(&[0.0, 0.0, 0.0]));
        let mesh = PlyMesh {
            name: "tri".into(),
            vertices,
            indices: vec![0, 1, 2],
        };

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.index_count(), 3);
        assert_eq!(mesh.vertices.names(), ["x", "y", "z"]);
        assert!(mesh.validate_indices().is_ok());
    }

    #[test]
    fn out_of_range_index_reports_face() {
        let mesh = PlyMesh {
            name: "bad".into(),
            vertices: VertexTable::new(3),
            indices: vec![0, 1, 2, 2, 1, 3],
        };
        match mesh.validate_indices().unwrap_err() {
            ConvertError::FaceIndexOutOfRange {
                face,
                index,
                vertex_count,
            } => {
                assert_eq!(face, 1);
                assert_eq!(index, 3);
                assert_eq!(vertex_count, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reader_reports_short_and_missing_columns() {
        let mut table = VertexTable::new(3);
        table.push_column("x", floats(&[1.0, 2.0]));

        assert_eq!(table.scalar("x", 1).unwrap(), Scalar::Float(2.0));
        assert!(matches!(
            table.scalar("x", 2),
            Err(ConvertError::FieldRead { index: 2, len: 2, .. })
        ));
        assert!(matches!(
            table.scalar("y", 0),
            Err(ConvertError::FieldRead { len: 0, .. })
        ));
    }

    #[test]
    fn scalar_byte_conversion() {
        assert_eq!(Scalar::Int(0).to_u8(), Some(0));
        assert_eq!(Scalar::Int(255).to_u8(), Some(255));
        assert_eq!(Scalar::Int(256).to_u8(), None);
        assert_eq!(Scalar::Int(-1).to_u8(), None);
        assert_eq!(Scalar::Float(128.0).to_u8(), Some(128));
        assert_eq!(Scalar::Float(0.5).to_u8(), None);
        assert_eq!(Scalar::Float(300.0).to_u8(), None);
    }

    #[test]
    fn repeated_column_keeps_single_name() {
        let mut table = VertexTable::new(1);
        table.push_column("x", floats(&[1.0]));
        table.push_column("x", floats(&[2.0]));
        assert_eq!(table.names(), ["x"]);
        assert_eq!(table.scalar("x", 0).unwrap(), Scalar::Float(2.0));
    }
}
