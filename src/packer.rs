//! Interleaved vertex buffer packing.
//!
//! One record per vertex, groups in canonical order, no padding. Float
//! components are written as big-endian `f32`, color components as `u8`.

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};
use tracing::debug;

use crate::error::{ConvertError, Result};
use crate::layout::{ComponentEncoding, Layout};
use crate::types::Scalar;

/// Per-vertex scalar access by property name.
pub trait VertexFieldReader {
    /// Declared number of vertices.
    fn vertex_count(&self) -> usize;

    /// Value of `field` for vertex `index`. Fails with
    /// [`ConvertError::FieldRead`] when the field is absent or too short.
    fn scalar(&self, field: &str, index: usize) -> Result<Scalar>;
}

/// Pack every vertex into a freshly allocated buffer of
/// `vertex_count * stride` bytes.
pub fn pack<R>(layout: &Layout, reader: &R) -> Result<Vec<u8>>
where
    R: VertexFieldReader + ?Sized,
{
    let mut out = Vec::with_capacity(reader.vertex_count() * layout.stride());
    pack_into(layout, reader, &mut out)?;
    Ok(out)
}

/// Stream vertex records into `writer`, one whole record per write.
///
/// Vertices are emitted in index order since the face index array refers to
/// them by position.
pub fn pack_into<R, W>(layout: &Layout, reader: &R, writer: &mut W) -> Result<()>
where
    R: VertexFieldReader + ?Sized,
    W: Write + ?Sized,
{
    let vertex_count = reader.vertex_count();
    debug!(
        vertex_count,
        stride = layout.stride(),
        "Packing vertex records"
    );

    let mut record = Vec::with_capacity(layout.stride());
    for index in 0..vertex_count {
        record.clear();
        for group in layout.present_groups() {
            let encoding = group.encoding();
            for &field in group.field_names() {
                let value = reader.scalar(field, index)?;
                match encoding {
                    ComponentEncoding::F32 => record.write_f32::<BigEndian>(value.as_f32())?,
                    ComponentEncoding::U8 => {
                        let byte = value.to_u8().ok_or_else(|| ConvertError::ValueRange {
                            field: field.to_string(),
                            index,
                            value: value.as_f64(),
                        })?;
                        record.write_u8(byte)?;
                    }
                }
            }
        }
        debug_assert_eq!(record.len(), layout.stride());
        writer.write_all(&record)?;
    }

    Ok(())
}
