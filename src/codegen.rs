//! libogc GX draw code generation.
//!
//! Rendering is a plain text template over a [`DrawModel`]. Every decision
//! (which arrays to bind, offsets, stride, index width) comes from the
//! [`Layout`] and the mesh counts.

use std::fmt;

use serde::Serialize;

use crate::error::{ConvertError, Result};
use crate::layout::{AttributeGroup, Layout};
use crate::types::PlyMesh;

/// Width of the indices used both in `vtxArr` and in indexed vertex fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexWidth {
    U8,
    U16,
}

impl IndexWidth {
    /// 8-bit indices up to 255 vertices, 16-bit beyond.
    pub fn for_vertex_count(vertex_count: usize) -> Result<Self> {
        if vertex_count <= 255 {
            Ok(IndexWidth::U8)
        } else if vertex_count <= usize::from(u16::MAX) + 1 {
            Ok(IndexWidth::U16)
        } else {
            Err(ConvertError::IndexOverflow { vertex_count })
        }
    }

    fn c_type(self) -> &'static str {
        match self {
            IndexWidth::U8 => "u8",
            IndexWidth::U16 => "u16",
        }
    }

    fn vtx_desc(self) -> &'static str {
        match self {
            IndexWidth::U8 => "GX_INDEX8",
            IndexWidth::U16 => "GX_INDEX16",
        }
    }

    fn fetch_suffix(self) -> &'static str {
        match self {
            IndexWidth::U8 => "1x8",
            IndexWidth::U16 => "1x16",
        }
    }
}

/// GX binding for an attribute group that owns a vertex array.
struct GxAttribute {
    array: &'static str,
    format: &'static str,
    fetch: &'static str,
}

/// Alpha shares the CLR0 array with color, so it has no binding of its own.
fn gx_attribute(group: AttributeGroup, has_alpha: bool) -> Option<GxAttribute> {
    match group {
        AttributeGroup::Position => Some(GxAttribute {
            array: "GX_VA_POS",
            format: "GX_POS_XYZ, GX_F32",
            fetch: "GX_Position",
        }),
        AttributeGroup::Normal => Some(GxAttribute {
            array: "GX_VA_NRM",
            format: "GX_NRM_XYZ, GX_F32",
            fetch: "GX_Normal",
        }),
        AttributeGroup::TexCoord => Some(GxAttribute {
            array: "GX_VA_TEX0",
            format: "GX_TEX_ST, GX_F32",
            fetch: "GX_TexCoord",
        }),
        AttributeGroup::Color => Some(GxAttribute {
            array: "GX_VA_CLR0",
            format: if has_alpha {
                "GX_CLR_RGBA, GX_RGBA8"
            } else {
                "GX_CLR_RGB, GX_RGB8"
            },
            fetch: "GX_Color",
        }),
        AttributeGroup::ColorAlpha => None,
    }
}

/// C identifier for an object name: characters outside `[A-Za-z0-9_]`
/// become `_`, and a leading digit gets a `_` prefix.
pub fn c_identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Everything the source and header templates need.
#[derive(Debug, Clone)]
pub struct DrawModel<'a> {
    /// Raw object name, used for the binary blob's companion header include.
    pub object_name: &'a str,
    /// C identifier derived from the object name.
    pub symbol: String,
    pub vertex_count: usize,
    pub index_width: IndexWidth,
    pub layout: &'a Layout,
    /// Flat triangle corner indices.
    pub indices: &'a [u32],
}

impl<'a> DrawModel<'a> {
    pub fn new(mesh: &'a PlyMesh, layout: &'a Layout) -> Result<Self> {
        Ok(Self {
            object_name: &mesh.name,
            symbol: c_identifier(&mesh.name),
            vertex_count: mesh.vertex_count(),
            index_width: IndexWidth::for_vertex_count(mesh.vertex_count())?,
            layout,
            indices: &mesh.indices,
        })
    }

    /// Number of triangle corners drawn.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    fn bound_attributes(&self) -> impl Iterator<Item = (AttributeGroup, GxAttribute)> + '_ {
        let has_alpha = self.layout.is_present(AttributeGroup::ColorAlpha);
        self.layout
            .present_groups()
            .filter_map(move |group| gx_attribute(group, has_alpha).map(|attr| (group, attr)))
    }
}

struct SourceTemplate<'m, 'a>(&'m DrawModel<'a>);

impl fmt::Display for SourceTemplate<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = self.0;
        let symbol = &model.symbol;
        let width = model.index_width;
        let stride = model.layout.stride();
        let count = model.index_count();

        writeln!(f, "#include <ogc/gx.h>")?;
        writeln!(f, "#include \"{}_mdl.h\"", model.object_name)?;

        write!(f, "static const {} vtxArr[] = {{", width.c_type())?;
        for index in model.indices {
            write!(f, "{index},")?;
        }
        writeln!(f, "}};")?;

        writeln!(f, "void draw_{symbol}(void) {{")?;
        writeln!(f, "GX_ClearVtxDesc();")?;

        for (group, attr) in model.bound_attributes() {
            let offset = model.layout.offset(group).unwrap_or_default();
            writeln!(
                f,
                "GX_SetArray({}, (void*){symbol}_mdl+{offset}, {stride});",
                attr.array
            )?;
        }
        for (_, attr) in model.bound_attributes() {
            writeln!(f, "GX_SetVtxDesc({}, {});", attr.array, width.vtx_desc())?;
        }
        for (_, attr) in model.bound_attributes() {
            writeln!(
                f,
                "GX_SetVtxAttrFmt(GX_VTXFMT0, {}, {}, 0);",
                attr.array, attr.format
            )?;
        }

        writeln!(f, "GX_Begin(GX_TRIANGLES, GX_VTXFMT0, {count});")?;
        writeln!(f, "for(size_t i = 0; i<{count}; i++){{")?;
        for (_, attr) in model.bound_attributes() {
            writeln!(f, "\t{}{}(vtxArr[i]);", attr.fetch, width.fetch_suffix())?;
        }
        writeln!(f, "}}")?;
        writeln!(f, "GX_End();")?;
        writeln!(f, "}}")
    }
}

/// Render `draw_<name>.c`.
pub fn render_source(model: &DrawModel<'_>) -> String {
    SourceTemplate(model).to_string()
}

/// Render `draw_<name>.h`.
pub fn render_header(model: &DrawModel<'_>) -> String {
    format!("#pragma once\nvoid draw_{}(void);\n", model.symbol)
}
