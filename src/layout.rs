//! Interleaved vertex layout planning.
//!
//! A layout is a pure function of the property names declared on the PLY
//! `vertex` element. Each [`AttributeGroup`] that is present claims a fixed
//! number of bytes, and offsets are assigned by a running total in canonical
//! group order. Absent groups take no space.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{ConvertError, Result};

/// One of the five semantic vertex attribute groups, in canonical layout order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeGroup {
    Position,
    Normal,
    TexCoord,
    Color,
    ColorAlpha,
}

/// On-disk encoding of a single component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentEncoding {
    /// IEEE-754 single precision, big-endian.
    F32,
    /// Unsigned 8-bit integer.
    U8,
}

impl ComponentEncoding {
    pub fn width(self) -> usize {
        match self {
            ComponentEncoding::F32 => 4,
            ComponentEncoding::U8 => 1,
        }
    }
}

impl AttributeGroup {
    /// Canonical layout order.
    pub const ALL: [AttributeGroup; 5] = [
        AttributeGroup::Position,
        AttributeGroup::Normal,
        AttributeGroup::TexCoord,
        AttributeGroup::Color,
        AttributeGroup::ColorAlpha,
    ];

    /// PLY property names belonging to this group, in packing order.
    pub fn field_names(self) -> &'static [&'static str] {
        match self {
            AttributeGroup::Position => &["x", "y", "z"],
            AttributeGroup::Normal => &["nx", "ny", "nz"],
            AttributeGroup::TexCoord => &["s", "t"],
            AttributeGroup::Color => &["red", "green", "blue"],
            AttributeGroup::ColorAlpha => &["alpha"],
        }
    }

    pub fn encoding(self) -> ComponentEncoding {
        match self {
            AttributeGroup::Position | AttributeGroup::Normal | AttributeGroup::TexCoord => {
                ComponentEncoding::F32
            }
            AttributeGroup::Color | AttributeGroup::ColorAlpha => ComponentEncoding::U8,
        }
    }

    /// Bytes this group occupies in every vertex record.
    pub fn byte_size(self) -> usize {
        self.field_names().len() * self.encoding().width()
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for AttributeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeGroup::Position => write!(f, "Position"),
            AttributeGroup::Normal => write!(f, "Normal"),
            AttributeGroup::TexCoord => write!(f, "TexCoord"),
            AttributeGroup::Color => write!(f, "Color"),
            AttributeGroup::ColorAlpha => write!(f, "ColorAlpha"),
        }
    }
}

/// How declared property names turn into group presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresenceRule {
    /// Any one component name marks the group present. A partially declared
    /// group then fails later, when the packer reads the missing component.
    #[default]
    AnyComponent,
    /// Every component name must be declared; partial groups are rejected
    /// while planning.
    AllComponents,
}

/// Presence flag for each attribute group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttributePresence {
    flags: [bool; 5],
}

impl AttributePresence {
    /// Mark a group present when any of its recognized names is declared.
    /// Matching is exact and case-sensitive.
    pub fn detect<S: AsRef<str>>(names: &[S]) -> Self {
        let declared: HashSet<&str> = names.iter().map(|name| name.as_ref()).collect();
        let flags = AttributeGroup::ALL.map(|group| {
            group
                .field_names()
                .iter()
                .any(|name| declared.contains(name))
        });
        Self { flags }
    }

    #[cfg(test)]
    fn with(mut self, group: AttributeGroup) -> Self {
        self.flags[group.slot()] = true;
        self
    }

    pub fn contains(&self, group: AttributeGroup) -> bool {
        self.flags[group.slot()]
    }
}

/// Placement of one group inside the vertex record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupSlot {
    pub group: AttributeGroup,
    pub present: bool,
    /// Byte offset within the record; zero and meaningless when absent.
    pub offset: usize,
    pub size: usize,
}

/// Interleaved vertex record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    slots: [GroupSlot; 5],
    stride: usize,
}

impl Layout {
    /// Plan the layout for the given vertex property names.
    pub fn plan<S: AsRef<str>>(names: &[S], rule: PresenceRule) -> Result<Self> {
        let presence = AttributePresence::detect(names);

        if rule == PresenceRule::AllComponents {
            let declared: HashSet<&str> = names.iter().map(|name| name.as_ref()).collect();
            for group in AttributeGroup::ALL {
                if !presence.contains(group) {
                    continue;
                }
                let missing: Vec<&'static str> = group
                    .field_names()
                    .iter()
                    .copied()
                    .filter(|name| !declared.contains(name))
                    .collect();
                if !missing.is_empty() {
                    return Err(ConvertError::IncompleteAttributeGroup { group, missing });
                }
            }
        }

        Self::from_presence(presence)
    }

    /// Assign offsets by a running total over the canonical group order.
    pub fn from_presence(presence: AttributePresence) -> Result<Self> {
        if !presence.contains(AttributeGroup::Position) {
            return Err(ConvertError::MissingRequiredAttribute);
        }

        let mut running = 0;
        let slots = AttributeGroup::ALL.map(|group| {
            let present = presence.contains(group);
            let size = group.byte_size();
            let offset = if present { running } else { 0 };
            if present {
                running += size;
            }
            GroupSlot {
                group,
                present,
                offset,
                size,
            }
        });

        Ok(Self {
            slots,
            stride: running,
        })
    }

    pub fn is_present(&self, group: AttributeGroup) -> bool {
        self.slots[group.slot()].present
    }

    /// Byte offset of a present group, `None` when absent.
    pub fn offset(&self, group: AttributeGroup) -> Option<usize> {
        let slot = &self.slots[group.slot()];
        slot.present.then_some(slot.offset)
    }

    /// Size in bytes of one interleaved vertex record.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn slots(&self) -> &[GroupSlot] {
        &self.slots
    }

    /// Present groups in canonical order.
    pub fn present_groups(&self) -> impl Iterator<Item = AttributeGroup> + '_ {
        self.slots.iter().filter(|s| s.present).map(|s| s.group)
    }
}
