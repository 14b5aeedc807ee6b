//! Boundary patches: named contiguous face ranges.

use serde::{Deserialize, Serialize};

/// Index of a patch in [`PolyMesh::patches`](crate::topology::poly_mesh::PolyMesh).
pub type PatchId = usize;

/// Declared type of a boundary patch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PatchType {
    #[default]
    Patch,
    Wall,
    Empty,
    SymmetryPlane,
    /// Paired transform patch. Faces of both halves are matched by order.
    Cyclic {
        #[serde(rename = "neighbourPatch")]
        neighbour_patch: String,
    },
    /// Cut between two workers of a decomposed mesh.
    Processor {
        #[serde(rename = "myProcNo")]
        my_rank: usize,
        #[serde(rename = "neighbProcNo")]
        neighbour_rank: usize,
    },
}

impl PatchType {
    /// Keyword used for this type in configuration files.
    pub fn type_name(&self) -> &'static str {
        match self {
            PatchType::Patch => "patch",
            PatchType::Wall => "wall",
            PatchType::Empty => "empty",
            PatchType::SymmetryPlane => "symmetryPlane",
            PatchType::Cyclic { .. } => "cyclic",
            PatchType::Processor { .. } => "processor",
        }
    }

    /// Whether faces of this patch are coupled to faces elsewhere.
    pub fn is_coupled(&self) -> bool {
        matches!(self, PatchType::Cyclic { .. } | PatchType::Processor { .. })
    }

    pub fn is_processor(&self) -> bool {
        matches!(self, PatchType::Processor { .. })
    }
}

/// A named range `start..start + size` of boundary faces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub name: String,
    #[serde(flatten)]
    pub kind: PatchType,
    pub start: usize,
    pub size: usize,
}

impl Patch {
    pub fn new(name: impl Into<String>, kind: PatchType, start: usize, size: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            start,
            size,
        }
    }

    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.size
    }

    #[inline]
    pub fn is_coupled(&self) -> bool {
        self.kind.is_coupled()
    }

    #[inline]
    pub fn contains(&self, face: usize) -> bool {
        self.range().contains(&face)
    }
}
