//! Face zones: named, ordered `(face, flip)` collections.
//!
//! The flip flag of a member records which side of the face the zone
//! "front" looks at: `false` means the owner side, `true` the neighbour side.

use hashbrown::HashMap;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// Index of a zone in [`PolyMesh::face_zones`](crate::topology::poly_mesh::PolyMesh).
pub type ZoneId = usize;

/// Named face zone.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FaceZone {
    name: String,
    faces: Vec<usize>,
    flip: Vec<bool>,
    #[serde(skip)]
    lookup: OnceCell<HashMap<usize, usize>>,
}

impl FaceZone {
    /// Creates a zone. `faces` and `flip` are expected to have equal length;
    /// [`PolyMesh::new`](crate::topology::poly_mesh::PolyMesh::new) rejects
    /// zones where they do not.
    pub fn new(name: impl Into<String>, faces: Vec<usize>, flip: Vec<bool>) -> Self {
        Self {
            name: name.into(),
            faces,
            flip,
            lookup: OnceCell::new(),
        }
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), Vec::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member faces in zone order.
    pub fn faces(&self) -> &[usize] {
        &self.faces
    }

    /// Flip flag per member, aligned with [`FaceZone::faces`].
    pub fn flip_map(&self) -> &[bool] {
        &self.flip
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Iterate `(face, flip)` pairs in zone order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.faces.iter().copied().zip(self.flip.iter().copied())
    }

    /// Position of `face` inside this zone, if it is a member.
    pub fn which_face(&self, face: usize) -> Option<usize> {
        self.lookup
            .get_or_init(|| {
                self.faces
                    .iter()
                    .enumerate()
                    .map(|(i, &f)| (f, i))
                    .collect()
            })
            .get(&face)
            .copied()
    }

    /// Flip flag of `face`, if it is a member.
    pub fn flip_of(&self, face: usize) -> Option<bool> {
        self.which_face(face).map(|i| self.flip[i])
    }

    /// Replace the member list.
    pub fn set_members(&mut self, faces: Vec<usize>, flip: Vec<bool>) {
        self.faces = faces;
        self.flip = flip;
        self.lookup = OnceCell::new();
    }
}

impl PartialEq for FaceZone {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.faces == other.faces && self.flip == other.flip
    }
}

impl Eq for FaceZone {}
