//! Face selection: named criteria that claim faces for a baffle zone.
//!
//! A [`FaceSelector`] evaluates its criterion against a mesh and returns a
//! [`ZoneSelection`], the partial `(face, flip)` assignment it claims. The
//! selections of all configured selectors are merged in configuration order
//! by [`assignment::assign_zones`] (last write wins), then turned into face
//! zones by [`zones::ZoneRegistry`].
//!
//! Selector kinds are resolved by name through [`registry`]; the built-in
//! kinds are `faceZone`, `faceList` and `plane`.

pub mod assignment;
pub mod face_list;
pub mod face_zone;
pub mod plane;
pub mod registry;
pub mod zones;

pub use assignment::{ZoneAssignment, assign_zones};
pub use registry::{build_selector, register_selector_kind, SelectorFactory};
pub use zones::ZoneRegistry;

use crate::mesh_error::SelectionError;
use crate::topology::poly_mesh::PolyMesh;

/// A named face-selection criterion.
pub trait FaceSelector: Send + Sync {
    /// Name of the baffle entry; also the name of the face zone it fills.
    fn name(&self) -> &str;

    /// Registry keyword of this selector kind.
    fn kind(&self) -> &str;

    /// Configuration tree the selector was built from.
    fn settings(&self) -> &serde_json::Value;

    /// Faces claimed by this criterion together with their flip flags.
    fn select(&self, mesh: &PolyMesh) -> Result<ZoneSelection, SelectionError>;
}

/// Partial zone assignment produced by one selector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZoneSelection {
    entries: Vec<(usize, bool)>,
}

impl ZoneSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, face: usize, flip: bool) {
        self.entries.push((face, flip));
    }

    /// `(face, flip)` pairs in the order the selector reported them.
    pub fn iter(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The same faces with every flip flag inverted.
    pub fn flipped(mut self) -> Self {
        for (_, flip) in &mut self.entries {
            *flip = !*flip;
        }
        self
    }
}

impl FromIterator<(usize, bool)> for ZoneSelection {
    fn from_iter<I: IntoIterator<Item = (usize, bool)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Wraps a selector and inverts the flip of everything it selects.
///
/// Applied by the registry when a baffle entry sets `"flip": true`.
pub(crate) struct FlipSelector {
    pub(crate) inner: Box<dyn FaceSelector>,
}

impl FaceSelector for FlipSelector {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn kind(&self) -> &str {
        self.inner.kind()
    }

    fn settings(&self) -> &serde_json::Value {
        self.inner.settings()
    }

    fn select(&self, mesh: &PolyMesh) -> Result<ZoneSelection, SelectionError> {
        Ok(self.inner.select(mesh)?.flipped())
    }
}
