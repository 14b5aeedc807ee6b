//! Zone Assignment Table: per-face `(zone, flip)` built from all selectors.

use crate::mesh_error::SelectionError;
use crate::selection::{FaceSelector, ZoneSelection};
use crate::topology::poly_mesh::PolyMesh;
use crate::topology::zone::ZoneId;

/// Per-face zone and flip, one slot per mesh face.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneAssignment {
    face_to_zone: Vec<Option<ZoneId>>,
    face_to_flip: Vec<bool>,
}

impl ZoneAssignment {
    /// Empty table for a mesh with `n_faces` faces.
    pub fn new(n_faces: usize) -> Self {
        Self {
            face_to_zone: vec![None; n_faces],
            face_to_flip: vec![false; n_faces],
        }
    }

    /// Apply a selector's partial assignment for `zone`.
    ///
    /// Later merges overwrite earlier ones face by face. Returns how many
    /// faces previously claimed by a different zone were taken over.
    ///
    /// # Panics
    /// If the selection references a face outside the table; use
    /// [`assign_zones`] to get that reported as an error instead.
    pub fn merge(&mut self, zone: ZoneId, selection: &ZoneSelection) -> usize {
        let mut overwritten = 0;
        for (face, flip) in selection.iter() {
            if self.face_to_zone[face].is_some_and(|z| z != zone) {
                overwritten += 1;
            }
            self.face_to_zone[face] = Some(zone);
            self.face_to_flip[face] = flip;
        }
        overwritten
    }

    pub fn zone_of(&self, face: usize) -> Option<ZoneId> {
        self.face_to_zone.get(face).copied().flatten()
    }

    pub fn flip_of(&self, face: usize) -> bool {
        self.face_to_flip.get(face).copied().unwrap_or(false)
    }

    pub fn face_to_zone(&self) -> &[Option<ZoneId>] {
        &self.face_to_zone
    }

    pub fn face_to_flip(&self) -> &[bool] {
        &self.face_to_flip
    }

    /// Members of `zone` in increasing face order, with their flips.
    pub fn members(&self, zone: ZoneId) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.face_to_zone
            .iter()
            .enumerate()
            .filter(move |(_, z)| **z == Some(zone))
            .map(|(face, _)| (face, self.face_to_flip[face]))
    }

    /// Number of faces claimed by any zone.
    pub fn n_assigned(&self) -> usize {
        self.face_to_zone.iter().filter(|z| z.is_some()).count()
    }
}

/// Run every selector in order and merge their selections.
///
/// `zone_ids[i]` is the zone of `selectors[i]`.
pub fn assign_zones(
    mesh: &PolyMesh,
    selectors: &[Box<dyn FaceSelector>],
    zone_ids: &[ZoneId],
) -> Result<ZoneAssignment, SelectionError> {
    debug_assert_eq!(selectors.len(), zone_ids.len());
    let mut table = ZoneAssignment::new(mesh.n_faces());

    for (selector, &zone) in selectors.iter().zip(zone_ids) {
        let selection = selector.select(mesh)?;
        if let Some((face, _)) = selection.iter().find(|&(f, _)| f >= mesh.n_faces()) {
            return Err(SelectionError::FaceOutOfRange {
                selector: selector.name().to_string(),
                face,
                n_faces: mesh.n_faces(),
            });
        }
        let overwritten = table.merge(zone, &selection);
        if overwritten > 0 {
            log::debug!(
                "selector `{}` took over {overwritten} faces claimed by earlier selectors",
                selector.name()
            );
        }
    }
    Ok(table)
}
