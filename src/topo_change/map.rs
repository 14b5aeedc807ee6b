//! Correspondence between a mesh before and after a committed change.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::topology::patch::PatchId;

/// Describes how the faces of a changed mesh relate to the old one.
///
/// Faces are never removed by a baffle change, so every old face has exactly
/// one new position, and every added face descends from an old master face.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshMap {
    pub(crate) face_map: Vec<usize>,
    pub(crate) reverse_face_map: Vec<usize>,
    pub(crate) added_faces: Vec<usize>,
    pub(crate) flip_face_flux: BTreeSet<usize>,
    pub(crate) old_patch_starts: Vec<usize>,
    pub(crate) old_patch_sizes: Vec<usize>,
}

impl MeshMap {
    /// Old face each new face takes its values from.
    pub fn face_map(&self) -> &[usize] {
        &self.face_map
    }

    /// New position of each old face.
    pub fn reverse_face_map(&self) -> &[usize] {
        &self.reverse_face_map
    }

    /// New faces that did not exist before, in increasing order.
    pub fn added_faces(&self) -> &[usize] {
        &self.added_faces
    }

    /// New faces whose flux sign is reversed relative to their source.
    pub fn flip_face_flux(&self) -> &BTreeSet<usize> {
        &self.flip_face_flux
    }

    pub fn old_patch_starts(&self) -> &[usize] {
        &self.old_patch_starts
    }

    pub fn old_patch_sizes(&self) -> &[usize] {
        &self.old_patch_sizes
    }

    pub fn n_old_faces(&self) -> usize {
        self.reverse_face_map.len()
    }

    pub fn n_new_faces(&self) -> usize {
        self.face_map.len()
    }

    /// True if `patch` had no faces before the change.
    pub fn was_empty_before_change(&self, patch: PatchId) -> bool {
        self.old_patch_sizes.get(patch).is_none_or(|&size| size == 0)
    }
}
