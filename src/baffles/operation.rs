//! Face operations emitted by the planner and consumed by a committer.

use serde::{Deserialize, Serialize};

use crate::topology::face::Face;
use crate::topology::patch::PatchId;
use crate::topology::zone::ZoneId;

/// One requested change to a face. The resulting face is always a boundary
/// face, so there is no neighbour.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceOperation {
    /// Re-route existing face `face_index` in place.
    Modify {
        face: Face,
        face_index: usize,
        owner: usize,
        flip_flux: bool,
        patch: PatchId,
        zone: ZoneId,
        zone_flip: bool,
    },
    /// Create a new face whose fields are copied from `master_face`.
    Add {
        face: Face,
        owner: usize,
        master_face: usize,
        flip_flux: bool,
        patch: PatchId,
        zone: ZoneId,
        zone_flip: bool,
    },
}

impl FaceOperation {
    pub fn face(&self) -> &Face {
        match self {
            Self::Modify { face, .. } | Self::Add { face, .. } => face,
        }
    }

    pub fn owner(&self) -> usize {
        match *self {
            Self::Modify { owner, .. } | Self::Add { owner, .. } => owner,
        }
    }

    pub fn patch(&self) -> PatchId {
        match *self {
            Self::Modify { patch, .. } | Self::Add { patch, .. } => patch,
        }
    }

    pub fn zone(&self) -> ZoneId {
        match *self {
            Self::Modify { zone, .. } | Self::Add { zone, .. } => zone,
        }
    }

    pub fn zone_flip(&self) -> bool {
        match *self {
            Self::Modify { zone_flip, .. } | Self::Add { zone_flip, .. } => zone_flip,
        }
    }

    pub fn flip_flux(&self) -> bool {
        match *self {
            Self::Modify { flip_flux, .. } | Self::Add { flip_flux, .. } => flip_flux,
        }
    }

    /// Pre-change face the result descends from: the modified face, or the
    /// master face of an addition.
    pub fn source_face(&self) -> usize {
        match *self {
            Self::Modify { face_index, .. } => face_index,
            Self::Add { master_face, .. } => master_face,
        }
    }

    pub fn is_modify(&self) -> bool {
        matches!(self, Self::Modify { .. })
    }

    pub fn is_add(&self) -> bool {
        matches!(self, Self::Add { .. })
    }
}
