//! `PolyMesh`: face-based polyhedral mesh with owner/neighbour addressing.
//!
//! Faces `0..n_internal_faces` are internal and have both an owner and a
//! neighbour cell (owner < neighbour). The remaining faces are boundary
//! faces grouped into contiguous per-patch ranges in patch order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use crate::topology::face::Face;
use crate::topology::patch::{Patch, PatchId, PatchType};
use crate::topology::zone::{FaceZone, ZoneId};

/// Polyhedral mesh described by its faces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolyMeshData")]
pub struct PolyMesh {
    points: Vec<[f64; 3]>,
    faces: Vec<Face>,
    owner: Vec<usize>,
    neighbour: Vec<usize>,
    patches: Vec<Patch>,
    face_zones: Vec<FaceZone>,
    #[serde(skip)]
    n_cells: usize,
}

/// Unvalidated serialized form of [`PolyMesh`].
#[derive(Deserialize)]
struct PolyMeshData {
    points: Vec<[f64; 3]>,
    faces: Vec<Face>,
    owner: Vec<usize>,
    neighbour: Vec<usize>,
    patches: Vec<Patch>,
    #[serde(default)]
    face_zones: Vec<FaceZone>,
}

impl TryFrom<PolyMeshData> for PolyMesh {
    type Error = MeshError;

    fn try_from(data: PolyMeshData) -> Result<Self, Self::Error> {
        PolyMesh::new(data.points, data.faces, data.owner, data.neighbour, data.patches)?
            .with_face_zones(data.face_zones)
    }
}

impl PolyMesh {
    /// Build and validate a mesh.
    pub fn new(
        points: Vec<[f64; 3]>,
        faces: Vec<Face>,
        owner: Vec<usize>,
        neighbour: Vec<usize>,
        patches: Vec<Patch>,
    ) -> Result<Self, MeshError> {
        let n_cells = owner
            .iter()
            .chain(neighbour.iter())
            .copied()
            .max()
            .map_or(0, |c| c + 1);
        let mesh = Self {
            points,
            faces,
            owner,
            neighbour,
            patches,
            face_zones: Vec::new(),
            n_cells,
        };
        mesh.validate_invariants()?;
        Ok(mesh)
    }

    /// Attach face zones, validating membership.
    pub fn with_face_zones(mut self, zones: Vec<FaceZone>) -> Result<Self, MeshError> {
        self.face_zones = zones;
        self.check_zones()?;
        Ok(self)
    }

    // ---------------------------------------------------------------------
    // Sizes and addressing
    // ---------------------------------------------------------------------

    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face(&self, face: usize) -> &Face {
        &self.faces[face]
    }

    /// Owner cell of every face.
    pub fn owner(&self) -> &[usize] {
        &self.owner
    }

    /// Neighbour cell of every internal face.
    pub fn neighbour(&self) -> &[usize] {
        &self.neighbour
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn patch(&self, id: PatchId) -> &Patch {
        &self.patches[id]
    }

    pub fn face_zones(&self) -> &[FaceZone] {
        &self.face_zones
    }

    pub fn face_zone(&self, id: ZoneId) -> &FaceZone {
        &self.face_zones[id]
    }

    pub fn face_zone_mut(&mut self, id: ZoneId) -> &mut FaceZone {
        &mut self.face_zones[id]
    }

    #[inline]
    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn n_internal_faces(&self) -> usize {
        self.neighbour.len()
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    #[inline]
    pub fn is_internal_face(&self, face: usize) -> bool {
        face < self.n_internal_faces()
    }

    /// Patch with the given name.
    pub fn find_patch(&self, name: &str) -> Option<PatchId> {
        self.patches.iter().position(|p| p.name == name)
    }

    /// Patch containing boundary face `face`.
    pub fn which_patch(&self, face: usize) -> Option<PatchId> {
        if self.is_internal_face(face) || face >= self.n_faces() {
            return None;
        }
        let idx = self.patches.partition_point(|p| p.start + p.size <= face);
        (idx < self.patches.len() && self.patches[idx].contains(face)).then_some(idx)
    }

    /// Face zone with the given name.
    pub fn find_zone(&self, name: &str) -> Option<ZoneId> {
        self.face_zones.iter().position(|z| z.name() == name)
    }

    // ---------------------------------------------------------------------
    // Additions that do not renumber faces
    // ---------------------------------------------------------------------

    /// Add an empty patch and return its id.
    ///
    /// Processor patches go to the end. Any other patch is inserted in front
    /// of the first processor patch, so non-processor patch ids stay the same
    /// on every worker; the processor patches behind it move up by one.
    pub fn add_patch(
        &mut self,
        name: impl Into<String>,
        kind: PatchType,
    ) -> Result<PatchId, MeshError> {
        let name = name.into();
        if self.find_patch(&name).is_some() {
            return Err(MeshError::DuplicatePatch(name));
        }
        let at = if kind.is_processor() {
            self.patches.len()
        } else {
            self.first_processor_patch()
        };
        let start = self.patches.get(at).map_or(self.n_faces(), |p| p.start);
        self.patches.insert(at, Patch::new(name, kind, start, 0));
        Ok(at)
    }

    /// Index of the first processor patch, or the patch count if there is none.
    pub fn first_processor_patch(&self) -> PatchId {
        self.patches
            .iter()
            .position(|p| p.kind.is_processor())
            .unwrap_or(self.patches.len())
    }

    /// Append an empty face zone.
    pub fn add_face_zone(&mut self, name: impl Into<String>) -> Result<ZoneId, MeshError> {
        let name = name.into();
        if self.find_zone(&name).is_some() {
            return Err(MeshError::DuplicateZone(name));
        }
        self.face_zones.push(FaceZone::empty(name));
        Ok(self.face_zones.len() - 1)
    }

    /// Change the declared type of an existing patch.
    pub fn set_patch_type(&mut self, id: PatchId, kind: PatchType) {
        self.patches[id].kind = kind;
    }

    // ---------------------------------------------------------------------
    // Geometry
    // ---------------------------------------------------------------------

    /// Approximate cell centres: average of the centres of each cell's faces.
    pub fn cell_centres(&self) -> Vec<[f64; 3]> {
        let mut sum = vec![[0.0; 3]; self.n_cells];
        let mut count = vec![0usize; self.n_cells];
        for (face_idx, face) in self.faces.iter().enumerate() {
            let c = face.centre(&self.points);
            let mut accumulate = |cell: usize| {
                for (s, x) in sum[cell].iter_mut().zip(c) {
                    *s += x;
                }
                count[cell] += 1;
            };
            accumulate(self.owner[face_idx]);
            if let Some(&nbr) = self.neighbour.get(face_idx) {
                accumulate(nbr);
            }
        }
        sum.into_iter()
            .zip(count)
            .map(|(s, n)| s.map(|x| x / n.max(1) as f64))
            .collect()
    }

    // ---------------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------------

    fn check_topology(&self) -> Result<(), MeshError> {
        let n_faces = self.faces.len();
        if self.owner.len() != n_faces {
            return Err(MeshError::OwnerLengthMismatch {
                expected: n_faces,
                found: self.owner.len(),
            });
        }
        if self.neighbour.len() > n_faces {
            return Err(MeshError::NeighbourLengthMismatch {
                faces: n_faces,
                found: self.neighbour.len(),
            });
        }
        for (face_idx, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(MeshError::DegenerateFace { face: face_idx });
            }
            if let Some(&point) = face.points().iter().find(|&&p| p >= self.points.len()) {
                return Err(MeshError::PointOutOfRange {
                    face: face_idx,
                    point,
                    n_points: self.points.len(),
                });
            }
        }
        for (face_idx, (&own, &nbr)) in self.owner.iter().zip(&self.neighbour).enumerate() {
            if own >= nbr {
                return Err(MeshError::OwnerNotBelowNeighbour {
                    face: face_idx,
                    owner: own,
                    neighbour: nbr,
                });
            }
        }
        Ok(())
    }

    fn check_patches(&self) -> Result<(), MeshError> {
        let mut names = HashSet::new();
        let mut expected = self.n_internal_faces();
        for patch in &self.patches {
            if !names.insert(patch.name.as_str()) {
                return Err(MeshError::DuplicatePatch(patch.name.clone()));
            }
            if patch.start != expected {
                return Err(MeshError::PatchNotContiguous {
                    name: patch.name.clone(),
                    start: patch.start,
                    expected,
                });
            }
            expected += patch.size;
        }
        if expected != self.n_faces() {
            return Err(MeshError::PatchCoverage {
                covered: expected,
                faces: self.n_faces(),
            });
        }
        Ok(())
    }

    fn check_zones(&self) -> Result<(), MeshError> {
        let mut names = HashSet::new();
        let mut claimed: Vec<Option<ZoneId>> = vec![None; self.n_faces()];
        for (zone_id, zone) in self.face_zones.iter().enumerate() {
            if !names.insert(zone.name()) {
                return Err(MeshError::DuplicateZone(zone.name().to_string()));
            }
            if zone.faces().len() != zone.flip_map().len() {
                return Err(MeshError::ZoneFlipLengthMismatch {
                    zone: zone.name().to_string(),
                    faces: zone.faces().len(),
                    flips: zone.flip_map().len(),
                });
            }
            for &face in zone.faces() {
                let Some(slot) = claimed.get_mut(face) else {
                    return Err(MeshError::ZoneFaceOutOfRange {
                        zone: zone.name().to_string(),
                        face,
                    });
                };
                if let Some(first) = *slot {
                    return Err(MeshError::ZoneOverlap {
                        face,
                        first: self.face_zones[first].name().to_string(),
                        second: zone.name().to_string(),
                    });
                }
                *slot = Some(zone_id);
            }
        }
        Ok(())
    }
}

impl DebugInvariants for PolyMesh {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "PolyMesh");
    }

    fn validate_invariants(&self) -> Result<(), MeshError> {
        self.check_topology()?;
        self.check_patches()?;
        self.check_zones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two unit hex cells stacked in x, one internal face at x = 1.
    fn two_cells() -> PolyMesh {
        PolyMesh::block([2, 1, 1], [2.0, 1.0, 1.0]).unwrap()
    }

    #[test]
    fn block_addressing() {
        let mesh = two_cells();
        assert_eq!(mesh.n_cells(), 2);
        assert_eq!(mesh.n_internal_faces(), 1);
        assert_eq!(mesh.n_faces(), 11);
        assert_eq!(mesh.owner()[0], 0);
        assert_eq!(mesh.neighbour()[0], 1);
        assert_eq!(mesh.which_patch(0), None);
        for face in 1..mesh.n_faces() {
            let patch = mesh.which_patch(face).unwrap();
            assert!(mesh.patch(patch).contains(face));
        }
    }

    #[test]
    fn add_patch_starts_empty_at_end() {
        let mut mesh = two_cells();
        let id = mesh.add_patch("baffle", PatchType::Wall).unwrap();
        assert_eq!(mesh.patch(id).size, 0);
        assert_eq!(mesh.patch(id).start, mesh.n_faces());
        assert!(mesh.validate_invariants().is_ok());
        assert_eq!(
            mesh.add_patch("baffle", PatchType::Wall),
            Err(MeshError::DuplicatePatch("baffle".into()))
        );
    }

    #[test]
    fn add_patch_goes_before_processor_patches() {
        let mut mesh = two_cells();
        let proc = PatchType::Processor {
            my_rank: 0,
            neighbour_rank: 1,
        };
        let p01 = mesh.add_patch("procBoundary0to1", proc.clone()).unwrap();
        assert_eq!(p01, 6);

        let wall = mesh.add_patch("baffle", PatchType::Wall).unwrap();
        assert_eq!(wall, 6);
        assert_eq!(mesh.patch(wall).start, mesh.n_faces());
        assert_eq!(mesh.find_patch("procBoundary0to1"), Some(7));
        assert_eq!(mesh.first_processor_patch(), 7);

        let p02 = mesh.add_patch("procBoundary0to2", proc).unwrap();
        assert_eq!(p02, 8);
        assert!(mesh.validate_invariants().is_ok());
    }

    #[test]
    fn rejects_inverted_internal_face() {
        let mesh = two_cells();
        let mut owner = mesh.owner().to_vec();
        let mut neighbour = mesh.neighbour().to_vec();
        std::mem::swap(&mut owner[0], &mut neighbour[0]);
        let err = PolyMesh::new(
            mesh.points().to_vec(),
            mesh.faces().to_vec(),
            owner,
            neighbour,
            mesh.patches().to_vec(),
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::OwnerNotBelowNeighbour { face: 0, .. }));
    }

    #[test]
    fn rejects_overlapping_zones() {
        let err = two_cells()
            .with_face_zones(vec![
                FaceZone::new("a", vec![0], vec![false]),
                FaceZone::new("b", vec![0], vec![true]),
            ])
            .unwrap_err();
        assert!(matches!(err, MeshError::ZoneOverlap { face: 0, .. }));
    }

    #[test]
    fn json_round_trip_validates() {
        let mesh = two_cells();
        let json = serde_json::to_string(&mesh).unwrap();
        let back: PolyMesh = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mesh);

        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["owner"] = serde_json::json!([0]);
        assert!(serde_json::from_value::<PolyMesh>(value).is_err());
    }
}
