//! Committing face operations to a mesh.
//!
//! [`TopoCommitter`] is the seam between planning and mesh rewriting. The
//! in-memory [`PolyTopoChange`] validates the whole operation sequence
//! against the current mesh before building anything, so a rejected
//! sequence leaves no partial result behind.
//!
//! Layout of the rebuilt mesh: untouched internal faces keep their relative
//! order and come first; each patch then holds its untouched faces in their
//! old order followed by the faces routed to it, in operation order.
//! Points and cells are never renumbered.

pub mod map;

pub use map::MeshMap;

use std::collections::BTreeSet;

use crate::baffles::operation::FaceOperation;
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::CommitError;
use crate::topology::face::Face;
use crate::topology::patch::Patch;
use crate::topology::poly_mesh::PolyMesh;
use crate::topology::zone::FaceZone;

/// Applies an operation sequence and reports the face correspondence.
pub trait TopoCommitter {
    fn apply(
        &self,
        mesh: &PolyMesh,
        operations: &[FaceOperation],
    ) -> Result<(PolyMesh, MeshMap), CommitError>;
}

/// In-memory committer.
#[derive(Clone, Copy, Debug, Default)]
pub struct PolyTopoChange;

impl PolyTopoChange {
    pub fn new() -> Self {
        Self
    }

    /// Check every operation against `mesh`. Returns, per old face, the
    /// index of the operation that modifies it.
    pub fn validate(
        &self,
        mesh: &PolyMesh,
        operations: &[FaceOperation],
    ) -> Result<Vec<Option<usize>>, CommitError> {
        let n_faces = mesh.n_faces();
        let mut modified_by: Vec<Option<usize>> = vec![None; n_faces];

        for (op_idx, op) in operations.iter().enumerate() {
            if op.patch() >= mesh.patches().len() {
                return Err(CommitError::UnknownPatch {
                    op: op_idx,
                    patch: op.patch(),
                });
            }
            if op.zone() >= mesh.face_zones().len() {
                return Err(CommitError::UnknownZone {
                    op: op_idx,
                    zone: op.zone(),
                });
            }
            if op.owner() >= mesh.n_cells() {
                return Err(CommitError::OwnerOutOfRange {
                    op: op_idx,
                    owner: op.owner(),
                    n_cells: mesh.n_cells(),
                });
            }
            check_face(op_idx, op.face(), mesh.n_points())?;

            let source = op.source_face();
            if source >= n_faces {
                return Err(CommitError::FaceOutOfRange {
                    op: op_idx,
                    face: source,
                    n_faces,
                });
            }
            let adjacent = mesh.owner()[source] == op.owner()
                || mesh.neighbour().get(source) == Some(&op.owner());
            if !adjacent {
                return Err(CommitError::OwnerNotAdjacent {
                    op: op_idx,
                    owner: op.owner(),
                    face: source,
                });
            }

            if let FaceOperation::Modify { face_index, .. } = *op {
                if let Some(first) = modified_by[face_index] {
                    return Err(CommitError::RepeatedModify {
                        op: op_idx,
                        face: face_index,
                        first,
                    });
                }
                modified_by[face_index] = Some(op_idx);
            }
        }
        Ok(modified_by)
    }
}

fn check_face(op: usize, face: &Face, n_points: usize) -> Result<(), CommitError> {
    if face.len() < 3 {
        return Err(CommitError::DegenerateFace { op });
    }
    match face.points().iter().find(|&&p| p >= n_points) {
        Some(&point) => Err(CommitError::PointOutOfRange {
            op,
            point,
            n_points,
        }),
        None => Ok(()),
    }
}

/// Accumulates the rebuilt face lists.
#[derive(Default)]
struct Rebuild {
    faces: Vec<Face>,
    owner: Vec<usize>,
    face_map: Vec<usize>,
    zone_of: Vec<Option<(usize, bool)>>,
}

impl Rebuild {
    fn push(&mut self, face: Face, owner: usize, source: usize, zone: Option<(usize, bool)>) -> usize {
        self.faces.push(face);
        self.owner.push(owner);
        self.face_map.push(source);
        self.zone_of.push(zone);
        self.faces.len() - 1
    }
}

impl TopoCommitter for PolyTopoChange {
    fn apply(
        &self,
        mesh: &PolyMesh,
        operations: &[FaceOperation],
    ) -> Result<(PolyMesh, MeshMap), CommitError> {
        let modified_by = self.validate(mesh, operations)?;

        let mut old_zone_of: Vec<Option<(usize, bool)>> = vec![None; mesh.n_faces()];
        for (zone_id, zone) in mesh.face_zones().iter().enumerate() {
            for (face, flip) in zone.iter() {
                old_zone_of[face] = Some((zone_id, flip));
            }
        }

        let n_patches = mesh.patches().len();
        let mut routed: Vec<Vec<usize>> = vec![Vec::new(); n_patches];
        for (op_idx, op) in operations.iter().enumerate() {
            routed[op.patch()].push(op_idx);
        }

        let mut out = Rebuild::default();
        let mut reverse_face_map = vec![0; mesh.n_faces()];
        let mut added_faces = Vec::new();
        let mut flip_face_flux = BTreeSet::new();
        let mut neighbour = Vec::new();

        for face in 0..mesh.n_internal_faces() {
            if modified_by[face].is_none() {
                let new = out.push(mesh.face(face).clone(), mesh.owner()[face], face, old_zone_of[face]);
                neighbour.push(mesh.neighbour()[face]);
                reverse_face_map[face] = new;
            }
        }

        let mut patches = Vec::with_capacity(n_patches);
        for (patch_id, patch) in mesh.patches().iter().enumerate() {
            let start = out.faces.len();
            for face in patch.range() {
                if modified_by[face].is_none() {
                    let new = out.push(mesh.face(face).clone(), mesh.owner()[face], face, old_zone_of[face]);
                    reverse_face_map[face] = new;
                }
            }
            for &op_idx in &routed[patch_id] {
                let op = &operations[op_idx];
                let new = out.push(
                    op.face().clone(),
                    op.owner(),
                    op.source_face(),
                    Some((op.zone(), op.zone_flip())),
                );
                match *op {
                    FaceOperation::Modify { face_index, .. } => reverse_face_map[face_index] = new,
                    FaceOperation::Add { .. } => added_faces.push(new),
                }
                if op.flip_flux() {
                    flip_face_flux.insert(new);
                }
            }
            patches.push(Patch::new(
                patch.name.clone(),
                patch.kind.clone(),
                start,
                out.faces.len() - start,
            ));
        }
        added_faces.sort_unstable();

        let mut zones: Vec<(Vec<usize>, Vec<bool>)> = vec![Default::default(); mesh.face_zones().len()];
        for (new_face, slot) in out.zone_of.iter().enumerate() {
            if let Some((zone, flip)) = *slot {
                zones[zone].0.push(new_face);
                zones[zone].1.push(flip);
            }
        }
        let face_zones = mesh
            .face_zones()
            .iter()
            .zip(zones)
            .map(|(old, (faces, flip))| FaceZone::new(old.name(), faces, flip))
            .collect();

        let new_mesh = PolyMesh::new(mesh.points().to_vec(), out.faces, out.owner, neighbour, patches)?
            .with_face_zones(face_zones)?;
        new_mesh.debug_assert_invariants();

        log::debug!(
            "committed {} operations: {} -> {} faces",
            operations.len(),
            mesh.n_faces(),
            new_mesh.n_faces()
        );

        let map = MeshMap {
            face_map: out.face_map,
            reverse_face_map,
            added_faces,
            flip_face_flux,
            old_patch_starts: mesh.patches().iter().map(|p| p.start).collect(),
            old_patch_sizes: mesh.patches().iter().map(|p| p.size).collect(),
        };
        Ok((new_mesh, map))
    }
}
