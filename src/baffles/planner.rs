//! Baffle planning: turn zone membership into face operations.
//!
//! For every master/slave patch pair of a zone the planner makes two passes
//! over the zone's internal faces and then one over the boundary:
//!
//! * the master pass places each face on the master patch, oriented
//!   outward from the cell on the side its zone flip designates;
//! * the slave pass places the mirror copy on the slave patch, oriented
//!   outward from the opposite cell;
//! * the boundary sweep re-routes zone faces sitting on boundary patches
//!   into the master patch.
//!
//! The first operation touching a face modifies it in place; every later
//! one adds a new face with the touched face as master. Planning never
//! fails: everything it relies on has been validated before it runs.

use std::collections::BTreeSet;

use crate::baffles::operation::FaceOperation;
use crate::topology::face::Face;
use crate::topology::patch::PatchId;
use crate::topology::poly_mesh::PolyMesh;
use crate::topology::zone::ZoneId;

/// A boundary face of `source_patch` that the plan moves into
/// `target_patch` because it belongs to `zone`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoundaryConversion {
    pub zone: ZoneId,
    pub source_patch: PatchId,
    pub target_patch: PatchId,
}

/// Result of planning all zones.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BafflePlan {
    /// Operations in emission order.
    pub operations: Vec<FaceOperation>,
    /// Faces placed by master passes and boundary sweeps on this worker.
    pub converted: usize,
    /// One entry per (pair, source patch) that had faces re-routed.
    pub boundary_conversions: Vec<BoundaryConversion>,
}

impl BafflePlan {
    pub fn n_modify(&self) -> usize {
        self.operations.iter().filter(|op| op.is_modify()).count()
    }

    pub fn n_add(&self) -> usize {
        self.operations.iter().filter(|op| op.is_add()).count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Master,
    Slave,
}

/// Builds a [`BafflePlan`] zone by zone.
#[derive(Debug)]
pub struct BafflePlanner<'m> {
    mesh: &'m PolyMesh,
    internal_faces_only: bool,
    /// Faces already touched by an operation in this run.
    modified: Vec<bool>,
    operations: Vec<FaceOperation>,
    converted: usize,
    boundary_conversions: Vec<BoundaryConversion>,
}

impl<'m> BafflePlanner<'m> {
    /// `mesh` must already carry the provisioned patches and the
    /// materialized zones.
    pub fn new(mesh: &'m PolyMesh, internal_faces_only: bool) -> Self {
        Self {
            mesh,
            internal_faces_only,
            modified: vec![false; mesh.n_faces()],
            operations: Vec::new(),
            converted: 0,
            boundary_conversions: Vec::new(),
        }
    }

    /// Plan one zone against its master and slave patches, pairing
    /// `masters[i]` with `slaves[i]`.
    pub fn plan_zone(&mut self, zone: ZoneId, masters: &[PatchId], slaves: &[PatchId]) {
        debug_assert_eq!(masters.len(), slaves.len());
        let mut internal: Vec<(usize, bool)> = self
            .mesh
            .face_zone(zone)
            .iter()
            .filter(|&(face, _)| self.mesh.is_internal_face(face))
            .collect();
        internal.sort_unstable_by_key(|&(face, _)| face);

        for (&master, &slave) in masters.iter().zip(slaves) {
            for &(face, flip) in &internal {
                self.place_internal(zone, face, flip, master, Side::Master);
                self.converted += 1;
            }
            for &(face, flip) in &internal {
                self.place_internal(zone, face, flip, slave, Side::Slave);
            }
            self.sweep_boundary(zone, master);
        }
    }

    /// Hand over the plan.
    pub fn finish(self) -> BafflePlan {
        BafflePlan {
            operations: self.operations,
            converted: self.converted,
            boundary_conversions: self.boundary_conversions,
        }
    }

    fn place_internal(&mut self, zone: ZoneId, face: usize, flip: bool, patch: PatchId, side: Side) {
        let owner_side = match side {
            Side::Master => !flip,
            Side::Slave => flip,
        };
        let (shape, cell) = if owner_side {
            (self.mesh.face(face).clone(), self.mesh.owner()[face])
        } else {
            (self.mesh.face(face).reverse_face(), self.mesh.neighbour()[face])
        };
        let flipped = !owner_side;
        self.modify_or_add(shape, face, cell, flipped, patch, zone, flipped);
    }

    /// Re-route zone faces sitting on boundary patches into `master`.
    ///
    /// A source patch is skipped when it and `master` are both coupled.
    /// Otherwise its zone faces move if the source is coupled or boundary
    /// faces are not excluded.
    fn sweep_boundary(&mut self, zone: ZoneId, master: PatchId) {
        let mesh = self.mesh;
        let master_coupled = mesh.patch(master).is_coupled();
        let zone_faces = mesh.face_zone(zone);
        let mut reported = BTreeSet::new();

        for (source, patch) in mesh.patches().iter().enumerate() {
            let coupled = patch.is_coupled();
            if coupled && master_coupled {
                continue;
            }
            if !coupled && self.internal_faces_only {
                continue;
            }
            for face in patch.range() {
                let Some(flip) = zone_faces.flip_of(face) else {
                    continue;
                };
                if reported.insert(source) {
                    self.boundary_conversions.push(BoundaryConversion {
                        zone,
                        source_patch: source,
                        target_patch: master,
                    });
                }
                self.modify_or_add(
                    mesh.face(face).clone(),
                    face,
                    mesh.owner()[face],
                    false,
                    master,
                    zone,
                    flip,
                );
                self.converted += 1;
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn modify_or_add(
        &mut self,
        face: Face,
        face_index: usize,
        owner: usize,
        flip_flux: bool,
        patch: PatchId,
        zone: ZoneId,
        zone_flip: bool,
    ) {
        let op = if self.modified[face_index] {
            FaceOperation::Add {
                face,
                owner,
                master_face: face_index,
                flip_flux,
                patch,
                zone,
                zone_flip,
            }
        } else {
            self.modified[face_index] = true;
            FaceOperation::Modify {
                face,
                face_index,
                owner,
                flip_flux,
                patch,
                zone,
                zone_flip,
            }
        };
        self.operations.push(op);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::patch::PatchType;
    use crate::topology::zone::FaceZone;

    /// [2,1,1] block (one internal face) with the face in zone 0 and two
    /// empty target patches appended.
    fn single_face(flip: bool) -> (PolyMesh, PatchId, PatchId) {
        let mut mesh = PolyMesh::block([2, 1, 1], [2.0, 1.0, 1.0])
            .unwrap()
            .with_face_zones(vec![FaceZone::new("z", vec![0], vec![flip])])
            .unwrap();
        let m = mesh.add_patch("m", PatchType::Wall).unwrap();
        let s = mesh.add_patch("s", PatchType::Wall).unwrap();
        (mesh, m, s)
    }

    #[test]
    fn unflipped_face_modify_then_add() {
        let (mesh, m, s) = single_face(false);
        let mut planner = BafflePlanner::new(&mesh, false);
        planner.plan_zone(0, &[m], &[s]);
        let plan = planner.finish();

        assert_eq!(plan.converted, 1);
        assert_eq!(
            plan.operations,
            vec![
                FaceOperation::Modify {
                    face: mesh.face(0).clone(),
                    face_index: 0,
                    owner: 0,
                    flip_flux: false,
                    patch: m,
                    zone: 0,
                    zone_flip: false,
                },
                FaceOperation::Add {
                    face: mesh.face(0).reverse_face(),
                    owner: 1,
                    master_face: 0,
                    flip_flux: true,
                    patch: s,
                    zone: 0,
                    zone_flip: true,
                },
            ]
        );
    }

    #[test]
    fn flipped_face_swaps_sides() {
        let (mesh, m, s) = single_face(true);
        let mut planner = BafflePlanner::new(&mesh, false);
        planner.plan_zone(0, &[m], &[s]);
        let plan = planner.finish();

        let ops = &plan.operations;
        assert_eq!(ops[0].owner(), 1);
        assert_eq!(ops[0].face(), &mesh.face(0).reverse_face());
        assert!(ops[0].flip_flux() && ops[0].zone_flip());
        assert_eq!(ops[1].owner(), 0);
        assert_eq!(ops[1].face(), mesh.face(0));
        assert!(!ops[1].flip_flux() && !ops[1].zone_flip());
    }

    #[test]
    fn no_pairs_means_no_operations() {
        let (mesh, _, _) = single_face(false);
        let mut planner = BafflePlanner::new(&mesh, false);
        planner.plan_zone(0, &[], &[]);
        assert_eq!(planner.finish(), BafflePlan::default());
    }

    #[test]
    fn boundary_face_swept_into_master() {
        // Face 1 is the first xMin face of the block.
        let mut mesh = PolyMesh::block([2, 1, 1], [2.0, 1.0, 1.0])
            .unwrap()
            .with_face_zones(vec![FaceZone::new("z", vec![1], vec![true])])
            .unwrap();
        let m = mesh.add_patch("m", PatchType::Patch).unwrap();
        let s = mesh.add_patch("s", PatchType::Patch).unwrap();

        let mut planner = BafflePlanner::new(&mesh, false);
        planner.plan_zone(0, &[m], &[s]);
        let plan = planner.finish();
        assert_eq!(plan.converted, 1);
        assert_eq!(
            plan.operations,
            vec![FaceOperation::Modify {
                face: mesh.face(1).clone(),
                face_index: 1,
                owner: mesh.owner()[1],
                flip_flux: false,
                patch: m,
                zone: 0,
                zone_flip: true,
            }]
        );
        assert_eq!(
            plan.boundary_conversions,
            vec![BoundaryConversion {
                zone: 0,
                source_patch: mesh.which_patch(1).unwrap(),
                target_patch: m,
            }]
        );

        let mut planner = BafflePlanner::new(&mesh, true);
        planner.plan_zone(0, &[m], &[s]);
        assert_eq!(planner.finish(), BafflePlan::default());
    }

    #[test]
    fn boundary_sweep_follows_both_passes() {
        // Face 0 is internal, face 1 the first xMin face.
        let mut mesh = PolyMesh::block([2, 1, 1], [2.0, 1.0, 1.0])
            .unwrap()
            .with_face_zones(vec![FaceZone::new("z", vec![0, 1], vec![false, false])])
            .unwrap();
        let m = mesh.add_patch("m", PatchType::Wall).unwrap();
        let s = mesh.add_patch("s", PatchType::Wall).unwrap();

        let mut planner = BafflePlanner::new(&mesh, false);
        planner.plan_zone(0, &[m], &[s]);
        let plan = planner.finish();

        let order: Vec<_> = plan
            .operations
            .iter()
            .map(|op| (op.source_face(), op.patch(), op.is_modify()))
            .collect();
        assert_eq!(order, vec![(0, m, true), (0, s, false), (1, m, true)]);
        assert_eq!(plan.converted, 2);
    }
}
