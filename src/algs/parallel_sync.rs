//! Cross-worker consistency of patches and face zones.
//!
//! Every worker must see the same non-processor patches (same names, same
//! types, same order) and the same face zone names before faces are moved,
//! otherwise the patch and zone ids in the operations mean different things
//! on different workers.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::algs::communicator::Communicator;
use crate::mesh_error::BaffleError;
use crate::topology::poly_mesh::PolyMesh;

/// Hash of the patch and zone layout that must agree across workers.
///
/// Processor patches are left out; their names differ per worker. The
/// other patches are hashed with their ids.
pub fn sync_fingerprint(mesh: &PolyMesh) -> u64 {
    let mut hasher = DefaultHasher::new();
    for (id, patch) in mesh.patches().iter().enumerate() {
        if patch.kind.is_processor() {
            continue;
        }
        id.hash(&mut hasher);
        patch.name.hash(&mut hasher);
        patch.kind.type_name().hash(&mut hasher);
    }
    0xff_u8.hash(&mut hasher);
    for zone in mesh.face_zones() {
        zone.name().hash(&mut hasher);
    }
    hasher.finish()
}

/// Fail unless every worker has the same fingerprint. A no-op on a single
/// worker.
pub fn check_parallel_sync<C: Communicator + ?Sized>(
    mesh: &PolyMesh,
    comm: &C,
) -> Result<(), BaffleError> {
    if !comm.is_parallel() {
        return Ok(());
    }
    let local = sync_fingerprint(mesh);
    let lo = comm.all_reduce_min(local);
    let hi = comm.all_reduce_max(local);
    if lo != hi {
        log::error!("patch/zone layout differs between workers (rank {})", comm.rank());
        return Err(BaffleError::ParallelSync { rank: comm.rank() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::{NoComm, ThreadComm};
    use crate::topology::patch::{Patch, PatchType};

    fn mesh() -> PolyMesh {
        PolyMesh::block([1, 1, 1], [1.0, 1.0, 1.0]).unwrap()
    }

    #[test]
    fn processor_patches_do_not_count() {
        let plain = mesh();
        let mut with_proc = mesh();
        with_proc
            .add_patch(
                "procBoundary0to1",
                PatchType::Processor {
                    my_rank: 0,
                    neighbour_rank: 1,
                },
            )
            .unwrap();
        assert_eq!(sync_fingerprint(&plain), sync_fingerprint(&with_proc));

        let mut with_wall = mesh();
        with_wall.add_patch("baffle", PatchType::Wall).unwrap();
        assert_ne!(sync_fingerprint(&plain), sync_fingerprint(&with_wall));
        assert!(check_parallel_sync(&with_wall, &NoComm).is_ok());
    }

    #[test]
    fn interleaved_processor_patch_shifts_ids() {
        let plain = mesh();
        let mut patches = plain.patches().to_vec();
        let start = patches[3].start;
        patches.insert(
            3,
            Patch::new(
                "procBoundary0to1",
                PatchType::Processor {
                    my_rank: 0,
                    neighbour_rank: 1,
                },
                start,
                0,
            ),
        );
        let interleaved = PolyMesh::new(
            plain.points().to_vec(),
            plain.faces().to_vec(),
            plain.owner().to_vec(),
            plain.neighbour().to_vec(),
            patches,
        )
        .unwrap();
        assert_ne!(sync_fingerprint(&plain), sync_fingerprint(&interleaved));
    }

    #[test]
    fn mismatch_detected_on_every_rank() {
        let group = ThreadComm::group(2);
        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = group
                .iter()
                .map(|comm| {
                    s.spawn(move || {
                        let mut m = mesh();
                        if comm.rank() == 1 {
                            m.add_face_zone("extra").unwrap();
                        }
                        check_parallel_sync(&m, comm)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(
            results,
            vec![
                Err(BaffleError::ParallelSync { rank: 0 }),
                Err(BaffleError::ParallelSync { rank: 1 }),
            ]
        );
    }
}
