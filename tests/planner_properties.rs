use mesh_baffles::prelude::*;
use proptest::prelude::*;

const N_INTERNAL: usize = 12; // 3×3×1 block
const N_FACES: usize = 42;

fn prepared(selected: &[bool], flips: &[bool], pairs: usize) -> (PolyMesh, Vec<usize>, Vec<usize>, Vec<usize>) {
    let faces: Vec<usize> = (0..N_INTERNAL).filter(|&f| selected[f]).collect();
    let zone_flips: Vec<bool> = faces.iter().map(|&f| flips[f]).collect();
    let mut mesh = PolyMesh::block([3, 3, 1], [3.0, 3.0, 1.0])
        .unwrap()
        .with_face_zones(vec![FaceZone::new("z", faces.clone(), zone_flips)])
        .unwrap();
    let mut masters = Vec::new();
    let mut slaves = Vec::new();
    for i in 0..pairs {
        masters.push(mesh.add_patch(format!("m{i}"), PatchType::Wall).unwrap());
        slaves.push(mesh.add_patch(format!("s{i}"), PatchType::Wall).unwrap());
    }
    (mesh, faces, masters, slaves)
}

/// 3×3×1 block with `xMin`/`xMax` turned into a cyclic pair and every face
/// selected by `selected` in zone 0. Target pairs are cyclic when
/// `coupled_targets` is set, walls otherwise.
fn with_boundary(
    selected: &[bool],
    flips: &[bool],
    pairs: usize,
    coupled_targets: bool,
) -> (PolyMesh, Vec<usize>, Vec<usize>) {
    let faces: Vec<usize> = (0..N_FACES).filter(|&f| selected[f]).collect();
    let zone_flips: Vec<bool> = faces.iter().map(|&f| flips[f]).collect();
    let mut mesh = PolyMesh::block([3, 3, 1], [3.0, 3.0, 1.0])
        .unwrap()
        .with_face_zones(vec![FaceZone::new("z", faces, zone_flips)])
        .unwrap();
    mesh.set_patch_type(0, PatchType::Cyclic { neighbour_patch: "xMax".into() });
    mesh.set_patch_type(1, PatchType::Cyclic { neighbour_patch: "xMin".into() });

    let target = |other: String| {
        if coupled_targets {
            PatchType::Cyclic { neighbour_patch: other }
        } else {
            PatchType::Wall
        }
    };
    let mut masters = Vec::new();
    let mut slaves = Vec::new();
    for i in 0..pairs {
        masters.push(mesh.add_patch(format!("m{i}"), target(format!("s{i}"))).unwrap());
        slaves.push(mesh.add_patch(format!("s{i}"), target(format!("m{i}"))).unwrap());
    }
    (mesh, masters, slaves)
}

proptest! {
    #[test]
    fn boundary_faces_conserved_and_coupled_faces_kept(
        selected in proptest::collection::vec(any::<bool>(), N_FACES),
        flips in proptest::collection::vec(any::<bool>(), N_FACES),
        pairs in 1usize..=2,
        coupled_targets in any::<bool>(),
        internal_faces_only in any::<bool>(),
    ) {
        let (mesh, masters, slaves) = with_boundary(&selected, &flips, pairs, coupled_targets);
        prop_assert_eq!(mesh.n_faces(), N_FACES);

        let zone = mesh.face_zone(0);
        let n_internal = zone.faces().iter().filter(|&&f| mesh.is_internal_face(f)).count();
        let movable = |face: usize| {
            let Some(source) = mesh.which_patch(face) else { return false };
            let coupled = mesh.patch(source).is_coupled();
            !(coupled && coupled_targets) && (coupled || !internal_faces_only)
        };
        let n_moved = zone.faces().iter().filter(|&&f| movable(f)).count();

        let mut planner = BafflePlanner::new(&mesh, internal_faces_only);
        planner.plan_zone(0, &masters, &slaves);
        let plan = planner.finish();

        prop_assert_eq!(plan.converted, pairs * (n_internal + n_moved));
        prop_assert_eq!(plan.n_modify(), n_internal + n_moved);

        for op in &plan.operations {
            let face = op.source_face();
            if mesh.is_internal_face(face) {
                continue;
            }
            prop_assert!(movable(face));
            let source = mesh.which_patch(face).unwrap();
            prop_assert!(!(mesh.patch(source).is_coupled() && mesh.patch(op.patch()).is_coupled()));
            prop_assert!(masters.contains(&op.patch()));
            prop_assert_eq!(op.owner(), mesh.owner()[face]);
            prop_assert_eq!(op.face(), mesh.face(face));
            prop_assert!(!op.flip_flux());
            prop_assert_eq!(Some(op.zone_flip()), zone.flip_of(face));
        }

        let (new, map) = PolyTopoChange.apply(&mesh, &plan.operations).unwrap();
        prop_assert_eq!(map.n_old_faces(), N_FACES);
        prop_assert_eq!(map.n_new_faces(), N_FACES + plan.n_add());
        prop_assert_eq!(new.n_internal_faces(), N_INTERNAL - n_internal);
    }

    #[test]
    fn planner_invariants(
        selected in proptest::collection::vec(any::<bool>(), N_INTERNAL),
        flips in proptest::collection::vec(any::<bool>(), N_INTERNAL),
        pairs in 1usize..=3,
    ) {
        let (mesh, faces, masters, slaves) = prepared(&selected, &flips, pairs);
        prop_assert_eq!(mesh.n_internal_faces(), N_INTERNAL);
        let n = faces.len();

        let mut planner = BafflePlanner::new(&mesh, false);
        planner.plan_zone(0, &masters, &slaves);
        let plan = planner.finish();

        prop_assert_eq!(plan.converted, pairs * n);
        prop_assert_eq!(plan.n_modify(), n);
        prop_assert_eq!(plan.n_add(), (2 * pairs - 1) * n);

        // The first operation touching a face modifies it; no face is modified twice.
        let mut seen = vec![false; mesh.n_faces()];
        for op in &plan.operations {
            let face = op.source_face();
            prop_assert!(faces.contains(&face));
            prop_assert_eq!(op.is_modify(), !seen[face]);
            seen[face] = true;
        }

        // Pair by pair: n master operations, then n slave operations.
        for (chunk, (&m, &s)) in plan.operations.chunks(2 * n.max(1)).zip(masters.iter().zip(&slaves)) {
            if n == 0 { break; }
            prop_assert!(chunk[..n].iter().all(|op| op.patch() == m));
            prop_assert!(chunk[n..].iter().all(|op| op.patch() == s));
        }

        let (new, map) = PolyTopoChange.apply(&mesh, &plan.operations).unwrap();
        prop_assert_eq!(new.n_internal_faces(), N_INTERNAL - n);
        prop_assert_eq!(new.n_faces(), mesh.n_faces() + (2 * pairs - 1) * n);
        prop_assert_eq!(new.n_points(), mesh.n_points());
        prop_assert_eq!(new.n_cells(), mesh.n_cells());
        prop_assert_eq!(map.added_faces().len(), plan.n_add());
        prop_assert_eq!(new.face_zone(0).len(), 2 * pairs * n);
    }

    #[test]
    fn planning_is_deterministic(
        selected in proptest::collection::vec(any::<bool>(), N_INTERNAL),
        flips in proptest::collection::vec(any::<bool>(), N_INTERNAL),
    ) {
        let (mesh, _, masters, slaves) = prepared(&selected, &flips, 1);
        let run = || {
            let mut planner = BafflePlanner::new(&mesh, false);
            planner.plan_zone(0, &masters, &slaves);
            planner.finish()
        };
        prop_assert_eq!(run(), run());
    }
}
