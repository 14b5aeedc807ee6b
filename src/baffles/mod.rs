//! Baffle creation pipeline.
//!
//! [`create_baffles`] runs the stages in order:
//!
//! 1. build the selectors of every baffle entry;
//! 2. allocate one face zone per entry and resolve zone membership;
//! 3. provision the destination patches;
//! 4. check that patches and zones agree across workers;
//! 5. plan the face operations;
//! 6. commit them through a [`TopoCommitter`];
//! 7. carry the fields over, zero-fill patches that were empty before the
//!    change and apply the configured patch field overrides.
//!
//! Nothing observable changes unless every stage succeeds: the function
//! works on copies and only hands back the new mesh and fields at the end.

pub mod operation;
pub mod planner;
pub mod provision;

pub use operation::FaceOperation;
pub use planner::{BafflePlan, BafflePlanner, BoundaryConversion};
pub use provision::{ProvisionOutcome, provision_patches};

use itertools::Itertools;

use crate::algs::communicator::Communicator;
use crate::algs::parallel_sync::check_parallel_sync;
use crate::config::BafflesConfig;
use crate::fields::FieldStore;
use crate::mesh_error::BaffleError;
use crate::selection::{ZoneRegistry, assign_zones};
use crate::topo_change::{MeshMap, TopoCommitter};
use crate::topology::poly_mesh::PolyMesh;

/// Boundary faces of one patch that were re-routed into a baffle patch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryConversionReport {
    pub zone: String,
    pub source_patch: String,
    pub target_patch: String,
}

/// Summary of a baffle run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BaffleReport {
    /// Faces converted into boundary faces, summed over all workers.
    pub converted: u64,
    /// Every destination patch, sorted by name.
    pub target_patches: Vec<String>,
    /// Destination patches that had to be created.
    pub created_patches: Vec<String>,
    /// Member count of each baffle zone, in configuration order.
    pub zone_sizes: Vec<(String, usize)>,
    pub boundary_conversions: Vec<BoundaryConversionReport>,
    /// Destination patches whose fields were reset to zero.
    pub zero_filled_patches: Vec<String>,
    pub n_modified: usize,
    pub n_added: usize,
}

/// Everything a successful run produces.
#[derive(Clone, Debug)]
pub struct BaffleOutcome {
    pub mesh: PolyMesh,
    /// Fields on the new mesh; empty when the run was told to skip fields.
    pub fields: FieldStore,
    pub map: MeshMap,
    pub report: BaffleReport,
}

/// Convert the faces selected by `config` into baffles.
///
/// `fields` must match `mesh` (checked unless fields are skipped).
pub fn create_baffles<T, C>(
    mesh: &PolyMesh,
    fields: &FieldStore,
    config: &BafflesConfig,
    committer: &T,
    comm: &C,
) -> Result<BaffleOutcome, BaffleError>
where
    T: TopoCommitter + ?Sized,
    C: Communicator + ?Sized,
{
    config.validate()?;
    let mut mesh = mesh.clone();
    let mut fields = if config.no_fields {
        FieldStore::new()
    } else {
        fields.check(&mesh)?;
        fields.clone()
    };

    let selectors = config.build_selectors()?;
    let registry = ZoneRegistry::allocate(&mut mesh, &selectors)?;
    let assignment = assign_zones(&mesh, &selectors, registry.zone_ids())?;
    let counts = registry.materialize(&mut mesh, &assignment);

    let provisioned = provision_patches(&mut mesh, &mut fields, config)?;
    check_parallel_sync(&mesh, comm)?;

    let mut planner = BafflePlanner::new(&mesh, config.internal_faces_only);
    for (index, baffle) in config.baffles.iter().enumerate() {
        let masters = baffle
            .master_patches()
            .map(|p| provisioned.id(&p.name))
            .collect::<Result<Vec<_>, _>>()?;
        let slaves = baffle
            .slave_patches()
            .map(|p| provisioned.id(&p.name))
            .collect::<Result<Vec<_>, _>>()?;
        planner.plan_zone(registry.zone_of_selector(index), &masters, &slaves);
    }
    let plan = planner.finish();

    let boundary_conversions: Vec<BoundaryConversionReport> = plan
        .boundary_conversions
        .iter()
        .map(|c| BoundaryConversionReport {
            zone: mesh.face_zone(c.zone).name().to_string(),
            source_patch: mesh.patch(c.source_patch).name.clone(),
            target_patch: mesh.patch(c.target_patch).name.clone(),
        })
        .collect();
    for c in &boundary_conversions {
        log::warn!(
            "Found boundary face (in patch {}) in faceZone {} to convert to baffle patch {}. \
             Set internalFacesOnly to true if you don't wish to convert boundary faces.",
            c.source_patch,
            c.zone,
            c.target_patch
        );
    }

    let converted = comm.all_reduce_sum(plan.converted as u64);
    let target_patches: Vec<String> = provisioned.ids.keys().cloned().collect();
    log::info!(
        "Converted {converted} faces into boundary faces in patches ({})",
        target_patches.iter().join(" ")
    );

    let (new_mesh, map) = committer.apply(&mesh, &plan.operations)?;

    let mut zero_filled_patches = Vec::new();
    if !config.no_fields {
        fields.remap(&mesh, &new_mesh, &map);

        for (name, &id) in &provisioned.ids {
            if map.was_empty_before_change(id) {
                fields.zero_patch(id);
                zero_filled_patches.push(name.clone());
            }
        }
        if !zero_filled_patches.is_empty() {
            log::warn!(
                "Setting field values on previously empty patches ({}) to zero",
                zero_filled_patches.iter().join(" ")
            );
        }

        for patch in config.baffles.iter().flat_map(|b| b.patches.iter()) {
            if !patch.patch_fields.is_empty() {
                fields.set_patch_fields(provisioned.id(&patch.name)?, &patch.patch_fields);
            }
        }
    }

    let report = BaffleReport {
        converted,
        target_patches,
        created_patches: provisioned.created,
        zone_sizes: config
            .baffles
            .iter()
            .map(|b| b.name.clone())
            .zip(counts)
            .collect(),
        boundary_conversions,
        zero_filled_patches,
        n_modified: plan.n_modify(),
        n_added: plan.n_add(),
    };
    Ok(BaffleOutcome {
        mesh: new_mesh,
        fields,
        map,
        report,
    })
}
