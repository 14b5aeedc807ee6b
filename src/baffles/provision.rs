//! Patch provisioning: make sure every destination patch exists.

use std::collections::BTreeMap;

use crate::config::BafflesConfig;
use crate::fields::{CALCULATED, FieldStore};
use crate::mesh_error::MeshError;
use crate::topology::patch::PatchId;
use crate::topology::poly_mesh::PolyMesh;

/// Which destination patches were created and which already existed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProvisionOutcome {
    /// Id of every destination patch, by name.
    pub ids: BTreeMap<String, PatchId>,
    /// Patches added to the mesh, in creation order.
    pub created: Vec<String>,
    /// Destination patches that were already in the mesh.
    pub existing: Vec<String>,
}

impl ProvisionOutcome {
    pub fn id(&self, name: &str) -> Result<PatchId, MeshError> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| MeshError::PatchNotFound(name.to_string()))
    }
}

/// Add an empty patch for every destination patch the mesh lacks.
///
/// Patches are visited in configuration order and placed as
/// [`PolyMesh::add_patch`] places them. A new patch takes the type
/// from its configuration entry and gets a `calculated` patch field in
/// every field of `fields`. An existing patch keeps its type; only faces
/// will be moved into it.
pub fn provision_patches(
    mesh: &mut PolyMesh,
    fields: &mut FieldStore,
    config: &BafflesConfig,
) -> Result<ProvisionOutcome, MeshError> {
    let mut outcome = ProvisionOutcome::default();
    for patch in config.baffles.iter().flat_map(|b| b.patches.iter()) {
        if outcome.ids.contains_key(&patch.name) {
            continue;
        }
        let id = match mesh.find_patch(&patch.name) {
            Some(id) => {
                log::info!(
                    "Patch '{}' already exists. Only moving patch faces - type will remain the same",
                    patch.name
                );
                outcome.existing.push(patch.name.clone());
                id
            }
            None => {
                let id = mesh.add_patch(patch.name.clone(), patch.kind.clone())?;
                log::info!(
                    "Adding new patch {} of type {} at index {}",
                    patch.name,
                    patch.kind.type_name(),
                    id
                );
                fields.insert_patch_field(id, CALCULATED);
                outcome.created.push(patch.name.clone());
                id
            }
        };
        outcome.ids.insert(patch.name.clone(), id);
    }
    // Later insertions may have moved processor patches up.
    for (name, id) in outcome.ids.iter_mut() {
        *id = mesh
            .find_patch(name)
            .ok_or_else(|| MeshError::PatchNotFound(name.clone()))?;
    }
    Ok(outcome)
}
