//! Cell-centred scalar fields carried through a baffle change.
//!
//! A [`VolField`] holds one value per cell plus one [`PatchField`] per mesh
//! patch. The store keeps every field aligned with the mesh patch list:
//! adding a patch to the mesh adds a (still empty) patch field to every
//! field, and [`FieldStore::remap`] follows a committed change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::PatchFieldSpec;
use crate::mesh_error::MeshError;
use crate::topo_change::MeshMap;
use crate::topology::patch::PatchId;
use crate::topology::poly_mesh::PolyMesh;

/// Patch field type used for patches created during a run.
pub const CALCULATED: &str = "calculated";

/// Values of a field on one patch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchField {
    #[serde(rename = "type")]
    pub kind: String,
    pub values: Vec<f64>,
}

impl PatchField {
    pub fn new(kind: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            kind: kind.into(),
            values,
        }
    }

    pub fn uniform(kind: impl Into<String>, size: usize, value: f64) -> Self {
        Self::new(kind, vec![value; size])
    }
}

/// Scalar field on cells and boundary faces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VolField {
    pub internal: Vec<f64>,
    pub boundary: Vec<PatchField>,
}

impl VolField {
    /// Same value everywhere, patch field type `kind` on every patch.
    pub fn uniform(mesh: &PolyMesh, kind: &str, value: f64) -> Self {
        Self {
            internal: vec![value; mesh.n_cells()],
            boundary: mesh
                .patches()
                .iter()
                .map(|p| PatchField::uniform(kind, p.size, value))
                .collect(),
        }
    }

    /// Value on boundary face `face` of `mesh`.
    pub fn boundary_value(&self, mesh: &PolyMesh, face: usize) -> Option<f64> {
        let patch = mesh.which_patch(face)?;
        let offset = face - mesh.patch(patch).start;
        self.boundary.get(patch)?.values.get(offset).copied()
    }

    fn check(&self, name: &str, mesh: &PolyMesh) -> Result<(), MeshError> {
        let mismatch = |reason: String| MeshError::FieldMismatch {
            field: name.to_string(),
            reason,
        };
        if self.internal.len() != mesh.n_cells() {
            return Err(mismatch(format!(
                "{} cell values for {} cells",
                self.internal.len(),
                mesh.n_cells()
            )));
        }
        if self.boundary.len() != mesh.patches().len() {
            return Err(mismatch(format!(
                "{} patch fields for {} patches",
                self.boundary.len(),
                mesh.patches().len()
            )));
        }
        for (patch, values) in mesh.patches().iter().zip(&self.boundary) {
            if values.values.len() != patch.size {
                return Err(mismatch(format!(
                    "patch `{}` has {} faces but {} values",
                    patch.name,
                    patch.size,
                    values.values.len()
                )));
            }
        }
        Ok(())
    }
}

/// Named fields of one mesh.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldStore {
    fields: BTreeMap<String, VolField>,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field after checking it fits `mesh`.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        field: VolField,
        mesh: &PolyMesh,
    ) -> Result<(), MeshError> {
        let name = name.into();
        field.check(&name, mesh)?;
        self.fields.insert(name, field);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&VolField> {
        self.fields.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check every field against `mesh`.
    pub fn check(&self, mesh: &PolyMesh) -> Result<(), MeshError> {
        self.fields
            .iter()
            .try_for_each(|(name, field)| field.check(name, mesh))
    }

    /// Give every field an empty patch field of type `kind` for a patch
    /// just inserted into the mesh at index `patch`.
    pub fn insert_patch_field(&mut self, patch: PatchId, kind: &str) {
        for field in self.fields.values_mut() {
            field.boundary.insert(patch, PatchField::new(kind, Vec::new()));
        }
    }

    /// Carry every field from `old` to `new` through `map`.
    ///
    /// Cell values are unchanged. A boundary face copies the value of its
    /// source face when that was a boundary face; faces coming from
    /// internal faces take the value of their (new) owner cell. Patch field
    /// types are kept.
    pub fn remap(&mut self, old: &PolyMesh, new: &PolyMesh, map: &MeshMap) {
        for field in self.fields.values_mut() {
            let boundary = new
                .patches()
                .iter()
                .enumerate()
                .map(|(patch_id, patch)| {
                    let kind = field
                        .boundary
                        .get(patch_id)
                        .map_or(CALCULATED, |pf| pf.kind.as_str());
                    let values = patch
                        .range()
                        .map(|face| {
                            let source = map.face_map()[face];
                            if old.is_internal_face(source) {
                                field.internal[new.owner()[face]]
                            } else {
                                field.boundary_value(old, source).unwrap_or_default()
                            }
                        })
                        .collect();
                    PatchField::new(kind, values)
                })
                .collect();
            field.boundary = boundary;
        }
    }

    /// Set every field to zero on `patch`.
    pub fn zero_patch(&mut self, patch: PatchId) {
        for field in self.fields.values_mut() {
            if let Some(pf) = field.boundary.get_mut(patch) {
                pf.values.iter_mut().for_each(|v| *v = 0.0);
            }
        }
    }

    /// Replace patch field types (and values, when given) on `patch`.
    ///
    /// Entries naming a field that is not in the store are skipped.
    pub fn set_patch_fields(&mut self, patch: PatchId, overrides: &BTreeMap<String, PatchFieldSpec>) {
        for (name, spec) in overrides {
            let Some(pf) = self
                .fields
                .get_mut(name)
                .and_then(|f| f.boundary.get_mut(patch))
            else {
                log::debug!("no field `{name}` to override on patch {patch}");
                continue;
            };
            pf.kind.clone_from(&spec.kind);
            if let Some(value) = spec.value {
                pf.values.iter_mut().for_each(|v| *v = value);
            }
        }
    }
}
