//! Zone Registry: one face zone per selector.

use crate::mesh_error::MeshError;
use crate::selection::assignment::ZoneAssignment;
use crate::selection::FaceSelector;
use crate::topology::poly_mesh::PolyMesh;
use crate::topology::zone::ZoneId;

/// Face zone ids of the configured selectors, in selector order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZoneRegistry {
    zones: Vec<ZoneId>,
}

impl ZoneRegistry {
    /// Find or create the face zone named after each selector.
    pub fn allocate(
        mesh: &mut PolyMesh,
        selectors: &[Box<dyn FaceSelector>],
    ) -> Result<Self, MeshError> {
        let mut zones = Vec::with_capacity(selectors.len());
        for selector in selectors {
            let id = match mesh.find_zone(selector.name()) {
                Some(id) => id,
                None => mesh.add_face_zone(selector.name())?,
            };
            zones.push(id);
        }
        Ok(Self { zones })
    }

    /// Zone ids in selector order.
    pub fn zone_ids(&self) -> &[ZoneId] {
        &self.zones
    }

    pub fn zone_of_selector(&self, selector: usize) -> ZoneId {
        self.zones[selector]
    }

    /// Replace the members of every registered zone with the faces the
    /// assignment table gives it, in increasing face order.
    ///
    /// Membership is resolved from the final table, so a face claimed by
    /// several selectors ends up only in the zone of the last one. Faces
    /// claimed by a registered zone are also dropped from any other
    /// (unregistered) mesh zone. Returns the member count per registered
    /// zone.
    pub fn materialize(&self, mesh: &mut PolyMesh, assignment: &ZoneAssignment) -> Vec<usize> {
        let mut counts = Vec::with_capacity(self.zones.len());
        for &zone in &self.zones {
            let (faces, flips): (Vec<usize>, Vec<bool>) = assignment.members(zone).unzip();
            counts.push(faces.len());
            log::info!(
                "Created zone {} at index {zone} with {} faces",
                mesh.face_zone(zone).name(),
                faces.len()
            );
            mesh.face_zone_mut(zone).set_members(faces, flips);
        }

        for zone in 0..mesh.face_zones().len() {
            if self.zones.contains(&zone) {
                continue;
            }
            let kept: Vec<(usize, bool)> = mesh
                .face_zone(zone)
                .iter()
                .filter(|&(face, _)| assignment.zone_of(face).is_none())
                .collect();
            if kept.len() != mesh.face_zone(zone).len() {
                log::debug!(
                    "zone {} lost {} faces to baffle zones",
                    mesh.face_zone(zone).name(),
                    mesh.face_zone(zone).len() - kept.len()
                );
                let (faces, flips) = kept.into_iter().unzip();
                mesh.face_zone_mut(zone).set_members(faces, flips);
            }
        }
        counts
    }
}
