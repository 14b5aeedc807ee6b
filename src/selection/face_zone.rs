//! `faceZone` selector: reuse the faces and flips of an existing face zone.

use serde::Deserialize;

use crate::mesh_error::{ConfigError, SelectionError};
use crate::selection::registry::parse_settings;
use crate::selection::{FaceSelector, ZoneSelection};
use crate::topology::poly_mesh::PolyMesh;

pub const KIND: &str = "faceZone";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Settings {
    zone_name: String,
}

/// Selects every member of the mesh face zone `zoneName`.
pub struct FaceZoneSelector {
    name: String,
    zone_name: String,
    settings: serde_json::Value,
}

impl FaceZoneSelector {
    pub fn new(name: impl Into<String>, zone_name: impl Into<String>) -> Self {
        let zone_name = zone_name.into();
        Self {
            name: name.into(),
            settings: serde_json::json!({ "zoneName": zone_name }),
            zone_name,
        }
    }
}

pub(crate) fn build(
    name: &str,
    settings: &serde_json::Value,
) -> Result<Box<dyn FaceSelector>, ConfigError> {
    let parsed: Settings = parse_settings(name, KIND, settings)?;
    Ok(Box::new(FaceZoneSelector {
        name: name.to_string(),
        zone_name: parsed.zone_name,
        settings: settings.clone(),
    }))
}

impl FaceSelector for FaceZoneSelector {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        KIND
    }

    fn settings(&self) -> &serde_json::Value {
        &self.settings
    }

    fn select(&self, mesh: &PolyMesh) -> Result<ZoneSelection, SelectionError> {
        let zone = mesh
            .find_zone(&self.zone_name)
            .ok_or_else(|| SelectionError::ZoneNotFound {
                selector: self.name.clone(),
                zone: self.zone_name.clone(),
            })?;
        Ok(mesh.face_zone(zone).iter().collect())
    }
}
