//! `faceList` selector: an explicit list of face indices.

use serde::Deserialize;

use crate::mesh_error::{ConfigError, SelectionError};
use crate::selection::registry::parse_settings;
use crate::selection::{FaceSelector, ZoneSelection};
use crate::topology::poly_mesh::PolyMesh;

pub const KIND: &str = "faceList";

#[derive(Deserialize)]
struct Settings {
    faces: Vec<usize>,
    #[serde(default)]
    flips: Option<Vec<bool>>,
}

/// Selects the listed faces with the listed flips (all `false` by default).
pub struct FaceListSelector {
    name: String,
    faces: Vec<usize>,
    flips: Vec<bool>,
    settings: serde_json::Value,
}

impl FaceListSelector {
    /// Build directly from faces and flips; `flips` shorter than `faces` is
    /// padded with `false`.
    pub fn new(name: impl Into<String>, faces: Vec<usize>, mut flips: Vec<bool>) -> Self {
        flips.resize(faces.len(), false);
        let settings = serde_json::json!({ "faces": faces, "flips": flips });
        Self {
            name: name.into(),
            faces,
            flips,
            settings,
        }
    }
}

pub(crate) fn build(
    name: &str,
    settings: &serde_json::Value,
) -> Result<Box<dyn FaceSelector>, ConfigError> {
    let parsed: Settings = parse_settings(name, KIND, settings)?;
    let flips = match parsed.flips {
        Some(flips) if flips.len() != parsed.faces.len() => {
            return Err(ConfigError::InvalidSelector {
                baffle: name.to_string(),
                kind: KIND.to_string(),
                message: format!(
                    "{} faces but {} flips",
                    parsed.faces.len(),
                    flips.len()
                ),
            });
        }
        Some(flips) => flips,
        None => vec![false; parsed.faces.len()],
    };
    Ok(Box::new(FaceListSelector {
        name: name.to_string(),
        faces: parsed.faces,
        flips,
        settings: settings.clone(),
    }))
}

impl FaceSelector for FaceListSelector {
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
        if let Some(&face) = self.faces.iter().find(|&&f| f >= mesh.n_faces()) {
            return Err(SelectionError::FaceOutOfRange {
                selector: self.name.clone(),
                face,
                n_faces: mesh.n_faces(),
            });
        }
        Ok(self
            .faces
            .iter()
            .copied()
            .zip(self.flips.iter().copied())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flips_default_to_false() {
        let mesh = PolyMesh::block([3, 1, 1], [3.0, 1.0, 1.0]).unwrap();
        let sel = build("b", &json!({"faces": [1, 0]})).unwrap();
        let picked: Vec<_> = sel.select(&mesh).unwrap().iter().collect();
        assert_eq!(picked, vec![(1, false), (0, false)]);
    }

    #[test]
    fn mismatched_flips_rejected_at_load() {
        let err = build("b", &json!({"faces": [1, 0], "flips": [true]})).err().unwrap();
        assert!(matches!(err, ConfigError::InvalidSelector { .. }));
    }

    #[test]
    fn out_of_range_face_rejected_at_select() {
        let mesh = PolyMesh::block([2, 1, 1], [2.0, 1.0, 1.0]).unwrap();
        let sel = FaceListSelector::new("b", vec![0, 99], vec![]);
        assert_eq!(
            sel.select(&mesh).unwrap_err(),
            SelectionError::FaceOutOfRange {
                selector: "b".into(),
                face: 99,
                n_faces: 11
            }
        );
    }
}
