//! `plane` selector: faces cut by an infinite plane.
//!
//! An internal face is selected when the segment between its owner and
//! neighbour cell centres strictly crosses the plane. Its flip is set when
//! that segment runs against the plane normal, so the zone front always
//! faces along `normal`. With `includeBoundary`, boundary faces are tested
//! with the segment from the owner centre to the face centre.

use serde::Deserialize;

use crate::mesh_error::{ConfigError, SelectionError};
use crate::selection::registry::parse_settings;
use crate::selection::{FaceSelector, ZoneSelection};
use crate::topology::face::{dot, sub};
use crate::topology::poly_mesh::PolyMesh;

pub const KIND: &str = "plane";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Settings {
    point: [f64; 3],
    normal: [f64; 3],
    #[serde(default)]
    include_boundary: bool,
}

pub struct PlaneSelector {
    name: String,
    point: [f64; 3],
    normal: [f64; 3],
    include_boundary: bool,
    settings: serde_json::Value,
}

impl PlaneSelector {
    pub fn new(
        name: impl Into<String>,
        point: [f64; 3],
        normal: [f64; 3],
        include_boundary: bool,
    ) -> Self {
        let settings = serde_json::json!({
            "point": point,
            "normal": normal,
            "includeBoundary": include_boundary,
        });
        Self {
            name: name.into(),
            point,
            normal,
            include_boundary,
            settings,
        }
    }

    fn signed_distance(&self, x: [f64; 3]) -> f64 {
        dot(self.normal, sub(x, self.point))
    }
}

pub(crate) fn build(
    name: &str,
    settings: &serde_json::Value,
) -> Result<Box<dyn FaceSelector>, ConfigError> {
    let parsed: Settings = parse_settings(name, KIND, settings)?;
    if dot(parsed.normal, parsed.normal) <= f64::EPSILON {
        return Err(ConfigError::InvalidSelector {
            baffle: name.to_string(),
            kind: KIND.to_string(),
            message: "plane normal has zero length".to_string(),
        });
    }
    let mut selector = PlaneSelector::new(
        name,
        parsed.point,
        parsed.normal,
        parsed.include_boundary,
    );
    selector.settings = settings.clone();
    Ok(Box::new(selector))
}

impl FaceSelector for PlaneSelector {
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
        let centres = mesh.cell_centres();
        let mut out = ZoneSelection::new();

        for face in 0..mesh.n_internal_faces() {
            let own = centres[mesh.owner()[face]];
            let nbr = centres[mesh.neighbour()[face]];
            let (d_own, d_nbr) = (self.signed_distance(own), self.signed_distance(nbr));
            if d_own * d_nbr < 0.0 {
                out.push(face, d_nbr < d_own);
            }
        }

        if self.include_boundary {
            for face in mesh.n_internal_faces()..mesh.n_faces() {
                let own = centres[mesh.owner()[face]];
                let fc = mesh.face(face).centre(mesh.points());
                let (d_own, d_face) = (self.signed_distance(own), self.signed_distance(fc));
                if d_own != 0.0 && d_own * d_face <= 0.0 {
                    out.push(face, d_face < d_own);
                }
            }
        }

        log::debug!("plane selector `{}` picked {} faces", self.name, out.len());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_plane_of_block() {
        let mesh = PolyMesh::block([2, 2, 2], [1.0, 1.0, 1.0]).unwrap();
        let sel = PlaneSelector::new("b", [0.5, 0.0, 0.0], [1.0, 0.0, 0.0], false);
        let picked: Vec<_> = sel.select(&mesh).unwrap().iter().collect();
        assert_eq!(picked.len(), 4);
        assert!(picked.iter().all(|&(f, flip)| mesh.is_internal_face(f) && !flip));

        let reversed = PlaneSelector::new("b", [0.5, 0.0, 0.0], [-1.0, 0.0, 0.0], false);
        assert!(reversed.select(&mesh).unwrap().iter().all(|(_, flip)| flip));
    }

    #[test]
    fn boundary_faces_on_plane() {
        let mesh = PolyMesh::block([2, 1, 1], [2.0, 1.0, 1.0]).unwrap();
        let sel = PlaneSelector::new("b", [2.0, 0.0, 0.0], [1.0, 0.0, 0.0], true);
        let picked: Vec<_> = sel.select(&mesh).unwrap().iter().collect();
        let x_max = mesh.find_patch("xMax").unwrap();
        assert_eq!(picked, vec![(mesh.patch(x_max).start, false)]);
    }

    #[test]
    fn zero_normal_rejected() {
        let settings = serde_json::json!({"point": [0.0, 0.0, 0.0], "normal": [0.0, 0.0, 0.0]});
        assert!(build("b", &settings).is_err());
    }
}
