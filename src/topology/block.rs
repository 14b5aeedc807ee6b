//! Structured hexahedral block meshes.
//!
//! Generates an `nx × ny × nz` box of hex cells as a [`PolyMesh`] with the
//! six sides as patches `xMin, xMax, yMin, yMax, zMin, zMax` (all of type
//! `patch`). Internal faces come out in upper-triangular order: sorted by
//! owner, then by neighbour.

use crate::mesh_error::MeshError;
use crate::topology::face::Face;
use crate::topology::patch::{Patch, PatchType};
use crate::topology::poly_mesh::PolyMesh;

/// Names of the six block sides, in patch order.
pub const BLOCK_PATCHES: [&str; 6] = ["xMin", "xMax", "yMin", "yMax", "zMin", "zMax"];

struct Lattice {
    n: [usize; 3],
}

impl Lattice {
    fn point(&self, i: usize, j: usize, k: usize) -> usize {
        i + (self.n[0] + 1) * (j + (self.n[1] + 1) * k)
    }

    fn cell(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.n[0] * (j + self.n[1] * k)
    }

    /// Face on the `x = i` plane, normal +x.
    fn x_face(&self, i: usize, j: usize, k: usize) -> Face {
        Face::new(vec![
            self.point(i, j, k),
            self.point(i, j + 1, k),
            self.point(i, j + 1, k + 1),
            self.point(i, j, k + 1),
        ])
    }

    /// Face on the `y = j` plane, normal +y.
    fn y_face(&self, i: usize, j: usize, k: usize) -> Face {
        Face::new(vec![
            self.point(i, j, k),
            self.point(i, j, k + 1),
            self.point(i + 1, j, k + 1),
            self.point(i + 1, j, k),
        ])
    }

    /// Face on the `z = k` plane, normal +z.
    fn z_face(&self, i: usize, j: usize, k: usize) -> Face {
        Face::new(vec![
            self.point(i, j, k),
            self.point(i + 1, j, k),
            self.point(i + 1, j + 1, k),
            self.point(i, j + 1, k),
        ])
    }
}

impl PolyMesh {
    /// Build a structured box of `cells[0] × cells[1] × cells[2]` hexahedra
    /// spanning `[0, lengths[d]]` in each direction.
    pub fn block(cells: [usize; 3], lengths: [f64; 3]) -> Result<PolyMesh, MeshError> {
        if cells.contains(&0) {
            return Err(MeshError::InvalidBlock(format!(
                "cell counts must be positive, got {cells:?}"
            )));
        }
        if lengths.iter().any(|&l| l.is_nan() || l <= 0.0) {
            return Err(MeshError::InvalidBlock(format!(
                "lengths must be positive, got {lengths:?}"
            )));
        }
        let [nx, ny, nz] = cells;
        let lat = Lattice { n: cells };

        let mut points = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
        for k in 0..=nz {
            for j in 0..=ny {
                for i in 0..=nx {
                    points.push([
                        lengths[0] * i as f64 / nx as f64,
                        lengths[1] * j as f64 / ny as f64,
                        lengths[2] * k as f64 / nz as f64,
                    ]);
                }
            }
        }

        let mut faces = Vec::new();
        let mut owner = Vec::new();
        let mut neighbour = Vec::new();

        // Cells in index order; for each, the +x, +y, +z neighbours have
        // increasing index, so the result is upper-triangular.
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let c = lat.cell(i, j, k);
                    if i + 1 < nx {
                        faces.push(lat.x_face(i + 1, j, k));
                        owner.push(c);
                        neighbour.push(lat.cell(i + 1, j, k));
                    }
                    if j + 1 < ny {
                        faces.push(lat.y_face(i, j + 1, k));
                        owner.push(c);
                        neighbour.push(lat.cell(i, j + 1, k));
                    }
                    if k + 1 < nz {
                        faces.push(lat.z_face(i, j, k + 1));
                        owner.push(c);
                        neighbour.push(lat.cell(i, j, k + 1));
                    }
                }
            }
        }

        let mut patches = Vec::with_capacity(6);
        let mut push_patch = |name: &str,
                              side: Vec<(Face, usize)>,
                              faces: &mut Vec<Face>,
                              owner: &mut Vec<usize>| {
            let start = faces.len();
            let size = side.len();
            for (f, c) in side {
                faces.push(f);
                owner.push(c);
            }
            patches.push(Patch::new(name, PatchType::Patch, start, size));
        };

        let mut x_min = Vec::new();
        let mut x_max = Vec::new();
        for k in 0..nz {
            for j in 0..ny {
                x_min.push((lat.x_face(0, j, k).reverse_face(), lat.cell(0, j, k)));
                x_max.push((lat.x_face(nx, j, k), lat.cell(nx - 1, j, k)));
            }
        }
        let mut y_min = Vec::new();
        let mut y_max = Vec::new();
        for k in 0..nz {
            for i in 0..nx {
                y_min.push((lat.y_face(i, 0, k).reverse_face(), lat.cell(i, 0, k)));
                y_max.push((lat.y_face(i, ny, k), lat.cell(i, ny - 1, k)));
            }
        }
        let mut z_min = Vec::new();
        let mut z_max = Vec::new();
        for j in 0..ny {
            for i in 0..nx {
                z_min.push((lat.z_face(i, j, 0).reverse_face(), lat.cell(i, j, 0)));
                z_max.push((lat.z_face(i, j, nz), lat.cell(i, j, nz - 1)));
            }
        }

        for (name, side) in BLOCK_PATCHES
            .iter()
            .zip([x_min, x_max, y_min, y_max, z_min, z_max])
        {
            push_patch(name, side, &mut faces, &mut owner);
        }

        PolyMesh::new(points, faces, owner, neighbour, patches)
    }
}
