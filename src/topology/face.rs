//! `Face`: an ordered loop of point indices.
//!
//! The point order fixes the face orientation. For an internal face the
//! right-hand-rule normal points from the owner cell into the neighbour cell;
//! reversing the face swaps which cell sees it as outward.

use serde::{Deserialize, Serialize};

/// Ordered point indices of a polygonal face.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Face(Vec<usize>);

impl Face {
    pub fn new(points: impl Into<Vec<usize>>) -> Self {
        Face(points.into())
    }

    /// Point indices in face order.
    #[inline]
    pub fn points(&self) -> &[usize] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The same face with opposite orientation.
    ///
    /// The first point is kept and the remaining points are reversed, so the
    /// reversed face still starts at the same vertex.
    pub fn reverse_face(&self) -> Face {
        let mut out = Vec::with_capacity(self.0.len());
        if let Some((&first, rest)) = self.0.split_first() {
            out.push(first);
            out.extend(rest.iter().rev().copied());
        }
        Face(out)
    }

    /// Average of the face points.
    pub fn average_point(&self, points: &[[f64; 3]]) -> [f64; 3] {
        let mut sum = [0.0; 3];
        for &p in &self.0 {
            for (s, x) in sum.iter_mut().zip(points[p]) {
                *s += x;
            }
        }
        let n = self.0.len().max(1) as f64;
        sum.map(|s| s / n)
    }

    /// Area-weighted centre from a triangle fan about the point average.
    pub fn centre(&self, points: &[[f64; 3]]) -> [f64; 3] {
        let apex = self.average_point(points);
        let mut weighted = [0.0; 3];
        let mut total = 0.0;
        for (a, b) in self.edges() {
            let (pa, pb) = (points[a], points[b]);
            let tri_normal = cross(sub(pa, apex), sub(pb, apex));
            let area = norm(tri_normal);
            let tri_centre = [
                (apex[0] + pa[0] + pb[0]) / 3.0,
                (apex[1] + pa[1] + pb[1]) / 3.0,
                (apex[2] + pa[2] + pb[2]) / 3.0,
            ];
            for (w, c) in weighted.iter_mut().zip(tri_centre) {
                *w += area * c;
            }
            total += area;
        }
        if total > f64::EPSILON {
            weighted.map(|w| w / total)
        } else {
            apex
        }
    }

    /// Area vector (right-hand rule over the point order).
    pub fn area_normal(&self, points: &[[f64; 3]]) -> [f64; 3] {
        let apex = self.average_point(points);
        let mut n = [0.0; 3];
        for (a, b) in self.edges() {
            let tri = cross(sub(points[a], apex), sub(points[b], apex));
            for (ni, ti) in n.iter_mut().zip(tri) {
                *ni += 0.5 * ti;
            }
        }
        n
    }

    /// Consecutive point pairs, closing the loop.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.0.len();
        (0..n).map(move |i| (self.0[i], self.0[(i + 1) % n]))
    }
}

impl From<Vec<usize>> for Face {
    fn from(points: Vec<usize>) -> Self {
        Face(points)
    }
}

pub(crate) fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> (Vec<[f64; 3]>, Face) {
        let pts = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        (pts, Face::new(vec![0, 1, 2, 3]))
    }

    #[test]
    fn reverse_keeps_first_point() {
        let f = Face::new(vec![4, 5, 6, 7]);
        assert_eq!(f.reverse_face().points(), &[4, 7, 6, 5]);
        assert_eq!(f.reverse_face().reverse_face(), f);
    }

    #[test]
    fn square_centre_and_normal() {
        let (pts, f) = unit_square();
        let c = f.centre(&pts);
        assert!((c[0] - 0.5).abs() < 1e-12 && (c[1] - 0.5).abs() < 1e-12);
        let n = f.area_normal(&pts);
        assert!((n[2] - 1.0).abs() < 1e-12);
        let r = f.reverse_face().area_normal(&pts);
        assert!((r[2] + 1.0).abs() < 1e-12);
    }
}
