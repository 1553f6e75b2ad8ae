use crate::math::Point3;
use crate::topology::Face;

/// Number of positions face `face` must be rotated so that its first vertex
/// coincides with `anchor` (within `tol`).
///
/// Rotating by `r` moves vertex `i` to position `(i + r) % n`, so a rotation
/// `r` brings vertex `(n - r) % n` to the front. The smallest such `r` whose
/// vertex lies within `tol` of the anchor is returned; `None` if no vertex
/// does.
#[must_use]
pub fn get_rotation(points: &[Point3], face: &Face, anchor: &Point3, tol: f64) -> Option<usize> {
    let n = face.len();
    (0..n).find(|&r| {
        let fp = (n - r) % n;
        points
            .get(face.vertices()[fp])
            .is_some_and(|p| (p - anchor).norm() <= tol)
    })
}

/// Distance from `anchor` to the closest vertex of `face`.
#[must_use]
pub fn anchor_distance(points: &[Point3], face: &Face, anchor: &Point3) -> f64 {
    face.vertices()
        .iter()
        .filter_map(|&v| points.get(v))
        .map(|p| (p - anchor).norm())
        .fold(f64::INFINITY, f64::min)
}
