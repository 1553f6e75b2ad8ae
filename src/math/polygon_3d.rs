use super::{Point3, Vector3, TOLERANCE};

/// Arithmetic mean of a set of points.
///
/// Returns the origin for an empty slice.
#[must_use]
pub fn average_point(points: &[Point3]) -> Point3 {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    #[allow(clippy::cast_precision_loss)]
    let inv_n = 1.0 / points.len() as f64;
    Point3::from(sum * inv_n)
}

/// Area-weighted centre of a (possibly non-planar) polygon.
///
/// The polygon is split into a triangle fan around its vertex average and the
/// triangle centroids are averaged with their areas as weights. Triangles and
/// zero-area polygons return the vertex average.
#[must_use]
pub fn polygon_centre(points: &[Point3]) -> Point3 {
    let pc = average_point(points);
    if points.len() <= 3 {
        return pc;
    }

    let n = points.len();
    let mut sum_a = 0.0;
    let mut sum_ac = Vector3::zeros();
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        let area = (b - a).cross(&(pc - a)).norm();
        sum_a += area;
        sum_ac += area * (a.coords + b.coords + pc.coords);
    }

    if sum_a < TOLERANCE * TOLERANCE {
        return pc;
    }
    Point3::from(sum_ac / (3.0 * sum_a))
}

/// Area vector of a polygon using Newell's method.
///
/// The direction follows the right-hand rule over the vertex order and the
/// magnitude is the polygon area.
#[must_use]
pub fn polygon_area_vector(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    0.5 * normal
}

/// Unit normal of a polygon, or `None` if the polygon has no area.
#[must_use]
pub fn polygon_unit_normal(points: &[Point3]) -> Option<Vector3> {
    let area = polygon_area_vector(points);
    let len = area.norm();
    if len < TOLERANCE {
        return None;
    }
    Some(area / len)
}

/// Largest distance from `centre` to any of `points`.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn max_distance_to(points: &[Point3], centre: &Point3) -> Option<f64> {
    points
        .iter()
        .map(|p| (p - centre).norm())
        .fold(None, |acc, d| Some(acc.map_or(d, |m: f64| m.max(d))))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn unit_square() -> Vec<Point3> {
        vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ]
    }

    // ── polygon_centre ──

    #[test]
    fn square_centre() {
        let c = polygon_centre(&unit_square());
        assert!((c - p(0.5, 0.5, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn triangle_centre_is_vertex_average() {
        let tri = vec![p(0.0, 0.0, 0.0), p(3.0, 0.0, 0.0), p(0.0, 3.0, 0.0)];
        let c = polygon_centre(&tri);
        assert!((c - p(1.0, 1.0, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn centre_is_area_weighted_not_vertex_weighted() {
        // Extra collinear vertex on one edge pulls the vertex average but
        // not the area centroid.
        let pts = vec![
            p(0.0, 0.0, 0.0),
            p(0.5, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ];
        let c = polygon_centre(&pts);
        assert!((c - p(0.5, 0.5, 0.0)).norm() < 1e-12, "centre = {c}");
        assert!((average_point(&pts) - p(0.5, 0.5, 0.0)).norm() > 0.05);
    }

    #[test]
    fn collapsed_polygon_centre_falls_back_to_average() {
        let pts = vec![p(2.0, 2.0, 2.0); 4];
        let c = polygon_centre(&pts);
        assert!((c - p(2.0, 2.0, 2.0)).norm() < TOLERANCE);
    }

    // ── polygon_area_vector ──

    #[test]
    fn square_area_vector_points_up() {
        let a = polygon_area_vector(&unit_square());
        assert!((a - Vector3::new(0.0, 0.0, 1.0)).norm() < TOLERANCE);
    }

    #[test]
    fn reversed_square_points_down() {
        let mut sq = unit_square();
        sq.reverse();
        let n = polygon_unit_normal(&sq).unwrap();
        assert!((n + Vector3::z()).norm() < TOLERANCE);
    }

    #[test]
    fn collinear_polygon_has_no_normal() {
        let pts = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)];
        assert!(polygon_unit_normal(&pts).is_none());
    }

    // ── max_distance_to ──

    #[test]
    fn max_distance_of_square_is_half_diagonal() {
        let d = max_distance_to(&unit_square(), &p(0.5, 0.5, 0.0)).unwrap();
        assert!((d - 0.5_f64.sqrt()).abs() < TOLERANCE);
    }

    #[test]
    fn max_distance_of_nothing_is_none() {
        assert!(max_distance_to(&[], &p(0.0, 0.0, 0.0)).is_none());
    }
}
