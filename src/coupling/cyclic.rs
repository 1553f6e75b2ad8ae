use tracing::debug;

use crate::error::{ContractError, Result};
use crate::math::Point3;
use crate::operations::order::FaceOrdering;
use crate::operations::transform::TransformKind;
use crate::topology::PatchGeometry;

use super::{CoupledPatch, MatchSettings, PatchCoupling, PatchOrdering};

/// A patch coupled to itself: face `i` of the first half is the partner of
/// face `i` of the second half.
#[derive(Debug, Clone)]
pub struct CyclicPatch {
    name: String,
    geometry: PatchGeometry,
    coupling: PatchCoupling,
}

impl CyclicPatch {
    /// Creates a cyclic patch. The transform is not derived until
    /// [`CoupledPatch::calc_geometry`] runs.
    ///
    /// # Errors
    ///
    /// Returns a contract error if the patch has an odd number of faces.
    pub fn new(name: impl Into<String>, geometry: PatchGeometry) -> Result<Self> {
        let (owner, neighbour) = split_halves(&geometry)?;
        Ok(Self {
            name: name.into(),
            geometry,
            coupling: PatchCoupling::new(owner, neighbour)?,
        })
    }

    /// Sets the tolerances and diagnostics location.
    #[must_use]
    pub fn with_settings(mut self, settings: MatchSettings) -> Self {
        self.coupling = self.coupling.with_settings(settings);
        self
    }

    /// Forces the transform kind instead of detecting it.
    #[must_use]
    pub fn with_hint(mut self, hint: TransformKind) -> Self {
        self.coupling = self.coupling.with_hint(hint);
        self
    }

    /// Returns the whole patch.
    #[must_use]
    pub fn geometry(&self) -> &PatchGeometry {
        &self.geometry
    }

    /// Number of faces on each side.
    #[must_use]
    pub fn half_size(&self) -> usize {
        self.geometry.len() / 2
    }
}

impl CoupledPatch for CyclicPatch {
    fn name(&self) -> &str {
        &self.name
    }

    fn coupling(&self) -> &PatchCoupling {
        &self.coupling
    }

    fn calc_geometry(&mut self) -> Result<()> {
        let transform = self.coupling.calc_transform()?;
        debug!(
            patch = %self.name,
            kind = %transform.kind(),
            "cyclic transform derived"
        );
        Ok(())
    }

    fn init_move_points(&mut self, points: &[Point3]) -> Result<()> {
        check_point_count(&self.geometry, points)?;
        self.coupling.invalidate();
        Ok(())
    }

    fn move_points(&mut self, points: &[Point3]) -> Result<()> {
        check_point_count(&self.geometry, points)?;
        self.geometry.move_points(points.to_vec())?;
        self.coupling.move_points(points.to_vec(), points.to_vec())?;
        self.calc_geometry()
    }

    fn init_update_mesh(&mut self) -> Result<()> {
        self.coupling.invalidate();
        Ok(())
    }

    fn update_mesh(&mut self, geometry: PatchGeometry) -> Result<()> {
        let (owner, neighbour) = split_halves(&geometry)?;
        self.coupling.replace(owner, neighbour)?;
        self.geometry = geometry;
        self.calc_geometry()
    }
}

impl PatchOrdering for CyclicPatch {
    fn init_order(&mut self, candidate: &PatchGeometry) -> Result<()> {
        split_halves(candidate)?;
        if !self.coupling.is_valid() {
            self.calc_geometry()?;
        }
        Ok(())
    }

    /// The first half keeps its order; every second-half face is moved and
    /// rotated onto its first-half partner.
    fn order(&self, candidate: &PatchGeometry) -> Result<FaceOrdering> {
        let (owner, neighbour) = split_halves(candidate)?;
        let half = owner.len();
        let matched = self.coupling.order_against(&self.name, &owner, &neighbour)?;

        let face_map = (0..half)
            .chain(matched.face_map.iter().map(|&f| f + half))
            .collect();
        let rotation = std::iter::repeat_n(0, half)
            .chain(matched.rotation.iter().copied())
            .collect();
        Ok(FaceOrdering {
            face_map,
            rotation,
            changed: matched.changed,
        })
    }
}

fn split_halves(geometry: &PatchGeometry) -> Result<(PatchGeometry, PatchGeometry)> {
    let n = geometry.len();
    let half = n / 2;
    if !n.is_multiple_of(2) {
        return Err(ContractError::LengthMismatch {
            what: "cyclic second half faces",
            expected: half,
            actual: n - half,
        }
        .into());
    }
    Ok((geometry.slice(0..half)?, geometry.slice(half..n)?))
}

fn check_point_count(geometry: &PatchGeometry, points: &[Point3]) -> Result<()> {
    if points.len() == geometry.points().len() {
        Ok(())
    } else {
        Err(ContractError::LengthMismatch {
            what: "moved points",
            expected: geometry.points().len(),
            actual: points.len(),
        }
        .into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_6;

    use approx::assert_relative_eq;

    use super::*;
    use crate::error::{ClassificationError, CoupleError};
    use crate::math::tensor::rotation_about_axis;
    use crate::math::Vector3;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Owner square at z = 0 coupled to a square 5 above it, whose anchor
    /// sits on the opposite corner.
    fn two_squares() -> PatchGeometry {
        PatchGeometry::from_polygons(&[
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)],
            vec![p(1.0, 1.0, 5.0), p(1.0, 0.0, 5.0), p(0.0, 0.0, 5.0), p(0.0, 1.0, 5.0)],
        ])
        .unwrap()
    }

    /// Two faces in the y = 0 plane (normal -y) and their images turned 30°
    /// about z, with reversed winding.
    fn wedge_polygons() -> Vec<Vec<Point3>> {
        let r = rotation_about_axis(&Vector3::z(), FRAC_PI_6);
        let owner = vec![
            vec![p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(2.0, 0.0, 0.5), p(1.0, 0.0, 0.5)],
            vec![p(1.0, 0.0, 0.5), p(2.0, 0.0, 0.5), p(2.0, 0.0, 1.0), p(1.0, 0.0, 1.0)],
        ];
        let neighbour: Vec<Vec<Point3>> = owner
            .iter()
            .map(|poly| {
                let mut image: Vec<Point3> =
                    poly.iter().map(|q| Point3::from(r * q.coords)).collect();
                image[1..].reverse();
                image
            })
            .collect();
        owner.into_iter().chain(neighbour).collect()
    }

    // ── end to end ──

    #[test]
    fn offset_squares_translate_and_align() {
        let mut patch = CyclicPatch::new("squares", two_squares()).unwrap();
        patch.calc_geometry().unwrap();

        let transform = patch.transform().unwrap();
        assert_eq!(transform.kind(), TransformKind::Translational);
        assert!(patch.parallel().unwrap());
        assert_eq!(transform.separation().len(), 1);
        assert_relative_eq!(transform.separation()[0], Vector3::new(0.0, 0.0, 5.0), epsilon = 1e-12);

        let candidate = patch.geometry().clone();
        patch.init_order(&candidate).unwrap();
        let ordering = patch.order(&candidate).unwrap();
        assert_eq!(ordering.face_map, vec![0, 1]);
        assert_eq!(ordering.rotation, vec![0, 2]);
        assert!(ordering.changed);

        let aligned = ordering.apply(candidate.faces()).unwrap();
        let anchor = candidate.points()[aligned[1].vertices()[0]];
        assert_relative_eq!(anchor, p(0.0, 0.0, 5.0), epsilon = 1e-12);
    }

    #[test]
    fn wedge_is_rotational() {
        let geometry = PatchGeometry::from_polygons(&wedge_polygons()).unwrap();
        let mut patch = CyclicPatch::new("wedge", geometry).unwrap();
        patch.calc_geometry().unwrap();

        let transform = patch.transform().unwrap();
        assert_eq!(transform.kind(), TransformKind::Rotational);
        assert!(!patch.parallel().unwrap());
        assert!(!patch.separated().unwrap());
        let r = rotation_about_axis(&Vector3::z(), FRAC_PI_6);
        assert_relative_eq!(transform.forward_t()[0], r, epsilon = 1e-9);
        assert_relative_eq!(transform.reverse_t()[0], r.transpose(), epsilon = 1e-9);

        let ordering = patch.order(patch.geometry()).unwrap();
        assert_eq!(ordering, FaceOrdering::identity(4));
    }

    #[test]
    fn scrambled_wedge_is_reordered() {
        let mut polygons = wedge_polygons();
        let geometry = PatchGeometry::from_polygons(&polygons).unwrap();
        let mut patch = CyclicPatch::new("wedge", geometry).unwrap();
        patch.calc_geometry().unwrap();

        polygons.swap(2, 3);
        polygons[3].rotate_left(1);
        let candidate = PatchGeometry::from_polygons(&polygons).unwrap();

        patch.init_order(&candidate).unwrap();
        let ordering = patch.order(&candidate).unwrap();
        assert_eq!(ordering.face_map, vec![0, 1, 3, 2]);
        assert_eq!(ordering.rotation, vec![0, 0, 1, 0]);
        assert!(ordering.changed);
    }

    // ── lifecycle ──

    #[test]
    fn motion_invalidates_then_rederives() {
        let geometry = PatchGeometry::from_polygons(&wedge_polygons()).unwrap();
        let mut patch = CyclicPatch::new("wedge", geometry).unwrap();
        patch.calc_geometry().unwrap();

        let lifted: Vec<Point3> = patch
            .geometry()
            .points()
            .iter()
            .map(|q| q + Vector3::new(0.0, 0.0, 1.0))
            .collect();
        patch.init_move_points(&lifted).unwrap();
        assert!(matches!(
            patch.transform(),
            Err(CoupleError::Classification(ClassificationError::Stale))
        ));

        patch.move_points(&lifted).unwrap();
        assert_eq!(patch.transform().unwrap().kind(), TransformKind::Rotational);
        assert!(!patch.separated().unwrap());
    }

    #[test]
    fn topology_change_replaces_halves() {
        let mut patch = CyclicPatch::new("squares", two_squares()).unwrap();
        patch.calc_geometry().unwrap();

        patch.init_update_mesh().unwrap();
        assert!(patch.transform().is_err());

        let geometry = PatchGeometry::from_polygons(&wedge_polygons()).unwrap();
        patch.update_mesh(geometry).unwrap();
        assert_eq!(patch.half_size(), 2);
        assert_eq!(patch.transform().unwrap().kind(), TransformKind::Rotational);
    }

    #[test]
    fn odd_face_count_is_rejected() {
        let mut polygons = wedge_polygons();
        polygons.pop();
        let geometry = PatchGeometry::from_polygons(&polygons).unwrap();
        assert!(matches!(
            CyclicPatch::new("odd", geometry),
            Err(CoupleError::Contract(ContractError::LengthMismatch { .. }))
        ));
    }

    #[test]
    fn ordering_before_geometry_is_stale() {
        let patch = CyclicPatch::new("squares", two_squares()).unwrap();
        assert!(patch.order(patch.geometry()).is_err());
    }
}
