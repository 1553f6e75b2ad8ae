use tracing::debug;

use crate::error::{ClassificationError, ContractError, Result};
use crate::math::{Point3, Tensor, Vector3};
use crate::operations::order::{FaceOrderer, FaceOrdering};
use crate::operations::transform::{
    CalcTransformTensors, CoupledFaceData, CouplingTransform, TransformKind,
};
use crate::topology::PatchGeometry;

use super::MatchSettings;

/// The two sides of a coupled interface and the transform between them.
///
/// The transform is cached: it is computed by
/// [`PatchCoupling::calc_transform`] and dropped whenever the geometry
/// changes, after which reading it is a [`ClassificationError::Stale`] error
/// until it is recomputed.
#[derive(Debug, Clone)]
pub struct PatchCoupling {
    owner: PatchGeometry,
    neighbour: PatchGeometry,
    settings: MatchSettings,
    hint: TransformKind,
    transform: Option<CouplingTransform>,
}

impl PatchCoupling {
    /// Couples `owner` face `i` with `neighbour` face `i`.
    ///
    /// # Errors
    ///
    /// Returns a contract error if the sides have different face counts.
    pub fn new(owner: PatchGeometry, neighbour: PatchGeometry) -> Result<Self> {
        check_sizes(&owner, &neighbour)?;
        Ok(Self {
            owner,
            neighbour,
            settings: MatchSettings::default(),
            hint: TransformKind::Unknown,
            transform: None,
        })
    }

    /// Sets the tolerances and diagnostics location.
    #[must_use]
    pub fn with_settings(mut self, settings: MatchSettings) -> Self {
        self.settings = settings;
        self.transform = None;
        self
    }

    /// Forces the transform kind instead of detecting it.
    #[must_use]
    pub fn with_hint(mut self, hint: TransformKind) -> Self {
        self.hint = hint;
        self.transform = None;
        self
    }

    /// Returns the owner side.
    #[must_use]
    pub fn owner(&self) -> &PatchGeometry {
        &self.owner
    }

    /// Returns the neighbour side.
    #[must_use]
    pub fn neighbour(&self) -> &PatchGeometry {
        &self.neighbour
    }

    /// Returns the active settings.
    #[must_use]
    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// Returns the transform kind hint.
    #[must_use]
    pub fn hint(&self) -> TransformKind {
        self.hint
    }

    /// Returns `true` if a transform is cached for the current geometry.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.transform.is_some()
    }

    /// Classifies the coupling and caches the resulting transform.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid settings or a coupling that matches
    /// neither a rotation nor a translation (or not the hinted one). The
    /// previous transform is discarded either way.
    pub fn calc_transform(&mut self) -> Result<&CouplingTransform> {
        self.transform = None;
        self.settings.validate()?;
        let small_dist = self.owner.tolerances(self.settings.match_tol)?;
        let data = CoupledFaceData::from_patches(&self.owner, &self.neighbour, &small_dist);
        let transform = CalcTransformTensors::new(data)
            .with_abs_tol(self.settings.abs_tol)
            .with_hint(self.hint)
            .execute()?;
        Ok(&*self.transform.insert(transform))
    }

    /// Returns the cached transform.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::Stale`] if the geometry changed since the
    /// last [`PatchCoupling::calc_transform`].
    pub fn transform(&self) -> Result<&CouplingTransform> {
        self.transform
            .as_ref()
            .ok_or_else(|| ClassificationError::Stale.into())
    }

    /// Are the coupled planes parallel?
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::Stale`] if the transform is not current.
    pub fn parallel(&self) -> Result<bool> {
        Ok(self.transform()?.parallel())
    }

    /// Are the coupled planes separated by an offset?
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::Stale`] if the transform is not current.
    pub fn separated(&self) -> Result<bool> {
        Ok(self.transform()?.separated())
    }

    /// Offset field, neighbour minus owner.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::Stale`] if the transform is not current.
    pub fn separation(&self) -> Result<&[Vector3]> {
        Ok(self.transform()?.separation())
    }

    /// Owner-to-neighbour tensors.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::Stale`] if the transform is not current.
    pub fn forward_t(&self) -> Result<&[Tensor]> {
        Ok(self.transform()?.forward_t())
    }

    /// Neighbour-to-owner tensors.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::Stale`] if the transform is not current.
    pub fn reverse_t(&self) -> Result<&[Tensor]> {
        Ok(self.transform()?.reverse_t())
    }

    /// Drops the cached transform.
    pub fn invalidate(&mut self) {
        if self.transform.take().is_some() {
            debug!(faces = self.owner.len(), "coupling transform invalidated");
        }
    }

    /// Moves the points of both sides and drops the cached transform.
    ///
    /// # Errors
    ///
    /// Returns a contract error if either point count changes. Nothing is
    /// moved in that case.
    pub fn move_points(&mut self, owner: Vec<Point3>, neighbour: Vec<Point3>) -> Result<()> {
        for (what, expected, actual) in [
            ("moved owner points", self.owner.points().len(), owner.len()),
            ("moved neighbour points", self.neighbour.points().len(), neighbour.len()),
        ] {
            if expected != actual {
                return Err(ContractError::LengthMismatch {
                    what,
                    expected,
                    actual,
                }
                .into());
            }
        }
        self.invalidate();
        self.owner.move_points(owner)?;
        self.neighbour.move_points(neighbour)
    }

    /// Replaces both sides after a topology change and drops the cached
    /// transform.
    ///
    /// # Errors
    ///
    /// Returns a contract error if the sides have different face counts.
    pub fn replace(&mut self, owner: PatchGeometry, neighbour: PatchGeometry) -> Result<()> {
        check_sizes(&owner, &neighbour)?;
        self.invalidate();
        self.owner = owner;
        self.neighbour = neighbour;
        Ok(())
    }

    /// Builds a face orderer from the settings, dumping diagnostics under
    /// `name` if a directory is configured.
    #[must_use]
    pub fn orderer(&self, name: &str) -> FaceOrderer {
        let orderer = FaceOrderer::new(self.settings.match_tol);
        match &self.settings.diagnostics_dir {
            Some(dir) => orderer.with_diagnostics(dir.clone(), name),
            None => orderer,
        }
    }

    /// Orders `candidate`, a neighbour-side face set in any order, against the
    /// owner side.
    ///
    /// # Errors
    ///
    /// See [`PatchCoupling::order_against`].
    pub fn order_neighbour(&self, name: &str, candidate: &PatchGeometry) -> Result<FaceOrdering> {
        self.order_against(name, &self.owner, candidate)
    }

    /// Orders the neighbour-side faces `candidate` against the owner-side faces
    /// `owner`.
    ///
    /// `owner` keeps its face order, so it is the side moved into the
    /// neighbour frame: a per-face separation is looked up by owner face and
    /// the candidate is matched where it lies.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::Stale`] if the transform is not current,
    /// a contract error if `owner` does not fit a per-face separation, and any
    /// error of [`FaceOrderer::order`].
    pub fn order_against(
        &self,
        name: &str,
        owner: &PatchGeometry,
        candidate: &PatchGeometry,
    ) -> Result<FaceOrdering> {
        let transform = self.transform()?;
        let separation = transform.separation().len();
        if separation > 1 && separation != owner.len() {
            return Err(ContractError::LengthMismatch {
                what: "owner faces for per-face separation",
                expected: separation,
                actual: owner.len(),
            }
            .into());
        }
        let in_neighbour_frame =
            owner.map_face_points(|face, p| transform.to_neighbour_frame(face, p))?;
        self.orderer(name).order(&in_neighbour_frame, candidate)
    }
}

fn check_sizes(owner: &PatchGeometry, neighbour: &PatchGeometry) -> Result<()> {
    if owner.len() == neighbour.len() {
        Ok(())
    } else {
        Err(ContractError::LengthMismatch {
            what: "neighbour faces",
            expected: owner.len(),
            actual: neighbour.len(),
        }
        .into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::error::CoupleError;
    use crate::topology::Face;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Unit square at height `z`; `flip` reverses the winding (normal -z).
    fn square(x: f64, z: f64, flip: bool) -> Vec<Point3> {
        let mut pts = vec![p(x, 0.0, z), p(x + 1.0, 0.0, z), p(x + 1.0, 1.0, z), p(x, 1.0, z)];
        if flip {
            pts[1..].reverse();
        }
        pts
    }

    /// Two unit squares at z = 0 coupled to their copies at z = 2.
    fn slab() -> PatchCoupling {
        let owner =
            PatchGeometry::from_polygons(&[square(0.0, 0.0, false), square(1.0, 0.0, false)])
                .unwrap();
        let neighbour =
            PatchGeometry::from_polygons(&[square(0.0, 2.0, true), square(1.0, 2.0, true)])
                .unwrap();
        PatchCoupling::new(owner, neighbour).unwrap()
    }

    // ── cache ──

    #[test]
    fn transform_is_stale_until_computed() {
        let coupling = slab();
        assert!(!coupling.is_valid());
        assert!(matches!(
            coupling.transform(),
            Err(CoupleError::Classification(ClassificationError::Stale))
        ));
    }

    #[test]
    fn translation_is_detected() {
        let mut coupling = slab();
        coupling.calc_transform().unwrap();
        assert!(coupling.parallel().unwrap());
        assert!(coupling.separated().unwrap());
        let s = coupling.separation().unwrap();
        assert_eq!(s.len(), 1);
        assert_relative_eq!(s[0], Vector3::new(0.0, 0.0, 2.0), epsilon = 1e-12);
        assert!(coupling.forward_t().unwrap().is_empty());
        assert!(coupling.reverse_t().unwrap().is_empty());
    }

    #[test]
    fn moving_points_invalidates_cache() {
        let mut coupling = slab();
        coupling.calc_transform().unwrap();
        let owner = coupling.owner().points().to_vec();
        let neighbour: Vec<Point3> = coupling
            .neighbour()
            .points()
            .iter()
            .map(|q| q + Vector3::new(0.0, 0.0, 1.0))
            .collect();
        coupling.move_points(owner, neighbour).unwrap();
        assert!(coupling.separated().is_err());

        coupling.calc_transform().unwrap();
        assert_relative_eq!(
            coupling.separation().unwrap()[0],
            Vector3::new(0.0, 0.0, 3.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn bad_move_keeps_geometry() {
        let mut coupling = slab();
        coupling.calc_transform().unwrap();
        let owner = coupling.owner().points().to_vec();
        assert!(coupling.move_points(owner, vec![]).is_err());
        assert!(coupling.is_valid());
    }

    #[test]
    fn failed_classification_leaves_cache_empty() {
        // Both sides face +z, so they cannot be translated onto each other.
        let owner = PatchGeometry::from_polygons(&[square(0.0, 0.0, false)]).unwrap();
        let neighbour = PatchGeometry::from_polygons(&[square(0.0, 2.0, false)]).unwrap();
        let mut coupling = PatchCoupling::new(owner, neighbour)
            .unwrap()
            .with_hint(TransformKind::Translational);
        assert!(coupling.calc_transform().is_err());
        assert!(!coupling.is_valid());
    }

    #[test]
    fn mismatched_sides_are_rejected() {
        let owner = PatchGeometry::from_polygons(&[square(0.0, 0.0, false)]).unwrap();
        let neighbour =
            PatchGeometry::from_polygons(&[square(0.0, 1.0, true), square(1.0, 1.0, true)])
                .unwrap();
        assert!(PatchCoupling::new(owner, neighbour).is_err());
    }

    // ── ordering ──

    #[test]
    fn swapped_neighbour_is_ordered() {
        let mut coupling = slab();
        coupling.calc_transform().unwrap();

        // Neighbour faces swapped and the second one re-anchored.
        let points = coupling.neighbour().points().to_vec();
        let candidate = PatchGeometry::new(
            vec![Face::new(vec![5, 6, 7, 4]), Face::new(vec![0, 1, 2, 3])],
            points,
        )
        .unwrap();

        let ordering = coupling.order_neighbour("slab", &candidate).unwrap();
        assert_eq!(ordering.face_map, vec![1, 0]);
        assert_eq!(ordering.rotation, vec![0, 1]);
        assert!(ordering.changed);
    }

    #[test]
    fn per_face_separation_follows_owner_faces() {
        let owner =
            PatchGeometry::from_polygons(&[square(0.0, 0.0, false), square(1.0, 0.0, false)])
                .unwrap();
        let neighbour =
            PatchGeometry::from_polygons(&[square(0.0, 1.0, true), square(1.0, 2.0, true)])
                .unwrap();
        let mut coupling = PatchCoupling::new(owner, neighbour).unwrap();
        coupling.calc_transform().unwrap();
        assert_eq!(coupling.separation().unwrap().len(), 2);

        let in_order = coupling.neighbour().clone();
        let ordering = coupling.order_neighbour("steps", &in_order).unwrap();
        assert_eq!(ordering.face_map, vec![0, 1]);
        assert!(!ordering.changed);

        let points = coupling.neighbour().points().to_vec();
        let swapped = PatchGeometry::new(
            vec![Face::new(vec![4, 5, 6, 7]), Face::new(vec![0, 1, 2, 3])],
            points,
        )
        .unwrap();
        let ordering = coupling.order_neighbour("steps", &swapped).unwrap();
        assert_eq!(ordering.face_map, vec![1, 0]);
        assert_eq!(ordering.rotation, vec![0, 0]);
        assert!(ordering.changed);
    }

    #[test]
    fn per_face_separation_needs_matching_owner() {
        let owner =
            PatchGeometry::from_polygons(&[square(0.0, 0.0, false), square(1.0, 0.0, false)])
                .unwrap();
        let neighbour =
            PatchGeometry::from_polygons(&[square(0.0, 1.0, true), square(1.0, 2.0, true)])
                .unwrap();
        let mut coupling = PatchCoupling::new(owner, neighbour).unwrap();
        coupling.calc_transform().unwrap();

        let one_face = coupling.owner().slice(0..1).unwrap();
        let candidate = coupling.neighbour().slice(0..1).unwrap();
        let result = coupling.order_against("steps", &one_face, &candidate);
        assert!(matches!(
            result,
            Err(CoupleError::Contract(ContractError::LengthMismatch { .. }))
        ));
    }

    #[test]
    fn ordering_needs_current_transform() {
        let coupling = slab();
        let candidate = coupling.neighbour().clone();
        assert!(coupling.order_neighbour("slab", &candidate).is_err());
    }
}
