mod cyclic;
mod patch_coupling;
mod settings;

pub use cyclic::CyclicPatch;
pub use patch_coupling::PatchCoupling;
pub use settings::MatchSettings;

use crate::error::Result;
use crate::math::Point3;
use crate::operations::order::FaceOrdering;
use crate::operations::transform::CouplingTransform;
use crate::topology::PatchGeometry;

/// Lifecycle of a boundary patch coupled to another set of faces.
///
/// The `init_*` hooks run before the corresponding step for every patch of a
/// mesh, so a patch can discard state derived from the old geometry before
/// anything reads it.
pub trait CoupledPatch {
    /// Returns the patch name.
    fn name(&self) -> &str;

    /// Returns the coupling state.
    fn coupling(&self) -> &PatchCoupling;

    /// Prepares for [`CoupledPatch::calc_geometry`].
    ///
    /// # Errors
    ///
    /// Returns an error if the patch cannot be prepared.
    fn init_geometry(&mut self) -> Result<()> {
        Ok(())
    }

    /// Derives the coupling transform from the current geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if the sides are not related by a rigid transform.
    fn calc_geometry(&mut self) -> Result<()>;

    /// Prepares for the points moving to `points`.
    ///
    /// # Errors
    ///
    /// Returns an error if `points` does not fit the patch.
    fn init_move_points(&mut self, _points: &[Point3]) -> Result<()> {
        Ok(())
    }

    /// Moves the patch points and re-derives the coupling.
    ///
    /// # Errors
    ///
    /// Returns an error if `points` does not fit the patch or the moved sides
    /// are no longer related by a rigid transform.
    fn move_points(&mut self, points: &[Point3]) -> Result<()>;

    /// Prepares for a topology change.
    ///
    /// # Errors
    ///
    /// Returns an error if the patch cannot be prepared.
    fn init_update_mesh(&mut self) -> Result<()> {
        Ok(())
    }

    /// Replaces the patch faces after a topology change.
    ///
    /// # Errors
    ///
    /// Returns an error if `geometry` does not fit the patch or its sides are
    /// not related by a rigid transform.
    fn update_mesh(&mut self, geometry: PatchGeometry) -> Result<()>;

    /// Returns the current coupling transform.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ClassificationError::Stale`] if the geometry
    /// changed since it was derived.
    fn transform(&self) -> Result<&CouplingTransform> {
        self.coupling().transform()
    }

    /// Are the coupled planes parallel?
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ClassificationError::Stale`] if the transform is
    /// not current.
    fn parallel(&self) -> Result<bool> {
        self.coupling().parallel()
    }

    /// Are the coupled planes separated by an offset?
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ClassificationError::Stale`] if the transform is
    /// not current.
    fn separated(&self) -> Result<bool> {
        self.coupling().separated()
    }
}

/// Face ordering of a coupled patch after its faces were renumbered.
pub trait PatchOrdering {
    /// Prepares to order `candidate`, the renumbered faces of this patch.
    ///
    /// # Errors
    ///
    /// Returns an error if the state needed to order cannot be derived.
    fn init_order(&mut self, candidate: &PatchGeometry) -> Result<()>;

    /// Computes how the faces of `candidate` must be reordered and rotated to
    /// line up with their coupled partners.
    ///
    /// # Errors
    ///
    /// Returns an error if a face has no unique partner or its anchor cannot
    /// be aligned.
    fn order(&self, candidate: &PatchGeometry) -> Result<FaceOrdering>;
}
