use tracing::{debug, warn};

use crate::error::Result;
use crate::math::{Point3, Tensor, Vector3, MATCH_TOL};

use super::classify::{Classification, CoupledFaceData, TransformClassifier};
use super::TransformKind;

/// Transformation between the two sides of a coupled patch.
///
/// `forward_t` maps owner-side quantities into the neighbour frame and
/// `reverse_t` maps them back. Both are empty when the sides are parallel.
/// `separation` (neighbour minus owner) is empty when the sides are not
/// offset, holds one vector when every face shares the offset, and one vector
/// per face otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingTransform {
    kind: TransformKind,
    forward_t: Vec<Tensor>,
    reverse_t: Vec<Tensor>,
    separation: Vec<Vector3>,
}

impl CouplingTransform {
    /// The identity transform: parallel, coincident sides.
    #[must_use]
    pub fn identity() -> Self {
        Self::from(Classification::identity())
    }

    /// Returns the resolved kind (never [`TransformKind::Unknown`]).
    #[must_use]
    pub fn kind(&self) -> TransformKind {
        self.kind
    }

    /// Returns the owner-to-neighbour tensors.
    #[must_use]
    pub fn forward_t(&self) -> &[Tensor] {
        &self.forward_t
    }

    /// Returns the neighbour-to-owner tensors.
    #[must_use]
    pub fn reverse_t(&self) -> &[Tensor] {
        &self.reverse_t
    }

    /// Returns the offset field (neighbour minus owner).
    #[must_use]
    pub fn separation(&self) -> &[Vector3] {
        &self.separation
    }

    /// Are the coupled planes parallel (no rotation needed)?
    #[must_use]
    pub fn parallel(&self) -> bool {
        self.forward_t.is_empty()
    }

    /// Are the coupled planes separated by an offset?
    #[must_use]
    pub fn separated(&self) -> bool {
        !self.separation.is_empty()
    }

    /// Offset that applies to face `face`.
    #[must_use]
    pub fn separation_for(&self, face: usize) -> Vector3 {
        match self.separation.as_slice() {
            [] => Vector3::zeros(),
            [s] => *s,
            field => field.get(face).copied().unwrap_or_else(Vector3::zeros),
        }
    }

    /// Maps a neighbour-side position of face `face` into the owner frame.
    #[must_use]
    pub fn to_owner_frame(&self, face: usize, point: &Point3) -> Point3 {
        let shifted = point - self.separation_for(face);
        match self.reverse_t.first() {
            Some(r) => Point3::from(r * shifted.coords),
            None => shifted,
        }
    }

    /// Maps an owner-side position of face `face` into the neighbour frame.
    #[must_use]
    pub fn to_neighbour_frame(&self, face: usize, point: &Point3) -> Point3 {
        let rotated = match self.forward_t.first() {
            Some(r) => Point3::from(r * point.coords),
            None => *point,
        };
        rotated + self.separation_for(face)
    }

    /// Rotates a neighbour-side direction into the owner frame.
    #[must_use]
    pub fn vector_to_owner_frame(&self, v: &Vector3) -> Vector3 {
        self.reverse_t.first().map_or(*v, |r| r * v)
    }
}

impl From<Classification> for CouplingTransform {
    fn from(classification: Classification) -> Self {
        let kind = classification.kind();
        let (tensor, separation) = match classification {
            Classification::Rotational { tensor, separation } => (tensor, separation),
            Classification::Translational { separation } => (None, separation),
        };
        Self {
            kind,
            forward_t: tensor.into_iter().collect(),
            reverse_t: tensor.map(|t| t.transpose()).into_iter().collect(),
            separation: separation.into_vec(),
        }
    }
}

/// Computes the transformation tensors and separation between two coupled
/// sides.
///
/// Classification falls back from rotational to translational unless a hint
/// forces one; an unclassifiable coupling is an error, never an identity.
pub struct CalcTransformTensors<'a> {
    data: CoupledFaceData<'a>,
    abs_tol: f64,
    hint: TransformKind,
}

impl<'a> CalcTransformTensors<'a> {
    /// Creates a new `CalcTransformTensors` operation.
    #[must_use]
    pub fn new(data: CoupledFaceData<'a>) -> Self {
        Self {
            data,
            abs_tol: MATCH_TOL,
            hint: TransformKind::Unknown,
        }
    }

    /// Sets the absolute error allowed in a single normal/tensor comparison.
    #[must_use]
    pub fn with_abs_tol(mut self, abs_tol: f64) -> Self {
        self.abs_tol = abs_tol;
        self
    }

    /// Forces the transform kind instead of detecting it.
    #[must_use]
    pub fn with_hint(mut self, hint: TransformKind) -> Self {
        self.hint = hint;
        self
    }

    /// Executes the calculation.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs are malformed or the sides are not
    /// related by the requested (or any) rigid transform.
    pub fn execute(&self) -> Result<CouplingTransform> {
        let classification = TransformClassifier::new(self.data)
            .with_abs_tol(self.abs_tol)
            .with_hint(self.hint)
            .classify()
            .inspect_err(|err| {
                warn!(
                    faces = self.data.len(),
                    hint = %self.hint,
                    abs_tol = self.abs_tol,
                    %err,
                    "cannot determine coupling transform"
                );
            })?;

        let transform = CouplingTransform::from(classification);
        debug!(
            kind = %transform.kind(),
            parallel = transform.parallel(),
            separated = transform.separation().len(),
            "coupling transform"
        );
        Ok(transform)
    }
}
