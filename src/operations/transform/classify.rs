use tracing::debug;

use crate::error::{ClassificationError, ContractError, Result};
use crate::math::tensor::{is_rotation, rotation_tensor, tensor_distance};
use crate::math::{Point3, Tensor, Vector3, MATCH_TOL};
use crate::operations::tolerance::check_tolerance;
use crate::topology::PatchGeometry;

use super::TransformKind;

/// Face-by-face data of two coupled sides, paired by index.
#[derive(Debug, Clone, Copy)]
pub struct CoupledFaceData<'a> {
    /// Owner face centres (`Cf`).
    pub owner_centres: &'a [Point3],
    /// Neighbour face centres (`Cr`).
    pub neighbour_centres: &'a [Point3],
    /// Owner unit normals (`nf`).
    pub owner_normals: &'a [Vector3],
    /// Neighbour unit normals (`nr`).
    pub neighbour_normals: &'a [Vector3],
    /// Allowed positional error per face pair.
    pub small_dist: &'a [f64],
}

impl<'a> CoupledFaceData<'a> {
    /// Pairs two patches face by face.
    #[must_use]
    pub fn from_patches(
        owner: &'a PatchGeometry,
        neighbour: &'a PatchGeometry,
        small_dist: &'a [f64],
    ) -> Self {
        Self {
            owner_centres: owner.centres(),
            neighbour_centres: neighbour.centres(),
            owner_normals: owner.normals(),
            neighbour_normals: neighbour.normals(),
            small_dist,
        }
    }

    /// Returns the number of face pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owner_centres.len()
    }

    /// Returns `true` if there are no face pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owner_centres.is_empty()
    }

    fn validate(&self) -> Result<()> {
        let expected = self.len();
        let fields = [
            ("neighbour centres", self.neighbour_centres.len()),
            ("owner normals", self.owner_normals.len()),
            ("neighbour normals", self.neighbour_normals.len()),
            ("small_dist", self.small_dist.len()),
        ];
        for (what, actual) in fields {
            if actual != expected {
                return Err(ContractError::LengthMismatch {
                    what,
                    expected,
                    actual,
                }
                .into());
            }
        }
        for &d in self.small_dist {
            check_tolerance("small_dist", d)?;
        }
        Ok(())
    }

    /// Per-face offsets `Cr_i - map(Cf_i)`.
    fn offsets(&self, map: impl Fn(&Point3) -> Point3) -> Vec<Vector3> {
        self.owner_centres
            .iter()
            .zip(self.neighbour_centres)
            .map(|(cf, cr)| cr - map(cf))
            .collect()
    }
}

/// Offset between the two sides of a coupling.
#[derive(Debug, Clone, PartialEq)]
pub enum Separation {
    /// The sides coincide.
    None,
    /// One offset shared by every face pair.
    Uniform(Vector3),
    /// A different offset per face pair.
    PerFace(Vec<Vector3>),
}

impl Separation {
    /// Collapses per-face offsets.
    ///
    /// Offsets all within `small_dist` of the first collapse to that one, and
    /// a collapsed offset within `small_dist[0]` of zero collapses to
    /// [`Separation::None`].
    ///
    /// # Errors
    ///
    /// Returns a contract error if `small_dist` does not have one entry per
    /// offset.
    pub fn from_offsets(offsets: Vec<Vector3>, small_dist: &[f64]) -> Result<Self> {
        if small_dist.len() != offsets.len() {
            return Err(ContractError::LengthMismatch {
                what: "small_dist",
                expected: offsets.len(),
                actual: small_dist.len(),
            }
            .into());
        }
        let (Some(&first), Some(&first_tol)) = (offsets.first(), small_dist.first()) else {
            return Ok(Self::None);
        };
        let uniform = offsets
            .iter()
            .zip(small_dist)
            .all(|(o, &tol)| (o - first).norm() <= tol);
        Ok(if !uniform {
            Self::PerFace(offsets)
        } else if first.norm() <= first_tol {
            Self::None
        } else {
            Self::Uniform(first)
        })
    }

    /// Flattens into the field layout: empty, one entry, or one per face.
    #[must_use]
    pub fn into_vec(self) -> Vec<Vector3> {
        match self {
            Self::None => Vec::new(),
            Self::Uniform(v) => vec![v],
            Self::PerFace(v) => v,
        }
    }
}

/// Outcome of comparing the owner normals with the flipped neighbour normals.
#[derive(Debug, Clone, PartialEq)]
pub enum RotationProbe {
    /// Every face pair already faces its partner; no rotation is needed.
    Aligned,
    /// One rotation tensor maps every owner normal onto its flipped partner.
    Rotated(Tensor),
    /// The per-face rotations disagree.
    Inconsistent,
}

/// A resolved relation between two coupled sides.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Related by a rotation. `tensor` is `None` for parallel sides. A
    /// non-trivial `separation` marks a rotation combined with an offset.
    Rotational {
        tensor: Option<Tensor>,
        separation: Separation,
    },
    /// Related by a non-zero translation.
    Translational { separation: Separation },
}

impl Classification {
    /// The identity relation: parallel and coincident.
    #[must_use]
    pub fn identity() -> Self {
        Self::Rotational {
            tensor: None,
            separation: Separation::None,
        }
    }

    /// Returns the transform kind of this relation.
    #[must_use]
    pub fn kind(&self) -> TransformKind {
        match self {
            Self::Rotational { .. } => TransformKind::Rotational,
            Self::Translational { .. } => TransformKind::Translational,
        }
    }
}

/// Decides whether two coupled sides are related by a rotation or a
/// translation.
///
/// With an [`TransformKind::Unknown`] hint the rotational relation is tried
/// first and the translational one second. A forced hint evaluates only that
/// branch and fails if the geometry does not satisfy it.
pub struct TransformClassifier<'a> {
    data: CoupledFaceData<'a>,
    abs_tol: f64,
    hint: TransformKind,
}

impl<'a> TransformClassifier<'a> {
    /// Creates a classifier with the default tolerance and no hint.
    #[must_use]
    pub fn new(data: CoupledFaceData<'a>) -> Self {
        Self {
            data,
            abs_tol: MATCH_TOL,
            hint: TransformKind::Unknown,
        }
    }

    /// Sets the absolute error allowed per normal or tensor comparison.
    #[must_use]
    pub fn with_abs_tol(mut self, abs_tol: f64) -> Self {
        self.abs_tol = abs_tol;
        self
    }

    /// Forces the rotational or translational branch.
    #[must_use]
    pub fn with_hint(mut self, hint: TransformKind) -> Self {
        self.hint = hint;
        self
    }

    /// Runs the classification.
    ///
    /// # Errors
    ///
    /// Returns a contract error for mismatched inputs or invalid tolerances,
    /// and a classification error if the geometry satisfies neither relation
    /// (or not the forced one).
    pub fn classify(&self) -> Result<Classification> {
        self.data.validate()?;
        check_tolerance("abs_tol", self.abs_tol)?;

        if self.data.is_empty() {
            return Ok(Classification::identity());
        }

        let result = match self.hint {
            TransformKind::Rotational => self
                .rotational(true)
                .map_err(ClassificationError::NotRotational),
            TransformKind::Translational => self
                .translational()
                .map_err(ClassificationError::NotTranslational),
            TransformKind::Unknown => self.rotational(false).or_else(|rotational| {
                debug!(reason = %rotational, "rotational relation rejected, trying translational");
                self.translational()
                    .map_err(|translational| ClassificationError::Inconsistent {
                        rotational,
                        translational,
                    })
            }),
        };

        let classification = result?;
        debug!(
            faces = self.data.len(),
            hint = %self.hint,
            kind = %classification.kind(),
            "classified coupling"
        );
        Ok(classification)
    }

    /// Compares every owner normal with its flipped neighbour normal.
    #[must_use]
    pub fn probe_rotation(&self) -> RotationProbe {
        let tensors: Vec<Tensor> = self
            .data
            .owner_normals
            .iter()
            .zip(self.data.neighbour_normals)
            .map(|(nf, nr)| rotation_tensor(nf, &-nr))
            .collect();

        let Some(first) = tensors.first() else {
            return RotationProbe::Aligned;
        };

        let identity = Tensor::identity();
        if tensors
            .iter()
            .all(|t| tensor_distance(t, &identity) <= self.abs_tol)
        {
            return RotationProbe::Aligned;
        }

        let consistent = tensors
            .iter()
            .all(|t| tensor_distance(t, first) <= self.abs_tol);
        if consistent && is_rotation(first, self.abs_tol) {
            RotationProbe::Rotated(*first)
        } else {
            RotationProbe::Inconsistent
        }
    }

    /// Rotational branch. `accept_aligned` admits the parallel case, which an
    /// auto-detecting caller leaves to the translational branch instead.
    fn rotational(&self, accept_aligned: bool) -> std::result::Result<Classification, String> {
        let tensor = match self.probe_rotation() {
            RotationProbe::Rotated(r) => Some(r),
            RotationProbe::Aligned if accept_aligned => None,
            RotationProbe::Aligned => return Err("normals are already aligned".into()),
            RotationProbe::Inconsistent => {
                return Err("face normals require different rotations".into())
            }
        };

        let offsets = match tensor {
            Some(r) => self.data.offsets(|c| Point3::from(r * c.coords)),
            None => self.data.offsets(|c| *c),
        };
        let separation =
            Separation::from_offsets(offsets, self.data.small_dist).map_err(|e| e.to_string())?;
        match separation {
            Separation::PerFace(_) => Err("rotated centres are offset differently per face".into()),
            separation => Ok(Classification::Rotational { tensor, separation }),
        }
    }

    fn translational(&self) -> std::result::Result<Classification, String> {
        let misaligned = self
            .data
            .owner_normals
            .iter()
            .zip(self.data.neighbour_normals)
            .position(|(nf, nr)| (nf + nr).norm() > self.abs_tol);
        if let Some(face) = misaligned {
            return Err(format!("face {face} does not face its partner"));
        }

        let offsets = self.data.offsets(|c| *c);
        let separation =
            Separation::from_offsets(offsets, self.data.small_dist).map_err(|e| e.to_string())?;
        Ok(match separation {
            Separation::None => Classification::identity(),
            separation => Classification::Translational { separation },
        })
    }
}
