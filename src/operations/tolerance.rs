use crate::error::{ContractError, Result};
use crate::math::polygon_3d::max_distance_to;
use crate::math::Point3;
use crate::topology::Face;

/// Typical size of a face: the largest distance from its centre to any of its
/// vertices.
///
/// Returns `None` for a face without vertices or with a label outside
/// `points`.
#[must_use]
pub fn face_tolerance(face: &Face, points: &[Point3], centre: &Point3) -> Option<f64> {
    max_distance_to(&face.points(points)?, centre)
}

/// Matching tolerance of every face: `match_tol` times the face size.
///
/// # Errors
///
/// Returns a contract error if `match_tol` is negative or not finite, if
/// `centres` does not have one entry per face, or if a face is empty.
pub fn calc_face_tol(
    faces: &[Face],
    points: &[Point3],
    centres: &[Point3],
    match_tol: f64,
) -> Result<Vec<f64>> {
    check_tolerance("match_tol", match_tol)?;
    if centres.len() != faces.len() {
        return Err(ContractError::LengthMismatch {
            what: "face centres",
            expected: faces.len(),
            actual: centres.len(),
        }
        .into());
    }

    faces
        .iter()
        .zip(centres)
        .enumerate()
        .map(|(i, (face, centre))| {
            if face.is_empty() {
                return Err(ContractError::EmptyFace { face: i }.into());
            }
            let size = face_tolerance(face, points, centre).ok_or_else(|| {
                let point = face
                    .vertices()
                    .iter()
                    .copied()
                    .find(|&v| v >= points.len())
                    .unwrap_or_default();
                ContractError::PointOutOfRange {
                    face: i,
                    point,
                    points: points.len(),
                }
            })?;
            Ok(match_tol * size)
        })
        .collect()
}

/// Rejects negative, NaN and infinite tolerances.
///
/// # Errors
///
/// Returns [`ContractError::InvalidTolerance`] naming the offending value.
pub fn check_tolerance(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ContractError::InvalidTolerance { name, value }.into())
    }
}
