use crate::error::{ContractError, Result};
use crate::math::polygon_3d::{max_distance_to, polygon_centre, polygon_unit_normal};
use crate::math::{Point3, Vector3};
use crate::operations::tolerance::calc_face_tol;

use super::Face;

/// An ordered set of faces together with the points they reference.
///
/// Per-face centres, unit normals and extents (largest centre-to-vertex
/// distance) are derived from the points on construction and re-derived by
/// [`PatchGeometry::move_points`]; they never go stale.
#[derive(Debug, Clone)]
pub struct PatchGeometry {
    faces: Vec<Face>,
    points: Vec<Point3>,
    centres: Vec<Point3>,
    normals: Vec<Vector3>,
}

impl PatchGeometry {
    /// Creates a patch from faces and the points they reference.
    ///
    /// # Errors
    ///
    /// Returns a contract error if a face has fewer than three vertices or
    /// references a point outside `points`.
    pub fn new(faces: Vec<Face>, points: Vec<Point3>) -> Result<Self> {
        validate_faces(&faces, points.len())?;
        let mut patch = Self {
            faces,
            points,
            centres: Vec::new(),
            normals: Vec::new(),
        };
        patch.derive();
        Ok(patch)
    }

    /// Creates a patch from polygons given directly as positions.
    ///
    /// Every polygon gets its own points; nothing is shared between faces.
    ///
    /// # Errors
    ///
    /// Returns a contract error if a polygon has fewer than three vertices.
    pub fn from_polygons(polygons: &[Vec<Point3>]) -> Result<Self> {
        let mut faces = Vec::with_capacity(polygons.len());
        let mut points = Vec::new();
        for polygon in polygons {
            let start = points.len();
            points.extend_from_slice(polygon);
            faces.push(Face::new((start..points.len()).collect()));
        }
        Self::new(faces, points)
    }

    /// Returns the faces.
    #[must_use]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Returns the points.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Returns the number of faces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Returns `true` if the patch has no faces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Returns the vertex positions of face `i`, in face order.
    ///
    /// # Panics
    ///
    /// Panics if `i` is not a face index of this patch.
    #[must_use]
    pub fn face_points(&self, i: usize) -> Vec<Point3> {
        self.faces[i]
            .vertices()
            .iter()
            .map(|&v| self.points[v])
            .collect()
    }

    /// Returns the area-weighted face centres.
    #[must_use]
    pub fn centres(&self) -> &[Point3] {
        &self.centres
    }

    /// Returns the unit face normals. Zero-area faces have a zero normal.
    #[must_use]
    pub fn normals(&self) -> &[Vector3] {
        &self.normals
    }

    /// Returns the anchor position of every face.
    #[must_use]
    pub fn anchor_points(&self) -> Vec<Point3> {
        self.faces
            .iter()
            .map(|f| self.points[f.vertices()[0]])
            .collect()
    }

    /// Returns the matching tolerance of every face for a relative tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if `match_tol` is negative or not finite.
    pub fn tolerances(&self, match_tol: f64) -> Result<Vec<f64>> {
        calc_face_tol(&self.faces, &self.points, &self.centres, match_tol)
    }

    /// Largest face extent (centre-to-vertex distance) of the patch.
    #[must_use]
    pub fn max_extent(&self) -> f64 {
        (0..self.faces.len())
            .filter_map(|i| max_distance_to(&self.face_points(i), &self.centres[i]))
            .fold(0.0, f64::max)
    }

    /// Replaces the point positions and re-derives the face geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of points changes.
    pub fn move_points(&mut self, points: Vec<Point3>) -> Result<()> {
        if points.len() != self.points.len() {
            return Err(ContractError::LengthMismatch {
                what: "moved points",
                expected: self.points.len(),
                actual: points.len(),
            }
            .into());
        }
        self.points = points;
        self.derive();
        Ok(())
    }

    /// Returns a copy with every face vertex mapped by `f(face_index, point)`.
    ///
    /// Points shared between faces are duplicated so each face can be mapped
    /// independently (e.g. by a per-face separation).
    ///
    /// # Errors
    ///
    /// Propagates construction errors of the mapped patch.
    pub fn map_face_points<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(usize, &Point3) -> Point3,
    {
        let polygons: Vec<Vec<Point3>> = (0..self.faces.len())
            .map(|i| self.face_points(i).iter().map(|p| f(i, p)).collect())
            .collect();
        Self::from_polygons(&polygons)
    }

    /// Returns the sub-patch made of faces `range`, sharing all points.
    ///
    /// # Errors
    ///
    /// Returns an error if the range runs past the last face.
    pub fn slice(&self, range: std::ops::Range<usize>) -> Result<Self> {
        let faces = self.faces.get(range.clone()).ok_or(ContractError::LengthMismatch {
            what: "face slice",
            expected: range.end,
            actual: self.faces.len(),
        })?;
        Self::new(faces.to_vec(), self.points.clone())
    }

    fn derive(&mut self) {
        self.centres = Vec::with_capacity(self.faces.len());
        self.normals = Vec::with_capacity(self.faces.len());
        for i in 0..self.faces.len() {
            let pts = self.face_points(i);
            self.centres.push(polygon_centre(&pts));
            self.normals
                .push(polygon_unit_normal(&pts).unwrap_or_else(Vector3::zeros));
        }
    }
}

fn validate_faces(faces: &[Face], n_points: usize) -> Result<()> {
    for (i, face) in faces.iter().enumerate() {
        if face.is_empty() {
            return Err(ContractError::EmptyFace { face: i }.into());
        }
        if face.len() < 3 {
            return Err(ContractError::DegenerateFace {
                face: i,
                vertices: face.len(),
            }
            .into());
        }
        if let Some(&point) = face.vertices().iter().find(|&&v| v >= n_points) {
            return Err(ContractError::PointOutOfRange {
                face: i,
                point,
                points: n_points,
            }
            .into());
        }
    }
    Ok(())
}
