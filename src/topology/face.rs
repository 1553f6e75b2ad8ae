use crate::math::Point3;

/// A polygonal face: an ordered, closed loop of point labels.
///
/// The first label is the *anchor* vertex. The winding defines the outward
/// normal by the right-hand rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Face {
    vertices: Vec<usize>,
}

impl Face {
    /// Creates a face from its point labels.
    #[must_use]
    pub fn new(vertices: Vec<usize>) -> Self {
        Self { vertices }
    }

    /// Returns the point labels in order.
    #[must_use]
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Returns the number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns `true` if the face has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns the anchor (first) point label.
    #[must_use]
    pub fn anchor(&self) -> Option<usize> {
        self.vertices.first().copied()
    }

    /// Resolves the labels to positions.
    ///
    /// Returns `None` if any label is outside `points`.
    #[must_use]
    pub fn points(&self, points: &[Point3]) -> Option<Vec<Point3>> {
        self.vertices.iter().map(|&i| points.get(i).copied()).collect()
    }

    /// Cyclically shifts the vertices by `n` positions.
    ///
    /// Vertex `i` of `self` becomes vertex `(i + n) % len` of the result, so a
    /// face whose anchor sits at position `k` is restored by a shift of
    /// `len - k`.
    #[must_use]
    pub fn rotated(&self, n: usize) -> Self {
        let len = self.vertices.len();
        if len == 0 {
            return self.clone();
        }
        let mut vertices = self.vertices.clone();
        vertices.rotate_right(n % len);
        Self { vertices }
    }

    /// Reverses the winding, keeping the anchor in place.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut vertices = self.vertices.clone();
        if vertices.len() > 1 {
            vertices[1..].reverse();
        }
        Self { vertices }
    }
}

impl From<Vec<usize>> for Face {
    fn from(vertices: Vec<usize>) -> Self {
        Self::new(vertices)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn anchor_is_first_vertex() {
        let f = Face::new(vec![7, 3, 5]);
        assert_eq!(f.anchor(), Some(7));
        assert_eq!(Face::new(vec![]).anchor(), None);
    }

    #[test]
    fn rotation_moves_anchor_forward() {
        let f = Face::new(vec![0, 1, 2, 3]);
        assert_eq!(f.rotated(1).vertices(), &[3, 0, 1, 2]);
        assert_eq!(f.rotated(4), f);
        assert_eq!(f.rotated(6).vertices(), &[2, 3, 0, 1]);
    }

    #[test]
    fn rotation_restores_shifted_face() {
        let f = Face::new(vec![10, 11, 12, 13, 14]);
        let mut shifted = f.vertices().to_vec();
        shifted.rotate_left(2);
        assert_eq!(Face::new(shifted).rotated(2), f);
    }

    #[test]
    fn reversal_keeps_anchor() {
        let f = Face::new(vec![0, 1, 2, 3]);
        assert_eq!(f.reversed().vertices(), &[0, 3, 2, 1]);
        assert_eq!(f.reversed().reversed(), f);
    }

    #[test]
    fn points_out_of_range_is_none() {
        let pts = vec![Point3::origin(); 2];
        assert!(Face::new(vec![0, 1]).points(&pts).is_some());
        assert!(Face::new(vec![0, 2]).points(&pts).is_none());
    }
}
