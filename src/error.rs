use thiserror::Error;

/// Top-level error type for coupled-patch geometry.
#[derive(Debug, Error)]
pub enum CoupleError {
    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error(transparent)]
    Matching(#[from] MatchError),

    #[error("diagnostic output failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Malformed input. These are programming errors on the caller's side.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("face {face} has no vertices")]
    EmptyFace { face: usize },

    #[error("face {face} has {vertices} vertices, at least 3 are required")]
    DegenerateFace { face: usize, vertices: usize },

    #[error("face {face} references point {point}, but only {points} points exist")]
    PointOutOfRange {
        face: usize,
        point: usize,
        points: usize,
    },

    #[error("{what}: expected {expected} entries, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("tolerance {name} = {value} must be finite and non-negative")]
    InvalidTolerance { name: &'static str, value: f64 },
}

/// The two sides of a coupling are not related by a rigid transform.
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("coupled sides are not rotationally related: {0}")]
    NotRotational(String),

    #[error("coupled sides are not translationally related: {0}")]
    NotTranslational(String),

    #[error(
        "coupled sides are neither rotationally related ({rotational}) nor translationally related ({translational})"
    )]
    Inconsistent {
        rotational: String,
        translational: String,
    },

    #[error("coupling transform has not been computed for the current geometry")]
    Stale,
}

/// Face correspondence could not be established.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("{} face(s) have no geometric match, first {:?} (nearest distance {:?})", .faces.len(), .faces.first(), .nearest.first())]
    Unmatched {
        /// Owner face indices without a candidate.
        faces: Vec<usize>,
        /// Distance to the nearest candidate centre, per entry of `faces`.
        nearest: Vec<f64>,
    },

    #[error("{} face(s) match more than one candidate, first {:?}", .faces.len(), .faces.first())]
    Ambiguous {
        /// Owner face indices with multiple candidates (or sharing one).
        faces: Vec<usize>,
        /// Candidate indices within tolerance, per entry of `faces`.
        candidates: Vec<Vec<usize>>,
    },

    #[error("{} face(s) have no vertex aligned with the anchor, first {:?}", .faces.len(), .faces.first())]
    NoAnchor {
        /// Owner face indices whose anchor could not be located.
        faces: Vec<usize>,
        /// Distance from the anchor to the closest candidate vertex.
        nearest: Vec<f64>,
    },
}

/// Convenience type alias for results using [`CoupleError`].
pub type Result<T> = std::result::Result<T, CoupleError>;
