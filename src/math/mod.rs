pub mod polygon_3d;
pub mod tensor;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Second-rank 3x3 tensor (rotation or orientation transform).
pub type Tensor = nalgebra::Matrix3<f64>;

/// Global geometric tolerance for degeneracy checks.
pub const TOLERANCE: f64 = 1e-10;

/// Default relative tolerance for geometric matching.
///
/// Distances are compared against this fraction of the local face size, and
/// normals/tensors against this absolute error per face.
pub const MATCH_TOL: f64 = 1e-3;
