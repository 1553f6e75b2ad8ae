use super::{Tensor, Vector3, TOLERANCE};

/// Builds the rotation tensor around a unit axis by an angle (Rodrigues).
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn rotation_about_axis(axis: &Vector3, angle: f64) -> Tensor {
    let c = angle.cos();
    let s = angle.sin();
    let t = 1.0 - c;
    let (x, y, z) = (axis.x, axis.y, axis.z);

    #[allow(clippy::suspicious_operation_groupings)]
    Tensor::new(
        t * x * x + c,     t * x * y - s * z, t * x * z + s * y,
        t * x * y + s * z, t * y * y + c,     t * y * z - s * x,
        t * x * z - s * y, t * y * z + s * x, t * z * z + c,
    )
}

/// Minimal rotation tensor that turns unit vector `n1` onto unit vector `n2`.
///
/// The rotation axis is `n1 × n2`. Opposite vectors have no unique minimal
/// rotation; a half turn around an axis perpendicular to `n1` is returned.
#[must_use]
pub fn rotation_tensor(n1: &Vector3, n2: &Vector3) -> Tensor {
    let cos = n1.dot(n2);
    let axis = n1.cross(n2);
    let sin = axis.norm();

    if sin > TOLERANCE {
        return rotation_about_axis(&(axis / sin), sin.atan2(cos));
    }
    if cos > 0.0 {
        return Tensor::identity();
    }

    let reference = if n1.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let perp = n1.cross(&reference).normalize();
    rotation_about_axis(&perp, std::f64::consts::PI)
}

/// Frobenius norm of the difference of two tensors.
#[must_use]
pub fn tensor_distance(a: &Tensor, b: &Tensor) -> f64 {
    (a - b).norm()
}

/// Whether `t` is a proper rotation (orthonormal, determinant +1) within `tol`.
#[must_use]
pub fn is_rotation(t: &Tensor, tol: f64) -> bool {
    let orthogonality = (t * t.transpose() - Tensor::identity()).norm();
    orthogonality <= tol && (t.determinant() - 1.0).abs() <= tol
}
