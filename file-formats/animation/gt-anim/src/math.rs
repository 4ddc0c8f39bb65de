//! Transform helpers shared by the importers and the pose evaluator
//!
//! Matrices are glam column-major `Mat4`s, the same layout the assets store
//! and the GPU consumes. `a * b` applies `b` first.

use glam::{Mat4, Quat, Vec3, Vec4};

/// Quaternions closer than this (by dot product) are blended linearly
pub const SLERP_LINEAR_THRESHOLD: f32 = 0.9995;

/// Determinant magnitude below which a bind pose is treated as singular
pub const SINGULAR_DETERMINANT: f32 = 1e-10;

/// Compose `T * S * R` from translation, scale and rotation
pub fn compose_trs(translation: Vec3, scale: Vec3, rotation: Quat) -> Mat4 {
    Mat4::from_translation(translation) * Mat4::from_scale(scale) * Mat4::from_quat(rotation)
}

/// Compose `T * R`, the runtime local transform (scale is not reapplied)
pub fn compose_tr(translation: Vec3, rotation: Quat) -> Mat4 {
    Mat4::from_translation(translation) * Mat4::from_quat(rotation)
}

/// General 4x4 inverse, `None` when the matrix is singular or not finite
pub fn try_inverse(matrix: &Mat4) -> Option<Mat4> {
    let det = matrix.determinant();
    if !det.is_finite() || det.abs() < SINGULAR_DETERMINANT {
        return None;
    }
    Some(matrix.inverse())
}

/// Normalize a 4-component quaternion, falling back to identity for zero length
pub fn normalize_quat(q: Vec4) -> Quat {
    let len = q.length();
    if len > 0.0 && len.is_finite() {
        Quat::from_vec4(q / len)
    } else {
        Quat::IDENTITY
    }
}

/// Spherical linear interpolation along the shortest arc
///
/// The second quaternion is negated when the pair lies in opposite
/// hemispheres. Nearly parallel inputs take the lerp + renormalize path,
/// where `sin(theta)` would approach zero. The result is always unit length.
pub fn slerp(a: Quat, b: Quat, alpha: f32) -> Quat {
    let a = Vec4::from(a);
    let mut b = Vec4::from(b);

    let mut dot = a.dot(b);
    if dot < 0.0 {
        b = -b;
        dot = -dot;
    }

    if dot > SLERP_LINEAR_THRESHOLD {
        return normalize_quat(a + (b - a) * alpha);
    }

    let dot = dot.clamp(-1.0, 1.0);
    let theta_0 = dot.acos();
    let theta = theta_0 * alpha;
    let sin_theta_0 = theta_0.sin();

    let s0 = (theta_0 - theta).sin() / sin_theta_0;
    let s1 = theta.sin() / sin_theta_0;

    normalize_quat(a * s0 + b * s1)
}

/// Translation column of an affine matrix
pub fn translation_of(matrix: &Mat4) -> Vec3 {
    matrix.w_axis.truncate()
}

/// Flatten to 16 column-major floats for upload
pub fn to_gpu(matrix: &Mat4) -> [f32; 16] {
    matrix.to_cols_array()
}
