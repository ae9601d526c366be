//! Math kernel.
//!
//! Vector and matrix types come from `glam`; this module adds the handful of
//! camera and model-space helpers the render modes share. Conventions:
//! right-handed world, column-major matrices, clip space with z in [-1, 1]
//! (the kernels depth-test against that range).

mod transform;

pub use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
pub use transform::Transform;

/// Perspective projection from a vertical field of view in degrees.
pub fn perspective(fov_y_deg: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(fov_y_deg.to_radians(), aspect, near, far)
}

/// View matrix looking from `eye` towards `target`.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_rh(eye, target, up)
}

/// Inverse of a rotation + translation matrix.
///
/// Cheaper than a general inverse and exact for view matrices: the rotation
/// block is transposed and the translation rotated back.
pub fn inverse_rigid(m: Mat4) -> Mat4 {
    let r = Mat3::from_mat4(m).transpose();
    let t = -(r * m.w_axis.truncate());
    Mat4::from_cols(
        r.x_axis.extend(0.0),
        r.y_axis.extend(0.0),
        r.z_axis.extend(0.0),
        t.extend(1.0),
    )
}

/// General inverse, `None` for singular input.
pub fn try_inverse(m: Mat4) -> Option<Mat4> {
    let det = m.determinant();
    if det.abs() <= f32::EPSILON || !det.is_finite() {
        return None;
    }
    Some(m.inverse())
}

/// Column-major array layout uploaded to `mat4x4<f32>` uniforms.
#[inline]
pub fn to_gpu(m: Mat4) -> [[f32; 4]; 4] {
    m.to_cols_array_2d()
}

/// Rotates a 2D vector by `angle` radians.
#[inline]
pub fn rotate2(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}
