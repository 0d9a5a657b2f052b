/// 4x4 transform construction: perspective projection plus in-place style
/// rotation and translation composed on the right.
///
/// Every operation returns a fresh matrix. Storage is column-major, so
/// `as_slice()` is ready for a `uniformMatrix4fv` upload.
use nalgebra::{Matrix4, Vector3};

use crate::error::{Result, ViewerError};

pub type Mat4 = Matrix4<f32>;

/// Symmetric perspective frustum in OpenGL clip-space convention (w = -z).
pub fn perspective(width: f32, height: f32, fov: f32, near: f32, far: f32) -> Result<Mat4> {
    if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
        return Err(ViewerError::InvalidViewport { width, height });
    }
    if !(fov > 0.0 && fov < std::f32::consts::PI) {
        return Err(ViewerError::InvalidFieldOfView(fov));
    }
    if !(near > 0.0 && far > near && far.is_finite()) {
        return Err(ViewerError::InvalidClipPlanes { near, far });
    }

    let aspect = width / height;
    let f = 1.0 / (fov / 2.0).tan();
    let nf = 1.0 / (near - far);

    // Matrix4::new takes its arguments row by row
    #[rustfmt::skip]
    let projection = Matrix4::new(
        f / aspect, 0.0, 0.0, 0.0,
        0.0, f, 0.0, 0.0,
        0.0, 0.0, (far + near) * nf, 2.0 * far * near * nf,
        0.0, 0.0, -1.0, 0.0,
    );
    Ok(projection)
}

/// `m · Rx(angle)`
pub fn rotate_x(m: &Mat4, angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    let c1 = m.column(1).into_owned();
    let c2 = m.column(2).into_owned();

    let mut out = *m;
    out.set_column(1, &(c1 * c + c2 * s));
    out.set_column(2, &(c2 * c - c1 * s));
    out
}

/// `m · Ry(angle)`
pub fn rotate_y(m: &Mat4, angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    let c0 = m.column(0).into_owned();
    let c2 = m.column(2).into_owned();

    let mut out = *m;
    out.set_column(0, &(c0 * c - c2 * s));
    out.set_column(2, &(c0 * s + c2 * c));
    out
}

/// `m · Rz(angle)`
pub fn rotate_z(m: &Mat4, angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    let c0 = m.column(0).into_owned();
    let c1 = m.column(1).into_owned();

    let mut out = *m;
    out.set_column(0, &(c0 * c + c1 * s));
    out.set_column(1, &(c1 * c - c0 * s));
    out
}

/// `m · T(dx, dy, dz)`: only the translation column changes.
pub fn translate(m: &Mat4, dx: f32, dy: f32, dz: f32) -> Mat4 {
    let offset = m.column(0) * dx + m.column(1) * dy + m.column(2) * dz;

    let mut out = *m;
    out.set_column(3, &(m.column(3) + offset));
    out
}

/// A single step of a transform chain
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    RotateX(f32),
    RotateY(f32),
    RotateZ(f32),
    Translate(Vector3<f32>),
}

impl TransformOp {
    pub fn translate(dx: f32, dy: f32, dz: f32) -> Self {
        TransformOp::Translate(Vector3::new(dx, dy, dz))
    }
}

/// Apply one operation on the right of `m`
pub fn apply(m: &Mat4, op: TransformOp) -> Mat4 {
    match op {
        TransformOp::RotateX(angle) => rotate_x(m, angle),
        TransformOp::RotateY(angle) => rotate_y(m, angle),
        TransformOp::RotateZ(angle) => rotate_z(m, angle),
        TransformOp::Translate(t) => translate(m, t.x, t.y, t.z),
    }
}

/// Apply `ops` left to right, so the last op is nearest the object.
pub fn compose(base: &Mat4, ops: &[TransformOp]) -> Mat4 {
    ops.iter().fold(*base, |m, op| apply(&m, *op))
}
