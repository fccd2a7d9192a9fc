//! Conversions between the array shapes used on the wire and in settings files
//! and the `cgmath` types used everywhere else.
//!
//! Quaternions travel as `[x, y, z, w]`. `cgmath::Quaternion::new` takes the
//! scalar part first, so every conversion goes through these helpers.

use cgmath::{Quaternion, Rad, Rotation3, Vector3};

pub fn vec3_from_array(a: [f32; 3]) -> Vector3<f32> {
    Vector3::new(a[0], a[1], a[2])
}

pub fn vec3_to_array(v: Vector3<f32>) -> [f32; 3] {
    [v.x, v.y, v.z]
}

/// Build a quaternion from `[x, y, z, w]` order.
pub fn quat_from_xyzw(q: [f32; 4]) -> Quaternion<f32> {
    Quaternion::new(q[3], q[0], q[1], q[2])
}

/// Flatten a quaternion into `[x, y, z, w]` order.
pub fn quat_to_xyzw(q: Quaternion<f32>) -> [f32; 4] {
    [q.v.x, q.v.y, q.v.z, q.s]
}

pub fn is_finite_vec3(v: &Vector3<f32>) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

pub fn is_finite_quat(q: &Quaternion<f32>) -> bool {
    q.s.is_finite() && is_finite_vec3(&q.v)
}

/// Rotation about the vertical axis
pub fn yaw_rotation(radians: f32) -> Quaternion<f32> {
    Quaternion::from_angle_y(Rad(radians))
}

/// Parse a `0xRRGGBB` packed color into linear `[r, g, b]` in 0..1.
pub fn rgb_from_hex(hex: u32) -> [f32; 3] {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    [r, g, b]
}
