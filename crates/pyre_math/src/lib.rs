// Re-export glam for convenience
pub use glam::*;

// Pyre math types
mod aabb;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::{Axis, Mat4Ext};

/// RGB color, stored linearly in a `Vec3` (x = red, y = green, z = blue).
pub type Color = Vec3;

/// Vectors shorter than this on every axis are treated as degenerate.
pub const NEAR_ZERO: f32 = 1e-8;

/// Returns true when every component of `v` is within [`NEAR_ZERO`] of zero.
#[inline]
pub fn near_zero(v: Vec3) -> bool {
    v.x.abs() < NEAR_ZERO && v.y.abs() < NEAR_ZERO && v.z.abs() < NEAR_ZERO
}
