// Transform utilities for Mat4
//
// Extends glam::Mat4 with the bounding-box transform used by instancing
// decorators. glam::Mat4 already provides transform_point3(),
// transform_vector3() and inverse().

use crate::Aabb;
use glam::Mat4;

/// A principal coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All three axes.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Rotation about this axis by `radians`, right-handed.
    pub fn rotation(self, radians: f32) -> Mat4 {
        match self {
            Axis::X => Mat4::from_rotation_x(radians),
            Axis::Y => Mat4::from_rotation_y(radians),
            Axis::Z => Mat4::from_rotation_z(radians),
        }
    }
}

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let corners = aabb.corners().map(|corner| self.transform_point3(corner));
        Aabb::enclosing(&corners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::f32::consts::PI;

    #[test]
    fn test_axis_rotation_matches_glam() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        for axis in Axis::ALL {
            let ours = axis.rotation(0.3).transform_vector3(v);
            let expected = match axis {
                Axis::X => Mat4::from_rotation_x(0.3),
                Axis::Y => Mat4::from_rotation_y(0.3),
                Axis::Z => Mat4::from_rotation_z(0.3),
            }
            .transform_vector3(v);
            assert!((ours - expected).length() < 1e-6);
        }
    }

    #[test]
    fn test_transform_vector3_no_translation() {
        let mat = Mat4::from_translation(Vec3::new(10.0, 20.0, 30.0));
        let vector = Vec3::new(1.0, 0.0, 0.0);

        // Translation should NOT affect vectors (w=0)
        assert_eq!(mat.transform_vector3(vector), vector);
    }

    #[test]
    fn test_rotation_y_quarter_turn() {
        // +X rotates to -Z under a right-handed quarter turn about Y
        let v = Axis::Y.rotation(PI / 2.0).transform_vector3(Vec3::X);
        assert!((v - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn test_transform_aabb_translation() {
        let mat = Mat4::from_translation(Vec3::new(5.0, 5.0, 5.0));
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let transformed = mat.transform_aabb(&aabb);

        assert!((transformed.min() - Vec3::splat(5.0)).length() < 0.001);
        assert!((transformed.max() - Vec3::splat(6.0)).length() < 0.001);
    }

    #[test]
    fn test_transform_aabb_rotation_encloses_corners() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(2.0, 1.0, 1.0));
        let rot = Axis::Y.rotation(PI / 4.0);
        let transformed = rot.transform_aabb(&aabb);

        for corner in aabb.corners() {
            let p = rot.transform_point3(corner);
            assert!(transformed.x.min <= p.x + 1e-5 && p.x - 1e-5 <= transformed.x.max);
            assert!(transformed.z.min <= p.z + 1e-5 && p.z - 1e-5 <= transformed.z.max);
        }
        // Height is unchanged by a rotation about Y
        assert!((transformed.y.size() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_mat4_rotation_inverse() {
        let mat = Axis::Y.rotation(PI / 4.0);
        let inv = mat.inverse();

        let point = Vec3::new(5.0, 3.0, 2.0);
        let back = inv.transform_point3(mat.transform_point3(point));

        assert!((back - point).length() < 0.001);
    }
}
