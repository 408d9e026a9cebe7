// Transform utilities for Mat4
//
// Extends glam::Mat4 with the affine helpers the scene stack needs.
// Note: glam::Mat4 already provides transform_point3(), transform_vector3() and inverse()

use crate::Aabb;
use glam::{Mat3, Mat4, Vec3};

/// Determinants smaller than this are treated as singular.
const SINGULAR_EPSILON: f32 = 1e-12;

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Rotation about `axis` by `|axis|` degrees (exponential map).
    /// A zero-length axis yields the identity.
    fn from_exponential_map_degrees(axis: Vec3) -> Mat4;

    /// True if the matrix can be inverted without blowing up.
    fn is_invertible(&self) -> bool;

    /// Transform a surface normal (inverse transpose of the upper 3x3), normalized.
    fn transform_normal(&self, normal: Vec3) -> Vec3;

    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    fn from_exponential_map_degrees(axis: Vec3) -> Mat4 {
        let degrees = axis.length();
        if degrees < 1e-10 {
            return Mat4::IDENTITY;
        }
        Mat4::from_axis_angle(axis / degrees, degrees.to_radians())
    }

    fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det.is_finite() && det.abs() > SINGULAR_EPSILON
    }

    fn transform_normal(&self, normal: Vec3) -> Vec3 {
        let linear = Mat3::from_mat4(*self);
        let normal_matrix = linear.inverse().transpose();
        (normal_matrix * normal).normalize_or_zero()
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        if aabb.is_empty() {
            return Aabb::EMPTY;
        }

        let (lo, hi) = (aabb.min(), aabb.max());
        let corners = (0..8).map(|i| {
            Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            )
        });

        Aabb::enclosing(corners.map(|corner| self.transform_point3(corner)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_exponential_map_rotates_about_axis() {
        // 90 degrees about Z
        let mat = Mat4::from_exponential_map_degrees(Vec3::new(0.0, 0.0, 90.0));
        let rotated = mat.transform_vector3(Vec3::X);

        assert!((rotated - Vec3::Y).length() < 0.001);
    }

    #[test]
    fn test_exponential_map_zero_is_identity() {
        assert_eq!(Mat4::from_exponential_map_degrees(Vec3::ZERO), Mat4::IDENTITY);
    }

    #[test]
    fn test_transform_vector_ignores_translation() {
        let mat = Mat4::from_translation(Vec3::new(10.0, 20.0, 30.0));

        assert_eq!(mat.transform_vector3(Vec3::X), Vec3::X);
        assert_eq!(mat.transform_point3(Vec3::X), Vec3::new(11.0, 20.0, 30.0));
    }

    #[test]
    fn test_transform_normal_under_nonuniform_scale() {
        // Plane x + y = 0 has normal (1,1,0); stretching x by 2 tilts it toward y
        let mat = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let normal = mat.transform_normal(Vec3::new(1.0, 1.0, 0.0).normalize());
        let expected = Vec3::new(0.5, 1.0, 0.0).normalize();

        assert!((normal - expected).length() < 0.001);
        // Still perpendicular to a transformed tangent
        let tangent = mat.transform_vector3(Vec3::new(1.0, -1.0, 0.0));
        assert!(normal.dot(tangent).abs() < 0.001);
    }

    #[test]
    fn test_is_invertible() {
        assert!(Mat4::from_rotation_y(PI / 4.0).is_invertible());
        assert!(!Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)).is_invertible());
    }

    #[test]
    fn test_transform_aabb_translation() {
        let mat = Mat4::from_translation(Vec3::splat(5.0));
        let transformed = mat.transform_aabb(&Aabb::from_points(Vec3::ZERO, Vec3::ONE));

        assert!((transformed.min() - Vec3::splat(5.0)).length() < 0.001);
        assert!((transformed.max() - Vec3::splat(6.0)).length() < 0.001);
    }

    #[test]
    fn test_transform_aabb_rotation_grows_box() {
        let mat = Mat4::from_rotation_z(PI / 4.0);
        let unit = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));
        let transformed = mat.transform_aabb(&unit);

        let half_diagonal = 2.0_f32.sqrt();
        assert!((transformed.x.max - half_diagonal).abs() < 0.001);
        assert!(transformed.contains(&unit));
    }

    #[test]
    fn test_mat4_rotation_inverse() {
        let mat = Mat4::from_rotation_y(PI / 4.0);
        let inv = mat.inverse();

        let point = Vec3::new(5.0, 3.0, 2.0);
        let back = inv.transform_point3(mat.transform_point3(point));

        assert!((back - point).length() < 0.001);
    }
}
