//! Camera for primary ray generation.
//!
//! The image plane is given by its four corners rather than a field of
//! view, so a transformed (rotated, sheared) plane is represented exactly.

use lumen_math::{Mat4, Ray, Vec3, Vec3Ext};

/// Pinhole camera looking through a quadrilateral image plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye position
    pub origin: Vec3,
    pub upper_left: Vec3,
    pub upper_right: Vec3,
    pub lower_left: Vec3,
    pub lower_right: Vec3,
}

impl Camera {
    /// Create a camera from its eye and image plane corners.
    pub fn new(
        origin: Vec3,
        upper_left: Vec3,
        upper_right: Vec3,
        lower_left: Vec3,
        lower_right: Vec3,
    ) -> Self {
        Self {
            origin,
            upper_left,
            upper_right,
            lower_left,
            lower_right,
        }
    }

    /// Camera at `origin` looking down -Z through a square plane of side
    /// `2 * half_extent` placed at distance 1.
    pub fn looking_down_z(origin: Vec3, half_extent: f32) -> Self {
        let h = half_extent;
        let center = origin - Vec3::Z;
        Self::new(
            origin,
            center + Vec3::new(-h, h, 0.0),
            center + Vec3::new(h, h, 0.0),
            center + Vec3::new(-h, -h, 0.0),
            center + Vec3::new(h, -h, 0.0),
        )
    }

    /// Apply an object-to-world transform to the eye and all corners.
    pub fn transformed(&self, transform: &Mat4) -> Self {
        Self {
            origin: transform.transform_point3(self.origin),
            upper_left: transform.transform_point3(self.upper_left),
            upper_right: transform.transform_point3(self.upper_right),
            lower_left: transform.transform_point3(self.lower_left),
            lower_right: transform.transform_point3(self.lower_right),
        }
    }

    /// Bilinear point on the image plane.
    ///
    /// `u` runs left to right and `v` top to bottom, both in [0, 1].
    pub fn plane_point(&self, u: f32, v: f32) -> Vec3 {
        let left = self.upper_left + (self.lower_left - self.upper_left) * v;
        let right = self.upper_right + (self.lower_right - self.upper_right) * v;
        left + (right - left) * u
    }

    /// Primary ray from the eye through a point on the image plane.
    pub fn ray_through(&self, plane_point: Vec3) -> Ray {
        Ray::new(self.origin, (plane_point - self.origin).normalize_or_self())
    }
}
