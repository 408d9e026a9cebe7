//! Sphere primitive for ray tracing.
//!
//! The sphere is defined in object space and placed in the world by an
//! affine transform, so scaled spheres render as ellipsoids. Rays are
//! intersected in object space.

use crate::{shape::T_EPSILON, Material, Shape};
use lumen_math::{Aabb, Mat3, Mat4, Mat4Ext, Ray, Vec3};

/// A (possibly transformed) sphere.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    /// World-to-object transform
    inverse: Mat4,
    /// Inverse transpose of the linear part, for normals
    normal_matrix: Mat3,
    material: Material,
    bbox: Aabb,
    /// False for zero-radius spheres and singular transforms
    valid: bool,
}

impl Sphere {
    /// Create an untransformed sphere.
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        Self::with_transform(center, radius, Mat4::IDENTITY, material)
    }

    /// Create a sphere placed in the world by `transform`.
    pub fn with_transform(center: Vec3, radius: f32, transform: Mat4, material: Material) -> Self {
        let valid = radius.is_finite() && radius > 0.0 && transform.is_invertible();
        let inverse = if valid { transform.inverse() } else { Mat4::IDENTITY };

        let bbox = if valid {
            let rvec = Vec3::splat(radius);
            transform.transform_aabb(&Aabb::from_points(center - rvec, center + rvec))
        } else {
            log::debug!("Degenerate sphere (radius {radius}) will not be hit");
            Aabb::EMPTY
        };

        Self {
            center,
            radius,
            inverse,
            normal_matrix: Mat3::from_mat4(inverse).transpose(),
            material,
            bbox,
            valid,
        }
    }
}

impl Shape for Sphere {
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        if !self.valid {
            return None;
        }

        // Same t in both spaces since the direction is transformed linearly
        let origin = self.inverse.transform_point3(ray.origin);
        let direction = self.inverse.transform_vector3(ray.direction);

        let oc = self.center - origin;
        let a = direction.length_squared();
        if a == 0.0 {
            return None;
        }
        let h = direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        let accept = |t: f32| t > T_EPSILON && ray.t.contains(t);

        // Nearest root first
        let near = (h - sqrtd) / a;
        if accept(near) {
            return Some(near);
        }
        let far = (h + sqrtd) / a;
        accept(far).then_some(far)
    }

    fn normal_at(&self, point: Vec3) -> Vec3 {
        let local = self.inverse.transform_point3(point);
        let outward = (local - self.center) / self.radius;
        (self.normal_matrix * outward).normalize_or_zero()
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn material(&self) -> &Material {
        &self.material
    }
}
