//! Shape trait and HitRecord for ray-surface intersection.

use crate::Material;
use lumen_math::{Aabb, Ray, Vec3};

/// Hits closer than this to the ray origin are ignored, so secondary rays
/// never re-hit the surface they start on.
pub const T_EPSILON: f32 = 1e-4;

/// Record of the nearest ray-surface intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Index of the shape in the scene's surface list
    pub shape: usize,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub point: Vec3,
    /// Surface normal at the intersection, as reported by `Shape::normal_at`
    pub normal: Vec3,
}

/// A surface that can be intersected by rays.
///
/// Shapes are immutable once built and shared read-only across render threads.
pub trait Shape: Send + Sync {
    /// Nearest intersection parameter inside `ray.t` and beyond `T_EPSILON`.
    ///
    /// Degenerate shapes return `None` rather than failing.
    fn intersect(&self, ray: &Ray) -> Option<f32>;

    /// World-space unit normal at a point on the surface.
    fn normal_at(&self, point: Vec3) -> Vec3;

    /// World-space box fully containing the shape.
    fn bounding_box(&self) -> Aabb;

    /// Surface material.
    fn material(&self) -> &Material;

    /// True if a ray leaving the surface can never hit it again.
    fn is_planar(&self) -> bool {
        false
    }

    /// Normal used for shading a hit by a ray travelling along `incoming`.
    ///
    /// By default the normal is flipped to face the incoming ray.
    fn orient_normal(&self, normal: Vec3, incoming: Vec3) -> Vec3 {
        if normal.dot(incoming) > 0.0 {
            -normal
        } else {
            normal
        }
    }
}
