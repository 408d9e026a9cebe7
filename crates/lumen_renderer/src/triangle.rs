//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.
//! Vertices are stored in world space.

use crate::{shape::T_EPSILON, Material, Shape};
use lumen_math::{Aabb, Ray, Vec3};

/// Cross products shorter than this mark a zero-area triangle.
const DEGENERATE_AREA: f32 = 1e-12;

/// A flat or smooth-shaded triangle.
pub struct Triangle {
    /// Vertices
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    /// Face normal from the winding (unit length, zero if degenerate)
    normal: Vec3,
    /// Per-vertex normals for smooth shading
    vertex_normals: Option<[Vec3; 3]>,
    material: Material,
    bbox: Aabb,
}

impl Triangle {
    /// Create a flat triangle. The normal follows the winding v0 -> v1 -> v2.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Material) -> Self {
        let cross = (v1 - v0).cross(v2 - v0);
        let normal = if cross.length_squared() > DEGENERATE_AREA {
            cross.normalize()
        } else {
            Vec3::ZERO
        };

        Self {
            v0,
            v1,
            v2,
            normal,
            vertex_normals: None,
            material,
            bbox: Aabb::enclosing([v0, v1, v2]),
        }
    }

    /// Create a flat triangle whose normal faces `eye`.
    ///
    /// The winding is swapped once here if the face points away from the
    /// eye. The orientation is baked in; it is not re-derived at render time.
    pub fn facing(v0: Vec3, v1: Vec3, v2: Vec3, eye: Vec3, material: Material) -> Self {
        let cross = (v1 - v0).cross(v2 - v0);
        let view = (v0 + v1 + v2) / 3.0 - eye;
        if cross.dot(view) > 0.0 {
            Self::new(v0, v2, v1, material)
        } else {
            Self::new(v0, v1, v2, material)
        }
    }

    /// Create a smooth-shaded triangle with one normal per vertex.
    pub fn smooth(v0: Vec3, v1: Vec3, v2: Vec3, normals: [Vec3; 3], material: Material) -> Self {
        let mut triangle = Self::new(v0, v1, v2, material);
        triangle.vertex_normals = Some(normals.map(|n| n.normalize_or_zero()));
        triangle
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// Geometric normal from the winding.
    pub fn face_normal(&self) -> Vec3 {
        self.normal
    }

    fn is_degenerate(&self) -> bool {
        self.normal == Vec3::ZERO
    }

    /// Barycentric weights of a point in the triangle's plane.
    fn barycentric(&self, point: Vec3) -> (f32, f32, f32) {
        let e0 = self.v1 - self.v0;
        let e1 = self.v2 - self.v0;
        let e2 = point - self.v0;
        let d00 = e0.dot(e0);
        let d01 = e0.dot(e1);
        let d11 = e1.dot(e1);
        let d20 = e2.dot(e0);
        let d21 = e2.dot(e1);
        let denom = d00 * d11 - d01 * d01;
        if denom.abs() < DEGENERATE_AREA {
            return (1.0, 0.0, 0.0);
        }
        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        (1.0 - v - w, v, w)
    }
}

impl Shape for Triangle {
    /// Möller-Trumbore ray-triangle intersection algorithm.
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        if self.is_degenerate() {
            return None;
        }

        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = ray.direction.cross(edge2);
        let a = edge1.dot(h);

        // Ray is parallel to triangle
        if a.abs() < 1e-8 {
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        (t > T_EPSILON && ray.t.contains(t)).then_some(t)
    }

    fn normal_at(&self, point: Vec3) -> Vec3 {
        match self.vertex_normals {
            Some([n0, n1, n2]) => {
                let (a, b, c) = self.barycentric(point);
                let interpolated = (n0 * a + n1 * b + n2 * c).normalize_or_zero();
                if interpolated == Vec3::ZERO {
                    self.normal
                } else {
                    interpolated
                }
            }
            None => self.normal,
        }
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn material(&self) -> &Material {
        &self.material
    }

    fn is_planar(&self) -> bool {
        true
    }

    /// Triangle normals keep the orientation baked in at construction.
    fn orient_normal(&self, normal: Vec3, _incoming: Vec3) -> Vec3 {
        normal
    }
}
