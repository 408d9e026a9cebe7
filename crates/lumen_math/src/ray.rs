use crate::{Interval, Vec3};

/// A ray in 3D space with origin, direction, medium flag and valid t range.
///
/// Only intersections with `t` inside `t` (the ray's interval) count as hits.
/// `entering` is true while the ray travels through the outer medium, so the
/// next refractive surface it meets is entered rather than exited.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub entering: bool,
    pub t: Interval,
}

impl Ray {
    /// Create a new ray travelling through the outer medium, valid for t >= 0.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            entering: true,
            t: Interval::new(0.0, f32::INFINITY),
        }
    }

    /// Create a ray restricted to the given parametric interval.
    pub fn with_interval(origin: Vec3, direction: Vec3, t: Interval) -> Self {
        Self {
            origin,
            direction,
            entering: true,
            t,
        }
    }

    /// Set the medium flag.
    pub fn entering(mut self, entering: bool) -> Self {
        self.entering = entering;
        self
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_creation() {
        let origin = Vec3::new(1.0, 2.0, 3.0);
        let direction = Vec3::new(0.0, 1.0, 0.0);
        let ray = Ray::new(origin, direction);

        assert_eq!(ray.origin, origin);
        assert_eq!(ray.direction, direction);
        assert!(ray.entering);
        assert_eq!(ray.t.min, 0.0);
        assert_eq!(ray.t.max, f32::INFINITY);
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_interval_and_medium() {
        let ray = Ray::with_interval(Vec3::ZERO, Vec3::Z, Interval::new(0.5, 4.0)).entering(false);

        assert!(!ray.entering);
        assert!(ray.t.contains(2.0));
        assert!(!ray.t.contains(5.0));
    }
}
