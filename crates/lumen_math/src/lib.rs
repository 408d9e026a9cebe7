// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod aabb;
mod interval;
mod ray;
mod transform;
mod vector;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::Mat4Ext;
pub use vector::{reflect, refract, Vec3Ext};

/// Color type alias (RGB, linear, unclamped while accumulating)
pub type Color = Vec3;
