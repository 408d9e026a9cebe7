//! Light sources.
//!
//! Ambient lights only scale the material's ambient term. Directional and
//! point lights drive the diffuse/specular terms and cast shadows.

use lumen_math::{Color, Vec3, Vec3Ext};

/// Uniform light reaching every surface regardless of occlusion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
}

impl AmbientLight {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

/// Light arriving from infinitely far away along `direction`, no attenuation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels (from the light toward the scene), unit length
    pub direction: Vec3,
    pub color: Color,
}

impl DirectionalLight {
    /// Create a directional light. The direction is normalized.
    pub fn new(direction: Vec3, color: Color) -> Self {
        Self {
            direction: direction.normalize_or_self(),
            color,
        }
    }
}

/// Light emitted from a point, attenuated by `distance^falloff`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
    /// 0 = none, 1 = linear, 2 = quadratic
    pub falloff: u32,
}

impl PointLight {
    pub fn new(position: Vec3, color: Color, falloff: u32) -> Self {
        Self {
            position,
            color,
            falloff,
        }
    }

    /// Factor the light's contribution is divided by at `distance`.
    pub fn attenuation(&self, distance: f32) -> f32 {
        match self.falloff {
            0 => 1.0,
            1 => distance,
            n => distance.powi(n as i32),
        }
    }
}
