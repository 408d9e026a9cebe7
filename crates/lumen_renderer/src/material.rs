//! Phong surface description.

use lumen_math::Color;

/// Refractive index used for every refractive material.
pub const GLASS_IOR: f32 = 1.5;

/// Refractive index of the medium the camera sits in.
pub const AIR_IOR: f32 = 1.0;

/// Phong material coefficients.
///
/// Colors are per-channel multipliers; none of them are clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Ambient reflectance (ka)
    pub ambient: Color,
    /// Lambertian reflectance (kd)
    pub diffuse: Color,
    /// Specular highlight reflectance (ks)
    pub specular: Color,
    /// Phong exponent (shininess)
    pub phong_exponent: f32,
    /// Mirror reflectance (kr), weights the reflection ray
    pub reflective: Color,
    /// Whether the surface transmits light (refractive index `GLASS_IOR`)
    pub refractive: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Color::ZERO,
            diffuse: Color::ZERO,
            specular: Color::ZERO,
            phong_exponent: 1.0,
            reflective: Color::ZERO,
            refractive: false,
        }
    }
}

impl Material {
    /// Material that only responds to ambient light.
    pub fn ambient(ambient: Color) -> Self {
        Self {
            ambient,
            ..Default::default()
        }
    }

    /// Plain diffuse material.
    pub fn diffuse(diffuse: Color) -> Self {
        Self {
            diffuse,
            ..Default::default()
        }
    }

    /// Perfect mirror tinted by `reflective`.
    pub fn mirror(reflective: Color) -> Self {
        Self {
            reflective,
            ..Default::default()
        }
    }

    /// Set the specular term.
    pub fn with_specular(mut self, specular: Color, phong_exponent: f32) -> Self {
        self.specular = specular;
        self.phong_exponent = phong_exponent;
        self
    }

    /// Set the refractive flag.
    pub fn with_refraction(mut self, refractive: bool) -> Self {
        self.refractive = refractive;
        self
    }

    /// True if the material spawns reflection rays.
    pub fn is_reflective(&self) -> bool {
        self.reflective.max_element() > 0.0
    }

    /// Refractive index of the material's interior.
    pub fn ior(&self) -> f32 {
        if self.refractive {
            GLASS_IOR
        } else {
            AIR_IOR
        }
    }
}
