//! Vector helpers shared by shading and the tracer.

use glam::Vec3;

/// Lengths below this are considered degenerate.
const DEGENERATE_LENGTH: f32 = 1e-10;

/// Extension trait for Vec3.
pub trait Vec3Ext {
    /// Normalize, or return the vector unchanged if its length is near zero.
    ///
    /// Unlike `Vec3::normalize` this never produces NaNs, but the result is
    /// not guaranteed to be unit length.
    fn normalize_or_self(self) -> Vec3;
}

impl Vec3Ext for Vec3 {
    #[inline]
    fn normalize_or_self(self) -> Vec3 {
        let length = self.length();
        if length < DEGENERATE_LENGTH {
            self
        } else {
            self / length
        }
    }
}

/// Reflect a direction about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit direction through a surface with unit normal `n` facing
/// against it, with `eta` the ratio of refractive indices (incident over
/// transmitted).
///
/// Returns `None` on total internal reflection.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, eta: f32) -> Option<Vec3> {
    let cos_i = (-uv).dot(n).min(1.0);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return None;
    }
    Some(eta * uv + (eta * cos_i - k.sqrt()) * n)
}
