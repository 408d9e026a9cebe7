//! Stratified jitter sampling for anti-aliasing.
//!
//! Each pixel is split into an N x N grid of sub-cells with one uniformly
//! random sample per cell (or the exact pixel center when N = 1). Samples
//! are drawn from a generator seeded per pixel, so every render thread owns
//! its randomness and re-renders are reproducible.

use crate::Camera;
use lumen_math::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Largest supported grid side; keeps `samples_per_axis^2` well inside `u32`.
pub const MAX_SAMPLES_PER_AXIS: u32 = 256;

/// Sample pattern configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampler {
    samples_per_axis: u32,
}

impl Sampler {
    /// Create a sampler taking `samples_per_axis^2` samples per pixel.
    /// Zero is treated as one and values above `MAX_SAMPLES_PER_AXIS` are capped.
    pub fn new(samples_per_axis: u32) -> Self {
        if samples_per_axis > MAX_SAMPLES_PER_AXIS {
            log::warn!("{samples_per_axis} samples per axis capped to {MAX_SAMPLES_PER_AXIS}");
        }
        Self {
            samples_per_axis: samples_per_axis.clamp(1, MAX_SAMPLES_PER_AXIS),
        }
    }

    pub fn samples_per_axis(&self) -> u32 {
        self.samples_per_axis
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_axis * self.samples_per_axis
    }

    /// Lazy sequence of world-space image plane points for pixel (x, y).
    ///
    /// Column `x` runs left to right, row `y` top to bottom.
    pub fn pixel_samples<'a>(
        &self,
        camera: &'a Camera,
        x: u32,
        y: u32,
        resolution: (u32, u32),
        seed: u64,
    ) -> PixelSamples<'a> {
        let seed = pixel_seed(seed, x, y);
        PixelSamples {
            camera,
            pixel: (x as f32, y as f32),
            resolution: (resolution.0 as f32, resolution.1 as f32),
            samples_per_axis: self.samples_per_axis,
            next: 0,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Mix the render seed with the pixel coordinates.
fn pixel_seed(seed: u64, x: u32, y: u32) -> u64 {
    let coords = ((y as u64) << 32) | x as u64;
    seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ coords
}

/// Sample points of one pixel, row by row through the sub-cell grid.
///
/// Finite (`samples_per_axis^2` items) and restartable: `restart` or a
/// clone taken before iterating yields the same points again.
#[derive(Debug, Clone)]
pub struct PixelSamples<'a> {
    camera: &'a Camera,
    pixel: (f32, f32),
    resolution: (f32, f32),
    samples_per_axis: u32,
    next: u32,
    seed: u64,
    rng: StdRng,
}

impl PixelSamples<'_> {
    /// Rewind to the first sample.
    pub fn restart(&mut self) {
        self.next = 0;
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    /// Offset inside the pixel, each component in [0, 1).
    fn subpixel_offset(&mut self, cell: u32) -> (f32, f32) {
        let n = self.samples_per_axis;
        if n == 1 {
            return (0.5, 0.5);
        }
        let (cx, cy) = ((cell % n) as f32, (cell / n) as f32);
        let jx: f32 = self.rng.gen();
        let jy: f32 = self.rng.gen();
        ((cx + jx) / n as f32, (cy + jy) / n as f32)
    }
}

impl Iterator for PixelSamples<'_> {
    type Item = Vec3;

    fn next(&mut self) -> Option<Vec3> {
        if self.next >= self.samples_per_axis * self.samples_per_axis {
            return None;
        }
        let (ox, oy) = self.subpixel_offset(self.next);
        self.next += 1;

        let u = (self.pixel.0 + ox) / self.resolution.0;
        let v = (self.pixel.1 + oy) / self.resolution.1;
        Some(self.camera.plane_point(u, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.samples_per_axis * self.samples_per_axis - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PixelSamples<'_> {}
