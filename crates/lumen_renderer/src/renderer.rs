//! Parallel render loop.
//!
//! Rows of the film are traced independently on the rayon pool. Every pixel
//! averages its stratified samples, each traced from the camera at depth 0,
//! and is written exactly once.

use crate::{Film, RenderError, RenderResult, Sampler, Scene, Tracer};
use lumen_math::Color;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Anti-aliasing samples per pixel axis (N x N per pixel)
    pub samples_per_axis: u32,
    /// Maximum recursion depth for reflection and refraction
    pub max_depth: u32,
    /// Color of rays that hit nothing
    pub background: Color,
    /// Base seed for sample jitter
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            samples_per_axis: 1,
            max_depth: 5,
            background: Color::ZERO,
            seed: 0,
        }
    }
}

/// Render the scene into a new film.
///
/// The scene must have a camera and a current BVH.
pub fn render(scene: &Scene, config: &RenderConfig) -> RenderResult<Film> {
    let (width, height) = (config.width, config.height);
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidResolution { width, height });
    }

    let tracer = Tracer::new(scene, config)?;
    let sampler = Sampler::new(config.samples_per_axis);

    log::info!(
        "Rendering {}x{} with {} samples per pixel, max depth {}",
        width,
        height,
        sampler.samples_per_pixel(),
        config.max_depth
    );
    let start = Instant::now();

    let mut film = Film::new(width, height);
    film.pixels_mut()
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.iter_mut().enumerate() {
                let color = render_pixel(&tracer, &sampler, x as u32, y as u32);
                *pixel = Film::display_color(color);
            }
        });

    log::info!("Render complete in {:.2?}", start.elapsed());
    Ok(film)
}

/// Average color of all samples through pixel (x, y).
pub fn render_pixel(tracer: &Tracer, sampler: &Sampler, x: u32, y: u32) -> Color {
    let camera = tracer.camera();
    let config = tracer.config();
    let samples = sampler.pixel_samples(camera, x, y, (config.width, config.height), config.seed);

    let mut pixel_color = Color::ZERO;
    for point in samples {
        let ray = camera.ray_through(point);
        pixel_color += tracer.trace(&ray, 0, None);
    }

    pixel_color / sampler.samples_per_pixel() as f32
}
