//! Recursive Whitted-style ray tracing.
//!
//! A ray past the depth limit is black. Otherwise the nearest hit is
//! shaded locally, then a reflection ray (weighted by the material's
//! reflectance) and a refraction ray (unweighted) are traced one level
//! deeper. Missing everything yields the background color.

use crate::shading::{self, SurfacePoint};
use crate::{Bvh, Camera, Material, RenderConfig, RenderError, RenderResult, Scene, AIR_IOR};
use lumen_math::{reflect, refract, Color, Ray, Vec3Ext};

/// Read-only view of a scene that is ready to trace.
///
/// Holds shared references only, so one tracer serves every render thread.
#[derive(Clone, Copy)]
pub struct Tracer<'a> {
    scene: &'a Scene,
    bvh: &'a Bvh,
    camera: &'a Camera,
    config: &'a RenderConfig,
}

impl<'a> Tracer<'a> {
    /// Fails if the scene has no camera or its BVH is stale.
    pub fn new(scene: &'a Scene, config: &'a RenderConfig) -> RenderResult<Self> {
        let camera = scene.camera().ok_or(RenderError::MissingCamera)?;
        let bvh = scene.bvh().ok_or(RenderError::BvhNotBuilt)?;
        Ok(Self {
            scene,
            bvh,
            camera,
            config,
        })
    }

    pub fn camera(&self) -> &'a Camera {
        self.camera
    }

    pub fn config(&self) -> &'a RenderConfig {
        self.config
    }

    /// Color seen along `ray` at recursion `depth` (primary rays are depth 0).
    ///
    /// `last_shape` is the surface the ray leaves, if any. Planar surfaces are
    /// excluded from the ray's candidates; curved ones rely on the hit epsilon.
    pub fn trace(&self, ray: &Ray, depth: u32, last_shape: Option<usize>) -> Color {
        if depth > self.config.max_depth {
            return Color::ZERO;
        }

        let surfaces = self.scene.surfaces();
        let skip = last_shape.filter(|&index| surfaces[index].is_planar());
        let Some(hit) = self.bvh.intersect(surfaces, ray, skip) else {
            return self.config.background;
        };

        let shape = &surfaces[hit.shape];
        let material = shape.material();
        let normal = shape.orient_normal(hit.normal, ray.direction);
        let facing = if hit.normal.dot(ray.direction) > 0.0 {
            -hit.normal
        } else {
            hit.normal
        };
        let surface = SurfacePoint {
            shape: hit.shape,
            point: hit.point,
            normal,
            facing,
            view: -ray.direction,
        };

        let mut color = shading::shade(self.scene, self.bvh, &surface, material);

        if material.is_reflective() {
            let reflected = reflection_ray(ray, &surface);
            color += material.reflective * self.trace(&reflected, depth + 1, Some(hit.shape));
        }

        if material.refractive {
            let transmitted = refraction_ray(ray, &surface, material);
            color += self.trace(&transmitted, depth + 1, Some(hit.shape));
        }

        color
    }
}

/// Mirror `ray` about the surface, staying in the same medium.
fn reflection_ray(ray: &Ray, surface: &SurfacePoint) -> Ray {
    let direction = reflect(ray.direction, surface.facing).normalize_or_self();
    Ray::new(surface.outside(), direction).entering(ray.entering)
}

/// Bend `ray` through the surface, or reflect it on total internal reflection.
fn refraction_ray(ray: &Ray, surface: &SurfacePoint, material: &Material) -> Ray {
    let eta = if ray.entering {
        AIR_IOR / material.ior()
    } else {
        material.ior() / AIR_IOR
    };

    match refract(ray.direction, surface.facing, eta) {
        Some(direction) => {
            Ray::new(surface.inside(), direction.normalize_or_self()).entering(!ray.entering)
        }
        None => {
            log::trace!("Total internal reflection at {}", surface.point);
            reflection_ray(ray, surface)
        }
    }
}
