//! Lumen renderer - recursive CPU ray tracing
//!
//! A Whitted-style tracer: Phong shading with hard shadows from ambient,
//! directional and point lights, plus mirror reflection and refraction
//! through a BVH over spheres and triangles.

mod bvh;
mod camera;
mod error;
mod film;
mod light;
mod material;
mod renderer;
mod sampler;
mod scene;
mod shading;
mod shape;
mod sphere;
mod tracer;
mod triangle;

pub use bvh::Bvh;
pub use camera::Camera;
pub use error::{RenderError, RenderResult};
pub use film::Film;
pub use light::{AmbientLight, DirectionalLight, PointLight};
pub use material::{Material, AIR_IOR, GLASS_IOR};
pub use renderer::{render, render_pixel, RenderConfig};
pub use sampler::{PixelSamples, Sampler, MAX_SAMPLES_PER_AXIS};
pub use scene::Scene;
pub use shading::{shade, SurfacePoint, SURFACE_OFFSET};
pub use shape::{HitRecord, Shape, T_EPSILON};
pub use sphere::Sphere;
pub use tracer::Tracer;
pub use triangle::Triangle;

/// Re-export common math types from lumen_math
pub use lumen_math::{Aabb, Color, Interval, Mat4, Ray, Vec3};
