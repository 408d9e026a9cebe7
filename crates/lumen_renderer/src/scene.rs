//! Renderable scene: camera, surfaces, lights and the derived BVH.

use crate::{AmbientLight, Bvh, Camera, DirectionalLight, PointLight, Shape};
use lumen_math::Color;

/// Everything the tracer reads while rendering.
///
/// The BVH is derived from the surface list: adding a surface drops it, and
/// `build_bvh` must be called again before rendering.
#[derive(Default)]
pub struct Scene {
    camera: Option<Camera>,
    surfaces: Vec<Box<dyn Shape>>,
    ambient_lights: Vec<AmbientLight>,
    directional_lights: Vec<DirectionalLight>,
    point_lights: Vec<PointLight>,
    bvh: Option<Bvh>,
}

impl Scene {
    /// Create an empty scene with no camera.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = Some(camera);
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    /// Add a surface. Invalidates the BVH.
    pub fn add_surface<S: Shape + 'static>(&mut self, surface: S) {
        self.add_boxed_surface(Box::new(surface));
    }

    /// Add an already boxed surface. Invalidates the BVH.
    pub fn add_boxed_surface(&mut self, surface: Box<dyn Shape>) {
        self.surfaces.push(surface);
        self.bvh = None;
    }

    pub fn add_ambient_light(&mut self, light: AmbientLight) {
        self.ambient_lights.push(light);
    }

    pub fn add_directional_light(&mut self, light: DirectionalLight) {
        self.directional_lights.push(light);
    }

    pub fn add_point_light(&mut self, light: PointLight) {
        self.point_lights.push(light);
    }

    /// (Re)build the BVH over the current surfaces.
    pub fn build_bvh(&mut self) {
        let start = std::time::Instant::now();
        self.bvh = Some(Bvh::build(&self.surfaces));
        log::info!(
            "BVH built over {} surfaces in {:?}",
            self.surfaces.len(),
            start.elapsed()
        );
    }

    /// The BVH, if it is current.
    pub fn bvh(&self) -> Option<&Bvh> {
        self.bvh.as_ref()
    }

    pub fn surfaces(&self) -> &[Box<dyn Shape>] {
        &self.surfaces
    }

    pub fn ambient_lights(&self) -> &[AmbientLight] {
        &self.ambient_lights
    }

    pub fn directional_lights(&self) -> &[DirectionalLight] {
        &self.directional_lights
    }

    pub fn point_lights(&self) -> &[PointLight] {
        &self.point_lights
    }

    /// Sum of all ambient light colors.
    pub fn ambient(&self) -> Color {
        self.ambient_lights.iter().map(|l| l.color).sum()
    }

    /// Total number of lights of all kinds.
    pub fn light_count(&self) -> usize {
        self.ambient_lights.len() + self.directional_lights.len() + self.point_lights.len()
    }
}
