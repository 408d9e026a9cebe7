//! Local Phong illumination with hard shadows.

use crate::{Bvh, Material, Scene, T_EPSILON};
use lumen_math::{reflect, Color, Interval, Ray, Vec3, Vec3Ext};

/// Distance secondary rays start off the surface they leave.
pub const SURFACE_OFFSET: f32 = 1e-4;

/// A point being shaded, as seen by one incoming ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    /// Index of the surface in the scene
    pub shape: usize,
    pub point: Vec3,
    /// Unit normal used for lighting
    pub normal: Vec3,
    /// Unit normal on the side the incoming ray arrived from
    pub facing: Vec3,
    /// Unit vector from the point back toward the viewer
    pub view: Vec3,
}

impl SurfacePoint {
    /// Origin for a ray leaving on the incoming side.
    pub fn outside(&self) -> Vec3 {
        self.point + self.facing * SURFACE_OFFSET
    }

    /// Origin for a ray continuing through the surface.
    pub fn inside(&self) -> Vec3 {
        self.point - self.facing * SURFACE_OFFSET
    }
}

/// Ambient plus diffuse and specular from every unshadowed light.
pub fn shade(scene: &Scene, bvh: &Bvh, surface: &SurfacePoint, material: &Material) -> Color {
    let mut color = material.ambient * scene.ambient();

    for light in scene.directional_lights() {
        let to_light = -light.direction;
        if !in_shadow(scene, bvh, surface, to_light, f32::INFINITY) {
            color += phong(material, surface, to_light, light.color);
        }
    }

    for light in scene.point_lights() {
        let offset = light.position - surface.point;
        let distance = offset.length();
        if distance <= T_EPSILON {
            continue;
        }
        let to_light = offset / distance;
        if !in_shadow(scene, bvh, surface, to_light, distance - SURFACE_OFFSET) {
            color += phong(material, surface, to_light, light.color) / light.attenuation(distance);
        }
    }

    color
}

/// Diffuse and specular terms for one light of the given color.
fn phong(material: &Material, surface: &SurfacePoint, to_light: Vec3, light: Color) -> Color {
    let n = surface.normal;
    let diffuse = material.diffuse * n.dot(to_light).max(0.0);

    let mirrored = reflect(-to_light, n).normalize_or_self();
    let highlight = mirrored.dot(surface.view).max(0.0).powf(material.phong_exponent);
    let specular = material.specular * highlight;

    (diffuse + specular) * light
}

/// Any surface between the point and the light, up to `max_distance`.
fn in_shadow(
    scene: &Scene,
    bvh: &Bvh,
    surface: &SurfacePoint,
    to_light: Vec3,
    max_distance: f32,
) -> bool {
    let skip = scene.surfaces()[surface.shape]
        .is_planar()
        .then_some(surface.shape);
    let ray = Ray::with_interval(
        surface.outside(),
        to_light,
        Interval::new(0.0, max_distance),
    );
    bvh.occluded(scene.surfaces(), &ray, skip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AmbientLight, DirectionalLight, PointLight, Sphere, Triangle};

    const EPS: f32 = 1e-5;

    /// Floor triangle in the z = 0 plane facing +Z, as surface 0.
    fn floor_scene(material: Material) -> Scene {
        let mut scene = Scene::new();
        scene.add_surface(Triangle::new(
            Vec3::new(-10.0, -10.0, 0.0),
            Vec3::new(10.0, -10.0, 0.0),
            Vec3::new(0.0, 10.0, 0.0),
            material,
        ));
        scene
    }

    fn floor_point() -> SurfacePoint {
        SurfacePoint {
            shape: 0,
            point: Vec3::ZERO,
            normal: Vec3::Z,
            facing: Vec3::Z,
            view: Vec3::Z,
        }
    }

    fn shade_scene(scene: &mut Scene) -> Color {
        scene.build_bvh();
        let material = *scene.surfaces()[0].material();
        let bvh = scene.bvh().cloned().unwrap();
        shade(scene, &bvh, &floor_point(), &material)
    }

    #[test]
    fn test_ambient_only() {
        let mut scene = floor_scene(Material::ambient(Color::splat(0.5)));
        scene.add_ambient_light(AmbientLight::new(Color::new(0.2, 0.4, 1.0)));

        assert_eq!(shade_scene(&mut scene), Color::new(0.1, 0.2, 0.5));
    }

    #[test]
    fn test_diffuse_follows_cosine() {
        let mut scene = floor_scene(Material::diffuse(Color::ONE));
        let direction = Vec3::new(1.0, 0.0, -1.0);
        scene.add_directional_light(DirectionalLight::new(direction, Color::ONE));

        let color = shade_scene(&mut scene);
        let expected = std::f32::consts::FRAC_1_SQRT_2;
        assert!((color.x - expected).abs() < EPS, "got {color}");
    }

    #[test]
    fn test_light_below_surface_contributes_nothing_diffuse() {
        let mut scene = floor_scene(Material::diffuse(Color::ONE));
        scene.add_directional_light(DirectionalLight::new(Vec3::Z, Color::ONE));

        assert_eq!(shade_scene(&mut scene), Color::ZERO);
    }

    #[test]
    fn test_specular_peaks_along_mirror_direction() {
        let material = Material::default().with_specular(Color::ONE, 20.0);
        let mut scene = floor_scene(material);
        // Light straight above; viewer straight above sees the full highlight
        scene.add_directional_light(DirectionalLight::new(-Vec3::Z, Color::ONE));

        let color = shade_scene(&mut scene);
        assert!((color.x - 1.0).abs() < EPS, "got {color}");
    }

    #[test]
    fn test_point_light_falloff() {
        let brightness = |height: f32, falloff: u32| {
            let mut scene = floor_scene(Material::diffuse(Color::ONE));
            scene.add_point_light(PointLight::new(Vec3::Z * height, Color::ONE, falloff));
            shade_scene(&mut scene).x
        };

        assert!((brightness(2.0, 0) - 1.0).abs() < EPS);
        assert!((brightness(2.0, 1) / brightness(1.0, 1) - 0.5).abs() < EPS);
        assert!((brightness(2.0, 2) / brightness(1.0, 2) - 0.25).abs() < EPS);
    }

    #[test]
    fn test_blocker_casts_shadow() {
        let mut scene = floor_scene(Material::diffuse(Color::ONE));
        scene.add_point_light(PointLight::new(Vec3::Z * 4.0, Color::ONE, 0));
        scene.add_surface(Sphere::new(Vec3::Z * 2.0, 0.5, Material::default()));

        assert_eq!(shade_scene(&mut scene), Color::ZERO);
    }

    #[test]
    fn test_blocker_beyond_point_light_casts_no_shadow() {
        let mut scene = floor_scene(Material::diffuse(Color::ONE));
        scene.add_point_light(PointLight::new(Vec3::Z * 2.0, Color::ONE, 0));
        scene.add_surface(Sphere::new(Vec3::Z * 4.0, 0.5, Material::default()));

        assert!((shade_scene(&mut scene).x - 1.0).abs() < EPS);
    }
}
