//! Line-oriented scene description parser.
//!
//! Each non-empty line is a directive followed by whitespace separated
//! parameters; `#` starts a comment line.
//!
//! # Directives
//!
//! - `cam ex ey ez llx lly llz lrx lry lrz ulx uly ulz urx ury urz`
//! - `sph cx cy cz r`
//! - `tri ax ay az bx by bz cx cy cz`
//! - `obj path`
//! - `ltp px py pz r g b [falloff]`
//! - `ltd dx dy dz r g b`
//! - `lta r g b`
//! - `mat kar kag kab kdr kdg kdb ksr ksg ksb ksp krr krg krb`
//! - `ref 0|1`
//! - `xft tx ty tz`, `xfr rx ry rz` (exponential map, degrees), `xfs sx sy sz`
//! - `xfz`
//! - `aa n`
//!
//! Transforms post-multiply the current transform and apply to everything
//! defined after them. A malformed line is logged and skipped; the rest of
//! the file still loads.

use std::path::PathBuf;
use std::time::Instant;

use lumen_math::{Mat4, Mat4Ext, Vec3, Vec3Ext};
use lumen_renderer::{
    AmbientLight, Camera, Color, DirectionalLight, Material, PointLight, Scene, Sphere, Triangle,
};

use crate::error::{LoadError, LoadResult};
use crate::obj::load_obj;

/// A parsed scene with its BVH built, plus render hints from the file.
pub struct LoadedScene {
    pub scene: Scene,
    /// Set by an `aa` directive
    pub samples_per_axis: Option<u32>,
}

/// Parser state: the scene so far plus the current transform and material.
pub struct SceneParser {
    scene: Scene,
    /// Directory relative `obj` paths are resolved against
    base_dir: Option<PathBuf>,
    transform: Mat4,
    material: Material,
    samples_per_axis: Option<u32>,
}

impl SceneParser {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self {
            scene: Scene::new(),
            base_dir,
            transform: Mat4::IDENTITY,
            material: Material::default(),
            samples_per_axis: None,
        }
    }

    /// Parse a whole scene description and build its BVH.
    pub fn parse(mut self, content: &str) -> LoadedScene {
        let start = Instant::now();

        for (index, line) in content.lines().enumerate() {
            if let Err(err) = self.parse_line(line, index + 1) {
                log::warn!("{err}; line skipped");
            }
        }

        if self.scene.camera().is_none() {
            log::warn!("Scene defines no camera");
        }
        log::info!(
            "Parsed scene: {} surfaces, {} lights in {:?}",
            self.scene.surfaces().len(),
            self.scene.light_count(),
            start.elapsed()
        );

        self.scene.build_bvh();
        LoadedScene {
            scene: self.scene,
            samples_per_axis: self.samples_per_axis,
        }
    }

    fn parse_line(&mut self, line: &str, number: usize) -> LoadResult<()> {
        let mut tokens = line.split_whitespace();
        let Some(directive) = tokens.next() else {
            return Ok(());
        };
        if directive.starts_with('#') {
            return Ok(());
        }
        let args: Vec<&str> = tokens.collect();

        match directive {
            "cam" => {
                let v: [f32; 15] = numbers(&args, number, directive)?;
                let corner = |i: usize| Vec3::new(v[i], v[i + 1], v[i + 2]);
                let camera = Camera::new(corner(0), corner(9), corner(12), corner(3), corner(6));
                self.scene.set_camera(camera.transformed(&self.transform));
            }
            "sph" => {
                let [x, y, z, r] = numbers(&args, number, directive)?;
                if r <= 0.0 {
                    log::warn!("Line {number}: sphere radius {r} never intersects");
                }
                self.scene.add_surface(Sphere::with_transform(
                    Vec3::new(x, y, z),
                    r,
                    self.transform,
                    self.material,
                ));
            }
            "tri" => {
                let v: [f32; 9] = numbers(&args, number, directive)?;
                let [a, b, c] = [0, 3, 6]
                    .map(|i| self.transform.transform_point3(Vec3::new(v[i], v[i + 1], v[i + 2])));
                let eye = self.eye();
                self.scene
                    .add_surface(Triangle::facing(a, b, c, eye, self.material));
            }
            "obj" => self.import_obj(&args, number)?,
            "ltp" => {
                let [x, y, z, r, g, b] = parse_numbers(&args, number)?;
                let falloff = match args.get(6) {
                    Some(_) => {
                        let [.., falloff] = parse_numbers::<7>(&args, number)?;
                        whole_number(falloff, number, "falloff")?
                    }
                    None => 0,
                };
                warn_extra(&args, 7, number, directive);
                let position = self.transform.transform_point3(Vec3::new(x, y, z));
                self.scene
                    .add_point_light(PointLight::new(position, Color::new(r, g, b), falloff));
            }
            "ltd" => {
                let [x, y, z, r, g, b] = numbers(&args, number, directive)?;
                let direction = self
                    .transform
                    .transform_vector3(Vec3::new(x, y, z).normalize_or_self());
                self.scene
                    .add_directional_light(DirectionalLight::new(direction, Color::new(r, g, b)));
            }
            "lta" => {
                let [r, g, b] = numbers(&args, number, directive)?;
                self.scene.add_ambient_light(AmbientLight::new(Color::new(r, g, b)));
            }
            "mat" => {
                let v: [f32; 13] = numbers(&args, number, directive)?;
                self.material = Material {
                    ambient: Color::new(v[0], v[1], v[2]),
                    diffuse: Color::new(v[3], v[4], v[5]),
                    specular: Color::new(v[6], v[7], v[8]),
                    phong_exponent: v[9],
                    reflective: Color::new(v[10], v[11], v[12]),
                    refractive: self.material.refractive,
                };
            }
            "ref" => {
                let [flag] = numbers(&args, number, directive)?;
                self.material.refractive = flag.trunc() != 0.0;
            }
            "xft" => {
                let [x, y, z] = numbers(&args, number, directive)?;
                self.transform *= Mat4::from_translation(Vec3::new(x, y, z));
            }
            "xfr" => {
                let [x, y, z] = numbers(&args, number, directive)?;
                self.transform *= Mat4::from_exponential_map_degrees(Vec3::new(x, y, z));
            }
            "xfs" => {
                let [x, y, z] = numbers(&args, number, directive)?;
                self.transform *= Mat4::from_scale(Vec3::new(x, y, z));
            }
            "xfz" => {
                warn_extra(&args, 0, number, directive);
                self.transform = Mat4::IDENTITY;
            }
            "aa" => {
                let [samples] = numbers(&args, number, directive)?;
                self.samples_per_axis = Some(whole_number(samples, number, "sample count")?);
            }
            other => {
                return Err(LoadError::parse(number, format!("unknown directive '{other}'")));
            }
        }

        Ok(())
    }

    /// Eye of the current camera; triangles are wound to face it.
    fn eye(&self) -> Vec3 {
        self.scene.camera().map_or(Vec3::ZERO, |camera| camera.origin)
    }

    fn import_obj(&mut self, args: &[&str], number: usize) -> LoadResult<()> {
        if args.is_empty() {
            return Err(LoadError::parse(number, "obj needs a file path"));
        }
        let relative = PathBuf::from(args.join(" "));
        let path = match &self.base_dir {
            Some(dir) if relative.is_relative() => dir.join(&relative),
            _ => relative,
        };

        let mesh = match load_obj(&path) {
            Ok(mesh) => mesh,
            Err(err) => {
                log::warn!("Line {number}: could not load {}: {err}; skipped", path.display());
                return Ok(());
            }
        };

        let triangles = mesh.triangles(&self.transform, self.material, self.eye());
        log::info!("Loaded {} triangles from {}", triangles.len(), path.display());
        for triangle in triangles {
            self.scene.add_surface(triangle);
        }
        Ok(())
    }
}

/// Parse the first `N` parameters as floats. Fewer than `N` is an error;
/// more are left for the caller.
fn parse_numbers<const N: usize>(args: &[&str], line: usize) -> LoadResult<[f32; N]> {
    if args.len() < N {
        return Err(LoadError::parse(
            line,
            format!("expected {N} parameters, found {}", args.len()),
        ));
    }

    let mut values = [0.0; N];
    for (value, raw) in values.iter_mut().zip(args) {
        *value = raw
            .parse()
            .map_err(|_| LoadError::parse(line, format!("invalid number '{raw}'")))?;
    }
    Ok(values)
}

/// Exactly `N` float parameters; extras are logged and ignored.
fn numbers<const N: usize>(args: &[&str], line: usize, directive: &str) -> LoadResult<[f32; N]> {
    let values = parse_numbers(args, line)?;
    warn_extra(args, N, line, directive);
    Ok(values)
}

/// Truncate a parsed number to a count, so `2` and `2.0` read the same.
fn whole_number(value: f32, line: usize, what: &str) -> LoadResult<u32> {
    if !value.is_finite() || value < 0.0 {
        return Err(LoadError::parse(line, format!("invalid {what} {value}")));
    }
    Ok(value.trunc() as u32)
}

fn warn_extra(args: &[&str], expected: usize, line: usize, directive: &str) {
    if args.len() > expected {
        log::warn!(
            "Line {line}: '{directive}' takes {expected} parameters, ignoring {} extra",
            args.len() - expected
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_renderer::{render, RenderConfig, Shape};

    fn parse(content: &str) -> LoadedScene {
        let _ = env_logger::builder().is_test(true).try_init();
        SceneParser::new(None).parse(content)
    }

    const CAMERA: &str = "cam 0 0 5  -1 -1 4  1 -1 4  -1 1 4  1 1 4";

    #[test]
    fn test_camera_corners() {
        let loaded = parse(CAMERA);
        let camera = loaded.scene.camera().unwrap();

        assert_eq!(camera.origin, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(camera.lower_left, Vec3::new(-1.0, -1.0, 4.0));
        assert_eq!(camera.lower_right, Vec3::new(1.0, -1.0, 4.0));
        assert_eq!(camera.upper_left, Vec3::new(-1.0, 1.0, 4.0));
        assert_eq!(camera.upper_right, Vec3::new(1.0, 1.0, 4.0));
    }

    #[test]
    fn test_basic_scene() {
        let loaded = parse(&format!(
            "# test scene\n{CAMERA}\n\nlta 0.1 0.1 0.1\nltd 0 0 -1 1 1 1\nltp 0 5 0 1 1 1 2\n\
             mat 0.2 0.2 0.2 0.5 0.5 0.5 1 1 1 20 0 0 0\nsph 0 0 0 1\naa 3\n"
        ));
        let scene = &loaded.scene;

        assert_eq!(scene.surfaces().len(), 1);
        assert_eq!(scene.light_count(), 3);
        assert_eq!(scene.point_lights()[0].falloff, 2);
        assert_eq!(loaded.samples_per_axis, Some(3));
        assert!(scene.bvh().is_some());

        let material = scene.surfaces()[0].material();
        assert_eq!(material.diffuse, Color::splat(0.5));
        assert_eq!(material.phong_exponent, 20.0);
        assert!(!material.refractive);
    }

    #[test]
    fn test_material_keeps_refractive_flag() {
        let loaded = parse(
            "ref 1\nmat 0 0 0 0 0 0 0 0 0 1 0.5 0.5 0.5\nsph 0 0 0 1\nref 0\nsph 3 0 0 1\n",
        );
        let surfaces = loaded.scene.surfaces();

        assert!(surfaces[0].material().refractive);
        assert_eq!(surfaces[0].material().reflective, Color::splat(0.5));
        assert!(!surfaces[1].material().refractive);
        assert_eq!(surfaces[1].material().reflective, Color::splat(0.5));
    }

    #[test]
    fn test_transforms_post_multiply_and_reset() {
        let loaded = parse("xft 10 0 0\nxfs 2 2 2\nsph 1 0 0 1\nxfz\nsph 0 0 0 1\n");
        let surfaces = loaded.scene.surfaces();

        // Scale applies first, then the translation
        let moved = surfaces[0].bounding_box().centroid();
        assert!((moved - Vec3::new(12.0, 0.0, 0.0)).length() < 1e-4, "got {moved}");

        let reset = surfaces[1].bounding_box().centroid();
        assert!(reset.length() < 1e-4);
    }

    #[test]
    fn test_directional_light_rotated() {
        let loaded = parse("xfr 0 0 90\nltd 2 0 0 1 1 1\n");
        let direction = loaded.scene.directional_lights()[0].direction;

        assert!((direction - Vec3::Y).length() < 1e-5, "got {direction}");
    }

    #[test]
    fn test_triangle_faces_camera() {
        // Wound clockwise as seen from the eye at +Z
        let loaded = parse(&format!("{CAMERA}\ntri 0 0 0  0 1 0  1 0 0\n"));
        let triangle = &loaded.scene.surfaces()[0];

        let normal = triangle.normal_at(Vec3::new(0.2, 0.2, 0.0));
        assert!((normal - Vec3::Z).length() < 1e-5, "got {normal}");
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let loaded = parse(
            "sph 1 2\nsph a b c d\nfoo 1 2 3\nltp 0 0 0 1 1 1 x\nlta 1 1 1 9\nsph 0 0 0 1 7\n",
        );

        assert_eq!(loaded.scene.surfaces().len(), 1);
        assert_eq!(loaded.scene.ambient_lights().len(), 1);
        assert!(loaded.scene.point_lights().is_empty());
    }

    #[test]
    fn test_counts_accept_decimal_notation() {
        let loaded = parse("aa 2.0\nref 1.0\nsph 0 0 0 1\nltp 0 0 0 1 1 1 2.0\nltp 0 0 0 1 1 1 1.7\n");

        assert_eq!(loaded.samples_per_axis, Some(2));
        assert!(loaded.scene.surfaces()[0].material().refractive);
        let falloffs: Vec<u32> = loaded.scene.point_lights().iter().map(|l| l.falloff).collect();
        assert_eq!(falloffs, vec![2, 1]);
    }

    #[test]
    fn test_fractional_refract_flag_truncates_to_off() {
        let loaded = parse("ref 0.5\nsph 0 0 0 1\naa -1\n");

        assert!(!loaded.scene.surfaces()[0].material().refractive);
        assert_eq!(loaded.samples_per_axis, None);
    }

    #[test]
    fn test_point_light_defaults_to_no_falloff() {
        let loaded = parse("xft 0 1 0\nltp 1 2 3 0.5 0.5 0.5\n");
        let light = loaded.scene.point_lights()[0];

        assert_eq!(light.falloff, 0);
        assert_eq!(light.position, Vec3::new(1.0, 3.0, 3.0));
    }

    #[test]
    fn test_missing_obj_is_skipped() {
        let loaded = parse("obj does/not/exist.obj\nsph 0 0 0 1\n");
        assert_eq!(loaded.scene.surfaces().len(), 1);
    }

    #[test]
    fn test_parsed_scene_renders() {
        let loaded = parse(&format!(
            "{CAMERA}\nlta 1 1 1\nmat 0.5 0.5 0.5 0 0 0 0 0 0 1 0 0 0\nsph 0 0 0 1\n"
        ));
        let config = RenderConfig {
            width: 5,
            height: 5,
            ..RenderConfig::default()
        };

        let film = render(&loaded.scene, &config).unwrap();
        assert_eq!(film.get(2, 2), Color::splat(0.5));
        assert_eq!(film.get(0, 0), Color::ZERO);
    }
}
