//! Lumen Scene - scene description and mesh loading.
//!
//! This crate turns scene files into a ready-to-render
//! [`lumen_renderer::Scene`]:
//!
//! - **Scene files**: line-oriented directives for the camera, spheres,
//!   triangles, lights, materials and transforms
//! - **OBJ meshes**: Wavefront geometry referenced from a scene file
//!
//! # Example
//!
//! ```ignore
//! use lumen_scene::load_scene;
//!
//! let loaded = load_scene("scenes/spheres.txt")?;
//! println!("Loaded {} surfaces", loaded.scene.surfaces().len());
//! ```

mod error;
pub mod obj;
mod parser;

use std::path::Path;

pub use error::{LoadError, LoadResult};
pub use obj::{load_obj, parse_obj, ObjMesh};
pub use parser::{LoadedScene, SceneParser};

/// Load a scene file. `obj` paths inside it resolve against its directory.
pub fn load_scene<P: AsRef<Path>>(path: P) -> LoadResult<LoadedScene> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    log::info!("Loading scene {}", path.display());
    let base_dir = path.parent().map(|p| p.to_path_buf());
    Ok(SceneParser::new(base_dir).parse(&content))
}

/// Parse scene text (useful for testing).
pub fn parse_scene(content: &str, base_dir: Option<&Path>) -> LoadedScene {
    SceneParser::new(base_dir.map(Path::to_path_buf)).parse(content)
}
