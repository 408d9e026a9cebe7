//! Wavefront OBJ mesh import.
//!
//! Files are read with `tobj`, keeping separate position and normal index
//! streams. Every model in the file is merged into one mesh. Faces with more
//! than three corners keep their first three; materials are ignored.

use std::path::Path;

use lumen_math::{Mat4, Mat4Ext, Vec3};
use lumen_renderer::{Material, Triangle};

use crate::error::LoadResult;

/// One face corner as 0-based indices into the mesh attribute lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceVertex {
    pub position: usize,
    pub normal: Option<usize>,
}

/// Geometry read from an OBJ file, in object space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub faces: Vec<[FaceVertex; 3]>,
}

impl ObjMesh {
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// World-space triangles for every face.
    ///
    /// Faces with a normal on every corner become smooth triangles; the rest
    /// are flat and wound to face `eye`.
    pub fn triangles(&self, transform: &Mat4, material: Material, eye: Vec3) -> Vec<Triangle> {
        self.faces
            .iter()
            .map(|face| {
                let [a, b, c] = face.map(|v| transform.transform_point3(self.positions[v.position]));
                match face.map(|v| v.normal) {
                    [Some(na), Some(nb), Some(nc)] => {
                        let normals = [na, nb, nc].map(|n| transform.transform_normal(self.normals[n]));
                        Triangle::smooth(a, b, c, normals, material)
                    }
                    _ => Triangle::facing(a, b, c, eye, material),
                }
            })
            .collect()
    }

    fn from_models(models: &[tobj::Model]) -> Self {
        let mut mesh = Self::default();
        for model in models {
            mesh.append(&model.name, &model.mesh);
        }

        log::debug!(
            "Read OBJ: {} models, {} vertices, {} normals, {} faces",
            models.len(),
            mesh.positions.len(),
            mesh.normals.len(),
            mesh.faces.len()
        );
        mesh
    }

    /// Add one model, offsetting its indices past what is already stored.
    fn append(&mut self, name: &str, model: &tobj::Mesh) {
        let position_base = self.positions.len();
        let normal_base = self.normals.len();
        self.positions
            .extend(model.positions.chunks_exact(3).map(|p| Vec3::new(p[0], p[1], p[2])));
        self.normals
            .extend(model.normals.chunks_exact(3).map(|n| Vec3::new(n[0], n[1], n[2])));

        let smooth = !model.normal_indices.is_empty()
            && model.normal_indices.len() == model.indices.len();
        if !model.normal_indices.is_empty() && !smooth {
            log::warn!("OBJ model '{name}': normals on only some faces, shading it flat");
        }

        // Empty arities mean every face is a triangle
        let arities: Vec<usize> = if model.face_arities.is_empty() {
            vec![3; model.indices.len() / 3]
        } else {
            model.face_arities.iter().map(|&a| a as usize).collect()
        };

        let mut start = 0;
        for arity in arities {
            if start + arity > model.indices.len() {
                log::warn!("OBJ model '{name}': face list is shorter than its arities");
                break;
            }
            if arity < 3 {
                log::debug!("OBJ model '{name}': skipping {arity}-vertex element");
            } else {
                if arity > 3 {
                    log::debug!("OBJ model '{name}': {arity}-vertex face, using the first 3");
                }
                let corner = |k: usize| FaceVertex {
                    position: position_base + model.indices[start + k] as usize,
                    normal: smooth.then(|| normal_base + model.normal_indices[start + k] as usize),
                };
                self.faces.push([corner(0), corner(1), corner(2)]);
            }
            start += arity;
        }
    }
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: false,
        triangulate: false,
        ..Default::default()
    }
}

/// Read an OBJ file.
pub fn load_obj<P: AsRef<Path>>(path: P) -> LoadResult<ObjMesh> {
    let (models, _materials) = tobj::load_obj(path.as_ref(), &load_options())?;
    Ok(ObjMesh::from_models(&models))
}

/// Parse OBJ text. Material libraries it references are not loaded.
pub fn parse_obj(content: &str) -> LoadResult<ObjMesh> {
    let mut reader = content.as_bytes();
    let (models, _materials) = tobj::load_obj_buf(&mut reader, &load_options(), |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })?;
    Ok(ObjMesh::from_models(&models))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use lumen_renderer::Shape;

    const SQUARE: &str = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n";

    #[test]
    fn test_flat_faces() {
        let mesh = parse_obj(&format!("# unit square\n{SQUARE}f 1 2 3\nf 1 3 4\n")).unwrap();

        assert_eq!(mesh.positions.len(), 4);
        assert!(mesh.normals.is_empty());
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.faces[1].map(|v| v.position), [0, 2, 3]);
        assert!(mesh.faces.iter().flatten().all(|v| v.normal.is_none()));
    }

    #[test]
    fn test_negative_indices() {
        let mesh = parse_obj(&format!("{SQUARE}f -4 -3 -2\n")).unwrap();

        assert_eq!(mesh.triangle_count(), 1);
        let [a, b, c] = mesh.faces[0].map(|v| mesh.positions[v.position]);
        assert_eq!([a, b, c], [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0)]);
    }

    #[test]
    fn test_quad_keeps_first_three_corners() {
        let mesh = parse_obj(&format!("{SQUARE}f 1 2 3 4\n")).unwrap();

        assert_eq!(mesh.triangle_count(), 1);
        let corners = mesh.faces[0].map(|v| mesh.positions[v.position]);
        assert_eq!(corners, [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0)]);
    }

    #[test]
    fn test_texture_and_normal_indices() {
        let mesh = parse_obj(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nvn 0 0 1\nf 1/1/1 2/2/1 3/3/1\n",
        )
        .unwrap();

        assert_eq!(mesh.normals, vec![Vec3::Z]);
        assert!(mesh.faces[0].iter().all(|v| v.normal == Some(0)));
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let result = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n");
        assert!(matches!(result, Err(LoadError::Obj(_))));
    }

    #[test]
    fn test_flat_triangles_face_eye() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let eye = Vec3::new(0.0, 0.0, -5.0);
        let triangles = mesh.triangles(&Mat4::IDENTITY, Material::default(), eye);

        assert_eq!(triangles.len(), 1);
        assert!(triangles[0].face_normal().dot(eye) > 0.0);
    }

    #[test]
    fn test_smooth_normals_use_inverse_transpose() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 1 1 0\nf 1//1 2//1 3//1\n").unwrap();
        let transform = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let triangles = mesh.triangles(&transform, Material::default(), Vec3::Z);

        assert_eq!(triangles[0].vertices()[1], Vec3::new(2.0, 0.0, 0.0));
        let normal = triangles[0].normal_at(Vec3::new(0.5, 0.25, 0.0));
        let expected = Vec3::new(0.5, 1.0, 0.0).normalize();
        assert!((normal - expected).length() < 1e-5, "got {normal}");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("lumen_obj_does_not_exist.obj");
        assert!(matches!(load_obj(path), Err(LoadError::Obj(_))));
    }
}
