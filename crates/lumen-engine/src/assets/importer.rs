use std::path::Path;

use super::AssetError;

/// One mesh as delivered by a scene importer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex normals; empty when the source has none.
    pub normals: Vec<[f32; 3]>,
    /// Per-vertex texture coordinates; empty when the source has none.
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    /// Vertex count of each face. Empty means every face is a triangle.
    pub face_arities: Vec<u32>,
}

impl ImportedMesh {
    /// Triangular faces in order; faces of any other arity are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        let arities: Box<dyn Iterator<Item = usize> + '_> = if self.face_arities.is_empty() {
            Box::new(std::iter::repeat_n(3, self.indices.len() / 3))
        } else {
            Box::new(self.face_arities.iter().map(|&a| a as usize))
        };

        let mut start = 0;
        arities.filter_map(move |arity| {
            let face = self.indices.get(start..start + arity);
            start += arity;
            match face {
                Some(&[a, b, c]) => Some([a, b, c]),
                _ => None,
            }
        })
    }
}

/// Narrow seam over a scene file format.
pub trait SceneImporter {
    fn import(&self, path: &Path) -> Result<Vec<ImportedMesh>, AssetError>;
}

/// Wavefront OBJ through `tobj`, triangulated with a single index stream.
#[derive(Debug, Copy, Clone, Default)]
pub struct ObjImporter;

impl SceneImporter for ObjImporter {
    fn import(&self, path: &Path) -> Result<Vec<ImportedMesh>, AssetError> {
        let (models, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
        )
        .map_err(|e| AssetError::Import {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if let Err(e) = materials {
            log::debug!("{}: materials ignored ({e})", path.display());
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let mesh = model.mesh;
                ImportedMesh {
                    name: model.name,
                    positions: mesh.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect(),
                    normals: mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect(),
                    uvs: mesh.texcoords.chunks_exact(2).map(|t| [t[0], t[1]]).collect(),
                    indices: mesh.indices,
                    face_arities: mesh.face_arities,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_arities_are_triangles() {
        let mesh = ImportedMesh {
            indices: vec![0, 1, 2, 2, 3, 0],
            ..Default::default()
        };
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 2], [2, 3, 0]]);
    }

    #[test]
    fn quads_and_lines_are_skipped() {
        let mesh = ImportedMesh {
            indices: vec![0, 1, 2, 3, 4, 5, 6, 7, 8],
            face_arities: vec![4, 2, 3],
            ..Default::default()
        };
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[6, 7, 8]]);
    }

    #[test]
    fn missing_obj_is_an_import_error() {
        let err = ObjImporter.import(Path::new("/nonexistent/model.obj")).unwrap_err();
        assert!(matches!(err, AssetError::Import { .. }));
    }

    #[test]
    fn obj_quad_is_triangulated() {
        let dir = std::env::temp_dir().join(format!("lumen-obj-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("quad.obj");
        std::fs::write(
            &path,
            "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\nf 1/1 2/2 3/3 4/4\n",
        )
        .unwrap();

        let meshes = ObjImporter.import(&path).unwrap();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].triangles().count(), 2);
        assert_eq!(meshes[0].uvs.len(), meshes[0].positions.len());

        std::fs::remove_dir_all(&dir).ok();
    }
}
