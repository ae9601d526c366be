use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use super::{decode_texture, AssetError, DecodedTexture, ImportedMesh, SceneImporter};

/// One triangle in model space (`struct Triangle` in WGSL, 128 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Triangle {
    /// xyz position, w = 1.
    pub positions: [[f32; 4]; 3],
    /// xyz normal, w = 0.
    pub normals: [[f32; 4]; 3],
    pub uvs: [[f32; 2]; 3],
    pub model_index: u32,
    pub _pad: u32,
}

/// Placement of one loaded model within the shared arrays (`struct Model`, 96 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Model {
    pub triangle_offset: u32,
    pub triangle_count: u32,
    pub vertex_offset: u32,
    pub vertex_count: u32,
    pub pixel_offset: u32,
    /// Zero for untextured models.
    pub tex_width: u32,
    pub tex_height: u32,
    pub _pad: u32,
    pub transform: [[f32; 4]; 4],
}

impl Model {
    pub fn transform(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.transform)
    }

    pub fn is_textured(&self) -> bool {
        self.tex_width > 0 && self.tex_height > 0
    }
}

/// Append-only store of every loaded model's triangles and texels.
///
/// Offsets are running totals, so model `i` owns
/// `triangles[triangle_offset .. triangle_offset + triangle_count]`.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    triangles: Vec<Triangle>,
    pixels: Vec<u32>,
    models: Vec<Model>,
    dirty: bool,
    stale_reported: bool,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Imports a scene and appends it as one model.
    ///
    /// On import failure or an empty scene the error is logged and returned
    /// and the registry is left untouched. A texture that fails to decode only
    /// downgrades the model to untextured.
    pub fn load_model(
        &mut self,
        importer: &dyn SceneImporter,
        path: &Path,
        texture: Option<&Path>,
        transform: Mat4,
    ) -> Result<usize, AssetError> {
        let meshes = importer.import(path).inspect_err(|e| {
            log::error!("failed to load model: {e}");
        })?;

        let texture = texture.and_then(|tex_path| match decode_texture(tex_path) {
            Ok(tex) => Some(tex),
            Err(e) => {
                log::warn!("{e}; `{}` loads untextured", path.display());
                None
            }
        });

        let index = self
            .append_meshes(path, &meshes, texture.as_ref(), transform)
            .inspect_err(|e| log::error!("failed to load model: {e}"))?;

        let model = &self.models[index];
        log::info!(
            "loaded model {index} from {} ({} triangles, texture {}x{})",
            path.display(),
            model.triangle_count,
            model.tex_width,
            model.tex_height
        );
        Ok(index)
    }

    /// Flattens already-imported meshes into a new model.
    pub fn append_meshes(
        &mut self,
        source: &Path,
        meshes: &[ImportedMesh],
        texture: Option<&DecodedTexture>,
        transform: Mat4,
    ) -> Result<usize, AssetError> {
        if meshes.is_empty() {
            return Err(AssetError::EmptyScene {
                path: source.to_path_buf(),
            });
        }

        let model_index = to_u32(self.models.len(), "model count")?;
        let triangle_offset = to_u32(self.triangles.len(), "triangle count")?;
        let pixel_offset = to_u32(self.pixels.len(), "pixel count")?;

        let mut added = Vec::new();
        for mesh in meshes {
            added.extend(mesh.triangles().filter_map(|face| build_triangle(mesh, face, model_index)));
        }

        let triangle_count = to_u32(added.len(), "triangle count")?;
        let total_triangles = to_u32(self.triangles.len() + added.len(), "triangle count")?;
        to_u32(total_triangles as usize * 3, "vertex count")?;
        let (tex_width, tex_height) = texture.map_or((0, 0), |t| (t.width, t.height));
        if let Some(tex) = texture {
            to_u32(self.pixels.len() + tex.pixels.len(), "pixel count")?;
        }

        self.triangles.extend(added);
        if let Some(tex) = texture {
            self.pixels.extend_from_slice(&tex.pixels);
        }
        self.models.push(Model {
            triangle_offset,
            triangle_count,
            vertex_offset: triangle_offset * 3,
            vertex_count: triangle_count * 3,
            pixel_offset,
            tex_width,
            tex_height,
            _pad: 0,
            transform: transform.to_cols_array_2d(),
        });
        self.dirty = true;
        self.stale_reported = false;

        Ok(model_index as usize)
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.triangles.len() * 3
    }

    /// True when models were added since the last upload.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// `true` the first time it is asked while dirty, then `false` until
    /// more models are added.
    pub fn take_stale_notice(&mut self) -> bool {
        if !self.dirty || self.stale_reported {
            return false;
        }
        self.stale_reported = true;
        true
    }

    pub fn mark_uploaded(&mut self) {
        self.dirty = false;
        self.stale_reported = false;
    }

    /// Drops every model and resets the offsets.
    pub fn free_all(&mut self) {
        self.triangles = Vec::new();
        self.pixels = Vec::new();
        self.models = Vec::new();
        self.dirty = false;
        self.stale_reported = false;
    }

    /// Debug dump of the model table.
    pub fn print_model_data(&self) {
        log::info!(
            "{} models, {} triangles, {} texels",
            self.models.len(),
            self.triangles.len(),
            self.pixels.len()
        );
        for (i, m) in self.models.iter().enumerate() {
            let t = m.transform().w_axis;
            log::info!(
                "  model {i}: triangles {}..{} pixels @{} {}x{} at ({:.2}, {:.2}, {:.2})",
                m.triangle_offset,
                m.triangle_offset + m.triangle_count,
                m.pixel_offset,
                m.tex_width,
                m.tex_height,
                t.x,
                t.y,
                t.z
            );
        }
    }
}

fn to_u32(n: usize, what: &'static str) -> Result<u32, AssetError> {
    u32::try_from(n).map_err(|_| AssetError::TooLarge { what })
}

fn build_triangle(mesh: &ImportedMesh, face: [u32; 3], model_index: u32) -> Option<Triangle> {
    let mut positions = [[0.0; 4]; 3];
    let mut corners = [Vec3::ZERO; 3];
    for (k, &i) in face.iter().enumerate() {
        let p = *mesh.positions.get(i as usize)?;
        positions[k] = [p[0], p[1], p[2], 1.0];
        corners[k] = Vec3::from_array(p);
    }

    // Flat normal for meshes without normals.
    let face_normal = (corners[1] - corners[0])
        .cross(corners[2] - corners[0])
        .normalize_or_zero();

    let mut normals = [[0.0; 4]; 3];
    let mut uvs = [[0.0; 2]; 3];
    for (k, &i) in face.iter().enumerate() {
        let n = mesh
            .normals
            .get(i as usize)
            .copied()
            .unwrap_or(face_normal.to_array());
        normals[k] = [n[0], n[1], n[2], 0.0];
        uvs[k] = mesh.uvs.get(i as usize).copied().unwrap_or([0.0, 0.0]);
    }

    Some(Triangle {
        positions,
        normals,
        uvs,
        model_index,
        _pad: 0,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::PathBuf;

    use super::*;

    struct FakeImporter {
        meshes: Vec<ImportedMesh>,
        calls: Cell<usize>,
    }

    impl FakeImporter {
        fn new(meshes: Vec<ImportedMesh>) -> Self {
            Self {
                meshes,
                calls: Cell::new(0),
            }
        }
    }

    impl SceneImporter for FakeImporter {
        fn import(&self, _path: &Path) -> Result<Vec<ImportedMesh>, AssetError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.meshes.clone())
        }
    }

    struct FailingImporter;

    impl SceneImporter for FailingImporter {
        fn import(&self, path: &Path) -> Result<Vec<ImportedMesh>, AssetError> {
            Err(AssetError::Import {
                path: path.to_path_buf(),
                message: "unreadable".into(),
            })
        }
    }

    fn quad_mesh() -> ImportedMesh {
        ImportedMesh {
            name: "quad".into(),
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![],
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            indices: vec![0, 1, 2, 2, 3, 0],
            face_arities: vec![],
        }
    }

    fn tex(w: u32, h: u32) -> DecodedTexture {
        DecodedTexture {
            width: w,
            height: h,
            pixels: vec![0xff00_00ff; (w * h) as usize],
        }
    }

    fn path() -> PathBuf {
        PathBuf::from("scene.obj")
    }

    // ── offsets ───────────────────────────────────────────────────────────

    #[test]
    fn offsets_are_running_totals() {
        let mut reg = ModelRegistry::new();
        let importer = FakeImporter::new(vec![quad_mesh()]);
        reg.load_model(&importer, &path(), None, Mat4::IDENTITY).unwrap();
        reg.append_meshes(&path(), &[quad_mesh(), quad_mesh()], Some(&tex(2, 2)), Mat4::IDENTITY)
            .unwrap();
        reg.append_meshes(&path(), &[quad_mesh()], Some(&tex(4, 1)), Mat4::IDENTITY)
            .unwrap();

        let m = reg.models();
        assert_eq!(m.len(), 3);
        assert_eq!((m[0].triangle_offset, m[0].triangle_count), (0, 2));
        assert_eq!((m[1].triangle_offset, m[1].triangle_count), (2, 4));
        assert_eq!((m[2].triangle_offset, m[2].triangle_count), (6, 2));
        assert_eq!((m[1].pixel_offset, m[2].pixel_offset), (0, 4));
        assert_eq!(reg.pixels().len(), 8);

        let total = reg.triangle_count() as u32;
        for model in m {
            assert!(model.triangle_offset + model.triangle_count <= total);
        }
        assert!(m.windows(2).all(|w| w[0].triangle_offset <= w[1].triangle_offset));
    }

    #[test]
    fn triangles_carry_their_model_index() {
        let mut reg = ModelRegistry::new();
        reg.append_meshes(&path(), &[quad_mesh()], None, Mat4::IDENTITY).unwrap();
        reg.append_meshes(&path(), &[quad_mesh()], None, Mat4::IDENTITY).unwrap();
        for model_index in 0..2u32 {
            let m = reg.models()[model_index as usize];
            let range = m.triangle_offset as usize..(m.triangle_offset + m.triangle_count) as usize;
            assert!(reg.triangles()[range].iter().all(|t| t.model_index == model_index));
        }
    }

    #[test]
    fn missing_normals_fall_back_to_face_normal() {
        let mut reg = ModelRegistry::new();
        reg.append_meshes(&path(), &[quad_mesh()], None, Mat4::IDENTITY).unwrap();
        let n = reg.triangles()[0].normals[0];
        assert_eq!(n, [0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn non_triangle_faces_are_skipped() {
        let mut mesh = quad_mesh();
        mesh.indices = vec![0, 1, 2, 3, 0, 1, 2];
        mesh.face_arities = vec![4, 3];
        let mut reg = ModelRegistry::new();
        reg.append_meshes(&path(), &[mesh], None, Mat4::IDENTITY).unwrap();
        assert_eq!(reg.models()[0].triangle_count, 1);
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn zero_mesh_scene_leaves_registry_unchanged() {
        let mut reg = ModelRegistry::new();
        reg.append_meshes(&path(), &[quad_mesh()], None, Mat4::IDENTITY).unwrap();
        reg.mark_uploaded();

        let importer = FakeImporter::new(vec![]);
        let err = reg.load_model(&importer, &path(), None, Mat4::IDENTITY).unwrap_err();

        assert!(matches!(err, AssetError::EmptyScene { .. }));
        assert_eq!(importer.calls.get(), 1);
        assert_eq!(reg.model_count(), 1);
        assert_eq!(reg.triangle_count(), 2);
        assert!(!reg.is_dirty());
    }

    #[test]
    fn import_failure_leaves_registry_unchanged() {
        let mut reg = ModelRegistry::new();
        let err = reg.load_model(&FailingImporter, &path(), None, Mat4::IDENTITY).unwrap_err();
        assert!(matches!(err, AssetError::Import { .. }));
        assert_eq!(reg.model_count(), 0);
    }

    #[test]
    fn undecodable_texture_loads_untextured() {
        let mut reg = ModelRegistry::new();
        let importer = FakeImporter::new(vec![quad_mesh()]);
        let idx = reg
            .load_model(&importer, &path(), Some(Path::new("/nonexistent.png")), Mat4::IDENTITY)
            .unwrap();
        let m = reg.models()[idx];
        assert!(!m.is_textured());
        assert_eq!(m.triangle_count, 2);
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn dirty_until_uploaded() {
        let mut reg = ModelRegistry::new();
        assert!(!reg.is_dirty());
        reg.append_meshes(&path(), &[quad_mesh()], None, Mat4::IDENTITY).unwrap();
        assert!(reg.is_dirty());
        reg.mark_uploaded();
        assert!(!reg.is_dirty());
    }

    #[test]
    fn stale_notice_fires_once_per_load() {
        let mut reg = ModelRegistry::new();
        assert!(!reg.take_stale_notice());

        reg.append_meshes(&path(), &[quad_mesh()], None, Mat4::IDENTITY).unwrap();
        assert!(reg.take_stale_notice());
        assert!(!reg.take_stale_notice());
        assert!(!reg.take_stale_notice());

        reg.append_meshes(&path(), &[quad_mesh()], None, Mat4::IDENTITY).unwrap();
        assert!(reg.take_stale_notice());

        reg.mark_uploaded();
        assert!(!reg.take_stale_notice());
    }

    #[test]
    fn free_all_resets_offsets() {
        let mut reg = ModelRegistry::new();
        reg.append_meshes(&path(), &[quad_mesh()], Some(&tex(2, 2)), Mat4::IDENTITY).unwrap();
        reg.free_all();
        assert_eq!((reg.model_count(), reg.triangle_count(), reg.pixels().len()), (0, 0, 0));
        reg.append_meshes(&path(), &[quad_mesh()], None, Mat4::IDENTITY).unwrap();
        assert_eq!(reg.models()[0].triangle_offset, 0);
    }

    #[test]
    fn gpu_layout_sizes() {
        assert_eq!(std::mem::size_of::<Triangle>(), 128);
        assert_eq!(std::mem::size_of::<Model>(), 96);
    }
}
