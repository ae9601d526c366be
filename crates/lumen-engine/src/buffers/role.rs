use std::fmt;

/// Logical purpose of a GPU buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum BufferRole {
    /// Packed RGBA8 color, one `u32` per pixel.
    Frame,
    /// Rasterizer depth, one `u32` per pixel.
    Depth,
    /// Raycaster perpendicular wall distance, one `f32` per column.
    ZBuffer,
    Params,
    Camera,
    Triangles,
    Models,
    TexturePixels,
    /// Rasterizer scratch: one `vec4<f32>` per vertex.
    ProjectedVertices,
    Player,
    Grid,
    Atlas,
    Sprites,
    SpriteInstances,
    SpriteOrder,
    /// Raytracer running sum, one `vec4<f32>` per pixel.
    Accumulation,
}

impl BufferRole {
    pub fn label(self) -> &'static str {
        match self {
            BufferRole::Frame => "frame",
            BufferRole::Depth => "depth",
            BufferRole::ZBuffer => "zbuffer",
            BufferRole::Params => "params",
            BufferRole::Camera => "camera",
            BufferRole::Triangles => "triangles",
            BufferRole::Models => "models",
            BufferRole::TexturePixels => "pixels",
            BufferRole::ProjectedVertices => "projected",
            BufferRole::Player => "player",
            BufferRole::Grid => "grid",
            BufferRole::Atlas => "atlas",
            BufferRole::Sprites => "sprites",
            BufferRole::SpriteInstances => "sprite_data",
            BufferRole::SpriteOrder => "sprite_order",
            BufferRole::Accumulation => "accumulation",
        }
    }
}

impl fmt::Display for BufferRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How kernels and the host touch a buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferAccess {
    /// Storage the kernels only read; filled by the host.
    ReadOnly,
    /// Storage the kernels write; can be copied out for readback.
    ReadWrite,
    /// Small uniform block rewritten by the host.
    Upload,
}

impl BufferAccess {
    pub fn usages(self) -> wgpu::BufferUsages {
        match self {
            BufferAccess::ReadOnly => wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            BufferAccess::ReadWrite => {
                wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC
            }
            BufferAccess::Upload => wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_read_write_buffers_can_be_read_back() {
        assert!(BufferAccess::ReadWrite.usages().contains(wgpu::BufferUsages::COPY_SRC));
        assert!(!BufferAccess::ReadOnly.usages().contains(wgpu::BufferUsages::COPY_SRC));
        assert!(!BufferAccess::Upload.usages().contains(wgpu::BufferUsages::COPY_SRC));
    }

    #[test]
    fn uploads_are_uniform_not_storage() {
        let u = BufferAccess::Upload.usages();
        assert!(u.contains(wgpu::BufferUsages::UNIFORM));
        assert!(!u.contains(wgpu::BufferUsages::STORAGE));
    }
}
