use bytemuck::{Pod, Zeroable};

// ── params ────────────────────────────────────────────────────────────────

/// Scalar kernel arguments shared by every mode (`struct Params` in WGSL).
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct ParamsUniform {
    pub width: u32,
    pub height: u32,
    pub vertex_count: u32,
    pub model_count: u32,
    pub frame_index: u32,
    pub sprite_count: u32,
    pub ui_frame: u32,
    pub map_size: u32,
    pub background: [f32; 4],
}

// ── camera ────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub inv_view: [[f32; 4]; 4],
    pub inv_proj: [[f32; 4]; 4],
    /// xyz = eye position, w unused.
    pub position: [f32; 4],
}

// ── player ────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct PlayerUniform {
    pub pos: [f32; 2],
    pub dir: [f32; 2],
    pub plane: [f32; 2],
    pub move_speed: f32,
    pub rot_speed: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    // Sizes must match the WGSL struct layouts in kernels/*.wgsl.
    #[test]
    fn uniform_sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<ParamsUniform>(), 48);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 272);
        assert_eq!(std::mem::size_of::<PlayerUniform>(), 32);
    }
}
