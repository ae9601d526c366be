use std::path::PathBuf;
use std::sync::Arc;

use crate::camera::{CameraSettings, PlayerSettings, UiAnimation};
use crate::mode::RenderMode;
use crate::sprite::DEFAULT_SPRITE_CAPACITY;
use crate::world::GridMap;

/// Everything the renderer needs to know before the first frame.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub mode: RenderMode,

    /// Overrides the kernel file shipped with the crate.
    pub kernel_path: Option<PathBuf>,

    /// Rasterizer clear colour, linear RGBA.
    pub background: [f32; 4],

    pub camera: CameraSettings,
    pub player: PlayerSettings,
    pub ui_animation: UiAnimation,

    /// Upper bound on live sprite instances (raycaster).
    pub sprite_capacity: usize,

    pub grid_map: Arc<GridMap>,
}

impl RendererConfig {
    pub fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn kernel_path(&self) -> PathBuf {
        self.kernel_path
            .clone()
            .unwrap_or_else(|| self.mode.kernel_path())
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::Raytracer,
            kernel_path: None,
            background: [0.1, 0.1, 0.12, 1.0],
            camera: CameraSettings::default(),
            player: PlayerSettings::default(),
            ui_animation: UiAnimation::default(),
            sprite_capacity: DEFAULT_SPRITE_CAPACITY,
            grid_map: Arc::new(GridMap::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_path_defaults_to_shipped_file() {
        let cfg = RendererConfig::new(RenderMode::Raycaster);
        assert!(cfg.kernel_path().ends_with("kernels/raycaster.wgsl"));
    }

    #[test]
    fn kernel_path_override_wins() {
        let cfg = RendererConfig {
            kernel_path: Some(PathBuf::from("/tmp/custom.wgsl")),
            ..RendererConfig::new(RenderMode::Rasterizer)
        };
        assert_eq!(cfg.kernel_path(), PathBuf::from("/tmp/custom.wgsl"));
    }
}
