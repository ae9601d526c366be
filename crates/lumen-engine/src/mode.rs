use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::buffers::{
    BufferAccess, BufferRole, BufferSpec, CameraUniform, ParamsUniform, PlayerUniform,
};
use crate::program::{self, ProgramLayout};

/// Which of the three algorithms renders the frame. Fixed for the process lifetime.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RenderMode {
    Rasterizer,
    Raycaster,
    Raytracer,
}

impl RenderMode {
    pub const ALL: [RenderMode; 3] = [
        RenderMode::Rasterizer,
        RenderMode::Raycaster,
        RenderMode::Raytracer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RenderMode::Rasterizer => "rasterizer",
            RenderMode::Raycaster => "raycaster",
            RenderMode::Raytracer => "raytracer",
        }
    }

    /// Kernel source shipped with the engine crate.
    pub fn kernel_path(self) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("kernels")
            .join(format!("{}.wgsl", self.name()))
    }

    pub fn layout(self) -> &'static ProgramLayout {
        match self {
            RenderMode::Rasterizer => &program::RASTERIZER,
            RenderMode::Raycaster => &program::RAYCASTER,
            RenderMode::Raytracer => &program::RAYTRACER,
        }
    }

    /// Whether the mode renders a 3D scene through `FreeCamera`.
    pub fn is_scene_mode(self) -> bool {
        !matches!(self, RenderMode::Raycaster)
    }

    /// Buffers sized by the resolution alone, allocated once at startup.
    ///
    /// Asset-backed roles (geometry, atlas, sprites, map) are created by the
    /// upload paths instead.
    pub fn allocation_plan(self, resolution: Resolution) -> Vec<BufferSpec> {
        let pixels = resolution.pixel_count();
        let mut plan = vec![
            BufferSpec::array::<u32>(BufferRole::Frame, BufferAccess::ReadWrite, pixels),
            BufferSpec::array::<ParamsUniform>(BufferRole::Params, BufferAccess::Upload, 1),
        ];
        match self {
            RenderMode::Rasterizer => {
                plan.push(BufferSpec::array::<u32>(BufferRole::Depth, BufferAccess::ReadWrite, pixels));
                plan.push(BufferSpec::array::<CameraUniform>(BufferRole::Camera, BufferAccess::Upload, 1));
            }
            RenderMode::Raycaster => {
                plan.push(BufferSpec::array::<f32>(
                    BufferRole::ZBuffer,
                    BufferAccess::ReadWrite,
                    resolution.width as usize,
                ));
                plan.push(BufferSpec::array::<PlayerUniform>(BufferRole::Player, BufferAccess::Upload, 1));
            }
            RenderMode::Raytracer => {
                plan.push(BufferSpec::array::<[f32; 4]>(
                    BufferRole::Accumulation,
                    BufferAccess::ReadWrite,
                    pixels,
                ));
                plan.push(BufferSpec::array::<CameraUniform>(BufferRole::Camera, BufferAccess::Upload, 1));
            }
        }
        plan
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown render mode `{0}` (expected rasterizer, raycaster or raytracer)")]
pub struct ParseModeError(String);

impl FromStr for RenderMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RenderMode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseModeError(wanted.to_string()))
    }
}

/// Render target size in pixels. Fixed for the session.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn aspect(self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size_of(plan: &[BufferSpec], role: BufferRole) -> Option<u64> {
        plan.iter().find(|s| s.role == role).map(|s| s.size)
    }

    #[test]
    fn parses_mode_names_case_insensitively() {
        assert_eq!("Raycaster".parse::<RenderMode>().unwrap(), RenderMode::Raycaster);
        assert_eq!(" raytracer ".parse::<RenderMode>().unwrap(), RenderMode::Raytracer);
        assert!("pathtracer".parse::<RenderMode>().is_err());
    }

    #[test]
    fn only_the_raycaster_skips_scene_loading() {
        assert!(RenderMode::Rasterizer.is_scene_mode());
        assert!(RenderMode::Raytracer.is_scene_mode());
        assert!(!RenderMode::Raycaster.is_scene_mode());
    }

    #[test]
    fn kernel_paths_point_into_the_crate() {
        for mode in RenderMode::ALL {
            let path = mode.kernel_path();
            assert!(path.ends_with(format!("kernels/{}.wgsl", mode.name())));
        }
    }

    #[test]
    fn rasterizer_plan_has_per_pixel_depth() {
        let res = Resolution::new(800, 600);
        let plan = RenderMode::Rasterizer.allocation_plan(res);
        assert_eq!(size_of(&plan, BufferRole::Frame), Some(800 * 600 * 4));
        assert_eq!(size_of(&plan, BufferRole::Depth), Some(800 * 600 * 4));
        assert!(size_of(&plan, BufferRole::Accumulation).is_none());
    }

    #[test]
    fn raycaster_plan_has_per_column_distance() {
        let plan = RenderMode::Raycaster.allocation_plan(Resolution::new(800, 600));
        assert_eq!(size_of(&plan, BufferRole::ZBuffer), Some(800 * 4));
        assert_eq!(size_of(&plan, BufferRole::Player), Some(32));
        assert!(size_of(&plan, BufferRole::Camera).is_none());
    }

    #[test]
    fn raytracer_plan_has_vec4_accumulation() {
        let plan = RenderMode::Raytracer.allocation_plan(Resolution::new(64, 32));
        assert_eq!(size_of(&plan, BufferRole::Accumulation), Some(64 * 32 * 16));
        assert_eq!(size_of(&plan, BufferRole::Camera), Some(272));
    }

    #[test]
    fn every_plan_role_is_bound_by_some_kernel() {
        for mode in RenderMode::ALL {
            let layout = mode.layout();
            for spec in mode.allocation_plan(Resolution::new(4, 4)) {
                assert!(
                    layout.slots.iter().any(|s| s.role == spec.role),
                    "{mode}: {} is never bound",
                    spec.role
                );
            }
        }
    }
}
