//! Lumen engine crate.
//!
//! GPU compute rendering in three modes (rasterizer, raycaster, raytracer)
//! plus the window runtime and input plumbing the viewers run on.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod math;
pub mod mode;
pub mod program;
pub mod buffers;
pub mod assets;
pub mod sprite;
pub mod world;
pub mod camera;
pub mod frame;
