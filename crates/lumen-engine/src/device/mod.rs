//! GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue (`DeviceContext`)
//! - rejecting adapters that are not GPU-class
//! - configuring the window surface and mapping its errors (`SurfaceTarget`)

mod context;
mod error;
mod init;
mod surface;

pub use context::{is_gpu_class, DeviceContext};
pub use error::{DeviceError, SurfaceErrorAction};
pub use init::DeviceInit;
pub use surface::SurfaceTarget;
