//! Kernel program loading.
//!
//! Each render mode ships one WGSL program with a fixed set of compute entry
//! points. The program's globals are matched against a static binding table
//! (`layouts`) when it is loaded, so a renamed or renumbered binding fails at
//! startup with a precise error instead of producing garbage at dispatch.

mod bindings;
mod error;
mod layouts;
mod loader;
mod validate;

pub use bindings::{BindingAccess, BindingSlot, KernelId, KernelLayout, ProgramLayout};
pub use error::ProgramError;
pub use layouts::{RASTERIZER, RAYCASTER, RAYTRACER};
pub use loader::{first_stale, CompiledProgram, Kernel, ProgramLoader};
pub use validate::validate_source;
