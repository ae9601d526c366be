//! GPU buffers keyed by role.
//!
//! A `BufferSet` owns one buffer per `BufferRole` the active mode needs.
//! Every (re)allocation of a role bumps its generation; kernels remember the
//! generation they were bound against so a stale binding is caught before
//! dispatch instead of reading a released buffer.

mod error;
mod role;
mod set;
mod uniforms;

pub use error::BufferError;
pub use role::{BufferAccess, BufferRole};
pub use set::{array_size, BufferSet, BufferSpec, GpuBuffer};
pub use uniforms::{CameraUniform, ParamsUniform, PlayerUniform};
