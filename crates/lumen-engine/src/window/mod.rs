//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the render window, and wires them to the
//! renderer.

mod runtime;
mod translate;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
