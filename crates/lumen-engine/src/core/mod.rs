//! Core engine-facing contracts.
//!
//! The interface between the window runtime and viewer binaries. Viewers
//! see a renderer, this frame's input and timing, and nothing of winit's
//! event loop.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
