//! Frame orchestration.
//!
//! Each frame is one command encoder: the mode's dispatches, then a copy of
//! the color buffer into a staging buffer. The host blocks on that readback,
//! uploads the pixels into the output texture and blits it to the window.
//! Nothing is pipelined across frames.

mod accumulation;
mod config;
mod error;
mod present;
mod readback;
mod renderer;

pub use accumulation::{AccumulationState, Accumulator};
pub use config::RendererConfig;
pub use error::FrameError;
pub use present::{FrameStatus, Presenter};
pub use readback::Readback;
pub use renderer::Renderer;
