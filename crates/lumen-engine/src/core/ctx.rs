use winit::window::Window;

use crate::camera::ViewInput;
use crate::frame::{FrameError, FrameStatus, Renderer};
use crate::input::{InputFrame, InputState, MouseButton};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Window handle and immutable window metadata.
pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Physical window size as `(width, height)`.
    pub fn physical_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Renderer<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub renderer: &'a mut Renderer<'w>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Snapshot of this frame's pointer, turn keys and trigger for the view
    /// controller.
    pub fn view_input(&self) -> ViewInput {
        ViewInput {
            cursor: self.input.cursor,
            pointer_delta: self.input_frame.pointer_delta,
            turn: self.input.turn_axis(),
            trigger: self.input_frame.button_pressed(MouseButton::Left),
            dt: self.time.dt,
        }
    }

    /// Runs the mode's kernels and presents the result.
    ///
    /// Recoverable surface loss skips the frame. Anything else is logged and
    /// ends the session.
    pub fn present(&mut self) -> AppControl {
        self.window.window.pre_present_notify();
        match self.renderer.draw_frame() {
            Ok(FrameStatus::Presented) => AppControl::Continue,
            Ok(FrameStatus::Skipped) => {
                log::debug!("frame skipped");
                AppControl::Continue
            }
            Err(err) => {
                report(&err);
                AppControl::Exit
            }
        }
    }
}

fn report(err: &FrameError) {
    log::error!("frame failed: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        log::error!("  caused by: {cause}");
        source = cause.source();
    }
}
