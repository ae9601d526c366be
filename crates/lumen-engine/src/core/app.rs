use winit::event::WindowEvent;

use crate::frame::Renderer;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by viewers.
pub trait App {
    /// Called once, after the renderer exists and before the first frame.
    /// Asset loading belongs here.
    fn on_ready(&mut self, renderer: &mut Renderer<'_>) -> anyhow::Result<()> {
        let _ = renderer;
        Ok(())
    }

    /// Called for window events.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
