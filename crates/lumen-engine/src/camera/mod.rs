//! View controllers.
//!
//! Two strategies share one contract: [`FreeCamera`] recomputes an orthonormal
//! basis from yaw/pitch every update, [`GridPlayer`] rotates its direction and
//! camera plane incrementally. The frame orchestrator only sees
//! [`ViewController`].

mod free;
mod grid;
mod ui_anim;

pub use free::{CameraSettings, FreeCamera};
pub use grid::{GridPlayer, PlayerSettings};
pub use ui_anim::UiAnimation;

use glam::Vec2;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Per-frame pointer and key state handed to [`ViewController::update`].
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ViewInput {
    /// Absolute pointer position in window pixels.
    pub cursor: Vec2,
    /// Raw pointer motion accumulated since the previous frame.
    pub pointer_delta: Vec2,
    /// Keyboard turn: positive turns left, negative turns right.
    pub turn: f32,
    /// Fire/action pressed this frame.
    pub trigger: bool,
    /// Seconds since the previous frame.
    pub dt: f32,
}

pub trait ViewController {
    fn move_toward(&mut self, movement: Movement, dt: f32);

    fn update(&mut self, input: &ViewInput);

    /// `true` when the view changed since the last [`clear_moved`](Self::clear_moved).
    fn has_moved(&self) -> bool;

    fn clear_moved(&mut self);

    /// Samples the moved flag and clears it in one step, so a frame that
    /// fails after sampling does not report the same motion again.
    fn take_moved(&mut self) -> bool {
        let moved = self.has_moved();
        self.clear_moved();
        moved
    }
}
