use std::collections::HashSet;

use glam::Vec2;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState, MouseButton, MouseButtonState};

/// Current input state for the render window.
///
/// Per-frame transitions are recorded into an `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,

    /// Last reported cursor position in physical pixels.
    pub pointer_pos: Option<Vec2>,

    /// Virtual cursor driven by raw motion. Keeps moving while the OS
    /// cursor is grabbed and pinned.
    pub cursor: Vec2,

    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state and writes deltas to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Avoid stuck keys when focus changes mid-press.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved { x, y } => {
                self.pointer_pos = Some(Vec2::new(*x, *y));
            }

            InputEvent::PointerMotion { dx, dy } => {
                let delta = Vec2::new(*dx, *dy);
                self.cursor += delta;
                frame.pointer_delta += delta;
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(*key) {
                        frame.keys_pressed.insert(*key);
                    }
                }
                KeyState::Released => {
                    if self.keys_down.remove(key) {
                        frame.keys_released.insert(*key);
                    }
                }
            },

            InputEvent::PointerButton { button, state } => match state {
                MouseButtonState::Pressed => {
                    if self.buttons_down.insert(*button) {
                        frame.buttons_pressed.insert(*button);
                    }
                }
                MouseButtonState::Released => {
                    if self.buttons_down.remove(button) {
                        frame.buttons_released.insert(*button);
                    }
                }
            },
        }

        frame.push_event(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }

    /// `+1` for left, `-1` for right, `0` when both or neither are held.
    pub fn turn_axis(&self) -> f32 {
        let mut axis = 0.0;
        if self.key_down(Key::ArrowLeft) {
            axis += 1.0;
        }
        if self.key_down(Key::ArrowRight) {
            axis -= 1.0;
        }
        axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key { key, state, repeat: false }
    }

    // ── keys ──────────────────────────────────────────────────────────────

    #[test]
    fn press_is_recorded_once_while_held() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::W, KeyState::Pressed));
        assert!(frame.key_pressed(Key::W));

        frame.clear();
        state.apply_event(&mut frame, key(Key::W, KeyState::Pressed));
        assert!(!frame.key_pressed(Key::W));
        assert!(state.key_down(Key::W));

        state.apply_event(&mut frame, key(Key::W, KeyState::Released));
        assert!(frame.keys_released.contains(&Key::W));
        assert!(!state.key_down(Key::W));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, key(Key::ArrowLeft, KeyState::Pressed));
        state.apply_event(
            &mut frame,
            InputEvent::PointerButton { button: MouseButton::Left, state: MouseButtonState::Pressed },
        );

        state.apply_event(&mut frame, InputEvent::Focused(false));
        assert!(state.keys_down.is_empty());
        assert!(state.buttons_down.is_empty());
        assert_eq!(state.turn_axis(), 0.0);
    }

    #[test]
    fn opposing_arrows_cancel() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, key(Key::ArrowLeft, KeyState::Pressed));
        assert_eq!(state.turn_axis(), 1.0);
        state.apply_event(&mut frame, key(Key::ArrowRight, KeyState::Pressed));
        assert_eq!(state.turn_axis(), 0.0);
        state.apply_event(&mut frame, key(Key::ArrowLeft, KeyState::Released));
        assert_eq!(state.turn_axis(), -1.0);
    }

    // ── pointer ───────────────────────────────────────────────────────────

    #[test]
    fn motion_accumulates_per_frame_and_into_cursor() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, InputEvent::PointerMotion { dx: 3.0, dy: -1.0 });
        state.apply_event(&mut frame, InputEvent::PointerMotion { dx: 2.0, dy: 4.0 });
        assert_eq!(frame.pointer_delta, Vec2::new(5.0, 3.0));

        frame.clear();
        assert_eq!(frame.pointer_delta, Vec2::ZERO);
        assert_eq!(state.cursor, Vec2::new(5.0, 3.0));
    }

    #[test]
    fn absolute_position_does_not_touch_virtual_cursor() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        state.apply_event(&mut frame, InputEvent::PointerMoved { x: 100.0, y: 50.0 });
        assert_eq!(state.pointer_pos, Some(Vec2::new(100.0, 50.0)));
        assert_eq!(state.cursor, Vec2::ZERO);

        state.apply_event(&mut frame, InputEvent::PointerLeft);
        assert_eq!(state.pointer_pos, None);
    }
}
