use std::sync::Arc;

use glam::Vec2;

use crate::buffers::PlayerUniform;
use crate::math::rotate2;
use crate::world::GridMap;

use super::{Movement, UiAnimation, ViewController, ViewInput};

/// Radians of turn per pixel of horizontal pointer motion.
const POINTER_TURN: f32 = 0.003;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlayerSettings {
    pub position: Vec2,
    pub dir: Vec2,
    pub plane: Vec2,
    /// Cells per frame.
    pub move_speed: f32,
    /// Radians per frame for keyboard turning.
    pub rot_speed: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            position: Vec2::new(5.5, 5.5),
            dir: Vec2::new(-1.0, 0.0),
            plane: Vec2::new(0.0, 0.66),
            move_speed: 0.05,
            rot_speed: 0.03,
        }
    }
}

/// Grid-bound raycaster viewer.
///
/// Speeds are per frame, so `dt` does not scale movement.
#[derive(Debug, Clone)]
pub struct GridPlayer {
    map: Arc<GridMap>,
    position: Vec2,
    dir: Vec2,
    plane: Vec2,
    move_speed: f32,
    rot_speed: f32,
    animation: UiAnimation,
    moved: bool,
}

impl GridPlayer {
    pub fn new(settings: PlayerSettings, map: Arc<GridMap>) -> Self {
        Self {
            map,
            position: settings.position,
            dir: settings.dir,
            plane: settings.plane,
            move_speed: settings.move_speed,
            rot_speed: settings.rot_speed,
            animation: UiAnimation::default(),
            moved: false,
        }
    }

    pub fn with_animation(mut self, animation: UiAnimation) -> Self {
        self.animation = animation;
        self
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn dir(&self) -> Vec2 {
        self.dir
    }

    pub fn plane(&self) -> Vec2 {
        self.plane
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn ui_frame(&self) -> u32 {
        self.animation.current()
    }

    pub fn animation(&self) -> &UiAnimation {
        &self.animation
    }

    pub fn uniform(&self) -> PlayerUniform {
        PlayerUniform {
            pos: self.position.to_array(),
            dir: self.dir.to_array(),
            plane: self.plane.to_array(),
            move_speed: self.move_speed,
            rot_speed: self.rot_speed,
        }
    }

    /// Commits `to` only if it lands on a free cell.
    fn try_step(&mut self, to: Vec2) -> bool {
        if !self.map.is_walkable(to) {
            return false;
        }
        self.position = to;
        true
    }

    fn rotate(&mut self, angle: f32) {
        self.dir = rotate2(self.dir, angle);
        self.plane = rotate2(self.plane, angle);
    }
}

impl ViewController for GridPlayer {
    fn move_toward(&mut self, movement: Movement, _dt: f32) {
        let s = self.move_speed;
        let d = self.dir;
        let step = match movement {
            Movement::Forward => d * s,
            Movement::Backward => -d * s,
            Movement::Left => Vec2::new(-d.y, d.x) * s,
            Movement::Right => Vec2::new(d.y, -d.x) * s,
        };
        if self.try_step(self.position + step) {
            self.moved = true;
        }
    }

    fn update(&mut self, input: &ViewInput) {
        let angle = -input.pointer_delta.x * POINTER_TURN + input.turn * self.rot_speed;
        if angle != 0.0 {
            self.rotate(angle);
            self.moved = true;
        }
        self.animation.update(input.trigger, input.dt);
    }

    fn has_moved(&self) -> bool {
        self.moved
    }

    fn clear_moved(&mut self) {
        self.moved = false;
    }
}
