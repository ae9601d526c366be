use glam::{Mat4, Vec2, Vec3};

use crate::buffers::CameraUniform;
use crate::math::{self, inverse_rigid};

const PITCH_LIMIT_DEG: f32 = 89.0;
const MOVE_EPSILON: f32 = 1e-4;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraSettings {
    pub position: Vec3,
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    /// World units per second.
    pub speed: f32,
    /// Degrees per pointer pixel.
    pub sensitivity: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            fov_deg: 60.0,
            near: 0.1,
            far: 100.0,
            yaw_deg: 90.0,
            pitch_deg: 0.0,
            speed: 2.0,
            sensitivity: 0.1,
        }
    }
}

/// Free-fly 3D camera for the rasterizer and raytracer.
#[derive(Debug, Clone)]
pub struct FreeCamera {
    position: Vec3,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    speed: f32,
    sensitivity: f32,

    proj: Mat4,
    inv_proj: Mat4,
    view: Mat4,
    inv_view: Mat4,

    last_cursor: Vec2,
    first_update: bool,
    moved: bool,
}

impl FreeCamera {
    pub fn new(settings: CameraSettings, aspect: f32) -> Self {
        let proj = math::perspective(settings.fov_deg, aspect, settings.near, settings.far);
        let mut camera = Self {
            position: settings.position,
            front: Vec3::Z,
            right: Vec3::X,
            up: Vec3::Y,
            world_up: Vec3::Y,
            yaw: settings.yaw_deg,
            pitch: settings.pitch_deg.clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG),
            speed: settings.speed,
            sensitivity: settings.sensitivity,
            proj,
            inv_proj: math::try_inverse(proj).unwrap_or(Mat4::IDENTITY),
            view: Mat4::IDENTITY,
            inv_view: Mat4::IDENTITY,
            last_cursor: Vec2::ZERO,
            first_update: true,
            moved: false,
        };
        camera.recompute_basis();
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn inverse_view(&self) -> Mat4 {
        self.inv_view
    }

    pub fn projection(&self) -> Mat4 {
        self.proj
    }

    pub fn inverse_projection(&self) -> Mat4 {
        self.inv_proj
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view: math::to_gpu(self.view),
            proj: math::to_gpu(self.proj),
            inv_view: math::to_gpu(self.inv_view),
            inv_proj: math::to_gpu(self.inv_proj),
            position: self.position.extend(1.0).to_array(),
        }
    }

    fn recompute_basis(&mut self) {
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();
        self.front = Vec3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        self.view = math::look_at(self.position, self.position + self.front, self.up);
        self.inv_view = inverse_rigid(self.view);
    }
}

impl super::ViewController for FreeCamera {
    fn move_toward(&mut self, movement: super::Movement, dt: f32) {
        use super::Movement;

        let velocity = self.speed * dt;
        let step = match movement {
            Movement::Forward => self.front * velocity,
            Movement::Backward => -self.front * velocity,
            Movement::Left => -self.right * velocity,
            Movement::Right => self.right * velocity,
        };
        self.position += step;
        self.refresh_view();
        self.moved = true;
    }

    fn update(&mut self, input: &super::ViewInput) {
        if self.first_update {
            self.last_cursor = input.cursor;
            self.first_update = false;
        }

        let offset = Vec2::new(
            input.cursor.x - self.last_cursor.x,
            self.last_cursor.y - input.cursor.y,
        ) * self.sensitivity;
        self.last_cursor = input.cursor;

        self.yaw += offset.x;
        self.pitch = (self.pitch + offset.y).clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
        self.recompute_basis();

        if offset.length() > MOVE_EPSILON {
            self.moved = true;
        }
    }

    fn has_moved(&self) -> bool {
        self.moved
    }

    fn clear_moved(&mut self) {
        self.moved = false;
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Movement, ViewController, ViewInput};
    use super::*;

    fn camera() -> FreeCamera {
        FreeCamera::new(CameraSettings::default(), 16.0 / 9.0)
    }

    fn at(x: f32, y: f32) -> ViewInput {
        ViewInput {
            cursor: Vec2::new(x, y),
            ..Default::default()
        }
    }

    // ── initial state ─────────────────────────────────────────────────────

    #[test]
    fn default_yaw_looks_down_positive_z() {
        let cam = camera();
        assert!(cam.front().abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-5));
        assert!(!cam.has_moved());
    }

    #[test]
    fn basis_is_orthonormal() {
        let mut cam = camera();
        cam.update(&at(0.0, 0.0));
        cam.update(&at(130.0, -70.0));
        assert!((cam.front().length() - 1.0).abs() < 1e-5);
        assert!(cam.front().dot(cam.right()).abs() < 1e-5);
        assert!(cam.front().dot(cam.up()).abs() < 1e-5);
        assert!(cam.right().dot(cam.up()).abs() < 1e-5);
    }

    // ── pointer ───────────────────────────────────────────────────────────

    #[test]
    fn first_update_only_captures_baseline() {
        let mut cam = camera();
        cam.update(&at(640.0, 360.0));
        assert_eq!(cam.yaw(), 90.0);
        assert_eq!(cam.pitch(), 0.0);
        assert!(!cam.has_moved());
    }

    #[test]
    fn pitch_stays_clamped_for_any_delta() {
        let mut cam = camera();
        cam.update(&at(0.0, 0.0));
        for y in [-1.0e6, 3.0e4, -250.0, 9.0e5, -9.0e5] {
            cam.update(&at(0.0, y));
            assert!(cam.pitch() <= 89.0 && cam.pitch() >= -89.0);
        }
    }

    #[test]
    fn pointer_up_raises_pitch() {
        let mut cam = camera();
        cam.update(&at(100.0, 100.0));
        cam.update(&at(100.0, 50.0));
        assert!((cam.pitch() - 5.0).abs() < 1e-5);
        assert!(cam.front().y > 0.0);
        assert!(cam.has_moved());
    }

    #[test]
    fn tiny_delta_does_not_flag_movement() {
        let mut cam = camera();
        cam.update(&at(10.0, 10.0));
        cam.update(&at(10.0, 10.0));
        assert!(!cam.has_moved());
    }

    // ── movement ──────────────────────────────────────────────────────────

    #[test]
    fn forward_moves_along_front_scaled_by_dt() {
        let mut cam = camera();
        cam.move_toward(Movement::Forward, 0.5);
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-5));
        assert!(cam.has_moved());
        cam.clear_moved();
        assert!(!cam.has_moved());
    }

    #[test]
    fn take_moved_reports_motion_once() {
        let mut cam = camera();
        assert!(!cam.take_moved());
        cam.move_toward(Movement::Backward, 0.1);
        assert!(cam.take_moved());
        assert!(!cam.take_moved());
        assert!(!cam.has_moved());
    }

    #[test]
    fn strafing_moves_toward_screen_side() {
        let mut cam = camera();
        let on_screen = cam.view() * cam.right().extend(1.0);
        assert!(on_screen.x > 0.0);

        cam.move_toward(Movement::Right, 1.0);
        assert!(cam.position().dot(cam.right()) > 0.0);
        cam.move_toward(Movement::Left, 2.0);
        assert!(cam.position().dot(cam.right()) < 0.0);
    }

    #[test]
    fn uniform_carries_inverses() {
        let mut cam = camera();
        cam.move_toward(Movement::Backward, 1.0);
        let u = cam.uniform();
        let view = Mat4::from_cols_array_2d(&u.view);
        let inv_view = Mat4::from_cols_array_2d(&u.inv_view);
        assert!((view * inv_view).abs_diff_eq(Mat4::IDENTITY, 1e-5));
        assert_eq!(u.position[..3], cam.position().to_array());
    }
}
