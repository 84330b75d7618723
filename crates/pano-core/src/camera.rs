//! Orbit camera at the panorama center.
//!
//! The eye never leaves the origin; pointer drags steer yaw/pitch and
//! the wheel zooms by narrowing the field of view. Auto-rotation runs
//! until the first interaction and resumes after a quiet period.

use glam::{Mat4, Vec3, Vec4};

use crate::constants::{
    AUTOROTATE_RESUME_DELAY_SEC, AUTOROTATE_SPEED, CAMERA_HOME, FOV_DEFAULT_DEG, FOV_MAX_DEG,
    FOV_MIN_DEG, WHEEL_ZOOM_SPEED,
};
use crate::interact::Ray;

const NEAR: f32 = 0.1;
const FAR: f32 = 1500.0;
const DRAG_ROTATE_SPEED: f32 = 0.0045;
const PITCH_LIMIT: f32 = 1.55;
const WHEEL_DELTA_SCALE: f32 = 0.01;

pub struct OrbitCamera {
    yaw: f32,
    pitch: f32,
    pub fov_deg: f32,
    autorotate: bool,
    resume_in: f32,
}

impl OrbitCamera {
    pub fn new() -> Self {
        // The home position looks back through the origin.
        let home = Vec3::from(CAMERA_HOME);
        let dir = (-home).normalize();
        Self {
            yaw: dir.z.atan2(dir.x),
            pitch: dir.y.asin(),
            fov_deg: FOV_DEFAULT_DEG,
            autorotate: true,
            resume_in: 0.0,
        }
    }

    /// Return to the home orientation (scene transitions land here).
    pub fn reset(&mut self) {
        let home = Vec3::from(CAMERA_HOME);
        let dir = (-home).normalize();
        self.yaw = dir.z.atan2(dir.x);
        self.pitch = dir.y.asin();
        self.fov_deg = FOV_DEFAULT_DEG;
    }

    fn direction(&self) -> Vec3 {
        Vec3::new(
            self.pitch.cos() * self.yaw.cos(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.sin(),
        )
    }

    /// Pointer drag in canvas pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * DRAG_ROTATE_SPEED;
        self.pitch = (self.pitch + dy * DRAG_ROTATE_SPEED).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.interrupt();
    }

    /// Wheel zoom proportional to the delta, clamped to the FOV band.
    pub fn zoom(&mut self, delta_y: f32) {
        let step = delta_y * WHEEL_DELTA_SCALE * WHEEL_ZOOM_SPEED;
        self.fov_deg = (self.fov_deg + step).clamp(FOV_MIN_DEG, FOV_MAX_DEG);
        self.interrupt();
    }

    /// Any interaction pauses auto-rotation and arms the resume timer.
    pub fn interrupt(&mut self) {
        self.autorotate = false;
        self.resume_in = AUTOROTATE_RESUME_DELAY_SEC;
    }

    pub fn tick(&mut self, dt_sec: f32) {
        if self.autorotate {
            // Same convention as the classic orbit controls: speed 2.0
            // is one orbit per 30 seconds.
            self.yaw += AUTOROTATE_SPEED * std::f32::consts::TAU / 60.0 * dt_sec;
        } else {
            self.resume_in -= dt_sec;
            if self.resume_in <= 0.0 {
                self.autorotate = true;
            }
        }
    }

    pub fn view_proj(&self, width: u32, height: u32) -> Mat4 {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let proj = Mat4::perspective_rh(self.fov_deg.to_radians(), aspect, NEAR, FAR);
        let view = Mat4::look_to_rh(Vec3::ZERO, self.direction(), Vec3::Y);
        proj * view
    }

    /// World-space ray through a backing pixel, from the origin eye.
    pub fn screen_to_world_ray(&self, width: u32, height: u32, sx: f32, sy: f32) -> Ray {
        let w = width.max(1) as f32;
        let h = height.max(1) as f32;
        let ndc_x = (2.0 * sx / w) - 1.0;
        let ndc_y = 1.0 - (2.0 * sy / h);
        let inv = self.view_proj(width, height).inverse();
        let p_far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let far: Vec3 = p_far.truncate() / p_far.w;
        Ray::new(Vec3::ZERO, far)
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}
