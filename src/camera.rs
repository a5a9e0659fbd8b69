//! Player-driven orbit camera that follows the boat.

use glam::{Mat4, Vec3};

use crate::params::{CameraParams, RenderConfig};

/// Everything needed to build a view and projection for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSnapshot {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_rad: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraSnapshot {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_rad, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

/// Arc-rotate camera: azimuth `alpha`, polar angle `beta`, distance `radius`
/// around a target that tracks the boat.
pub struct OrbitCamera {
    params: CameraParams,
    alpha: f32,
    beta: f32,
    radius: f32,
    target: Vec3,
    fov_y_rad: f32,
    aspect: f32,
    near: f32,
    far: f32,
}

impl OrbitCamera {
    pub fn new(params: CameraParams, render: &RenderConfig) -> Self {
        Self {
            alpha: params.initial_alpha,
            beta: params.initial_beta.clamp(params.min_beta, params.max_beta),
            radius: params.initial_radius_m.clamp(params.min_radius_m, params.max_radius_m),
            target: Vec3::new(0.0, params.target_height_m, 0.0),
            fov_y_rad: render.fov_degrees.to_radians(),
            aspect: render.aspect_ratio(),
            near: render.near_plane_m,
            far: render.far_plane_m,
            params,
        }
    }

    /// Rotate by a mouse drag of `(dx, dy)` pixels
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.alpha -= dx * self.params.drag_sensitivity;
        self.beta = (self.beta - dy * self.params.drag_sensitivity)
            .clamp(self.params.min_beta, self.params.max_beta);
    }

    /// Zoom by wheel lines; positive zooms in
    pub fn zoom(&mut self, lines: f32) {
        self.radius = (self.radius - lines * self.params.zoom_step_m)
            .clamp(self.params.min_radius_m, self.params.max_radius_m);
    }

    /// Track a new focus point (the boat origin)
    pub fn follow(&mut self, focus: Vec3) {
        self.target = focus + Vec3::Y * self.params.target_height_m;
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn position(&self) -> Vec3 {
        let (sin_b, cos_b) = self.beta.sin_cos();
        let (sin_a, cos_a) = self.alpha.sin_cos();
        self.target + self.radius * Vec3::new(cos_a * sin_b, cos_b, sin_a * sin_b)
    }

    pub fn snapshot(&self) -> CameraSnapshot {
        CameraSnapshot {
            position: self.position(),
            target: self.target,
            up: Vec3::Y,
            fov_y_rad: self.fov_y_rad,
            aspect: self.aspect,
            near: self.near,
            far: self.far,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(CameraParams::default(), &RenderConfig::default())
    }

    #[test]
    fn test_position_at_radius() {
        let cam = camera();
        let dist = cam.position().distance(cam.snapshot().target);
        assert!((dist - CameraParams::default().initial_radius_m).abs() < 1e-3);
    }

    #[test]
    fn test_drag_keeps_camera_above_water() {
        let mut cam = camera();
        cam.drag(0.0, -100_000.0);
        assert!(cam.position().y > cam.snapshot().target.y);
        cam.drag(0.0, 100_000.0);
        assert!(cam.position().y > cam.snapshot().target.y);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut cam = camera();
        let params = CameraParams::default();
        cam.zoom(1000.0);
        let d = cam.position().distance(cam.snapshot().target);
        assert!((d - params.min_radius_m).abs() < 1e-3);
        cam.zoom(-1000.0);
        let d = cam.position().distance(cam.snapshot().target);
        assert!((d - params.max_radius_m).abs() < 1e-2);
    }

    #[test]
    fn test_follow_moves_target() {
        let mut cam = camera();
        cam.follow(Vec3::new(100.0, 0.0, -50.0));
        let snap = cam.snapshot();
        assert_eq!(snap.target.x, 100.0);
        assert_eq!(snap.target.z, -50.0);
    }

    #[test]
    fn test_view_proj_matrix_generation() {
        let snap = camera().snapshot();
        let view_proj = snap.view_proj();

        // Matrix should not be identity or zero
        assert_ne!(view_proj, Mat4::IDENTITY);
        assert_ne!(view_proj, Mat4::ZERO);
        assert!(snap.position.is_finite());
    }
}
