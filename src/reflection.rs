//! Planar water reflection: a camera mirrored about the water plane.
//!
//! The backend brackets its reflection-target pass with [`ReflectionPipeline::pre_pass`]
//! and [`ReflectionPipeline::post_pass`]. Between the two, the reflection camera is
//! active, the water surface is hidden from its own reflection and a clip plane
//! discards everything below the waterline.

use glam::{Mat4, Vec3, Vec4};

use crate::camera::CameraSnapshot;

/// Which camera the backend should render with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveCamera {
    Primary,
    Reflection,
}

/// Plane `(n, d)`; points with `n·p + d >= 0` are kept
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipPlane(pub Vec4);

impl ClipPlane {
    /// Keep the half-space above `y = level`
    pub fn above_water(level: f32) -> Self {
        Self(Vec4::new(0.0, 1.0, 0.0, -level))
    }

    pub fn keeps(&self, point: Vec3) -> bool {
        self.0.truncate().dot(point) + self.0.w >= 0.0
    }
}

/// Reflect a point across the horizontal plane `y = level`
pub fn reflect_point(p: Vec3, level: f32) -> Vec3 {
    Vec3::new(p.x, 2.0 * level - p.y, p.z)
}

/// Reflect a direction across a plane with unit normal `n`
pub fn reflect_direction(d: Vec3, n: Vec3) -> Vec3 {
    d - 2.0 * d.dot(n) * n
}

/// Mirror camera state and the clip/visibility toggles around the reflection pass
pub struct ReflectionPipeline {
    water_level: f32,
    normal: Vec3,
    camera: Option<CameraSnapshot>,
    active: ActiveCamera,
    water_visible: bool,
    clip_plane: Option<ClipPlane>,
    matrix: Mat4,
}

impl ReflectionPipeline {
    pub fn new(water_level: f32) -> Self {
        Self {
            water_level,
            normal: Vec3::Y,
            camera: None,
            active: ActiveCamera::Primary,
            water_visible: true,
            clip_plane: None,
            matrix: Mat4::IDENTITY,
        }
    }

    /// Mirror `primary` about the water plane. Same FOV/aspect/clip distances.
    pub fn mirror(&self, primary: &CameraSnapshot) -> CameraSnapshot {
        let position = reflect_point(primary.position, self.water_level);
        let target =
            position + reflect_direction(primary.target - primary.position, self.normal);
        CameraSnapshot {
            position,
            target,
            ..*primary
        }
    }

    /// Switch to the mirrored camera, hide the water and clip below the waterline
    pub fn pre_pass(&mut self, primary: &CameraSnapshot) -> CameraSnapshot {
        let camera = self.mirror(primary);
        self.camera = Some(camera);
        self.active = ActiveCamera::Reflection;
        self.water_visible = false;
        self.clip_plane = Some(ClipPlane::above_water(self.water_level));
        camera
    }

    /// Restore water visibility, drop the clip plane and return to the primary camera
    pub fn post_pass(&mut self) {
        self.water_visible = true;
        self.clip_plane = None;
        self.active = ActiveCamera::Primary;
    }

    /// Recompute `primary projection × reflection view`.
    ///
    /// The mirror copies the primary lens, so this is also the mirror's own
    /// view-projection.
    pub fn update_matrix(&mut self, primary: &CameraSnapshot) -> Mat4 {
        let camera = self.mirror(primary);
        self.camera = Some(camera);
        self.matrix = primary.projection() * camera.view();
        self.matrix
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    pub fn camera(&self) -> Option<&CameraSnapshot> {
        self.camera.as_ref()
    }

    pub fn active(&self) -> ActiveCamera {
        self.active
    }

    pub fn water_visible(&self) -> bool {
        self.water_visible
    }

    pub fn clip_plane(&self) -> Option<ClipPlane> {
        self.clip_plane
    }

    pub fn water_level(&self) -> f32 {
        self.water_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary() -> CameraSnapshot {
        CameraSnapshot {
            position: Vec3::new(10.0, 30.0, -20.0),
            target: Vec3::new(0.0, 2.0, 5.0),
            up: Vec3::Y,
            fov_y_rad: 1.0,
            aspect: 16.0 / 9.0,
            near: 0.5,
            far: 1000.0,
        }
    }

    #[test]
    fn test_mirror_reflects_position_and_target() {
        let pipeline = ReflectionPipeline::new(0.0);
        let cam = primary();
        let mirrored = pipeline.mirror(&cam);

        assert_eq!(mirrored.position, reflect_direction(cam.position, Vec3::Y));
        let expected_target =
            mirrored.position + reflect_direction(cam.target - cam.position, Vec3::Y);
        assert_eq!(mirrored.target, expected_target);
        assert_eq!(mirrored.target, Vec3::new(0.0, -2.0, 5.0));
    }

    #[test]
    fn test_mirror_about_raised_water() {
        let pipeline = ReflectionPipeline::new(5.0);
        let mirrored = pipeline.mirror(&primary());
        assert_eq!(mirrored.position.y, -20.0);
        assert_eq!(mirrored.target.y, 8.0);
    }

    #[test]
    fn test_pre_pass_repeatable_without_drift() {
        let mut pipeline = ReflectionPipeline::new(0.0);
        let cam = primary();
        let first = pipeline.pre_pass(&cam);
        pipeline.post_pass();
        for _ in 0..100 {
            let again = pipeline.pre_pass(&cam);
            pipeline.post_pass();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_hooks_toggle_render_state() {
        let mut pipeline = ReflectionPipeline::new(0.0);
        assert_eq!(pipeline.active(), ActiveCamera::Primary);
        assert!(pipeline.water_visible());
        assert!(pipeline.clip_plane().is_none());

        pipeline.pre_pass(&primary());
        assert_eq!(pipeline.active(), ActiveCamera::Reflection);
        assert!(!pipeline.water_visible());
        let plane = pipeline.clip_plane().expect("clip plane installed");
        assert!(plane.keeps(Vec3::new(0.0, 1.0, 0.0)));
        assert!(!plane.keeps(Vec3::new(0.0, -1.0, 0.0)));

        pipeline.post_pass();
        assert_eq!(pipeline.active(), ActiveCamera::Primary);
        assert!(pipeline.water_visible());
        assert!(pipeline.clip_plane().is_none());
    }

    #[test]
    fn test_matrix_composes_primary_projection_with_mirror_view() {
        let mut pipeline = ReflectionPipeline::new(0.0);
        let cam = primary();
        let matrix = pipeline.update_matrix(&cam);
        let expected = cam.projection() * pipeline.mirror(&cam).view();
        assert_eq!(matrix, expected);
        assert_eq!(pipeline.matrix(), expected);
    }
}
