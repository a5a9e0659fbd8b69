//! Window and projection configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (meters)
    pub near_plane_m: f32,

    /// Far clipping plane (meters)
    pub far_plane_m: f32,

    /// Reflection target edge length (pixels)
    pub reflection_resolution: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fov_degrees: 60.0,
            near_plane_m: 0.5,
            far_plane_m: 4000.0,
            reflection_resolution: 512,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }
}
