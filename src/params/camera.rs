//! Orbit camera configuration.

use crate::error::ConfigError;

/// Arc-rotate camera parameters
#[derive(Debug, Clone)]
pub struct CameraParams {
    /// Initial azimuth around the target (radians)
    pub initial_alpha: f32,

    /// Initial polar angle from +Y (radians); π/2 is level with the water
    pub initial_beta: f32,

    /// Initial distance from the target (meters)
    pub initial_radius_m: f32,

    /// Closest / farthest allowed zoom (meters)
    pub min_radius_m: f32,
    pub max_radius_m: f32,

    /// Smallest polar angle (keeps the camera off the zenith)
    pub min_beta: f32,

    /// Largest polar angle (keeps the camera above the waterline)
    pub max_beta: f32,

    /// Radians of rotation per pixel of mouse drag
    pub drag_sensitivity: f32,

    /// Meters of zoom per wheel line
    pub zoom_step_m: f32,

    /// Height of the look-at point above the boat origin (meters)
    pub target_height_m: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            initial_alpha: -std::f32::consts::FRAC_PI_2,
            initial_beta: 1.2,
            initial_radius_m: 40.0,
            min_radius_m: 10.0,
            max_radius_m: 200.0,
            min_beta: 0.1,
            max_beta: 1.5, // just under π/2
            drag_sensitivity: 0.005,
            zoom_step_m: 4.0,
            target_height_m: 2.0,
        }
    }
}

impl CameraParams {
    /// Radius and beta bounds feed `f32::clamp`, which needs ordered, non-NaN limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, min, max) in [
            ("camera radius", self.min_radius_m, self.max_radius_m),
            ("camera beta", self.min_beta, self.max_beta),
        ] {
            if min.is_nan() || max.is_nan() || min > max {
                return Err(ConfigError::InvertedRange { name, min, max });
            }
        }
        if self.min_radius_m <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "camera min radius",
                value: self.min_radius_m,
            });
        }
        Ok(())
    }
}
