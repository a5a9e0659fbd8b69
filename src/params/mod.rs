//! Parameter definitions with physical units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Physical units (meters, seconds, radians, etc.)
//! - Documented ranges and meanings
//! - A `validate()` check run once when the scene is built

mod boat;
mod camera;
mod ocean;
mod render;
mod sky;

// Re-export all types
pub use boat::BoatParams;
pub use camera::CameraParams;
pub use ocean::OceanParams;
pub use render::RenderConfig;
pub use sky::{CloudParams, SkyParams};

use crate::error::ConfigError;

/// Every tunable the scene needs, grouped by concern
#[derive(Debug, Clone, Default)]
pub struct SceneParams {
    pub ocean: OceanParams,
    pub sky: SkyParams,
    pub clouds: CloudParams,
    pub boat: BoatParams,
    pub camera: CameraParams,
    pub render: RenderConfig,
}

impl SceneParams {
    /// Check all parameter groups
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ocean.validate()?;
        self.sky.validate()?;
        self.clouds.validate()?;
        self.boat.validate()?;
        self.camera.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(SceneParams::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_camera_ranges_rejected() {
        let mut params = SceneParams::default();
        params.camera.min_radius_m = 300.0;
        assert!(matches!(
            params.validate(),
            Err(ConfigError::InvertedRange {
                name: "camera radius",
                ..
            })
        ));

        let mut params = SceneParams::default();
        params.camera.max_beta = f32::NAN;
        assert!(matches!(
            params.validate(),
            Err(ConfigError::InvertedRange {
                name: "camera beta",
                ..
            })
        ));
    }

    #[test]
    fn test_inverted_amplitude_rejected() {
        let mut params = SceneParams::default();
        params.ocean.min_amplitude_m = 9.0;
        assert!(matches!(
            params.validate(),
            Err(ConfigError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_fixed_strength_out_of_range_rejected() {
        let mut params = SceneParams::default();
        params.ocean.fixed_strength = Some(1.5);
        assert!(matches!(
            params.validate(),
            Err(ConfigError::OutOfRange { .. })
        ));
    }
}
