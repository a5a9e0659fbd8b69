//! Ocean surface parameters: wave strength oscillator, grid and water tint.

use crate::error::ConfigError;

/// Ocean wave and surface parameters
#[derive(Debug, Clone)]
pub struct OceanParams {
    /// Wave amplitude at wave strength 0 (meters)
    pub min_amplitude_m: f32,

    /// Wave amplitude at wave strength 1 (meters)
    pub max_amplitude_m: f32,

    /// Spatial frequency at wave strength 0 (radians per meter)
    pub min_frequency: f32,

    /// Spatial frequency at wave strength 1 (radians per meter)
    pub max_frequency: f32,

    /// Angular speed of the slow wave-strength oscillation (rad/s)
    pub strength_speed: f32,

    /// Pins wave strength to a constant in [0, 1] instead of oscillating
    pub fixed_strength: Option<f32>,

    /// Height of the water plane (meters); also the reflection mirror plane
    pub water_level_m: f32,

    /// Grid resolution (quads per side)
    pub grid_size: usize,

    /// Spacing between grid vertices (meters)
    pub grid_spacing_m: f32,

    /// Deep water tint (linear RGB)
    pub water_color: [f32; 3],

    /// Shallow/crest tint mixed in by wave height (linear RGB)
    pub secondary_water_color: [f32; 3],

    /// How strongly the water tint is mixed over the reflection (0-1)
    pub color_blend_intensity: f32,
}

impl Default for OceanParams {
    fn default() -> Self {
        Self {
            min_amplitude_m: 1.0,
            max_amplitude_m: 7.0,
            min_frequency: 0.02,
            max_frequency: 0.06,
            strength_speed: 0.05,
            fixed_strength: None,
            water_level_m: 0.0,
            grid_size: 256,
            grid_spacing_m: 4.0, // 1024m square, matches the boat world
            water_color: [0.0, 0.18, 0.32],
            secondary_water_color: [0.1, 0.45, 0.55],
            color_blend_intensity: 0.3,
        }
    }
}

impl OceanParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_amplitude_m > self.max_amplitude_m {
            return Err(ConfigError::InvertedRange {
                name: "ocean amplitude",
                min: self.min_amplitude_m,
                max: self.max_amplitude_m,
            });
        }
        if self.min_frequency > self.max_frequency {
            return Err(ConfigError::InvertedRange {
                name: "ocean frequency",
                min: self.min_frequency,
                max: self.max_frequency,
            });
        }
        if self.grid_spacing_m <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "grid spacing",
                value: self.grid_spacing_m,
            });
        }
        if self.grid_size == 0 {
            return Err(ConfigError::NonPositive {
                name: "grid size",
                value: 0.0,
            });
        }
        if let Some(strength) = self.fixed_strength {
            if !(0.0..=1.0).contains(&strength) {
                return Err(ConfigError::OutOfRange {
                    name: "wave strength",
                    value: strength,
                    lo: 0.0,
                    hi: 1.0,
                });
            }
        }
        Ok(())
    }

    /// Edge length of the rendered ocean grid (meters)
    pub fn grid_extent_m(&self) -> f32 {
        self.grid_size as f32 * self.grid_spacing_m
    }
}
