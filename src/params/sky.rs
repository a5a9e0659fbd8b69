//! Day-night cycle, lighting endpoints, sky material and fog.

use crate::error::ConfigError;

/// Day-night cycle and the fixed night/day lighting endpoints
#[derive(Debug, Clone)]
pub struct SkyParams {
    /// Phase advance per second (rad/s); a full day is 2π / cycle_speed seconds
    pub cycle_speed: f32,

    /// Starting phase (radians). 0 = noon, π = midnight
    pub initial_phase: f32,

    /// Fraction of the cycle wave treated as night; shifts where daylight reaches 0
    pub night_duration: f32,

    /// Sun azimuth handed to the sky position function (0-1 turns)
    pub sun_azimuth: f32,

    /// Hemispheric (ambient) light color at night / at day
    pub ambient_night: [f32; 3],
    pub ambient_day: [f32; 3],

    /// Hemispheric light intensity at night / at day
    pub ambient_intensity_night: f32,
    pub ambient_intensity_day: f32,

    /// Sun disc emissive color at night / at day
    pub sun_night: [f32; 3],
    pub sun_day: [f32; 3],

    /// Sky material turbidity at night / at day
    pub turbidity_night: f32,
    pub turbidity_day: f32,

    /// Sky material luminance at night / at day
    pub luminance_night: f32,
    pub luminance_day: f32,

    /// Fog color at night / at day
    pub fog_night: [f32; 3],
    pub fog_day: [f32; 3],

    /// Exponential fog density (1/m)
    pub fog_density: f32,

    /// Water color brightness multiplier at night / at day
    pub water_tint_night: f32,
    pub water_tint_day: f32,
}

impl Default for SkyParams {
    fn default() -> Self {
        Self {
            cycle_speed: 0.05, // ~2 minute day
            initial_phase: 0.0,
            night_duration: 0.2,
            sun_azimuth: 0.25,

            ambient_night: [0.05, 0.07, 0.15],
            ambient_day: [1.0, 1.0, 1.0],
            ambient_intensity_night: 0.2,
            ambient_intensity_day: 1.0,

            sun_night: [0.2, 0.2, 0.4],
            sun_day: [1.0, 0.95, 0.8],

            turbidity_night: 1.0,
            turbidity_day: 10.0,
            luminance_night: 0.1,
            luminance_day: 1.0,

            fog_night: [0.02, 0.03, 0.08],
            fog_day: [0.7, 0.8, 0.9],
            fog_density: 0.0015,

            water_tint_night: 0.15,
            water_tint_day: 1.0,
        }
    }
}

impl SkyParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.night_duration) {
            return Err(ConfigError::OutOfRange {
                name: "night duration",
                value: self.night_duration,
                lo: 0.0,
                hi: 1.0,
            });
        }
        if self.fog_density < 0.0 {
            return Err(ConfigError::NonPositive {
                name: "fog density",
                value: self.fog_density,
            });
        }
        Ok(())
    }
}

/// Drifting cloud billboards
#[derive(Debug, Clone)]
pub struct CloudParams {
    /// Number of clouds
    pub count: usize,

    /// Lowest / highest cloud altitude (meters)
    pub min_height_m: f32,
    pub max_height_m: f32,

    /// Slowest / fastest drift along +x (meters per second)
    pub min_drift_m_per_s: f32,
    pub max_drift_m_per_s: f32,

    /// Billboard width (meters); height is half of it
    pub size_m: f32,

    /// Placement noise seed
    pub seed: u32,
}

impl Default for CloudParams {
    fn default() -> Self {
        Self {
            count: 24,
            min_height_m: 120.0,
            max_height_m: 220.0,
            min_drift_m_per_s: 2.0,
            max_drift_m_per_s: 6.0,
            size_m: 40.0,
            seed: 7,
        }
    }
}

impl CloudParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_height_m > self.max_height_m {
            return Err(ConfigError::InvertedRange {
                name: "cloud height",
                min: self.min_height_m,
                max: self.max_height_m,
            });
        }
        if self.min_drift_m_per_s > self.max_drift_m_per_s {
            return Err(ConfigError::InvertedRange {
                name: "cloud drift",
                min: self.min_drift_m_per_s,
                max: self.max_drift_m_per_s,
            });
        }
        Ok(())
    }
}
