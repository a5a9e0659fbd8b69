//! Boat handling and wave response tuning.

use crate::error::ConfigError;

/// Boat dynamics tuning
#[derive(Debug, Clone)]
pub struct BoatParams {
    /// Distance moved per tick while forward/back is held (meters per tick).
    /// Not scaled by frame time, so speed follows the frame rate.
    pub move_speed_m_per_tick: f32,

    /// Heading change rate while turning (rad/s)
    pub turn_speed_rad_per_s: f32,

    /// Fraction of the local wave height transferred to the hull
    pub wave_amplitude_factor: f32,

    /// Per-tick blend toward target heave/pitch/roll
    pub motion_smoothing: f32,

    /// Per-tick blend of current heading toward target heading
    pub yaw_smoothing: f32,

    /// Distance of the fore/aft probes from the hull center (meters)
    pub pitch_probe_m: f32,

    /// Wave slope → pitch gain (rad per meter of height difference)
    pub pitch_gain: f32,

    /// Distance of the port/starboard probes from the hull center (meters)
    pub roll_probe_m: f32,

    /// Wave slope → roll gain (rad per meter of height difference)
    pub roll_gain: f32,

    /// Uniform scale applied to the loaded model
    pub model_scale: f32,

    /// Edge length of the toroidal world (meters)
    pub world_size_m: f32,
}

impl Default for BoatParams {
    fn default() -> Self {
        Self {
            move_speed_m_per_tick: 0.5,
            turn_speed_rad_per_s: 1.2,
            wave_amplitude_factor: 0.25,
            motion_smoothing: 0.05,
            yaw_smoothing: 0.1,
            pitch_probe_m: 5.0,
            pitch_gain: 0.1,
            roll_probe_m: 3.0,
            roll_gain: -0.5,
            model_scale: 1.0,
            world_size_m: 1024.0,
        }
    }
}

impl BoatParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world_size_m <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "world size",
                value: self.world_size_m,
            });
        }
        if self.model_scale <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "model scale",
                value: self.model_scale,
            });
        }
        for (name, value) in [
            ("motion smoothing", self.motion_smoothing),
            ("yaw smoothing", self.yaw_smoothing),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    name,
                    value,
                    lo: 0.0,
                    hi: 1.0,
                });
            }
        }
        Ok(())
    }

    pub fn half_world_size(&self) -> f32 {
        self.world_size_m / 2.0
    }
}
