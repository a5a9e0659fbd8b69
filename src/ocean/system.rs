//! Slowly oscillating sea state: wave strength → amplitude and frequency.

use super::WaveParameters;
use crate::math::lerp;
use crate::params::OceanParams;

/// High-level ocean system owning the sea-state oscillator
pub struct OceanSystem {
    pub params: OceanParams,
    strength: f32,
    waves: WaveParameters,
}

impl OceanSystem {
    /// Create new ocean system with specified parameters
    pub fn new(params: OceanParams) -> Self {
        let mut system = Self {
            strength: 0.0,
            waves: WaveParameters {
                amplitude: params.min_amplitude_m,
                frequency: params.min_frequency,
            },
            params,
        };
        system.update(0.0);
        system
    }

    /// Wave strength in [0, 1] at time `time_s`
    pub fn strength_at(&self, time_s: f32) -> f32 {
        match self.params.fixed_strength {
            Some(strength) => strength,
            None => ((time_s * self.params.strength_speed).sin() + 1.0) * 0.5,
        }
    }

    /// Map a wave strength in [0, 1] onto amplitude/frequency ranges.
    ///
    /// Both are monotonic increasing in `strength`.
    pub fn parameters_for(&self, strength: f32) -> WaveParameters {
        let s = strength.clamp(0.0, 1.0);
        WaveParameters {
            amplitude: lerp(self.params.min_amplitude_m, self.params.max_amplitude_m, s),
            frequency: lerp(self.params.min_frequency, self.params.max_frequency, s),
        }
    }

    /// Advance the sea state to `time_s` and return this tick's parameters
    pub fn update(&mut self, time_s: f32) -> WaveParameters {
        self.strength = self.strength_at(time_s);
        self.waves = self.parameters_for(self.strength);
        self.waves
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn waves(&self) -> WaveParameters {
        self.waves
    }
}
