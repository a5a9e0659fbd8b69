//! Ocean surface: the analytic wave field and its time-varying parameters.
//!
//! The same [`wave_height`] drives both the vertex shader (`water.wgsl`) and
//! the boat's heave/pitch/roll probes, so hull and surface never drift apart.

mod mesh;
mod system;

// Re-export public types
pub use mesh::{OceanGrid, Vertex};
pub use system::OceanSystem;

/// Amplitude and spatial frequency of the wave field for one tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveParameters {
    /// Peak displacement (meters)
    pub amplitude: f32,
    /// Spatial frequency along x; z uses 1.5× this (radians per meter)
    pub frequency: f32,
}

/// Vertical displacement of the water surface at world `(x, z)` and time `t`.
///
/// `sin(x·f + t) · sin(z·1.5f + 0.7t) · amplitude`. Total over all reals.
#[inline]
pub fn wave_height(x: f32, z: f32, t: f32, amplitude: f32, frequency: f32) -> f32 {
    (x * frequency + t).sin() * (z * 1.5 * frequency + 0.7 * t).sin() * amplitude
}

impl WaveParameters {
    /// Sample the wave field with these parameters
    #[inline]
    pub fn height_at(&self, x: f32, z: f32, t: f32) -> f32 {
        wave_height(x, z, t, self.amplitude, self.frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_shader_uses_same_wave_field() {
        let shader = include_str!("../water.wgsl");
        assert!(shader.contains("sin(x * f + t) * sin(z * 1.5 * f + 0.7 * t) * a"));
    }

    fn reference(x: f32, z: f32, t: f32, a: f32, f: f32) -> f32 {
        a * (x * f + t).sin() * (z * 1.5 * f + 0.7 * t).sin()
    }

    #[test]
    fn test_wave_height_matches_reference() {
        let samples = [
            (0.0, 0.0, 0.0, 1.0, 0.02),
            (13.5, -40.25, 2.0, 7.0, 0.06),
            (-300.0, 511.0, 120.75, 3.3, 0.031),
            (1.0e4, -1.0e4, 9999.0, 0.5, 0.02),
        ];
        for (x, z, t, a, f) in samples {
            let got = wave_height(x, z, t, a, f);
            let want = reference(x, z, t, a, f);
            assert!((got - want).abs() < 1e-5, "{got} vs {want}");
        }
    }

    #[test]
    fn test_wave_height_bounded_by_amplitude() {
        for i in 0..200 {
            let x = i as f32 * 7.3 - 700.0;
            let z = i as f32 * -3.1 + 100.0;
            let h = wave_height(x, z, i as f32 * 0.1, 4.0, 0.05);
            assert!(h.abs() <= 4.0 + 1e-5);
        }
    }

    #[test]
    fn test_zero_amplitude_is_flat() {
        assert_eq!(wave_height(12.0, 34.0, 5.0, 0.0, 0.05), 0.0);
    }

    #[test]
    fn test_parameters_delegate_to_field() {
        let waves = WaveParameters {
            amplitude: 2.0,
            frequency: 0.04,
        };
        assert_eq!(
            waves.height_at(10.0, 20.0, 3.0),
            wave_height(10.0, 20.0, 3.0, 2.0, 0.04)
        );
    }
}
