//! Continuous day-night cycle driven by a single phase angle.
//!
//! Every lighting quantity (ambient, sun disc, sky material, fog) is a linear
//! blend between a night and a day endpoint, using the daylight factor as the
//! blend parameter. The daylight factor is floored at 0 but not capped at 1,
//! so around noon the blends extrapolate past the day endpoints.

use std::f32::consts::{FRAC_PI_2, PI};
use std::f64::consts::TAU;

use glam::Vec3;

use crate::math::{lerp, lerp_rgb};
use crate::params::SkyParams;

/// Sky-position function: where the sun sits for a sky-material
/// inclination/azimuth pair.
pub trait SunPath {
    fn position(&self, inclination: f32, azimuth: f32) -> Vec3;
}

/// Preetham sky dome convention: inclination 0 is the zenith, 0.5 the
/// horizon, 1 the nadir; azimuth is in turns.
#[derive(Debug, Clone, Copy)]
pub struct DomeSunPath {
    pub distance: f32,
}

impl Default for DomeSunPath {
    fn default() -> Self {
        Self { distance: 500.0 }
    }
}

impl SunPath for DomeSunPath {
    fn position(&self, inclination: f32, azimuth: f32) -> Vec3 {
        let theta = PI * (inclination - 0.5);
        let phi = 2.0 * PI * (azimuth - 0.5);
        Vec3::new(
            self.distance * phi.cos(),
            self.distance * phi.sin() * theta.sin(),
            self.distance * phi.sin() * theta.cos(),
        )
    }
}

/// Lighting state derived from the clock for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingBlend {
    pub daylight: f32,
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    pub sun_color: Vec3,
    pub sun_direction: Vec3,
    pub inclination: f32,
    pub turbidity: f32,
    pub luminance: f32,
    pub fog_color: Vec3,
    pub water_tint: f32,
}

/// Day-night clock. The phase accumulates in `f64` so per-tick increments
/// keep registering after days of runtime.
pub struct DayNightClock<P: SunPath = DomeSunPath> {
    phase: f64,
    params: SkyParams,
    sun_path: P,
}

impl DayNightClock<DomeSunPath> {
    pub fn new(params: SkyParams) -> Self {
        Self::with_sun_path(params, DomeSunPath::default())
    }
}

impl<P: SunPath> DayNightClock<P> {
    pub fn with_sun_path(params: SkyParams, sun_path: P) -> Self {
        Self {
            phase: f64::from(params.initial_phase),
            params,
            sun_path,
        }
    }

    /// Advance the phase by `cycle_speed · dt`
    pub fn tick(&mut self, dt: f32) {
        self.phase += f64::from(self.params.cycle_speed) * f64::from(dt);
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Phase folded into `[0, 2π)`, narrowed for the trig below
    fn local_phase(&self) -> f32 {
        self.phase.rem_euclid(TAU) as f32
    }

    /// `sin(phase + π/2)`: 1 at noon, -1 at midnight
    pub fn cycle(&self) -> f32 {
        (self.local_phase() + FRAC_PI_2).sin()
    }

    /// Normalized daylight, 0 through the night, rising past 1 near noon
    pub fn daylight_factor(&self) -> f32 {
        daylight_factor(self.local_phase(), self.params.night_duration)
    }

    /// Sky-material inclination tracking the phase (0 = noon, 1 = midnight)
    pub fn inclination(&self) -> f32 {
        (self.local_phase() / PI).rem_euclid(2.0)
    }

    /// Unit vector from the scene toward the sun
    pub fn sun_direction(&self) -> Vec3 {
        self.sun_path
            .position(self.inclination(), self.params.sun_azimuth)
            .normalize_or_zero()
    }

    /// Blend every lighting quantity for the current phase
    pub fn lighting(&self) -> LightingBlend {
        let p = &self.params;
        let t = self.daylight_factor();
        LightingBlend {
            daylight: t,
            ambient_color: lerp_rgb(p.ambient_night, p.ambient_day, t),
            ambient_intensity: lerp(p.ambient_intensity_night, p.ambient_intensity_day, t),
            sun_color: lerp_rgb(p.sun_night, p.sun_day, t),
            sun_direction: self.sun_direction(),
            inclination: self.inclination(),
            turbidity: lerp(p.turbidity_night, p.turbidity_day, t),
            luminance: lerp(p.luminance_night, p.luminance_day, t),
            fog_color: lerp_rgb(p.fog_night, p.fog_day, t),
            water_tint: lerp(p.water_tint_night, p.water_tint_day, t),
        }
    }
}

/// Daylight factor as a pure function of phase
pub fn daylight_factor(phase: f32, night_duration: f32) -> f32 {
    let cycle = (phase + FRAC_PI_2).sin();
    ((cycle + night_duration) / (1.0 - night_duration)).max(0.0)
}
