//! Drifting cloud billboards.

use glam::Vec3;
use noise::{NoiseFn, Perlin};

use crate::math::{lerp, wrap_edge};
use crate::params::CloudParams;

/// One cloud billboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cloud {
    pub position: Vec3,
    pub drift_velocity: Vec3,
}

/// Ordered set of independent clouds, wrapping on x at ±1.5 × half world size
pub struct CloudSet {
    pub clouds: Vec<Cloud>,
    wrap_limit: f32,
    size: f32,
}

impl CloudSet {
    /// Scatter `params.count` clouds over the sky above a world of `world_size`
    pub fn new(params: &CloudParams, world_size: f32) -> Self {
        let half = world_size / 2.0;
        let wrap_limit = 1.5 * half;
        let perlin = Perlin::new(params.seed);

        // Perlin is zero on integer lattice points, so sample between them
        let unit = |i: usize, channel: f64| -> f32 {
            let v = perlin.get([i as f64 * 1.37 + 0.5, channel * 3.1 + 0.25, 0.5]) as f32;
            (v * 0.5 + 0.5).clamp(0.0, 1.0)
        };

        let clouds = (0..params.count)
            .map(|i| Cloud {
                position: Vec3::new(
                    lerp(-wrap_limit, wrap_limit, unit(i, 0.0)),
                    lerp(params.min_height_m, params.max_height_m, unit(i, 1.0)),
                    lerp(-half, half, unit(i, 2.0)),
                ),
                drift_velocity: Vec3::new(
                    lerp(params.min_drift_m_per_s, params.max_drift_m_per_s, unit(i, 3.0)),
                    0.0,
                    0.0,
                ),
            })
            .collect();

        Self {
            clouds,
            wrap_limit,
            size: params.size_m,
        }
    }

    /// Drift every cloud by `velocity · dt`, wrapping on x
    pub fn update(&mut self, dt: f32) {
        for cloud in &mut self.clouds {
            cloud.position += cloud.drift_velocity * dt;
            cloud.position.x = wrap_edge(cloud.position.x, self.wrap_limit);
        }
    }

    pub fn wrap_limit(&self) -> f32 {
        self.wrap_limit
    }

    /// Billboard width (meters)
    pub fn size(&self) -> f32 {
        self.size
    }
}
