//! Player boat: steering integrator and wave response.
//!
//! The hull rides the same analytic wave field the ocean shader draws. Heave
//! follows the wave height under the hull; pitch and roll follow the height
//! difference between probe points fore/aft and port/starboard. All three are
//! exponentially smoothed once per tick.

mod model;

pub use model::{
    build_boat_hierarchy, Aabb, AssetSource, BoatModel, MaterialLibrary, MeshData, MeshVertex,
    ModelHierarchy, ModelNode, ProceduralBoatLoader, BOAT_ROOT, HULL_BOUNDS,
};

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::input::BoatIntents;
use crate::math::{lerp, wrap_edge};
use crate::ocean::WaveParameters;
use crate::params::BoatParams;

/// Mutable boat state, owned by [`BoatDynamics`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoatState {
    /// World position; `y` is the smoothed heave
    pub position: Vec3,
    /// Heading the player is steering toward (radians)
    pub yaw_target: f32,
    /// Smoothed heading actually shown (radians)
    pub yaw_current: f32,
    /// Nose-up rotation (radians)
    pub pitch_current: f32,
    /// Starboard-up rotation (radians)
    pub roll_current: f32,
}

/// Continuous boat integrator
pub struct BoatDynamics {
    params: BoatParams,
    base_height: f32,
    pub state: BoatState,
}

impl BoatDynamics {
    /// Boat at the world origin resting at `base_height`
    pub fn new(params: BoatParams, base_height: f32) -> Self {
        Self {
            params,
            base_height,
            state: BoatState {
                position: Vec3::new(0.0, base_height, 0.0),
                yaw_target: 0.0,
                yaw_current: 0.0,
                pitch_current: 0.0,
                roll_current: 0.0,
            },
        }
    }

    /// `(sin yaw, 0, cos yaw)`; the bow points along its negative
    pub fn forward(&self) -> Vec3 {
        let (sin, cos) = self.state.yaw_current.sin_cos();
        Vec3::new(sin, 0.0, cos)
    }

    /// Horizontal unit vector toward the port side
    pub fn port(&self) -> Vec3 {
        let (sin, cos) = self.state.yaw_current.sin_cos();
        Vec3::new(-cos, 0.0, sin)
    }

    /// Advance one tick.
    ///
    /// Turning is scaled by `dt`; translation is a fixed step per tick.
    pub fn tick(&mut self, dt: f32, intents: BoatIntents, waves: WaveParameters, time: f32) {
        let p = &self.params;

        // Heading
        if intents.left {
            self.state.yaw_target += p.turn_speed_rad_per_s * dt;
        }
        if intents.right {
            self.state.yaw_target -= p.turn_speed_rad_per_s * dt;
        }
        self.state.yaw_current = lerp(self.state.yaw_current, self.state.yaw_target, p.yaw_smoothing);

        // Translation
        let forward = self.forward();
        if intents.forward {
            self.state.position -= forward * p.move_speed_m_per_tick;
        }
        if intents.back {
            self.state.position += forward * p.move_speed_m_per_tick;
        }

        // Toroidal world
        let half = p.half_world_size();
        self.state.position.x = wrap_edge(self.state.position.x, half);
        self.state.position.z = wrap_edge(self.state.position.z, half);

        // Heave
        let at = |point: Vec3| waves.height_at(point.x, point.z, time);
        let center = self.state.position;
        let heave_target = at(center) * p.wave_amplitude_factor + self.base_height;
        self.state.position.y = lerp(center.y, heave_target, p.motion_smoothing);

        // Pitch from fore/aft probes, roll from port/starboard probes
        let bow = center - forward * p.pitch_probe_m;
        let stern = center + forward * p.pitch_probe_m;
        let pitch_target = (at(bow) - at(stern)) * p.pitch_gain;

        let port = self.port();
        let port_probe = center + port * p.roll_probe_m;
        let starboard_probe = center - port * p.roll_probe_m;
        let roll_target = (at(port_probe) - at(starboard_probe)) * p.roll_gain;

        self.state.pitch_current = lerp(self.state.pitch_current, pitch_target, p.motion_smoothing);
        self.state.roll_current = lerp(self.state.roll_current, roll_target, p.motion_smoothing);
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.state.yaw_current,
            self.state.pitch_current,
            self.state.roll_current,
        )
    }

    /// Model-to-world transform for the hull mesh
    pub fn model_matrix(&self, scale: f32) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(scale), self.rotation(), self.state.position)
    }

    pub fn base_height(&self) -> f32 {
        self.base_height
    }
}
