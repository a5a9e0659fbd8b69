//! Per-frame orchestrator: owns every simulation system and pushes their
//! state to the rendering backend in a fixed order.
//!
//! One call to [`Scene::tick`] is one frame. `time` and `dt` are captured once
//! at the top of the tick and every system sees that same snapshot.

use glam::{Mat4, Vec3, Vec4};
use log::{debug, error, info, warn};

use crate::boat::{AssetSource, BoatDynamics, BoatModel, MaterialLibrary};
use crate::camera::{CameraSnapshot, OrbitCamera};
use crate::clouds::{Cloud, CloudSet};
use crate::daynight::{DayNightClock, LightingBlend};
use crate::error::ConfigError;
use crate::input::InputState;
use crate::ocean::{OceanGrid, OceanSystem, WaveParameters};
use crate::params::SceneParams;
use crate::reflection::ReflectionPipeline;

/// Fog mode id for exponential fog in the (mode, start, end, density) layout
const FOG_MODE_EXP: f32 = 1.0;

/// Water material uniforms driven by the sea state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveUniforms {
    pub time: f32,
    pub wave_amplitude: f32,
    pub wave_frequency: f32,
    pub color_blend_intensity: f32,
}

/// Sun emissive material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunMaterial {
    pub emissive: Vec3,
}

/// Hemispheric ambient light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphericLight {
    pub diffuse: Vec3,
    pub intensity: f32,
}

/// Sky dome material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyMaterial {
    pub inclination: f32,
    pub turbidity: f32,
    pub luminance: f32,
}

/// Lighting uniforms driven by the day-night clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingUniforms {
    pub sun_direction: Vec3,
    pub water_color: Vec3,
    pub secondary_water_color: Vec3,
    /// (mode, start, end, density)
    pub fog_infos: Vec4,
    pub fog_color: Vec3,
    pub daylight: f32,
    pub sun_material: SunMaterial,
    pub hemispheric: HemisphericLight,
    pub sky: SkyMaterial,
}

/// Primary camera and the reflection lookup matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraUniforms {
    pub camera_position: Vec3,
    pub view_proj: Mat4,
    pub reflection_matrix: Mat4,
    /// Ocean grid translation, snapped to whole cells
    pub ocean_anchor: Vec3,
}

/// Every uniform pushed during the last completed tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub waves: WaveUniforms,
    pub lighting: LightingUniforms,
    pub camera: CameraUniforms,
    pub boat_transform: Option<Mat4>,
}

/// Rendering collaborator receiving per-tick state
pub trait SceneSink {
    fn push_waves(&mut self, waves: &WaveUniforms);
    fn push_lighting(&mut self, lighting: &LightingUniforms);
    fn push_clouds(&mut self, clouds: &[Cloud]);
    /// Called once, when the boat model becomes available
    fn upload_boat(&mut self, model: &BoatModel);
    fn push_boat(&mut self, transform: Mat4);
    fn push_camera(&mut self, camera: &CameraUniforms);
}

struct Boat {
    dynamics: BoatDynamics,
    model: BoatModel,
}

/// Scene tick orchestrator
pub struct Scene<A: AssetSource> {
    params: SceneParams,
    /// Seconds since start; `f64` so small `dt`s still register after days
    time: f64,
    ocean: OceanSystem,
    grid: OceanGrid,
    clock: DayNightClock,
    clouds: CloudSet,
    camera: OrbitCamera,
    reflection: ReflectionPipeline,
    boat: Option<Boat>,
    assets: Option<A>,
    materials: MaterialLibrary,
    frame: Option<FrameUniforms>,
    ticks: u64,
}

impl<A: AssetSource> Scene<A> {
    /// Build the scene; parameters are validated once here
    pub fn new(params: SceneParams, assets: A) -> Result<Self, ConfigError> {
        params.validate()?;

        let ocean = OceanSystem::new(params.ocean.clone());
        let grid = OceanGrid::new(&params.ocean);
        let clock = DayNightClock::new(params.sky.clone());
        let clouds = CloudSet::new(&params.clouds, params.boat.world_size_m);
        let camera = OrbitCamera::new(params.camera.clone(), &params.render);
        let reflection = ReflectionPipeline::new(params.ocean.water_level_m);

        info!(
            "Scene ready: {} clouds, world {}m, day length {:.0}s",
            params.clouds.count,
            params.boat.world_size_m,
            std::f32::consts::TAU / params.sky.cycle_speed.max(f32::EPSILON)
        );

        Ok(Self {
            params,
            time: 0.0,
            ocean,
            grid,
            clock,
            clouds,
            camera,
            reflection,
            boat: None,
            assets: Some(assets),
            materials: MaterialLibrary::default(),
            frame: None,
            ticks: 0,
        })
    }

    /// Run one frame given the seconds elapsed since the previous one.
    ///
    /// A non-finite or negative `dt` skips the tick entirely so the backend
    /// keeps showing the previous frame's state.
    pub fn tick(&mut self, dt: f32, input: &InputState, sink: &mut impl SceneSink) {
        if !dt.is_finite() || dt < 0.0 {
            warn!("Skipping tick with invalid dt {}", dt);
            return;
        }
        self.time += f64::from(dt);
        let now = self.time as f32;

        // Sea state
        let waves = self.ocean.update(now);
        let wave_uniforms = WaveUniforms {
            time: now,
            wave_amplitude: waves.amplitude,
            wave_frequency: waves.frequency,
            color_blend_intensity: self.params.ocean.color_blend_intensity,
        };
        sink.push_waves(&wave_uniforms);

        // Day-night
        self.clock.tick(dt);
        let lighting = self.lighting_uniforms(&self.clock.lighting());
        sink.push_lighting(&lighting);

        // Weather
        self.clouds.update(dt);
        sink.push_clouds(&self.clouds.clouds);

        // Boat
        let boat_transform = self.update_boat(dt, input, waves, now, sink);

        // Camera and reflection
        let camera = self.update_camera();
        sink.push_camera(&camera);

        self.frame = Some(FrameUniforms {
            waves: wave_uniforms,
            lighting,
            camera,
            boat_transform,
        });
        self.ticks += 1;
        if self.ticks % 600 == 0 {
            debug!(
                "t={:.1}s amplitude={:.2} daylight={:.2}",
                now, waves.amplitude, lighting.daylight
            );
        }
    }

    fn lighting_uniforms(&self, blend: &LightingBlend) -> LightingUniforms {
        let ocean = &self.params.ocean;
        LightingUniforms {
            sun_direction: blend.sun_direction,
            water_color: Vec3::from_array(ocean.water_color) * blend.water_tint,
            secondary_water_color: Vec3::from_array(ocean.secondary_water_color)
                * blend.water_tint,
            fog_infos: Vec4::new(FOG_MODE_EXP, 0.0, 0.0, self.params.sky.fog_density),
            fog_color: blend.fog_color,
            daylight: blend.daylight,
            sun_material: SunMaterial {
                emissive: blend.sun_color,
            },
            hemispheric: HemisphericLight {
                diffuse: blend.ambient_color,
                intensity: blend.ambient_intensity,
            },
            sky: SkyMaterial {
                inclination: blend.inclination,
                turbidity: blend.turbidity,
                luminance: blend.luminance,
            },
        }
    }

    /// Pick up the boat model if it just arrived, then integrate it.
    /// Returns `None` while the model is still loading.
    fn update_boat(
        &mut self,
        dt: f32,
        input: &InputState,
        waves: WaveParameters,
        now: f32,
        sink: &mut impl SceneSink,
    ) -> Option<Mat4> {
        if self.boat.is_none() {
            self.poll_assets(sink);
        }
        let boat = self.boat.as_mut()?;
        boat.dynamics.tick(dt, input.boat_intents(), waves, now);
        let transform = boat.dynamics.model_matrix(boat.model.scale);
        sink.push_boat(transform);
        self.camera.follow(boat.dynamics.state.position);
        Some(transform)
    }

    fn poll_assets(&mut self, sink: &mut impl SceneSink) {
        let Some(assets) = self.assets.as_mut() else {
            return;
        };
        let Some(result) = assets.poll() else {
            return;
        };
        self.assets = None;

        let located = result.and_then(|hierarchy| {
            BoatModel::locate(
                &hierarchy,
                self.params.boat.model_scale,
                self.params.ocean.water_level_m,
                &self.materials,
            )
        });
        match located {
            Ok(model) => {
                info!(
                    "Boat ready after {} ticks ({} triangles, base height {:.2}m)",
                    self.ticks,
                    model.mesh.indices.len() / 3,
                    model.base_height
                );
                sink.upload_boat(&model);
                let dynamics = BoatDynamics::new(self.params.boat.clone(), model.base_height);
                self.boat = Some(Boat { dynamics, model });
            }
            Err(e) => error!("Boat unavailable, continuing without it: {}", e),
        }
    }

    fn update_camera(&mut self) -> CameraUniforms {
        let primary = self.camera.snapshot();
        let reflection_matrix = self.reflection.update_matrix(&primary);
        CameraUniforms {
            camera_position: primary.position,
            view_proj: primary.view_proj(),
            reflection_matrix,
            ocean_anchor: self.grid.anchor_for(primary.position),
        }
    }

    /// Uniforms from the last completed tick
    pub fn frame(&self) -> Option<&FrameUniforms> {
        self.frame.as_ref()
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn boat_state(&self) -> Option<&crate::boat::BoatState> {
        self.boat.as_ref().map(|b| &b.dynamics.state)
    }

    pub fn grid(&self) -> &OceanGrid {
        &self.grid
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn primary_camera(&self) -> CameraSnapshot {
        self.camera.snapshot()
    }

    /// Reflection hooks, driven by the backend around its reflection pass
    pub fn reflection_mut(&mut self) -> &mut ReflectionPipeline {
        &mut self.reflection
    }

    pub fn cloud_size(&self) -> f32 {
        self.clouds.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boat::ModelHierarchy;
    use crate::error::AssetError;

    struct NeverLoads;

    impl AssetSource for NeverLoads {
        fn poll(&mut self) -> Option<Result<ModelHierarchy, AssetError>> {
            None
        }
    }

    #[derive(Default)]
    struct WaveTimes(Vec<f32>);

    impl SceneSink for WaveTimes {
        fn push_waves(&mut self, waves: &WaveUniforms) {
            self.0.push(waves.time);
        }
        fn push_lighting(&mut self, _lighting: &LightingUniforms) {}
        fn push_clouds(&mut self, _clouds: &[Cloud]) {}
        fn upload_boat(&mut self, _model: &BoatModel) {}
        fn push_boat(&mut self, _transform: Mat4) {}
        fn push_camera(&mut self, _camera: &CameraUniforms) {}
    }

    #[test]
    fn test_time_keeps_advancing_after_days() {
        let mut scene = Scene::new(SceneParams::default(), NeverLoads).unwrap();
        scene.time = 524288.5;
        let mut sink = WaveTimes::default();
        let input = InputState::new();

        for _ in 0..600 {
            scene.tick(1.0 / 60.0, &input, &mut sink);
        }

        assert!((scene.time() - 524298.5).abs() < 1e-6);
        let first = sink.0[0];
        let last = *sink.0.last().unwrap();
        assert!(last - first > 9.9, "{} -> {}", first, last);
    }
}
