//! Drives the scene orchestrator end to end with a recording backend.

use glam::Mat4;
use winit::keyboard::KeyCode;

use seafarer::boat::{build_boat_hierarchy, AssetSource, BoatModel, ModelHierarchy};
use seafarer::clouds::Cloud;
use seafarer::error::AssetError;
use seafarer::input::{InputState, KeyInput};
use seafarer::params::SceneParams;
use seafarer::scene::{CameraUniforms, LightingUniforms, Scene, SceneSink, WaveUniforms};

const DT: f32 = 1.0 / 60.0;

#[derive(Debug, Clone, PartialEq)]
enum Push {
    Waves,
    Lighting,
    Clouds(usize),
    UploadBoat,
    Boat,
    Camera,
}

#[derive(Default)]
struct RecordingSink {
    pushes: Vec<Push>,
    boat_transforms: Vec<Mat4>,
}

impl RecordingSink {
    fn take(&mut self) -> Vec<Push> {
        std::mem::take(&mut self.pushes)
    }
}

impl SceneSink for RecordingSink {
    fn push_waves(&mut self, _waves: &WaveUniforms) {
        self.pushes.push(Push::Waves);
    }

    fn push_lighting(&mut self, _lighting: &LightingUniforms) {
        self.pushes.push(Push::Lighting);
    }

    fn push_clouds(&mut self, clouds: &[Cloud]) {
        self.pushes.push(Push::Clouds(clouds.len()));
    }

    fn upload_boat(&mut self, _model: &BoatModel) {
        self.pushes.push(Push::UploadBoat);
    }

    fn push_boat(&mut self, transform: Mat4) {
        self.pushes.push(Push::Boat);
        self.boat_transforms.push(transform);
    }

    fn push_camera(&mut self, _camera: &CameraUniforms) {
        self.pushes.push(Push::Camera);
    }
}

/// Delivers a fixed result after a set number of empty polls
struct ScriptedAssets {
    empty_polls: usize,
    result: Option<Result<ModelHierarchy, AssetError>>,
}

impl ScriptedAssets {
    fn boat_after(empty_polls: usize) -> Self {
        Self {
            empty_polls,
            result: Some(Ok(build_boat_hierarchy())),
        }
    }

    fn delivering(result: Result<ModelHierarchy, AssetError>) -> Self {
        Self {
            empty_polls: 0,
            result: Some(result),
        }
    }
}

impl AssetSource for ScriptedAssets {
    fn poll(&mut self) -> Option<Result<ModelHierarchy, AssetError>> {
        if self.empty_polls > 0 {
            self.empty_polls -= 1;
            return None;
        }
        self.result.take()
    }
}

fn params() -> SceneParams {
    let mut params = SceneParams::default();
    params.clouds.count = 5;
    params
}

fn scene_with(assets: ScriptedAssets) -> Scene<ScriptedAssets> {
    Scene::new(params(), assets).unwrap()
}

fn holding(keys: &[KeyCode]) -> InputState {
    let mut input = InputState::new();
    for &key in keys {
        input.apply(KeyInput { key, pressed: true });
    }
    input
}

#[test]
fn test_pushes_follow_fixed_order_while_boat_loads() {
    let mut scene = scene_with(ScriptedAssets::boat_after(100));
    let mut sink = RecordingSink::default();

    scene.tick(DT, &InputState::new(), &mut sink);

    assert_eq!(
        sink.take(),
        vec![Push::Waves, Push::Lighting, Push::Clouds(5), Push::Camera]
    );
    assert!(scene.boat_state().is_none());
    assert!(scene.frame().unwrap().boat_transform.is_none());
}

#[test]
fn test_boat_arrives_after_several_ticks() {
    let mut scene = scene_with(ScriptedAssets::boat_after(3));
    let mut sink = RecordingSink::default();
    let input = InputState::new();

    for _ in 0..3 {
        scene.tick(DT, &input, &mut sink);
        assert!(!sink.take().contains(&Push::UploadBoat));
        assert!(scene.boat_state().is_none());
    }

    scene.tick(DT, &input, &mut sink);
    assert_eq!(
        sink.take(),
        vec![
            Push::Waves,
            Push::Lighting,
            Push::Clouds(5),
            Push::UploadBoat,
            Push::Boat,
            Push::Camera,
        ]
    );
    assert!(scene.boat_state().is_some());

    // Uploaded once, then only transforms
    scene.tick(DT, &input, &mut sink);
    assert_eq!(
        sink.take(),
        vec![
            Push::Waves,
            Push::Lighting,
            Push::Clouds(5),
            Push::Boat,
            Push::Camera,
        ]
    );
}

#[test]
fn test_holding_w_moves_half_meter_per_tick_toward_negative_z() {
    let mut scene = scene_with(ScriptedAssets::boat_after(0));
    let mut sink = RecordingSink::default();
    scene.tick(DT, &InputState::new(), &mut sink);
    let start = scene.boat_state().unwrap().position;

    let input = holding(&[KeyCode::KeyW]);
    for _ in 0..10 {
        scene.tick(DT, &input, &mut sink);
    }

    let end = scene.boat_state().unwrap().position;
    assert!((end.z - (start.z - 5.0)).abs() < 1e-4);
    assert!((end.x - start.x).abs() < 1e-6);
}

#[test]
fn test_translation_ignores_frame_time() {
    let mut fast = scene_with(ScriptedAssets::boat_after(0));
    let mut slow = scene_with(ScriptedAssets::boat_after(0));
    let mut sink = RecordingSink::default();
    let input = holding(&[KeyCode::ArrowUp]);

    for _ in 0..6 {
        fast.tick(1.0 / 120.0, &input, &mut sink);
        slow.tick(1.0 / 20.0, &input, &mut sink);
    }

    let a = fast.boat_state().unwrap().position;
    let b = slow.boat_state().unwrap().position;
    assert!((a.z - b.z).abs() < 1e-4);
}

#[test]
fn test_invalid_dt_holds_previous_frame() {
    let mut scene = scene_with(ScriptedAssets::boat_after(0));
    let mut sink = RecordingSink::default();
    scene.tick(DT, &InputState::new(), &mut sink);
    sink.take();

    let frame = *scene.frame().unwrap();
    let time = scene.time();
    let input = holding(&[KeyCode::KeyW]);

    scene.tick(f32::NAN, &input, &mut sink);
    scene.tick(-1.0, &input, &mut sink);
    scene.tick(f32::INFINITY, &input, &mut sink);

    assert!(sink.take().is_empty());
    assert_eq!(scene.time(), time);
    assert_eq!(*scene.frame().unwrap(), frame);
}

#[test]
fn test_reflection_matrix_is_primary_projection_times_mirror_view() {
    let mut scene = scene_with(ScriptedAssets::boat_after(0));
    let mut sink = RecordingSink::default();
    let input = holding(&[KeyCode::KeyW, KeyCode::KeyA]);
    for _ in 0..20 {
        scene.tick(DT, &input, &mut sink);
    }

    let primary = scene.primary_camera();
    let mirror = scene.reflection_mut().mirror(&primary);
    let expected = primary.projection() * mirror.view();

    let actual = scene.frame().unwrap().camera.reflection_matrix;
    assert!(actual.abs_diff_eq(expected, 1e-4));
    // Mirrored across the water plane
    assert!((mirror.position.y + primary.position.y).abs() < 1e-4);
}

#[test]
fn test_pinned_strength_hits_amplitude_endpoints() {
    for (strength, amplitude, frequency) in [(0.0, 1.0, 0.02), (1.0, 7.0, 0.06)] {
        let mut params = params();
        params.ocean.fixed_strength = Some(strength);
        let mut scene = Scene::new(params, ScriptedAssets::boat_after(100)).unwrap();
        let mut sink = RecordingSink::default();
        scene.tick(DT, &InputState::new(), &mut sink);

        let waves = scene.frame().unwrap().waves;
        assert!((waves.wave_amplitude - amplitude).abs() < 1e-5);
        assert!((waves.wave_frequency - frequency).abs() < 1e-6);
    }
}

#[test]
fn test_noon_overshoots_and_midnight_is_dark() {
    let mut noon = scene_with(ScriptedAssets::boat_after(100));
    let mut sink = RecordingSink::default();
    noon.tick(DT, &InputState::new(), &mut sink);
    let daylight = noon.frame().unwrap().lighting.daylight;
    assert!(daylight > 1.0, "noon daylight {}", daylight);

    let mut params = params();
    params.sky.initial_phase = std::f32::consts::PI;
    let mut midnight = Scene::new(params, ScriptedAssets::boat_after(100)).unwrap();
    midnight.tick(DT, &InputState::new(), &mut sink);
    let lighting = midnight.frame().unwrap().lighting;
    assert_eq!(lighting.daylight, 0.0);
    assert!(lighting.sun_direction.y < 0.0);
}

#[test]
fn test_failed_load_keeps_scene_running_without_boat() {
    let mut scene = scene_with(ScriptedAssets::delivering(Err(AssetError::LoaderDisconnected)));
    let mut sink = RecordingSink::default();

    for _ in 0..5 {
        scene.tick(DT, &holding(&[KeyCode::KeyW]), &mut sink);
    }

    let pushes = sink.take();
    assert!(!pushes.contains(&Push::UploadBoat));
    assert!(!pushes.contains(&Push::Boat));
    assert_eq!(pushes.iter().filter(|p| **p == Push::Camera).count(), 5);
    assert!(scene.boat_state().is_none());
}

#[test]
fn test_boat_without_named_root_still_loads() {
    let mut hierarchy = build_boat_hierarchy();
    hierarchy.root.children[0].name = "ship".to_string();

    let mut scene = scene_with(ScriptedAssets::delivering(Ok(hierarchy)));
    let mut sink = RecordingSink::default();
    scene.tick(DT, &InputState::new(), &mut sink);

    assert!(sink.take().contains(&Push::UploadBoat));
    assert!(scene.boat_state().is_some());
}

#[test]
fn test_boat_transform_matches_frame_uniforms() {
    let mut scene = scene_with(ScriptedAssets::boat_after(0));
    let mut sink = RecordingSink::default();
    for _ in 0..4 {
        scene.tick(DT, &holding(&[KeyCode::KeyD]), &mut sink);
    }

    let last = *sink.boat_transforms.last().unwrap();
    assert_eq!(scene.frame().unwrap().boat_transform, Some(last));
    assert!((scene.time() - 4.0 * f64::from(DT)).abs() < 1e-6);
    assert!((scene.frame().unwrap().waves.time - scene.time() as f32).abs() < 1e-6);
}
