//! Seafarer - sail a small boat across an endless animated ocean.
//!
//! Steer with WASD or the arrow keys, drag with the left mouse button to orbit
//! the camera, scroll to zoom. The sky runs through a full day-night cycle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use seafarer::boat::ProceduralBoatLoader;
use seafarer::cli::Args;
use seafarer::error::RenderError;
use seafarer::input::{InputState, KeyInput};
use seafarer::params::SceneParams;
use seafarer::rendering::RenderSystem;
use seafarer::scene::Scene;

/// Pixels of touchpad scroll that count as one wheel line
const PIXELS_PER_LINE: f64 = 40.0;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,

    // Simulation
    scene: Scene<ProceduralBoatLoader>,
    input: InputState,
    params: SceneParams,

    // Mouse orbit
    dragging: bool,
    last_cursor: Option<PhysicalPosition<f64>>,

    // Time tracking
    last_frame: Instant,
}

impl App {
    fn new(scene: Scene<ProceduralBoatLoader>, params: SceneParams) -> Self {
        Self {
            window: None,
            render_system: None,
            scene,
            input: InputState::new(),
            params,
            dragging: false,
            last_cursor: None,
            last_frame: Instant::now(),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if let Some(render_system) = &mut self.render_system {
            render_system.resize(width, height);
        }
        self.scene.camera_mut().set_aspect(width, height);
    }

    /// Advance the scene by the wall-clock time since the last frame, then draw it
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(render_system) = &mut self.render_system else {
            return;
        };

        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.scene.tick(dt, &self.input, &mut *render_system);

        let primary = self.scene.primary_camera();
        match render_system.render(self.scene.reflection_mut(), &primary) {
            Ok(()) => {}
            Err(RenderError::SurfaceTexture(
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
            )) => {
                warn!("Surface lost, reconfiguring");
                let (width, height) = render_system.size();
                render_system.resize(width, height);
            }
            Err(RenderError::SurfaceTexture(wgpu::SurfaceError::OutOfMemory)) => {
                error!("GPU out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => error!("Render error: {}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let render = &self.params.render;
        let window_attributes = Window::default_attributes()
            .with_title("Seafarer")
            .with_inner_size(winit::dpi::LogicalSize::new(
                render.window_width,
                render.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let render_system = pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            self.scene.grid(),
            self.params.render.clone(),
            self.params.ocean.water_level_m,
            self.scene.cloud_size(),
        ));
        let render_system = match render_system {
            Ok(render_system) => render_system,
            Err(e) => {
                error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.scene.camera_mut().set_aspect(size.width, size.height);

        info!("Seafarer is running! WASD/arrows to steer, drag to orbit, ESC to quit");

        self.window = Some(window);
        self.render_system = Some(render_system);
        self.last_frame = Instant::now();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if code == KeyCode::Escape && state == ElementState::Pressed {
                    event_loop.exit();
                    return;
                }
                self.input.apply(KeyInput {
                    key: code,
                    pressed: state == ElementState::Pressed,
                });
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let (true, Some(last)) = (self.dragging, self.last_cursor) {
                    let dx = (position.x - last.x) as f32;
                    let dy = (position.y - last.y) as f32;
                    self.scene.camera_mut().drag(dx, dy);
                }
                self.last_cursor = Some(position);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_LINE) as f32,
                };
                self.scene.camera_mut().zoom(lines);
            }
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut params = SceneParams::default();
    args.apply(&mut params);

    let loader = ProceduralBoatLoader::spawn(Duration::from_millis(args.load_delay_ms));
    let scene = match Scene::new(params.clone(), loader) {
        Ok(scene) => scene,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(scene, params);
    if let Err(e) = event_loop.run_app(&mut app) {
        error!("Event loop error: {}", e);
    }
}
