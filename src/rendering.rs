//! Rendering system with wgpu pipelines, offscreen reflection target and shader management.
//!
//! Implements [`SceneSink`]: the scene pushes typed uniforms each tick, and
//! [`RenderSystem::render`] draws the reflection pass followed by the main pass.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use log::{debug, info};
use wgpu::util::DeviceExt;

use crate::boat::{BoatModel, MeshVertex};
use crate::camera::CameraSnapshot;
use crate::clouds::Cloud;
use crate::error::RenderError;
use crate::ocean::{OceanGrid, Vertex};
use crate::params::RenderConfig;
use crate::reflection::ReflectionPipeline;
use crate::scene::{CameraUniforms, LightingUniforms, SceneSink, WaveUniforms};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Clip plane that keeps every point
const NO_CLIP: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Uniform block shared by every shader (layout mirrors `Globals` in the WGSL files)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GlobalUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub reflection_matrix: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    /// xyz = camera position, w = scene time (s)
    pub camera_position: [f32; 4],
    /// xyz = sun direction, w = daylight factor
    pub sun_direction: [f32; 4],
    /// amplitude, frequency, color blend intensity, water level
    pub wave: [f32; 4],
    pub water_color: [f32; 4],
    pub secondary_water_color: [f32; 4],
    pub fog_infos: [f32; 4],
    pub fog_color: [f32; 4],
    pub sun_emissive: [f32; 4],
    /// rgb = hemispheric diffuse, w = intensity
    pub hemi: [f32; 4],
    /// inclination, turbidity, luminance, unused
    pub sky: [f32; 4],
    pub ocean_anchor: [f32; 4],
    pub clip_plane: [f32; 4],
}

impl Default for GlobalUniforms {
    fn default() -> Self {
        let identity = Mat4::IDENTITY.to_cols_array_2d();
        Self {
            view_proj: identity,
            reflection_matrix: identity,
            inv_view_proj: identity,
            clip_plane: NO_CLIP,
            hemi: [1.0, 1.0, 1.0, 1.0],
            sky: [0.0, 10.0, 1.0, 0.0],
            ..Zeroable::zeroed()
        }
    }
}

fn vec3_4(v: Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

/// Cloud billboard vertex, expanded on the CPU each frame
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CloudVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

const CLOUD_CORNERS: [[f32; 2]; 6] = [
    [0.0, 0.0],
    [1.0, 0.0],
    [1.0, 1.0],
    [0.0, 0.0],
    [1.0, 1.0],
    [0.0, 1.0],
];

/// Expand cloud centers into camera-facing quads (two triangles each)
pub fn cloud_billboards(clouds: &[Cloud], camera: &CameraSnapshot, size: f32) -> Vec<CloudVertex> {
    let forward = (camera.target - camera.position).normalize_or_zero();
    let right = forward.cross(Vec3::Y).normalize_or(Vec3::X);
    let up = right.cross(forward).normalize_or(Vec3::Y);
    // Clouds read as wide, flat puffs
    let half_w = size * 0.5;
    let half_h = size * 0.25;

    let mut vertices = Vec::with_capacity(clouds.len() * CLOUD_CORNERS.len());
    for cloud in clouds {
        for [u, v] in CLOUD_CORNERS {
            let offset = right * (u * 2.0 - 1.0) * half_w + up * (1.0 - v * 2.0) * half_h;
            vertices.push(CloudVertex {
                position: (cloud.position + offset).to_array(),
                uv: [u, v],
            });
        }
    }
    vertices
}

struct BoatBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Rendering system managing wgpu device, pipelines, and buffers
pub struct RenderSystem {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    render_config: RenderConfig,

    sky_pipeline: wgpu::RenderPipeline,
    water_pipeline: wgpu::RenderPipeline,
    boat_pipeline: wgpu::RenderPipeline,
    cloud_pipeline: wgpu::RenderPipeline,

    globals: GlobalUniforms,
    main_globals_buffer: wgpu::Buffer,
    main_globals_bind_group: wgpu::BindGroup,
    reflection_globals_buffer: wgpu::Buffer,
    reflection_globals_bind_group: wgpu::BindGroup,

    ocean_vertex_buffer: wgpu::Buffer,
    ocean_index_buffer: wgpu::Buffer,
    ocean_index_count: u32,

    boat: Option<BoatBuffers>,
    boat_model_buffer: wgpu::Buffer,
    boat_model_bind_group: wgpu::BindGroup,

    clouds: Vec<Cloud>,
    cloud_size: f32,
    cloud_vertex_buffer: wgpu::Buffer,
    cloud_capacity: usize,

    reflection_layout: wgpu::BindGroupLayout,
    reflection_sampler: wgpu::Sampler,
    reflection_bind_group: wgpu::BindGroup,
    reflection_color: wgpu::TextureView,
    reflection_depth: wgpu::TextureView,
    main_depth: wgpu::TextureView,
}

impl RenderSystem {
    /// Create new rendering system
    pub async fn new(
        window: std::sync::Arc<winit::window::Window>,
        ocean_grid: &OceanGrid,
        render_config: RenderConfig,
        water_level: f32,
        cloud_size: f32,
    ) -> Result<Self, RenderError> {
        let size = window.inner_size();

        // Create wgpu instance
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface (window must have 'static lifetime via Arc)
        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::SurfaceCreation(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::AdapterNotFound)?;
        info!("GPU adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| RenderError::DeviceRequest(e.to_string()))?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| RenderError::SurfaceCreation("surface has no formats".into()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Load shaders
        let sky_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sky Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sky.wgsl").into()),
        });
        let water_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Water Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("water.wgsl").into()),
        });
        let boat_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Boat Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("boat.wgsl").into()),
        });
        let cloud_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cloud Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("cloud.wgsl").into()),
        });

        // Shared globals: one buffer per pass so both can be written before submit
        let globals = GlobalUniforms::default();
        let globals_layout = uniform_layout(&device, "Globals Bind Group Layout");
        let main_globals_buffer = uniform_buffer(&device, "Main Globals Buffer", &globals);
        let main_globals_bind_group =
            uniform_bind_group(&device, &globals_layout, &main_globals_buffer, "Main Globals");
        let reflection_globals_buffer =
            uniform_buffer(&device, "Reflection Globals Buffer", &globals);
        let reflection_globals_bind_group = uniform_bind_group(
            &device,
            &globals_layout,
            &reflection_globals_buffer,
            "Reflection Globals",
        );

        // Boat model matrix
        let model_layout = uniform_layout(&device, "Boat Model Bind Group Layout");
        let boat_model_buffer =
            uniform_buffer(&device, "Boat Model Buffer", &Mat4::IDENTITY.to_cols_array_2d());
        let boat_model_bind_group =
            uniform_bind_group(&device, &model_layout, &boat_model_buffer, "Boat Model");

        // Reflection texture sampled by the water
        let reflection_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Reflection Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let reflection_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Reflection Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let (rw, rh) = reflection_extent(&render_config, config.width, config.height);
        let reflection_color = create_color_view(&device, config.format, rw, rh);
        let reflection_depth = create_depth_view(&device, rw, rh);
        let reflection_bind_group = reflection_texture_bind_group(
            &device,
            &reflection_layout,
            &reflection_color,
            &reflection_sampler,
        );
        let main_depth = create_depth_view(&device, config.width, config.height);

        // Pipelines
        let sky_pipeline = create_pipeline(
            &device,
            PipelineDesc {
                label: "Sky Pipeline",
                shader: &sky_shader,
                bind_group_layouts: &[&globals_layout],
                buffers: &[],
                format: config.format,
                blend: None,
                cull_mode: None,
                depth_write: false,
                depth_compare: wgpu::CompareFunction::Always,
            },
        );

        let ocean_attributes = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];
        let water_pipeline = create_pipeline(
            &device,
            PipelineDesc {
                label: "Water Pipeline",
                shader: &water_shader,
                bind_group_layouts: &[&globals_layout, &reflection_layout],
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &ocean_attributes,
                }],
                format: config.format,
                blend: None,
                cull_mode: None,
                depth_write: true,
                depth_compare: wgpu::CompareFunction::Less,
            },
        );

        let boat_attributes =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3];
        let boat_pipeline = create_pipeline(
            &device,
            PipelineDesc {
                label: "Boat Pipeline",
                shader: &boat_shader,
                bind_group_layouts: &[&globals_layout, &model_layout],
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &boat_attributes,
                }],
                format: config.format,
                blend: None,
                cull_mode: Some(wgpu::Face::Back),
                depth_write: true,
                depth_compare: wgpu::CompareFunction::Less,
            },
        );

        let cloud_attributes = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];
        let cloud_pipeline = create_pipeline(
            &device,
            PipelineDesc {
                label: "Cloud Pipeline",
                shader: &cloud_shader,
                bind_group_layouts: &[&globals_layout],
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<CloudVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &cloud_attributes,
                }],
                format: config.format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                cull_mode: None,
                depth_write: false,
                depth_compare: wgpu::CompareFunction::Less,
            },
        );

        // Ocean grid (static; displacement happens in the vertex shader)
        let ocean_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Ocean Vertex Buffer"),
            contents: bytemuck::cast_slice(&ocean_grid.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ocean_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Ocean Index Buffer"),
            contents: bytemuck::cast_slice(&ocean_grid.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let cloud_capacity = 0;
        let cloud_vertex_buffer = cloud_buffer(&device, cloud_capacity);

        info!(
            "Renderer ready: {}x{} {:?}, reflection target {}x{}",
            config.width, config.height, config.format, rw, rh
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_config,
            sky_pipeline,
            water_pipeline,
            boat_pipeline,
            cloud_pipeline,
            globals,
            main_globals_buffer,
            main_globals_bind_group,
            reflection_globals_buffer,
            reflection_globals_bind_group,
            ocean_vertex_buffer,
            ocean_index_buffer,
            ocean_index_count: ocean_grid.indices.len() as u32,
            boat: None,
            boat_model_buffer,
            boat_model_bind_group,
            clouds: Vec::new(),
            cloud_size,
            cloud_vertex_buffer,
            cloud_capacity,
            reflection_layout,
            reflection_sampler,
            reflection_bind_group,
            reflection_color,
            reflection_depth,
            main_depth,
        })
    }

    /// Current surface size in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigure the surface and recreate the size-dependent textures
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.main_depth = create_depth_view(&self.device, width, height);
        let (rw, rh) = reflection_extent(&self.render_config, width, height);
        self.reflection_color = create_color_view(&self.device, self.config.format, rw, rh);
        self.reflection_depth = create_depth_view(&self.device, rw, rh);
        self.reflection_bind_group = reflection_texture_bind_group(
            &self.device,
            &self.reflection_layout,
            &self.reflection_color,
            &self.reflection_sampler,
        );
        debug!("Resized to {}x{} (reflection {}x{})", width, height, rw, rh);
    }

    /// Render the reflection pass and the main pass for the current frame.
    ///
    /// The reflection hooks bracket the offscreen pass: while it runs the
    /// water is hidden and the clip plane is active.
    pub fn render(
        &mut self,
        reflection: &mut ReflectionPipeline,
        primary: &CameraSnapshot,
    ) -> Result<(), RenderError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Cloud billboards face the primary camera in both passes
        let cloud_vertices = cloud_billboards(&self.clouds, primary, self.cloud_size);
        if cloud_vertices.len() > self.cloud_capacity {
            self.cloud_capacity = cloud_vertices.len();
            self.cloud_vertex_buffer = cloud_buffer(&self.device, self.cloud_capacity);
        }
        if !cloud_vertices.is_empty() {
            self.queue.write_buffer(
                &self.cloud_vertex_buffer,
                0,
                bytemuck::cast_slice(&cloud_vertices),
            );
        }
        let cloud_vertex_count = cloud_vertices.len() as u32;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // Reflection pass
        let mirror = reflection.pre_pass(primary);
        let mirror_view_proj = mirror.view_proj();
        let mut mirrored = self.globals;
        mirrored.view_proj = mirror_view_proj.to_cols_array_2d();
        mirrored.inv_view_proj = mirror_view_proj.inverse().to_cols_array_2d();
        mirrored.camera_position = vec3_4(mirror.position, self.globals.camera_position[3]);
        mirrored.clip_plane = reflection
            .clip_plane()
            .map(|plane| plane.0.to_array())
            .unwrap_or(NO_CLIP);
        self.queue.write_buffer(
            &self.reflection_globals_buffer,
            0,
            bytemuck::cast_slice(&[mirrored]),
        );
        {
            let mut pass = begin_pass(
                &mut encoder,
                "Reflection Pass",
                &self.reflection_color,
                &self.reflection_depth,
            );
            self.draw_scene(
                &mut pass,
                &self.reflection_globals_bind_group,
                reflection.water_visible(),
                cloud_vertex_count,
            );
        }
        reflection.post_pass();

        // Main pass
        self.queue.write_buffer(
            &self.main_globals_buffer,
            0,
            bytemuck::cast_slice(&[self.globals]),
        );
        {
            let mut pass = begin_pass(&mut encoder, "Main Pass", &view, &self.main_depth);
            self.draw_scene(
                &mut pass,
                &self.main_globals_bind_group,
                reflection.water_visible(),
                cloud_vertex_count,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn draw_scene(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        globals: &wgpu::BindGroup,
        draw_water: bool,
        cloud_vertex_count: u32,
    ) {
        // Sky first, behind everything
        pass.set_pipeline(&self.sky_pipeline);
        pass.set_bind_group(0, globals, &[]);
        pass.draw(0..3, 0..1);

        if draw_water {
            pass.set_pipeline(&self.water_pipeline);
            pass.set_bind_group(0, globals, &[]);
            pass.set_bind_group(1, &self.reflection_bind_group, &[]);
            pass.set_vertex_buffer(0, self.ocean_vertex_buffer.slice(..));
            pass.set_index_buffer(self.ocean_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..self.ocean_index_count, 0, 0..1);
        }

        if let Some(boat) = &self.boat {
            pass.set_pipeline(&self.boat_pipeline);
            pass.set_bind_group(0, globals, &[]);
            pass.set_bind_group(1, &self.boat_model_bind_group, &[]);
            pass.set_vertex_buffer(0, boat.vertex_buffer.slice(..));
            pass.set_index_buffer(boat.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..boat.index_count, 0, 0..1);
        }

        // Transparent, drawn last
        if cloud_vertex_count > 0 {
            pass.set_pipeline(&self.cloud_pipeline);
            pass.set_bind_group(0, globals, &[]);
            pass.set_vertex_buffer(0, self.cloud_vertex_buffer.slice(..));
            pass.draw(0..cloud_vertex_count, 0..1);
        }
    }
}

impl SceneSink for RenderSystem {
    fn push_waves(&mut self, waves: &WaveUniforms) {
        self.globals.camera_position[3] = waves.time;
        self.globals.wave = [
            waves.wave_amplitude,
            waves.wave_frequency,
            waves.color_blend_intensity,
            self.globals.wave[3],
        ];
    }

    fn push_lighting(&mut self, lighting: &LightingUniforms) {
        let g = &mut self.globals;
        g.sun_direction = vec3_4(lighting.sun_direction, lighting.daylight);
        g.water_color = vec3_4(lighting.water_color, 1.0);
        g.secondary_water_color = vec3_4(lighting.secondary_water_color, 1.0);
        g.fog_infos = lighting.fog_infos.to_array();
        g.fog_color = vec3_4(lighting.fog_color, 1.0);
        g.sun_emissive = vec3_4(lighting.sun_material.emissive, 1.0);
        g.hemi = vec3_4(lighting.hemispheric.diffuse, lighting.hemispheric.intensity);
        g.sky = [
            lighting.sky.inclination,
            lighting.sky.turbidity,
            lighting.sky.luminance,
            0.0,
        ];
    }

    fn push_clouds(&mut self, clouds: &[Cloud]) {
        self.clouds.clear();
        self.clouds.extend_from_slice(clouds);
    }

    fn upload_boat(&mut self, model: &BoatModel) {
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Boat Vertex Buffer"),
                contents: bytemuck::cast_slice(&model.mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Boat Index Buffer"),
                contents: bytemuck::cast_slice(&model.mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        self.boat = Some(BoatBuffers {
            vertex_buffer,
            index_buffer,
            index_count: model.mesh.indices.len() as u32,
        });
    }

    fn push_boat(&mut self, transform: Mat4) {
        self.queue.write_buffer(
            &self.boat_model_buffer,
            0,
            bytemuck::cast_slice(&[transform.to_cols_array_2d()]),
        );
    }

    fn push_camera(&mut self, camera: &CameraUniforms) {
        let g = &mut self.globals;
        g.view_proj = camera.view_proj.to_cols_array_2d();
        g.inv_view_proj = camera.view_proj.inverse().to_cols_array_2d();
        g.reflection_matrix = camera.reflection_matrix.to_cols_array_2d();
        g.camera_position = vec3_4(camera.camera_position, g.camera_position[3]);
        g.ocean_anchor = vec3_4(camera.ocean_anchor, 0.0);
        g.clip_plane = NO_CLIP;
    }
}

struct PipelineDesc<'a> {
    label: &'a str,
    shader: &'a wgpu::ShaderModule,
    bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    cull_mode: Option<wgpu::Face>,
    depth_write: bool,
    depth_compare: wgpu::CompareFunction,
}

fn create_pipeline(device: &wgpu::Device, desc: PipelineDesc<'_>) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(desc.label),
        bind_group_layouts: desc.bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: desc.shader,
            entry_point: Some("vs_main"),
            buffers: desc.buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.format,
                blend: desc.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: desc.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: desc.depth_write,
            depth_compare: desc.depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn uniform_buffer<T: Pod>(device: &wgpu::Device, label: &str, contents: &T) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(contents),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

fn uniform_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

fn cloud_buffer(device: &wgpu::Device, vertices: usize) -> wgpu::Buffer {
    let size = (vertices.max(6) * std::mem::size_of::<CloudVertex>()) as wgpu::BufferAddress;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Cloud Vertex Buffer"),
        size,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Reflection target keeps the window aspect, longest side = configured resolution
fn reflection_extent(config: &RenderConfig, width: u32, height: u32) -> (u32, u32) {
    let longest = width.max(height).max(1) as f32;
    let scale = config.reflection_resolution as f32 / longest;
    (
        ((width as f32 * scale).round() as u32).max(1),
        ((height as f32 * scale).round() as u32).max(1),
    )
}

fn create_color_view(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("Reflection Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

fn reflection_texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    color: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Reflection Texture Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(color),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn begin_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    color: &wgpu::TextureView,
    depth: &wgpu::TextureView,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: color,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> CameraSnapshot {
        CameraSnapshot {
            position: Vec3::new(0.0, 10.0, 50.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_rad: 1.0,
            aspect: 1.5,
            near: 0.5,
            far: 1000.0,
        }
    }

    #[test]
    fn test_global_uniforms_layout_is_16_byte_aligned() {
        // 3 matrices + 12 vec4s
        assert_eq!(std::mem::size_of::<GlobalUniforms>(), 3 * 64 + 12 * 16);
        assert_eq!(std::mem::size_of::<GlobalUniforms>() % 16, 0);
    }

    #[test]
    fn test_default_globals_disable_clipping() {
        let globals = GlobalUniforms::default();
        assert_eq!(globals.clip_plane, NO_CLIP);
        assert_eq!(globals.view_proj, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn test_cloud_billboards_two_triangles_per_cloud() {
        let clouds = vec![
            Cloud {
                position: Vec3::new(0.0, 150.0, 0.0),
                drift_velocity: Vec3::X,
            },
            Cloud {
                position: Vec3::new(100.0, 180.0, -40.0),
                drift_velocity: Vec3::X,
            },
        ];
        let vertices = cloud_billboards(&clouds, &camera(), 40.0);
        assert_eq!(vertices.len(), 12);
    }

    #[test]
    fn test_cloud_billboards_centered_on_cloud() {
        let center = Vec3::new(20.0, 150.0, -10.0);
        let clouds = [Cloud {
            position: center,
            drift_velocity: Vec3::ZERO,
        }];
        let vertices = cloud_billboards(&clouds, &camera(), 40.0);
        // Opposite corners of the first triangle straddle the center
        let a = Vec3::from_array(vertices[0].position);
        let c = Vec3::from_array(vertices[2].position);
        assert!(((a + c) * 0.5 - center).length() < 1e-3);
        assert!(((a - c).length() - (40.0f32.powi(2) + 20.0f32.powi(2)).sqrt()).abs() < 1e-2);
    }

    #[test]
    fn test_reflection_extent_keeps_aspect() {
        let config = RenderConfig::default();
        let (w, h) = reflection_extent(&config, 1280, 720);
        assert_eq!(w, config.reflection_resolution);
        assert_eq!(h, (720.0 * config.reflection_resolution as f32 / 1280.0).round() as u32);
        assert_eq!(reflection_extent(&config, 0, 0), (1, 1));
    }
}
