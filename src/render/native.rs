use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use bytemuck::{bytes_of, Pod, Zeroable};
use glam::{Mat3, Mat4};
use log::{info, warn};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use crate::app::{FrameContext, LitDraw, MeshKind, TextureSlot};
use crate::assets::TextureImage;
use crate::mesh::{self, MeshData, Vertex};
use crate::particles::ParticleSprite;
use crate::scene::SceneTextures;

use super::shared::{lit_shader_source, sprite_shader_source};

/// Number of light slots in the global uniform.
pub const MAX_LIGHTS: usize = 3;

/// GPU renderer backed by wgpu that draws a [`FrameContext`].
pub struct Renderer {
    // Declared before `window` so the surface is dropped first.
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth: DepthBuffer,
    lit_pipeline: wgpu::RenderPipeline,
    sprite_pipeline: wgpu::RenderPipeline,
    global_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    meshes: HashMap<MeshKind, MeshBuffers>,
    textures: HashMap<TextureSlot, wgpu::BindGroup>,
    window: Arc<Window>,
}

impl Renderer {
    /// Initializes the GPU renderer for the window and uploads the scene textures.
    pub async fn new(window: Arc<Window>, textures: &SceneTextures) -> Result<Self> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(anyhow!("window has zero area"));
        }

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        // SAFETY: the window is kept alive by `Renderer::window`, which is
        // dropped after the surface.
        let surface = unsafe { instance.create_surface(window.as_ref()) }
            .context("failed to create window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to acquire GPU adapter")?;
        info!("using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("renderer-device"),
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no supported formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps
                .present_modes
                .iter()
                .copied()
                .find(|mode| *mode == wgpu::PresentMode::Mailbox)
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth = DepthBuffer::create(&device, config.width, config.height);

        let global_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("global-bind-layout"),
            entries: &[uniform_entry::<GlobalUniform>(0)],
        });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object-bind-layout"),
            entries: &[uniform_entry::<ObjectConstants>(0)],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture-bind-layout"),
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

        let global_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("global-uniform"),
            size: std::mem::size_of::<GlobalUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let global_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("global-bind-group"),
            layout: &global_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: global_buffer.as_entire_binding(),
            }],
        });

        let lit_pipeline = create_lit_pipeline(
            &device,
            surface_format,
            &[&global_layout, &object_layout, &texture_layout],
        );
        let sprite_pipeline = create_sprite_pipeline(&device, surface_format, &global_layout);

        let meshes = HashMap::from([
            (
                MeshKind::BackWall,
                MeshBuffers::from_mesh(&device, &mesh::back_wall(), "back-wall"),
            ),
            (
                MeshKind::Floor,
                MeshBuffers::from_mesh(&device, &mesh::floor(), "floor"),
            ),
            (
                MeshKind::Cube,
                MeshBuffers::from_mesh(&device, &mesh::unit_cube(), "slime-cube"),
            ),
        ]);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("surface-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let textures = [TextureSlot::Wall, TextureSlot::Slime]
            .into_iter()
            .map(|slot| {
                let view = upload_texture(&device, &queue, textures.get(slot), slot);
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("texture-bind-group"),
                    layout: &texture_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                    ],
                });
                (slot, bind_group)
            })
            .collect();

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth,
            lit_pipeline,
            sprite_pipeline,
            global_buffer,
            global_bind_group,
            object_layout,
            meshes,
            textures,
            window,
        })
    }

    /// Returns the identifier of the window owned by the renderer.
    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    /// Exposes the inner window for event handling.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Resizes the swap chain to match the new dimensions.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthBuffer::create(&self.device, new_size.width, new_size.height);
    }

    /// Draws the lit geometry, then the additive particle batch.
    pub fn render(&mut self, frame: &FrameContext) -> Result<(), wgpu::SurfaceError> {
        self.queue
            .write_buffer(&self.global_buffer, 0, bytes_of(&GlobalUniform::from_frame(frame)));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("renderer-encoder"),
            });

        // Per-draw resources must outlive the render pass.
        let object_bind_groups: Vec<wgpu::BindGroup> = frame
            .draws
            .iter()
            .map(|draw| self.object_bind_group(draw))
            .collect();
        let sprite_buffer = (!frame.sprites.is_empty()).then(|| {
            let instances: Vec<SpriteInstance> =
                frame.sprites.iter().map(SpriteInstance::from).collect();
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("sprite-instances"),
                    contents: bytemuck::cast_slice(&instances),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.03,
                            a: 1.0,
                        }),
                        store: true,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: true,
                    }),
                    stencil_ops: None,
                }),
            });

            pass.set_pipeline(&self.lit_pipeline);
            pass.set_bind_group(0, &self.global_bind_group, &[]);
            for (draw, bind_group) in frame.draws.iter().zip(&object_bind_groups) {
                let (Some(mesh), Some(texture)) =
                    (self.meshes.get(&draw.mesh), self.textures.get(&draw.texture))
                else {
                    continue;
                };
                pass.set_bind_group(1, bind_group, &[]);
                pass.set_bind_group(2, texture, &[]);
                pass.set_vertex_buffer(0, mesh.vertex.slice(..));
                pass.set_index_buffer(mesh.index.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }

            if let Some(buffer) = sprite_buffer.as_ref() {
                pass.set_pipeline(&self.sprite_pipeline);
                pass.set_bind_group(0, &self.global_bind_group, &[]);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(0..6, 0..frame.sprites.len() as u32);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn object_bind_group(&self, draw: &LitDraw) -> wgpu::BindGroup {
        let constants = ObjectConstants::from_draw(draw);
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("object-uniform"),
                contents: bytes_of(&constants),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object-bind-group"),
            layout: &self.object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }
}

fn uniform_entry<T>(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
        },
        count: None,
    }
}

fn create_lit_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("lit-shader"),
        source: wgpu::ShaderSource::Wgsl(lit_shader_source().into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("lit-pipeline-layout"),
        bind_group_layouts: layouts,
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("lit-pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &VERTEX_ATTRIBUTES,
            }],
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthBuffer::FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        multiview: None,
    })
}

/// Additive, depth-tested but not depth-writing billboards.
fn create_sprite_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    global_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("sprite-shader"),
        source: wgpu::ShaderSource::Wgsl(sprite_shader_source().into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("sprite-pipeline-layout"),
        bind_group_layouts: &[global_layout],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("sprite-pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_sprite",
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<SpriteInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &SPRITE_ATTRIBUTES,
            }],
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthBuffer::FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_sprite",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(ADDITIVE_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        multiview: None,
    })
}

const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

const SPRITE_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4];

const WHITE_PIXEL: [u8; 4] = [255; 4];

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: Option<&TextureImage>,
    slot: TextureSlot,
) -> wgpu::TextureView {
    let (width, height, pixels) = match image {
        Some(image) => (image.width, image.height, image.rgba.as_slice()),
        None => {
            warn!("texture {slot:?} missing, using plain white");
            (1, 1, &WHITE_PIXEL[..])
        }
    };
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("surface-texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn from_mesh(device: &wgpu::Device, mesh: &MeshData, label: &str) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            index_count: mesh.indices.len() as u32,
        }
    }
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
struct LightUniform {
    position: [f32; 4],
    params: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
}

impl LightUniform {
    /// Slot without a light; zero strength and a non-zero half distance so it adds nothing.
    const UNUSED: Self = Self {
        position: [0.0; 4],
        params: [1.0, 0.0, 0.0, 0.0],
        diffuse: [0.0; 4],
        specular: [0.0; 4],
    };
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
struct GlobalUniform {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    camera_right: [f32; 4],
    camera_up: [f32; 4],
    lights: [LightUniform; MAX_LIGHTS],
    material_diffuse: [f32; 4],
    material_specular: [f32; 4],
}

impl GlobalUniform {
    fn from_frame(frame: &FrameContext) -> Self {
        let mut lights = [LightUniform::UNUSED; MAX_LIGHTS];
        if frame.lights.len() > MAX_LIGHTS {
            warn!(
                "{} lights requested, only {MAX_LIGHTS} are shaded",
                frame.lights.len()
            );
        }
        for (slot, light) in lights.iter_mut().zip(&frame.lights) {
            *slot = LightUniform {
                position: light.position.extend(light.strength).into(),
                params: [light.half_distance, light.ambient, 0.0, 0.0],
                diffuse: light.diffuse.extend(0.0).into(),
                specular: light.specular.extend(0.0).into(),
            };
        }
        let camera = &frame.camera;
        let material = &frame.material;
        Self {
            view_proj: camera.view_proj.to_cols_array_2d(),
            eye: camera.position.extend(1.0).into(),
            camera_right: camera.right.extend(0.0).into(),
            camera_up: camera.up.extend(0.0).into(),
            lights,
            material_diffuse: material.diffuse.extend(1.0).into(),
            material_specular: material.specular.extend(material.shininess).into(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
struct ObjectConstants {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 3],
    params: [f32; 4],
}

impl ObjectConstants {
    fn from_draw(draw: &LitDraw) -> Self {
        Self {
            model: draw.model.to_cols_array_2d(),
            normal: normal_matrix(draw.model),
            params: [draw.texture_scale, draw.opacity, 0.0, 0.0],
        }
    }
}

/// Inverse transpose of the model's upper 3x3, columns padded to vec4.
fn normal_matrix(model: Mat4) -> [[f32; 4]; 3] {
    let normal = Mat3::from_mat4(model).inverse().transpose();
    [
        normal.x_axis.extend(0.0).into(),
        normal.y_axis.extend(0.0).into(),
        normal.z_axis.extend(0.0).into(),
    ]
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
struct SpriteInstance {
    center_radius: [f32; 4],
    color: [f32; 4],
}

impl From<&ParticleSprite> for SpriteInstance {
    fn from(sprite: &ParticleSprite) -> Self {
        Self {
            center_radius: sprite.center.extend(sprite.radius).into(),
            color: [sprite.brightness, sprite.brightness, sprite.brightness, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::{scene_lights, Material};
    use glam::Vec3;

    #[test]
    fn global_uniform_matches_wgsl_layout() {
        // 4x4 matrix, 3 vec4s, 3 lights of 4 vec4s, 2 vec4s
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 64 + 48 + 3 * 64 + 32);
        assert_eq!(std::mem::size_of::<ObjectConstants>(), 64 + 48 + 16);
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 32);
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }

    #[test]
    fn global_uniform_packs_lights_and_material() {
        let mut frame = FrameContext::new();
        frame.lights.extend(scene_lights(Vec3::new(0.5, 0.5, 0.0)));
        frame.material = Material::scene();
        let uniform = GlobalUniform::from_frame(&frame);
        assert_eq!(uniform.lights[0].position, [3.5, 2.0, 0.5, 10.0]);
        assert_eq!(uniform.lights[2].params, [1.0, 0.2, 0.0, 0.0]);
        assert_eq!(uniform.lights[1].diffuse, [0.5, 0.5, 0.0, 0.0]);
        assert_eq!(uniform.material_specular, [0.5, 0.5, 0.5, 100.0]);
    }

    #[test]
    fn missing_lights_fill_unused_slots() {
        let frame = FrameContext::new();
        let uniform = GlobalUniform::from_frame(&frame);
        assert!(uniform.lights.iter().all(|light| *light == LightUniform::UNUSED));
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let model = Mat4::from_scale(Vec3::new(1.5, 2.0, 1.5));
        let normal = normal_matrix(model);
        assert!((normal[0][0] - 1.0 / 1.5).abs() < 1e-6);
        assert!((normal[1][1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn sprites_become_gray_instances() {
        let sprite = ParticleSprite {
            center: Vec3::new(1.0, 2.0, 3.0),
            radius: 0.1,
            brightness: 0.3,
        };
        let instance = SpriteInstance::from(&sprite);
        assert_eq!(instance.center_radius, [1.0, 2.0, 3.0, 0.1]);
        assert_eq!(instance.color, [0.3, 0.3, 0.3, 1.0]);
    }
}
