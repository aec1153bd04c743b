use anyhow::{Context, Result};
use ledmodel::Model;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::compile::ShaderSources;
use crate::scene::FrameParams;
use crate::types::VisualizerConfig;

use super::context::GpuContext;
use super::pipeline::{PipelineTargets, ScenePipelines, DEPTH_FORMAT};
use super::uniforms::{enclosure_vertices, led_instances, LedInstance, SceneUniforms};

/// Octahedron drawn per LED in debug mode.
const MARKER_VERTICES: u32 = 24;

struct RenderTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl RenderTarget {
    fn new(
        device: &wgpu::Device,
        label: &str,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
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

/// GPU side of the visualizer: surface, pipelines and scene buffers.
pub(crate) struct GpuState {
    context: GpuContext,
    pipelines: ScenePipelines,
    uniform_buffer: wgpu::Buffer,
    led_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    enclosure_buffer: wgpu::Buffer,
    enclosure_vertex_count: u32,
    led_count: u32,
    uniforms: SceneUniforms,
    depth_target: RenderTarget,
    multisample_target: Option<RenderTarget>,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        model: &Model,
        led_positions: &[[f32; 4]],
        config: &VisualizerConfig,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let sources = ShaderSources::load(&config.shader_dir)?;
        let context = GpuContext::new(target, initial_size, config.antialiasing, config.vsync)?;
        let pipelines = ScenePipelines::new(
            &context.device,
            &sources,
            PipelineTargets {
                surface_format: context.surface_format,
                sample_count: context.sample_count,
                cull_back_faces: config.cull_back_faces,
            },
        )
        .with_context(|| {
            format!(
                "failed to build render pipelines from {}",
                sources.directory.display()
            )
        })?;

        let led_count =
            u32::try_from(model.led_count()).context("LED count exceeds GPU index range")?;
        let uniforms = SceneUniforms::new(led_count, config.marker_size);
        let uniform_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("scene uniforms"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let dark = vec![[0.0, 0.0, 0.0, 1.0]; led_positions.len()];
        let instances = led_instances(led_positions, &dark);
        let led_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("led instances"),
                contents: bytemuck::cast_slice(&instances),
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            });

        let scene_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("scene bind group"),
                layout: &pipelines.scene_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: led_buffer.as_entire_binding(),
                    },
                ],
            });

        let vertices = enclosure_vertices(&model.led_enclosure);
        let enclosure_vertex_count =
            u32::try_from(vertices.len()).context("enclosure has too many triangles")?;
        let enclosure_buffer = context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("enclosure vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let (depth_target, multisample_target) = Self::create_targets(&context);

        Ok(Self {
            context,
            pipelines,
            uniform_buffer,
            led_buffer,
            scene_bind_group,
            enclosure_buffer,
            enclosure_vertex_count,
            led_count,
            uniforms,
            depth_target,
            multisample_target,
        })
    }

    fn create_targets(context: &GpuContext) -> (RenderTarget, Option<RenderTarget>) {
        let depth = RenderTarget::new(
            &context.device,
            "depth target",
            DEPTH_FORMAT,
            context.size,
            context.sample_count,
        );
        let multisample = (context.sample_count > 1).then(|| {
            RenderTarget::new(
                &context.device,
                "msaa color target",
                context.surface_format,
                context.size,
                context.sample_count,
            )
        });
        (depth, multisample)
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn aspect(&self) -> f32 {
        self.context.aspect()
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        let (depth, multisample) = Self::create_targets(&self.context);
        self.depth_target = depth;
        self.multisample_target = multisample;
    }

    /// Re-applies the current surface configuration after a lost/outdated
    /// swapchain.
    pub(crate) fn reconfigure(&mut self) {
        self.context.reconfigure();
    }

    /// Uploads the staged LED colors next to their fixed positions.
    pub(crate) fn upload_leds(&self, positions: &[[f32; 4]], colors: &[[f32; 4]]) {
        let instances: Vec<LedInstance> = led_instances(positions, colors);
        self.context
            .queue
            .write_buffer(&self.led_buffer, 0, bytemuck::cast_slice(&instances));
    }

    pub(crate) fn render(&mut self, frame: &FrameParams) -> Result<(), wgpu::SurfaceError> {
        let output = self.context.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.uniforms.apply_frame(frame);
        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("scene encoder"),
                });

        let [r, g, b] = frame.clear_color.map(f64::from);
        let (attachment_view, resolve_target) = match self.multisample_target.as_ref() {
            Some(msaa) => (&msaa.view, Some(&view)),
            None => (&view, None),
        };
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a: 1.0 }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_target.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_bind_group(0, &self.scene_bind_group, &[]);

            if self.enclosure_vertex_count > 0 {
                render_pass.set_pipeline(&self.pipelines.enclosure);
                render_pass.set_vertex_buffer(0, self.enclosure_buffer.slice(..));
                render_pass.draw(0..self.enclosure_vertex_count, 0..1);
            }

            if frame.show_markers {
                render_pass.set_pipeline(&self.pipelines.marker);
                render_pass.draw(0..MARKER_VERTICES, 0..self.led_count);
            }
        }

        self.context.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}
