use anyhow::{Context, Result};
use wgpu::naga::ShaderStage;

use crate::compile::{compile_stage, ShaderSources};

use super::uniforms::EnclosureVertex;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Pipeline parameters fixed for the lifetime of the window.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PipelineTargets {
    pub surface_format: wgpu::TextureFormat,
    pub sample_count: u32,
    pub cull_back_faces: bool,
}

pub(crate) struct ScenePipelines {
    pub scene_layout: wgpu::BindGroupLayout,
    pub enclosure: wgpu::RenderPipeline,
    pub marker: wgpu::RenderPipeline,
}

impl ScenePipelines {
    pub fn new(
        device: &wgpu::Device,
        sources: &ShaderSources,
        targets: PipelineTargets,
    ) -> Result<Self> {
        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene pipeline layout"),
            bind_group_layouts: &[&scene_layout],
            push_constant_ranges: &[],
        });

        let enclosure_vertex = compile_stage(
            device,
            "enclosure vertex",
            &sources.enclosure_vertex,
            ShaderStage::Vertex,
        )?;
        let enclosure_fragment = compile_stage(
            device,
            "enclosure fragment",
            &sources.enclosure_fragment,
            ShaderStage::Fragment,
        )?;
        let marker_vertex = compile_stage(
            device,
            "marker vertex",
            &sources.marker_vertex,
            ShaderStage::Vertex,
        )?;
        let marker_fragment = compile_stage(
            device,
            "marker fragment",
            &sources.marker_fragment,
            ShaderStage::Fragment,
        )?;

        let cull_mode = targets.cull_back_faces.then_some(wgpu::Face::Back);
        let enclosure = build_pipeline(
            device,
            "enclosure pipeline",
            &pipeline_layout,
            &enclosure_vertex,
            &enclosure_fragment,
            &[EnclosureVertex::layout()],
            cull_mode,
            wgpu::CompareFunction::LessEqual,
            targets,
        )
        .context("failed to build enclosure pipeline")?;
        let marker = build_pipeline(
            device,
            "marker pipeline",
            &pipeline_layout,
            &marker_vertex,
            &marker_fragment,
            &[],
            None,
            // Markers sit inside the enclosure and are drawn on top of it.
            wgpu::CompareFunction::Always,
            targets,
        )
        .context("failed to build marker pipeline")?;

        Ok(Self {
            scene_layout,
            enclosure,
            marker,
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn build_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    vertex_module: &wgpu::ShaderModule,
    fragment_module: &wgpu::ShaderModule,
    buffers: &[wgpu::VertexBufferLayout<'_>],
    cull_mode: Option<wgpu::Face>,
    depth_compare: wgpu::CompareFunction,
    targets: PipelineTargets,
) -> Result<wgpu::RenderPipeline> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: vertex_module,
            entry_point: Some("main"),
            buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: targets.sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: fragment_module,
            entry_point: Some("main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: targets.surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        anyhow::bail!("{label}: {err}");
    }
    Ok(pipeline)
}
