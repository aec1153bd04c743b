use bytemuck::{Pod, Zeroable};

use crate::scene::FrameParams;

/// Mirror of the `SceneParams` block declared in every shader.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
    pub hdr: [f32; 2],
    pub led_count: u32,
    pub marker_size: f32,
}

unsafe impl Zeroable for SceneUniforms {}
unsafe impl Pod for SceneUniforms {}

impl SceneUniforms {
    pub fn new(led_count: u32, marker_size: f32) -> Self {
        Self {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            eye: [0.0, 0.0, 0.0, 1.0],
            hdr: [1.0, 0.0],
            led_count,
            marker_size,
        }
    }

    pub fn apply_frame(&mut self, frame: &FrameParams) {
        self.view_proj = frame.view_proj.to_cols_array_2d();
        self.eye = frame.eye.extend(1.0).to_array();
        self.hdr = frame.hdr;
    }
}

/// One element of the `LedBlock` storage buffer (std430).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct LedInstance {
    pub position: [f32; 4],
    pub color: [f32; 4],
}

/// Interleaves positions and staged colors for upload.
pub(crate) fn led_instances(positions: &[[f32; 4]], colors: &[[f32; 4]]) -> Vec<LedInstance> {
    positions
        .iter()
        .zip(colors)
        .map(|(&position, &color)| LedInstance { position, color })
        .collect()
}

/// Enclosure vertex: position plus the flat normal of its triangle.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct EnclosureVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl EnclosureVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Expands triangles into a flat vertex list. Degenerate triangles get a
/// zero normal, which the fragment shader treats as facing every LED.
pub(crate) fn enclosure_vertices(triangles: &[ledmodel::Triangle]) -> Vec<EnclosureVertex> {
    let mut vertices = Vec::with_capacity(triangles.len() * 3);
    for triangle in triangles {
        let [a, b, c] = triangle.map(glam::Vec3::from);
        let normal = (b - a).cross(c - a).normalize_or_zero().to_array();
        for corner in triangle {
            vertices.push(EnclosureVertex {
                position: *corner,
                normal,
            });
        }
    }
    vertices
}
