//! GPU side of the visualizer.
//!
//! - `context` owns wgpu instance/device/surface wiring and reconfigures the
//!   swapchain when the window resizes.
//! - `pipeline` compiles the GLSL sources into the enclosure and marker
//!   pipelines sharing one bind group layout.
//! - `uniforms` mirrors the `SceneParams` block and the `LedBlock` storage
//!   buffer, and expands enclosure triangles into vertices.
//! - `state` glues everything together and exposes the `GpuState` API used by
//!   `window`.

mod context;
mod pipeline;
mod state;
mod uniforms;

pub(crate) use state::GpuState;
