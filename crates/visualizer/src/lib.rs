//! Real-time preview of an LED cube or strip without the hardware.
//!
//! The caller owns the LED colors and the render thread owns everything
//! graphical:
//!
//! ```text
//!   caller thread                         render thread
//!   ─────────────                         ─────────────
//!   LedColors::set / fill_with ──┐
//!   LedVisualizer::refresh ──────┴─ dirty ─▶ SceneState::sync_colors
//!                                               │ staging colors, exposure goal
//!                                               ▼
//!   LedVisualizer::running ◀── join handle   GpuState::render ─▶ window
//! ```
//!
//! [`LedVisualizer::spawn`] returns only once the window, GPU device and
//! shaders are ready, so a missing shader file or an unusable adapter is an
//! error at start-up rather than a dead window later.

mod camera;
mod colors;
mod compile;
mod exposure;
mod gpu;
mod runtime;
mod scene;
mod types;
mod window;

use anyhow::Result;
use ledmodel::Model;
use tracing::info;

pub use camera::OrbitCamera;
pub use colors::LedColors;
pub use compile::ShaderSources;
pub use exposure::Exposure;
pub use runtime::{FpsCounter, FrameClock, FrameScheduler};
pub use scene::{FrameParams, SceneState};
pub use types::{Antialiasing, CameraTuning, VisualizerConfig};

use window::WindowRuntime;

/// Handle to a running visualizer window.
///
/// Dropping the handle closes the window and joins the render thread.
pub struct LedVisualizer {
    colors: LedColors,
    runtime: WindowRuntime,
}

impl LedVisualizer {
    /// Opens the visualizer for `model`, reading LED colors from `colors`.
    ///
    /// Fails immediately when the color buffer does not hold exactly three
    /// bytes per model LED, and otherwise on any window, GPU or shader error.
    pub fn spawn(model: &Model, colors: LedColors, config: VisualizerConfig) -> Result<Self> {
        model.check_colors(colors.len_bytes())?;

        let bounds = model.bounds();
        info!(
            model = model.display_name(),
            leds = model.led_count(),
            min = ?bounds.min,
            max = ?bounds.max,
            "starting LED visualizer"
        );

        // The initial contents count as the first refresh.
        colors.refresh();
        let runtime = WindowRuntime::spawn(config, model.clone(), colors.clone())?;
        Ok(Self { colors, runtime })
    }

    /// Marks the shared colors dirty; the next rendered frame picks them up.
    pub fn refresh(&self) {
        self.colors.refresh();
    }

    /// Whether the render thread is still alive. Turns false once the window
    /// is closed or Escape is pressed.
    pub fn running(&self) -> bool {
        self.runtime.is_running()
    }

    pub fn colors(&self) -> &LedColors {
        &self.colors
    }

    /// Closes the window and waits for the render thread, returning its
    /// error if it failed.
    pub fn shutdown(mut self) -> Result<()> {
        self.runtime.shutdown()
    }
}
