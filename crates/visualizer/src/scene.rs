//! Per-frame integration that does not touch the GPU.
//!
//! ```text
//!   LedColors ──sync_colors()──▶ led_colors (staging) ──▶ Exposure goal
//!                                                     │
//!   input ──▶ OrbitCamera ──advance()──▶ FrameParams ◀─┘
//! ```

use std::time::Instant;

use glam::{Mat4, Vec3};
use ledmodel::Model;

use crate::camera::OrbitCamera;
use crate::colors::LedColors;
use crate::exposure::Exposure;
use crate::runtime::FrameClock;
use crate::types::VisualizerConfig;

/// Everything the GPU needs to draw one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    pub view_proj: Mat4,
    pub eye: Vec3,
    pub hdr: [f32; 2],
    pub clear_color: [f32; 3],
    pub show_markers: bool,
}

pub struct SceneState {
    camera: OrbitCamera,
    exposure: Exposure,
    clock: FrameClock,
    led_positions: Vec<[f32; 4]>,
    led_colors: Vec<[f32; 4]>,
    /// Set when `led_colors` changed and still has to reach the GPU.
    colors_pending: bool,
    clear_color: [f32; 3],
    debug: bool,
}

impl SceneState {
    pub fn new(model: &Model, config: &VisualizerConfig) -> Self {
        let led_positions = model
            .led_strip
            .iter()
            .map(|&[x, y, z]| [x, y, z, 1.0])
            .collect();
        Self {
            camera: OrbitCamera::new(config.camera, config.fov, config.near, config.far),
            exposure: Exposure::new(config.exposure_rate),
            clock: FrameClock::new(),
            led_positions,
            led_colors: vec![[0.0, 0.0, 0.0, 1.0]; model.led_count()],
            colors_pending: true,
            clear_color: config.clear_color,
            debug: config.debug,
        }
    }

    /// Samples the shared buffer when a refresh is queued and retargets
    /// exposure on the mean LED intensity. Returns whether it sampled.
    pub fn sync_colors(&mut self, colors: &LedColors) -> bool {
        if !colors.take_refresh() {
            return false;
        }
        let mean_intensity = colors.sample_into(&mut self.led_colors);
        self.exposure.set_brightness(mean_intensity);
        self.colors_pending = true;
        true
    }

    /// Whether the staged colors changed since the last upload; clears the
    /// mark.
    pub fn take_pending_upload(&mut self) -> bool {
        std::mem::take(&mut self.colors_pending)
    }

    pub fn advance(&mut self, now: Instant, aspect: f32) -> FrameParams {
        let dt = self.clock.tick(now);
        self.exposure.advance(dt);
        self.camera.advance();

        FrameParams {
            view_proj: self.camera.view_projection(aspect),
            eye: self.camera.eye(),
            hdr: self.exposure.uniform(),
            clear_color: self.exposure.clear_color(self.clear_color),
            show_markers: self.debug,
        }
    }

    pub fn led_positions(&self) -> &[[f32; 4]] {
        &self.led_positions
    }

    pub fn led_colors(&self) -> &[[f32; 4]] {
        &self.led_colors
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn exposure(&self) -> &Exposure {
        &self.exposure
    }

    pub fn frames(&self) -> u64 {
        self.clock.frames()
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn toggle_debug(&mut self) -> bool {
        self.debug = !self.debug;
        self.debug
    }
}
