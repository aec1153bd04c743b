use std::f32::consts::FRAC_PI_4;
use std::path::PathBuf;

/// Anti-aliasing policy for the render pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Orbit and zoom behaviour of the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTuning {
    /// Initial azimuth in radians.
    pub horizontal_angle: f32,
    /// Initial polar angle from +Z in radians.
    pub vertical_angle: f32,
    /// Eye distance at zoom factor zero.
    pub start_distance: f32,
    /// Fraction of the remaining zoom distance covered each frame.
    pub animation_speed: f32,
    /// Radians per pixel of mouse drag.
    pub drag_speed: f32,
    /// Zoom factor change per wheel line.
    pub scroll_speed: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            horizontal_angle: FRAC_PI_4,
            vertical_angle: FRAC_PI_4,
            start_distance: 6.0,
            animation_speed: 0.1,
            drag_speed: 0.01,
            scroll_speed: 0.5,
        }
    }
}

/// Immutable configuration passed to the visualizer at start-up.
#[derive(Debug, Clone)]
pub struct VisualizerConfig {
    /// Window size in physical pixels.
    pub window_size: (u32, u32),
    pub window_title: String,
    /// Frame rate cap; `None` renders on every wakeup.
    pub target_fps: Option<f32>,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Background color before exposure is applied.
    pub clear_color: [f32; 3],
    pub antialiasing: Antialiasing,
    pub vsync: bool,
    pub cull_back_faces: bool,
    /// Half-size of the debug LED markers in model units.
    pub marker_size: f32,
    pub camera: CameraTuning,
    /// Exposure convergence per second.
    pub exposure_rate: f32,
    /// Directory holding `enclosure.vert`, `enclosure.frag`, `marker.vert`
    /// and `marker.frag`.
    pub shader_dir: PathBuf,
    /// Start with LED markers and frame stats enabled.
    pub debug: bool,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            window_size: (800, 600),
            window_title: "LED Visualizer".into(),
            target_fps: Some(60.0),
            fov: 45.0,
            near: 0.01,
            far: 1000.0,
            clear_color: [0.5, 0.5, 0.5],
            antialiasing: Antialiasing::default(),
            vsync: true,
            cull_back_faces: true,
            marker_size: 0.04,
            camera: CameraTuning::default(),
            exposure_rate: 1.0,
            shader_dir: PathBuf::from("shaders"),
            debug: false,
        }
    }
}
