//! Static descriptions consumed by the LED visualizer.
//!
//! [`Model`] is the JSON geometry of a device (LED positions plus the
//! triangles of its enclosure). [`Settings`] is the optional TOML file that
//! tunes the window, camera and exposure behaviour.

mod model;
mod settings;

pub use model::{Bounds, Model, ModelError, Triangle};
pub use settings::{
    AntialiasSetting, CameraSettings, ConfigError, DemoSettings, ExposureSettings, RenderSettings,
    Settings, ShaderSettings, WindowSettings,
};
