use std::f32::consts::{FRAC_PI_4, PI};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Visualizer tuning loaded from TOML. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub render: RenderSettings,
    pub camera: CameraSettings,
    pub exposure: ExposureSettings,
    pub shaders: ShaderSettings,
    pub demo: DemoSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "LED Visualizer".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderSettings {
    pub fps: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub clear_color: [f32; 3],
    #[serde(deserialize_with = "deserialize_antialias")]
    pub antialias: AntialiasSetting,
    pub vsync: bool,
    pub cull_back_faces: bool,
    pub marker_size: f32,
    pub debug: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            fps: 60.0,
            fov: 45.0,
            near: 0.01,
            far: 1000.0,
            clear_color: [0.5, 0.5, 0.5],
            antialias: AntialiasSetting::Auto,
            vsync: true,
            cull_back_faces: true,
            marker_size: 0.04,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CameraSettings {
    pub horizontal_angle: f32,
    pub vertical_angle: f32,
    pub start_distance: f32,
    /// Fraction of the remaining zoom distance covered each frame.
    pub animation_speed: f32,
    pub drag_speed: f32,
    pub scroll_speed: f32,
}

impl Default for CameraSettings {
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

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExposureSettings {
    /// Exposure convergence per second.
    pub change_rate: f32,
}

impl Default for ExposureSettings {
    fn default() -> Self {
        Self { change_rate: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ShaderSettings {
    pub directory: PathBuf,
}

impl Default for ShaderSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("shaders"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoSettings {
    #[serde(deserialize_with = "deserialize_duration", serialize_with = "serialize_duration")]
    pub interval: Duration,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }

    /// Explicit sample count, `None` for `Auto`.
    pub fn samples(self) -> Option<u32> {
        match self {
            Self::Auto => None,
            Self::Off => Some(1),
            Self::Samples2 => Some(2),
            Self::Samples4 => Some(4),
            Self::Samples8 => Some(8),
            Self::Samples16 => Some(16),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "auto" | "max" | "default" => Ok(Self::Auto),
            "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(Self::Off),
            "2" => Ok(Self::Samples2),
            "4" => Ok(Self::Samples4),
            "8" => Ok(Self::Samples8),
            "16" => Ok(Self::Samples16),
            other => Err(format!("invalid antialias setting '{other}'")),
        }
    }
}

fn deserialize_antialias<'de, D>(deserializer: D) -> Result<AntialiasSetting, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    match Helper::deserialize(deserializer)? {
        Helper::Str(raw) => AntialiasSetting::parse(&raw).map_err(de::Error::custom),
        Helper::Num(value) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            AntialiasSetting::parse(&value.to_string()).map_err(de::Error::custom)
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

impl Settings {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(input)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let window = &self.window;
        if window.width == 0 || window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                window.width, window.height
            )));
        }

        let render = &self.render;
        if !(render.fps.is_finite() && render.fps > 0.0) {
            return Err(ConfigError::Invalid("render.fps must be > 0".into()));
        }
        if !(render.fov > 0.0 && render.fov < 180.0) {
            return Err(ConfigError::Invalid(
                "render.fov must be between 0 and 180 degrees".into(),
            ));
        }
        if !(render.near > 0.0 && render.far > render.near && render.far.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "render clip planes must satisfy 0 < near < far, got near={} far={}",
                render.near, render.far
            )));
        }
        if render
            .clear_color
            .iter()
            .any(|channel| !(0.0..=1.0).contains(channel))
        {
            return Err(ConfigError::Invalid(
                "render.clear_color components must be within [0, 1]".into(),
            ));
        }
        if !(render.marker_size.is_finite() && render.marker_size > 0.0) {
            return Err(ConfigError::Invalid("render.marker_size must be > 0".into()));
        }

        let camera = &self.camera;
        if !(camera.animation_speed > 0.0 && camera.animation_speed <= 1.0) {
            return Err(ConfigError::Invalid(
                "camera.animation_speed must be within (0, 1]".into(),
            ));
        }
        if !(camera.start_distance.is_finite() && camera.start_distance > 0.0) {
            return Err(ConfigError::Invalid(
                "camera.start_distance must be > 0".into(),
            ));
        }
        if !(camera.vertical_angle > 0.0 && camera.vertical_angle < PI) {
            return Err(ConfigError::Invalid(
                "camera.vertical_angle must be within (0, pi)".into(),
            ));
        }
        for (name, value) in [
            ("camera.horizontal_angle", camera.horizontal_angle),
            ("camera.drag_speed", camera.drag_speed),
            ("camera.scroll_speed", camera.scroll_speed),
            ("exposure.change_rate", self.exposure.change_rate),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite")));
            }
        }
        for (name, value) in [
            ("camera.drag_speed", camera.drag_speed),
            ("camera.scroll_speed", camera.scroll_speed),
            ("exposure.change_rate", self.exposure.change_rate),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be >= 0")));
            }
        }

        if self.shaders.directory.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "shaders.directory may not be empty".into(),
            ));
        }

        if self.demo.interval.is_zero() {
            return Err(ConfigError::Invalid(
                "demo.interval must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}
