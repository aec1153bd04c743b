use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One enclosure triangle: three `[x, y, z]` vertices.
pub type Triangle = [[f32; 3]; 3];

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse model: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid model: {0}")]
    Invalid(String),
    #[error("LED color array does not fit current model: expected {expected} bytes, got {actual}")]
    ColorMismatch { expected: usize, actual: usize },
}

/// Geometry of a simulated LED device.
///
/// The JSON layout uses the hyphenated keys `led-strip` and `led-enclosure`:
///
/// ```json
/// {
///   "led-strip": [[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]],
///   "led-enclosure": [[[-1, -1, -1], [1, -1, -1], [1, 1, -1]]]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Model {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "led-strip")]
    pub led_strip: Vec<[f32; 3]>,
    #[serde(rename = "led-enclosure", default)]
    pub led_enclosure: Vec<Triangle>,
}

/// Axis-aligned box around every LED and enclosure vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Bounds {
    pub fn center(&self) -> [f32; 3] {
        std::array::from_fn(|axis| (self.min[axis] + self.max[axis]) * 0.5)
    }

    pub fn extent(&self) -> [f32; 3] {
        std::array::from_fn(|axis| self.max[axis] - self.min[axis])
    }
}

impl Model {
    pub fn from_json_str(input: &str) -> Result<Self, ModelError> {
        let model: Model = serde_json::from_str(input)?;
        model.validate()?;
        Ok(model)
    }

    /// Reads a model file, naming the model after the file stem when the
    /// JSON does not carry a name of its own.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut model = Self::from_json_str(&raw)?;
        if model.name.is_none() {
            model.name = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_owned);
        }
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.led_strip.is_empty() {
            return Err(ModelError::Invalid(
                "led-strip must contain at least one LED".into(),
            ));
        }

        for (index, position) in self.led_strip.iter().enumerate() {
            if position.iter().any(|value| !value.is_finite()) {
                return Err(ModelError::Invalid(format!(
                    "led-strip entry {index} has a non-finite coordinate"
                )));
            }
        }

        for (index, triangle) in self.led_enclosure.iter().enumerate() {
            if triangle.iter().flatten().any(|value| !value.is_finite()) {
                return Err(ModelError::Invalid(format!(
                    "led-enclosure triangle {index} has a non-finite coordinate"
                )));
            }
        }

        Ok(())
    }

    pub fn led_count(&self) -> usize {
        self.led_strip.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.led_enclosure.len()
    }

    /// Display name, falling back to a generic label for anonymous models.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }

    /// Fails unless `len_bytes` holds exactly one RGB triplet per LED.
    pub fn check_colors(&self, len_bytes: usize) -> Result<(), ModelError> {
        let expected = self.led_count() * 3;
        if len_bytes != expected {
            return Err(ModelError::ColorMismatch {
                expected,
                actual: len_bytes,
            });
        }
        Ok(())
    }

    pub fn bounds(&self) -> Bounds {
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        let points = self
            .led_strip
            .iter()
            .chain(self.led_enclosure.iter().flatten());
        for point in points {
            for axis in 0..3 {
                min[axis] = min[axis].min(point[axis]);
                max[axis] = max[axis].max(point[axis]);
            }
        }
        Bounds { min, max }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
{
    "led-strip": [[0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [0.0, 0.5, -0.5]],
    "led-enclosure": [
        [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0]],
        [[-1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]]
    ]
}
"#;

    #[test]
    fn parses_hyphenated_keys() {
        let model = Model::from_json_str(SAMPLE).expect("parse model");
        assert_eq!(model.led_count(), 3);
        assert_eq!(model.triangle_count(), 2);
        assert_eq!(model.led_strip[1], [0.5, 0.0, 0.0]);
        assert_eq!(model.name, None);
        assert_eq!(model.display_name(), "unnamed");
    }

    #[test]
    fn enclosure_is_optional() {
        let model = Model::from_json_str(r#"{"led-strip": [[1, 2, 3]]}"#).expect("parse");
        assert_eq!(model.triangle_count(), 0);
        assert_eq!(model.led_strip[0], [1.0, 2.0, 3.0]);
    }

    #[test]
    fn rejects_empty_strip() {
        let err = Model::from_json_str(r#"{"led-strip": [], "led-enclosure": []}"#).unwrap_err();
        assert!(matches!(err, ModelError::Invalid(_)));
        assert!(err.to_string().contains("at least one LED"));
    }

    #[test]
    fn rejects_missing_strip() {
        let err = Model::from_json_str(r#"{"led-enclosure": []}"#).unwrap_err();
        assert!(matches!(err, ModelError::Parse(_)));
    }

    #[test]
    fn rejects_malformed_triangle() {
        let err = Model::from_json_str(
            r#"{"led-strip": [[0, 0, 0]], "led-enclosure": [[[0, 0, 0], [1, 0, 0]]]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::Parse(_)));
    }

    #[test]
    fn color_length_must_match_led_count() {
        let model = Model::from_json_str(SAMPLE).expect("parse model");
        assert!(model.check_colors(9).is_ok());

        let err = model.check_colors(6).unwrap_err();
        match err {
            ModelError::ColorMismatch { expected, actual } => {
                assert_eq!(expected, 9);
                assert_eq!(actual, 6);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bounds_cover_leds_and_enclosure() {
        let model = Model::from_json_str(SAMPLE).expect("parse model");
        let bounds = model.bounds();
        assert_eq!(bounds.min, [-1.0, -1.0, -1.0]);
        assert_eq!(bounds.max, [1.0, 1.0, 1.0]);
        assert_eq!(bounds.center(), [0.0, 0.0, 0.0]);
        assert_eq!(bounds.extent(), [2.0, 2.0, 2.0]);
    }

    #[test]
    fn load_names_model_after_file_stem() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cube.json");
        fs::write(&path, SAMPLE).expect("write model");

        let model = Model::load(&path).expect("load model");
        assert_eq!(model.name.as_deref(), Some("cube"));
    }

    #[test]
    fn load_keeps_embedded_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("strip.json");
        fs::write(&path, r#"{"name": "desk strip", "led-strip": [[0, 0, 0]]}"#)
            .expect("write model");

        let model = Model::load(&path).expect("load model");
        assert_eq!(model.display_name(), "desk strip");
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Model::load(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/model.json"));
    }

    #[test]
    fn shipped_cube_model_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/models/cube.json");
        let model = Model::load(&path).expect("cube model");
        assert_eq!(model.display_name(), "cube");
        assert_eq!(model.led_count(), 27);
        assert_eq!(model.triangle_count(), 12);
        assert_eq!(model.bounds().extent(), [2.0, 2.0, 2.0]);
    }
}
