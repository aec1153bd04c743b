use std::borrow::Cow;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use wgpu::naga::ShaderStage;

pub(crate) const ENCLOSURE_VERTEX: &str = "enclosure.vert";
pub(crate) const ENCLOSURE_FRAGMENT: &str = "enclosure.frag";
pub(crate) const MARKER_VERTEX: &str = "marker.vert";
pub(crate) const MARKER_FRAGMENT: &str = "marker.frag";

/// GLSL sources for both pipelines, read once at startup.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub directory: PathBuf,
    pub enclosure_vertex: String,
    pub enclosure_fragment: String,
    pub marker_vertex: String,
    pub marker_fragment: String,
}

impl ShaderSources {
    /// Reads all four shader files from `dir`; any missing file aborts
    /// start-up with its path in the error.
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            directory: dir.to_path_buf(),
            enclosure_vertex: read_source(dir, ENCLOSURE_VERTEX)?,
            enclosure_fragment: read_source(dir, ENCLOSURE_FRAGMENT)?,
            marker_vertex: read_source(dir, MARKER_VERTEX)?,
            marker_fragment: read_source(dir, MARKER_FRAGMENT)?,
        })
    }
}

fn read_source(dir: &Path, name: &str) -> Result<String> {
    let path = dir.join(name);
    std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read shader at {}", path.display()))
}

/// Compiles one GLSL stage into a shader module.
///
/// Errors raised by naga surface through wgpu's validation scope, so the
/// caller wraps creation in an error scope.
pub(crate) fn compile_stage(
    device: &wgpu::Device,
    label: &str,
    source: &str,
    stage: ShaderStage,
) -> Result<wgpu::ShaderModule> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source.to_owned()),
            stage,
            defines: &[],
        },
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        anyhow::bail!("failed to compile shader {label}: {err}");
    }
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::naga::front::glsl::{Frontend, Options};

    fn shipped_shader_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../shaders")
    }

    fn parse(source: &str, stage: ShaderStage) {
        let mut frontend = Frontend::default();
        if let Err(err) = frontend.parse(&Options::from(stage), source) {
            panic!("GLSL front-end rejected {stage:?} shader: {err:?}");
        }
    }

    #[test]
    fn shipped_shaders_load() {
        let sources = ShaderSources::load(&shipped_shader_dir()).expect("shader sources");
        assert!(sources.enclosure_vertex.starts_with("#version 450"));
        assert!(sources.marker_fragment.contains("main"));
    }

    #[test]
    fn shipped_shaders_parse() {
        let sources = ShaderSources::load(&shipped_shader_dir()).expect("shader sources");
        parse(&sources.enclosure_vertex, ShaderStage::Vertex);
        parse(&sources.enclosure_fragment, ShaderStage::Fragment);
        parse(&sources.marker_vertex, ShaderStage::Vertex);
        parse(&sources.marker_fragment, ShaderStage::Fragment);
    }

    #[test]
    fn missing_shader_names_the_path() {
        let dir = std::env::temp_dir().join("visualizer-missing-shaders");
        let err = ShaderSources::load(&dir).expect_err("missing shaders must fail");
        let message = format!("{err:#}");
        assert!(message.contains(ENCLOSURE_VERTEX), "{message}");
    }
}
