use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories_next::ProjectDirs;

pub const ENV_CONFIG_DIR: &str = "LEDVIS_CONFIG_DIR";
pub const CONFIG_FILE: &str = "config.toml";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "LedVisualizer";
const APPLICATION: &str = "ledvis";

/// Where the settings for this run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` or `$LEDVIS_CONFIG`; the file must exist.
    Explicit(PathBuf),
    /// `<config dir>/config.toml`, found on disk.
    Discovered(PathBuf),
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(path) | Self::Discovered(path) => Some(path),
            Self::Defaults => None,
        }
    }
}

pub fn resolve_config(explicit: Option<&Path>) -> Result<ConfigSource> {
    if let Some(path) = explicit {
        return Ok(ConfigSource::Explicit(path.to_path_buf()));
    }
    let config_dir = config_dir()?;
    Ok(discover_in(&config_dir))
}

/// `$LEDVIS_CONFIG_DIR`, else the platform config directory for ledvis.
pub fn config_dir() -> Result<PathBuf> {
    if let Some(value) = env::var_os(ENV_CONFIG_DIR) {
        if !value.is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    let project_dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
        .ok_or_else(|| anyhow!("failed to determine user directories"))?;
    Ok(project_dirs.config_dir().to_path_buf())
}

fn discover_in(config_dir: &Path) -> ConfigSource {
    let candidate = config_dir.join(CONFIG_FILE);
    if candidate.is_file() {
        ConfigSource::Discovered(candidate)
    } else {
        ConfigSource::Defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn explicit_path_wins() {
        let source = resolve_config(Some(Path::new("custom.toml"))).expect("resolve");
        assert_eq!(source, ConfigSource::Explicit(PathBuf::from("custom.toml")));
        assert_eq!(source.path(), Some(Path::new("custom.toml")));
    }

    #[test]
    fn discovers_config_file_in_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(discover_in(dir.path()), ConfigSource::Defaults);

        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[render]\nfps = 30\n").expect("write config");
        assert_eq!(discover_in(dir.path()), ConfigSource::Discovered(path));
    }

    #[test]
    fn defaults_have_no_path() {
        assert_eq!(ConfigSource::Defaults.path(), None);
    }
}
