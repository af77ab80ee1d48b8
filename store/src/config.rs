//! Tool configuration: where the game server lives and which match
//! documents to read and write.
//!
//! # Example YAML
//!
//! ```yaml
//! paths:
//!   srcds: /srv/csgo
//!   input: csgo/addons/sourcemod/configs/get5/base.json
//!   output: csgo/addons/sourcemod/configs/get5/match.json
//! ```
//!
//! Relative `input` and `output` paths are taken relative to `srcds` when
//! it is set. YAML is a superset of JSON, so a JSON file with the same
//! shape is accepted too.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::file::{load, resolve_path, save};

/// Filesystem locations used by the tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paths {
    /// Root of the dedicated server installation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srcds: Option<PathBuf>,
    /// Base match document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
    /// Where the prepared match document is written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// Top-level tool configuration.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use get5_config_store::{Paths, ToolConfig};
///
/// let config = ToolConfig {
///     paths: Paths {
///         srcds: Some("/srv/csgo".into()),
///         input: Some("base.json".into()),
///         output: Some("/tmp/match.json".into()),
///     },
/// };
/// assert_eq!(config.input_path(), Some(PathBuf::from("/srv/csgo/base.json")));
/// assert_eq!(config.output_path().as_deref(), Some(Path::new("/tmp/match.json")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Filesystem locations.
    #[serde(default)]
    pub paths: Paths,
}

impl ToolConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Any error from [`load`](crate::load), or [`StoreError::Config`] if
    /// parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = resolve_path(path)?;
        let bytes = load(&path)?;
        let config: Self = if bytes.iter().all(u8::is_ascii_whitespace) {
            Self::default()
        } else {
            serde_yaml::from_slice(&bytes).map_err(|source| StoreError::Config {
                path: path.clone(),
                source,
            })?
        };
        debug!(path = %path.display(), ?config, "loaded tool configuration");
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Any error from [`save`](crate::save), or [`StoreError::Config`] if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = resolve_path(path)?;
        let text = serde_yaml::to_string(self).map_err(|source| StoreError::Config {
            path: path.clone(),
            source,
        })?;
        save(&path, text.as_bytes())
    }

    /// The configured base document, resolved against the server root.
    pub fn input_path(&self) -> Option<PathBuf> {
        self.paths.input.as_deref().map(|path| self.under_srcds(path))
    }

    /// The configured output document, resolved against the server root.
    pub fn output_path(&self) -> Option<PathBuf> {
        self.paths.output.as_deref().map(|path| self.under_srcds(path))
    }

    fn under_srcds(&self, path: &Path) -> PathBuf {
        match &self.paths.srcds {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("get5-config.yml");
        let config = ToolConfig {
            paths: Paths {
                srcds: Some("/srv/csgo".into()),
                input: Some("base.json".into()),
                output: None,
            },
        };

        config.save(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("srcds"));
        assert!(!text.contains("output"));
        assert_eq!(ToolConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_json_config_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"paths": {"output": "match.json"}}"#).unwrap();

        let config = ToolConfig::load(&path).unwrap();
        assert_eq!(config.output_path(), Some(PathBuf::from("match.json")));
        assert_eq!(config.input_path(), None);
    }

    #[test]
    fn test_empty_config_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.yml");
        std::fs::write(&path, "\n").unwrap();
        assert_eq!(ToolConfig::load(&path).unwrap(), ToolConfig::default());
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yml");
        std::fs::write(&path, "paths: [1, 2").unwrap();

        let err = ToolConfig::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Config { .. }));
        assert!(err.to_string().contains("bad.yml"));
    }

    #[test]
    fn test_absolute_paths_ignore_srcds() {
        let config = ToolConfig {
            paths: Paths {
                srcds: Some("/srv/csgo".into()),
                input: None,
                output: Some("/var/match.json".into()),
            },
        };
        assert_eq!(config.output_path(), Some(PathBuf::from("/var/match.json")));
    }
}
