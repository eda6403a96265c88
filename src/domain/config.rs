//! Application configuration model.
//!
//! Loaded from `docsync.toml`; every field has a default so a project
//! works without a config file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::formatting::FormatOptions;

/// Project-local config file name.
pub const CONFIG_FILE_NAME: &str = "docsync.toml";

/// Conversion tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PandocConfig {
    /// Binary name or path of the conversion tool.
    #[serde(default = "default_binary")]
    pub binary: String,
}

impl Default for PandocConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
        }
    }
}

fn default_binary() -> String {
    "pandoc".into()
}

/// Path configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    /// Manifest file location.
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// Directory backing the local document store.
    #[serde(default = "default_remote_dir")]
    pub remote_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            remote_dir: default_remote_dir(),
        }
    }
}

fn default_manifest() -> PathBuf {
    PathBuf::from(".docsync-manifest.json")
}

fn default_remote_dir() -> PathBuf {
    PathBuf::from(".docsync/remote")
}

/// Defaults for `push`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushConfig {
    /// Reference document used when `--refdoc` is not given.
    #[serde(default)]
    pub reference_doc: Option<PathBuf>,

    /// Folder used when `--folder-id` is not given.
    #[serde(default)]
    pub folder_id: Option<String>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub pandoc: PandocConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub push: PushConfig,

    /// Formatting applied by `push --format`.
    #[serde(default)]
    pub format: FormatOptions,
}

impl AppConfig {
    /// User-wide config file, e.g. `~/.config/docsync/config.toml`.
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("docsync").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.pandoc.binary, "pandoc");
        assert_eq!(
            config.paths.manifest,
            PathBuf::from(".docsync-manifest.json")
        );
        assert!(config.push.reference_doc.is_none());
        assert!((config.format.margin_pt - 72.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig = toml::from_str("[pandoc]\nbinary = \"/opt/pandoc\"\n").unwrap();
        assert_eq!(config.pandoc.binary, "/opt/pandoc");
        assert_eq!(config.paths.remote_dir, PathBuf::from(".docsync/remote"));
    }
}
