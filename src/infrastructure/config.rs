//! Configuration file management.
//!
//! Handles locating, loading and creating `docsync.toml` files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result, CONFIG_FILE_NAME};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# docsync configuration
# Auto-generated - edit as needed

[pandoc]
# Conversion tool binary name or path
binary = "pandoc"

[paths]
# Sync manifest, relative to the working directory
manifest = ".docsync-manifest.json"

# Directory backing the local document store
remote_dir = ".docsync/remote"

[push]
# Style reference document for Markdown -> DOCX (optional)
# reference_doc = "templates/reference.docx"

# Folder for newly created documents (optional)
# folder_id = "your-folder-id"

[format]
# Applied by `docsync push --format`
margin_pt = 72.0
line_spacing = 115.0
# header = "Working draft"
"#;

/// Load configuration.
///
/// An explicit path must exist. Otherwise `./docsync.toml` is tried, then
/// the user config directory, then built-in defaults.
///
/// # Errors
/// Returns error if a config file exists but cannot be read or parsed.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config_from_file(path);
    }

    let candidates = std::iter::once(PathBuf::from(CONFIG_FILE_NAME))
        .chain(AppConfig::user_config_path());

    for path in candidates {
        if path.exists() {
            tracing::debug!(path = %path.display(), "Loading configuration");
            return load_config_from_file(&path);
        }
    }

    Ok(AppConfig::default())
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file {}: {e}", path.display()),
    })
}

/// Write the default configuration into `dir` unless one already exists.
///
/// Returns the path if a file was created.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists(dir: &Path) -> Result<Option<PathBuf>> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        return Ok(None);
    }

    fs::create_dir_all(dir).map_err(|e| AppError::io("Failed to create config directory", e))?;
    fs::write(&config_path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %config_path.display(), "Created default configuration");

    Ok(Some(config_path))
}
