//! JSON manifest persistence.
//!
//! A missing manifest reads as empty. Writes go to a temporary file in the
//! same directory which is then renamed over the target, so readers never
//! observe a partial manifest.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::domain::{AppError, Manifest, Result};

/// Durable storage for the sync manifest.
#[cfg_attr(test, mockall::automock)]
pub trait ManifestStore {
    /// Load the manifest at `path`.
    ///
    /// # Errors
    /// Returns `ManifestParse` if the file exists but is not a valid manifest.
    fn read(&self, path: &Path) -> Result<Manifest>;

    /// Replace the manifest at `path` with `manifest`.
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be written.
    fn write(&self, manifest: &Manifest, path: &Path) -> Result<()>;
}

/// File-backed manifest store.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonManifestStore;

impl ManifestStore for JsonManifestStore {
    fn read(&self, path: &Path) -> Result<Manifest> {
        read_manifest(path)
    }

    fn write(&self, manifest: &Manifest, path: &Path) -> Result<()> {
        write_manifest(manifest, path)
    }
}

/// Read a manifest, treating a missing file as empty.
///
/// # Errors
/// Returns `ManifestParse` for invalid JSON and `Io` for other read failures.
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No manifest found, using empty manifest");
            return Ok(Manifest::default());
        }
        Err(e) => {
            return Err(AppError::io(
                format!("Failed to read manifest: {}", path.display()),
                e,
            ))
        }
    };

    serde_json::from_str(&content).map_err(|source| AppError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize `manifest` with 2-space indentation and atomically replace `path`.
///
/// # Errors
/// Returns `Io` if the temp file cannot be written or renamed.
pub fn write_manifest(manifest: &Manifest, path: &Path) -> Result<()> {
    let mut content = serde_json::to_string_pretty(manifest).map_err(AppError::json_parse)?;
    content.push('\n');

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(dir)
        .map_err(|e| AppError::io(format!("Failed to create {}", dir.display()), e))?;

    // Same directory keeps the rename on one filesystem.
    let mut temp = NamedTempFile::new_in(dir)
        .map_err(|e| AppError::io("Failed to create temporary manifest", e))?;

    temp.write_all(content.as_bytes())
        .map_err(|e| AppError::io("Failed to write temporary manifest", e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| AppError::io("Failed to flush temporary manifest", e))?;

    temp.persist(path).map_err(|e| {
        AppError::io(
            format!("Failed to replace manifest: {}", path.display()),
            e.error,
        )
    })?;

    tracing::debug!(path = %path.display(), files = manifest.len(), "Manifest written");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn sample() -> Manifest {
        let mut manifest = Manifest::default();
        manifest.record("content/ch1.md", "abc123", None);
        manifest.record(
            "content/ch2.md",
            "def456",
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()),
        );
        manifest
            .extra
            .insert("title".into(), serde_json::json!({ "main": "My Book" }));
        manifest
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.json");

        let manifest = sample();
        write_manifest(&manifest, &path).unwrap();

        assert_eq!(read_manifest(&path).unwrap(), manifest);
    }

    #[test]
    fn test_nested_unknown_keys_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        let original = serde_json::json!({
            "version": "1.0",
            "files": { "a.md": { "gdocId": "x", "lastSync": null, "title": "Ch 1" } },
            "config": {
                "contentDir": "content",
                "distDir": "dist",
                "templatesDir": "templates",
                "bookTitle": "B"
            }
        });
        fs::write(&path, original.to_string()).unwrap();

        let manifest = read_manifest(&path).unwrap();
        write_manifest(&manifest, &path).unwrap();

        let back: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_wrong_value_type_is_schema_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, r#"{ "files": { "a.md": { "gdocId": 7 } } }"#).unwrap();

        let err = read_manifest(&path).unwrap_err();
        assert!(matches!(err, AppError::ManifestParse { .. }));
        assert!(err.to_string().contains("does not match the manifest schema"));
    }

    #[test]
    fn test_date_only_last_sync_is_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(
            &path,
            r#"{ "files": { "a.md": { "gdocId": "x", "lastSync": "2024-05-01" } } }"#,
        )
        .unwrap();

        let manifest = read_manifest(&path).unwrap();
        assert_eq!(
            manifest.entry("a.md").unwrap().last_sync,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let manifest = read_manifest(&dir.path().join("absent.json")).unwrap();
        assert_eq!(manifest.len(), 0);
        assert_eq!(manifest, Manifest::default());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, "{ not json").unwrap();

        let err = read_manifest(&path).unwrap_err();
        assert!(matches!(err, AppError::ManifestParse { .. }));
        assert!(err.to_string().contains("manifest.json"));
    }

    #[test]
    fn test_write_uses_two_space_indent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        write_manifest(&sample(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("{\n  \"version\": \"1.0\""));
        assert!(content.contains("\n    \"content/ch1.md\": {\n      \"gdocId\": \"abc123\""));
    }

    #[test]
    fn test_write_replaces_previous_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        write_manifest(&sample(), &path).unwrap();

        let empty = Manifest::default();
        write_manifest(&empty, &path).unwrap();

        assert_eq!(read_manifest(&path).unwrap(), empty);
        // No temp files left next to the manifest.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state").join("manifest.json");
        write_manifest(&sample(), &path).unwrap();
        assert!(path.exists());
    }
}
