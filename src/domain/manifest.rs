//! Sync manifest model.
//!
//! The manifest maps local Markdown files to remote document identifiers
//! and the time they were last pushed or pulled.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Manifest format version written by this tool.
pub const MANIFEST_VERSION: &str = "1.0";

/// Sync record for a single local file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Remote document identifier.
    pub gdoc_id: String,
    /// Completion time of the last successful push or pull.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub last_sync: Option<DateTime<Utc>>,
    /// Per-file keys written by other tools, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ManifestEntry {
    /// Create an entry that is linked but has never been synced.
    #[must_use]
    pub fn linked(remote_id: impl Into<String>) -> Self {
        Self {
            gdoc_id: remote_id.into(),
            last_sync: None,
            extra: BTreeMap::new(),
        }
    }

}

/// Project directory layout recorded in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLayout {
    #[serde(default = "default_content_dir")]
    pub content_dir: String,
    #[serde(default = "default_dist_dir")]
    pub dist_dir: String,
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            dist_dir: default_dist_dir(),
            templates_dir: default_templates_dir(),
            extra: BTreeMap::new(),
        }
    }
}

fn default_content_dir() -> String {
    "content".into()
}

fn default_dist_dir() -> String {
    "dist".into()
}

fn default_templates_dir() -> String {
    "templates".into()
}

fn default_version() -> String {
    MANIFEST_VERSION.into()
}

/// Parse a `lastSync` value.
///
/// Accepts RFC 3339, a zoneless `YYYY-MM-DDTHH:MM:SS` (taken as UTC) and a
/// bare `YYYY-MM-DD` (midnight UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(raw) if !raw.trim().is_empty() => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid lastSync timestamp {raw:?}"))),
        _ => Ok(None),
    }
}

/// The persisted manifest document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default = "default_version")]
    pub version: String,

    /// Entries keyed by local path.
    #[serde(default)]
    pub files: BTreeMap<String, ManifestEntry>,

    #[serde(default)]
    pub config: ProjectLayout,

    /// Top-level keys this version does not know about, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            version: default_version(),
            files: BTreeMap::new(),
            config: ProjectLayout::default(),
            extra: BTreeMap::new(),
        }
    }
}

impl Manifest {
    /// Look up the entry for a local path.
    #[must_use]
    pub fn entry(&self, local_path: &str) -> Option<&ManifestEntry> {
        self.files.get(local_path)
    }

    /// Remote identifier linked to a local path, if any.
    #[must_use]
    pub fn remote_id(&self, local_path: &str) -> Option<&str> {
        self.entry(local_path)
            .map(|e| e.gdoc_id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Point a local path at `remote_id` with the given sync time.
    ///
    /// Unknown keys on an existing entry survive the update.
    pub fn record(
        &mut self,
        local_path: impl Into<String>,
        remote_id: impl Into<String>,
        last_sync: Option<DateTime<Utc>>,
    ) -> &ManifestEntry {
        let entry = self
            .files
            .entry(local_path.into())
            .or_insert_with(|| ManifestEntry::linked(""));
        entry.gdoc_id = remote_id.into();
        entry.last_sync = last_sync;
        entry
    }

    /// Remove the entry for a local path, returning it if present.
    pub fn remove(&mut self, local_path: &str) -> Option<ManifestEntry> {
        self.files.remove(local_path)
    }

    /// Number of linked files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest_shape() {
        let json = serde_json::to_value(Manifest::default()).unwrap();
        assert_eq!(json["version"], "1.0");
        assert!(json["files"].as_object().unwrap().is_empty());
        assert_eq!(json["config"]["contentDir"], "content");
        assert_eq!(json["config"]["distDir"], "dist");
        assert_eq!(json["config"]["templatesDir"], "templates");
    }

    #[test]
    fn test_entry_uses_camel_case_keys() {
        let entry = ManifestEntry::linked("abc123");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["gdocId"], "abc123");
        assert!(json["lastSync"].is_null());
    }

    #[test]
    fn test_parses_existing_manifest_and_keeps_unknown_keys() {
        let raw = r#"{
            "version": "1.0",
            "files": {
                "content/ch1.md": { "gdocId": "abc", "lastSync": "2024-05-01T10:00:00Z" }
            },
            "config": { "contentDir": "chapters", "distDir": "out", "templatesDir": "tpl" },
            "author": "someone"
        }"#;

        let manifest: Manifest = serde_json::from_str(raw).unwrap();
        assert_eq!(manifest.remote_id("content/ch1.md"), Some("abc"));
        assert!(manifest.entry("content/ch1.md").unwrap().last_sync.is_some());
        assert_eq!(manifest.config.content_dir, "chapters");
        assert_eq!(manifest.extra["author"], "someone");

        let back = serde_json::to_value(&manifest).unwrap();
        assert_eq!(back["author"], "someone");
    }

    #[test]
    fn test_empty_remote_id_is_not_linked() {
        let mut manifest = Manifest::default();
        manifest.record("a.md", "", None);
        assert_eq!(manifest.remote_id("a.md"), None);
    }

    #[test]
    fn test_nested_unknown_keys_survive() {
        let raw = r#"{
            "files": { "a.md": { "gdocId": "x", "lastSync": null, "title": "Ch 1" } },
            "config": { "contentDir": "content", "bookTitle": "B" }
        }"#;

        let manifest: Manifest = serde_json::from_str(raw).unwrap();
        assert_eq!(manifest.entry("a.md").unwrap().extra["title"], "Ch 1");
        assert_eq!(manifest.config.extra["bookTitle"], "B");

        let back = serde_json::to_value(&manifest).unwrap();
        assert_eq!(back["files"]["a.md"]["title"], "Ch 1");
        assert_eq!(back["config"]["bookTitle"], "B");
    }

    #[test]
    fn test_record_keeps_entry_extras() {
        let mut manifest: Manifest =
            serde_json::from_str(r#"{ "files": { "a.md": { "gdocId": "old", "title": "Ch 1" } } }"#)
                .unwrap();

        let at = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        manifest.record("a.md", "new", Some(at));

        let entry = manifest.entry("a.md").unwrap();
        assert_eq!(entry.gdoc_id, "new");
        assert_eq!(entry.last_sync, Some(at));
        assert_eq!(entry.extra["title"], "Ch 1");
    }

    #[test]
    fn test_last_sync_accepts_loose_timestamps() {
        let midnight = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-05-01"), Some(midnight));
        assert_eq!(parse_timestamp("2024-05-01T00:00:00"), Some(midnight));
        assert_eq!(parse_timestamp("2024-05-01T02:00:00+02:00"), Some(midnight));
        assert_eq!(parse_timestamp("yesterday"), None);

        let entry: ManifestEntry =
            serde_json::from_str(r#"{ "gdocId": "x", "lastSync": "2024-05-01" }"#).unwrap();
        assert_eq!(entry.last_sync, Some(midnight));

        let blank: ManifestEntry =
            serde_json::from_str(r#"{ "gdocId": "x", "lastSync": "" }"#).unwrap();
        assert_eq!(blank.last_sync, None);
    }

    #[test]
    fn test_record_overwrites() {
        let mut manifest = Manifest::default();
        manifest.record("a.md", "one", None);
        manifest.record("a.md", "two", None);
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.remote_id("a.md"), Some("two"));
    }
}
