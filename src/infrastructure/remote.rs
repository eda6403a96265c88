//! Remote document service adapters.
//!
//! The sync coordinator only talks to [`RemoteDocuments`]. The bundled
//! backend keeps documents in a local directory so push and pull work
//! without network access.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{build_formatting_requests, AppError, FormatOptions, Result};

/// Capabilities the sync coordinator needs from a document service.
pub trait RemoteDocuments {
    /// Establish credentials for subsequent calls.
    ///
    /// # Errors
    /// Returns `Remote` if the service cannot be reached or rejects the caller.
    fn authenticate(&self) -> Result<()>;

    /// Create a document from DOCX bytes and return its identifier.
    ///
    /// # Errors
    /// Returns `Remote` or `Io` on failure.
    fn create_document(&self, title: &str, content: &[u8], folder_id: Option<&str>)
        -> Result<String>;

    /// Replace the content of an existing document.
    ///
    /// # Errors
    /// Returns `Remote` if the document does not exist.
    fn update_document(&self, remote_id: &str, content: &[u8]) -> Result<()>;

    /// Export a document as DOCX bytes.
    ///
    /// # Errors
    /// Returns `Remote` if the document does not exist.
    fn export_document(&self, remote_id: &str) -> Result<Vec<u8>>;

    /// Apply page formatting to a document.
    ///
    /// # Errors
    /// Returns `Remote` if the document does not exist.
    fn apply_formatting(&self, remote_id: &str, options: &FormatOptions) -> Result<()>;
}

/// Sidecar metadata kept next to each stored document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentMeta {
    title: String,
    folder_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Directory-backed document store.
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_path(&self, remote_id: &str) -> PathBuf {
        self.root.join(format!("{remote_id}.docx"))
    }

    fn meta_path(&self, remote_id: &str) -> PathBuf {
        self.root.join(format!("{remote_id}.meta.json"))
    }

    fn requests_path(&self, remote_id: &str) -> PathBuf {
        self.root.join(format!("{remote_id}.requests.json"))
    }

    fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            AppError::io(
                format!("Failed to create document store {}", self.root.display()),
                e,
            )
        })
    }

    /// Reject identifiers that would escape the store directory.
    fn validate_id(remote_id: &str) -> Result<()> {
        let valid = !remote_id.is_empty()
            && remote_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if valid {
            Ok(())
        } else {
            Err(AppError::remote(format!("Invalid document id: {remote_id:?}")))
        }
    }

    fn read_document(&self, remote_id: &str) -> Result<Vec<u8>> {
        Self::validate_id(remote_id)?;
        let path = self.document_path(remote_id);

        fs::read(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                AppError::remote(format!("Document {remote_id} not found"))
            } else {
                AppError::io(format!("Failed to read {}", path.display()), e)
            }
        })
    }

    fn read_meta(&self, remote_id: &str) -> Result<Option<DocumentMeta>> {
        let path = self.meta_path(remote_id);
        match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(AppError::json_parse),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::io(format!("Failed to read {}", path.display()), e)),
        }
    }

    fn write_meta(&self, remote_id: &str, meta: &DocumentMeta) -> Result<()> {
        let path = self.meta_path(remote_id);
        let raw = serde_json::to_string_pretty(meta).map_err(AppError::json_parse)?;
        fs::write(&path, raw)
            .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))
    }

    fn write_document(&self, remote_id: &str, content: &[u8]) -> Result<()> {
        let path = self.document_path(remote_id);
        fs::write(&path, content)
            .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))
    }
}

impl RemoteDocuments for LocalDocumentStore {
    fn authenticate(&self) -> Result<()> {
        self.ensure_root()?;
        tracing::debug!(root = %self.root.display(), "Using local document store");
        Ok(())
    }

    fn create_document(
        &self,
        title: &str,
        content: &[u8],
        folder_id: Option<&str>,
    ) -> Result<String> {
        self.ensure_root()?;

        let remote_id = Uuid::new_v4().simple().to_string();
        let now = Utc::now();

        self.write_document(&remote_id, content)?;
        self.write_meta(
            &remote_id,
            &DocumentMeta {
                title: title.to_string(),
                folder_id: folder_id.map(String::from),
                created_at: now,
                updated_at: now,
            },
        )?;

        tracing::info!(%remote_id, title, folder = ?folder_id, "Created document");
        Ok(remote_id)
    }

    fn update_document(&self, remote_id: &str, content: &[u8]) -> Result<()> {
        Self::validate_id(remote_id)?;
        if !self.document_path(remote_id).exists() {
            return Err(AppError::remote(format!("Document {remote_id} not found")));
        }

        self.write_document(remote_id, content)?;

        if let Some(mut meta) = self.read_meta(remote_id)? {
            meta.updated_at = Utc::now();
            self.write_meta(remote_id, &meta)?;
        }

        tracing::info!(%remote_id, bytes = content.len(), "Updated document");
        Ok(())
    }

    fn export_document(&self, remote_id: &str) -> Result<Vec<u8>> {
        let content = self.read_document(remote_id)?;
        tracing::info!(%remote_id, bytes = content.len(), "Exported document");
        Ok(content)
    }

    fn apply_formatting(&self, remote_id: &str, options: &FormatOptions) -> Result<()> {
        let content = self.read_document(remote_id)?;

        // Byte length stands in for the body length the real service reports.
        let body_end = u64::try_from(content.len()).unwrap_or(u64::MAX).saturating_add(1);
        let requests = build_formatting_requests(options, body_end);

        let path = self.requests_path(remote_id);
        let raw = serde_json::to_string_pretty(&serde_json::json!({ "requests": requests }))
            .map_err(AppError::json_parse)?;
        fs::write(&path, raw)
            .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))?;

        tracing::info!(%remote_id, requests = requests.len(), "Applied formatting");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory backend for coordinator tests.

    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::{AppError, FormatOptions, RemoteDocuments, Result};

    #[derive(Debug, Default)]
    pub struct InMemoryRemote {
        pub documents: RefCell<HashMap<String, Vec<u8>>>,
        pub calls: RefCell<Vec<String>>,
        next_id: RefCell<u32>,
    }

    impl InMemoryRemote {
        pub fn with_document(remote_id: &str, content: &[u8]) -> Self {
            let remote = Self::default();
            remote
                .documents
                .borrow_mut()
                .insert(remote_id.to_string(), content.to_vec());
            remote
        }

        fn record(&self, call: String) {
            self.calls.borrow_mut().push(call);
        }
    }

    impl RemoteDocuments for InMemoryRemote {
        fn authenticate(&self) -> Result<()> {
            self.record("authenticate".into());
            Ok(())
        }

        fn create_document(
            &self,
            title: &str,
            content: &[u8],
            folder_id: Option<&str>,
        ) -> Result<String> {
            let mut next = self.next_id.borrow_mut();
            *next += 1;
            let remote_id = format!("doc{next}");
            self.documents
                .borrow_mut()
                .insert(remote_id.clone(), content.to_vec());
            self.record(format!("create {title} {folder_id:?}"));
            Ok(remote_id)
        }

        fn update_document(&self, remote_id: &str, content: &[u8]) -> Result<()> {
            let mut docs = self.documents.borrow_mut();
            let doc = docs
                .get_mut(remote_id)
                .ok_or_else(|| AppError::remote(format!("Document {remote_id} not found")))?;
            *doc = content.to_vec();
            self.record(format!("update {remote_id}"));
            Ok(())
        }

        fn export_document(&self, remote_id: &str) -> Result<Vec<u8>> {
            self.record(format!("export {remote_id}"));
            self.documents
                .borrow()
                .get(remote_id)
                .cloned()
                .ok_or_else(|| AppError::remote(format!("Document {remote_id} not found")))
        }

        fn apply_formatting(&self, remote_id: &str, _options: &FormatOptions) -> Result<()> {
            self.record(format!("format {remote_id}"));
            Ok(())
        }
    }
}
