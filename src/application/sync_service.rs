//! Sync coordinator.
//!
//! Sequences push, pull, link and status operations over the manifest
//! store, the conversion tool and the remote document service. Dry runs
//! branch off at the top of each operation and only ever read the manifest.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::domain::{
    AppError, FileState, InitReport, LocalState, Manifest, ManifestEntry, PlanStep, PullOptions,
    PushOptions, Result, StatusEntry, SyncOutcome,
};
use crate::infrastructure::{
    convert_forward, convert_reverse, ManifestStore, RemoteDocuments, ToolInvoker,
};

/// Normalize a user-supplied path into a manifest key.
#[must_use]
pub fn manifest_key(local_path: &str) -> String {
    let unified = local_path.replace('\\', "/");
    let mut key = unified.as_str();
    while let Some(rest) = key.strip_prefix("./") {
        key = rest;
    }
    key.to_string()
}

/// Coordinates sync operations for one invocation.
pub struct SyncService<'a> {
    invoker: &'a dyn ToolInvoker,
    store: &'a dyn ManifestStore,
    remote: &'a dyn RemoteDocuments,
}

impl<'a> SyncService<'a> {
    #[must_use]
    pub fn new(
        invoker: &'a dyn ToolInvoker,
        store: &'a dyn ManifestStore,
        remote: &'a dyn RemoteDocuments,
    ) -> Self {
        Self {
            invoker,
            store,
            remote,
        }
    }

    /// Create an empty manifest and the project directories under `project_root`.
    ///
    /// Manifest keys are resolved against the same root, which the CLI sets
    /// to the working directory. An existing manifest is validated and left
    /// untouched.
    ///
    /// # Errors
    /// Returns `ManifestParse` if an existing manifest is corrupt, or `Io`.
    pub fn init(&self, manifest_path: &Path, project_root: &Path) -> Result<InitReport> {
        let manifest_created = !manifest_path.exists();
        let manifest = if manifest_created {
            let manifest = Manifest::default();
            self.store.write(&manifest, manifest_path)?;
            manifest
        } else {
            self.store.read(manifest_path)?
        };

        let mut created_dirs = Vec::new();
        for dir in [
            &manifest.config.content_dir,
            &manifest.config.dist_dir,
            &manifest.config.templates_dir,
        ] {
            let path = project_root.join(dir);
            if !path.exists() {
                fs::create_dir_all(&path).map_err(|e| {
                    AppError::io(format!("Failed to create {}", path.display()), e)
                })?;
                created_dirs.push(path);
            }
        }

        tracing::info!(
            manifest = %manifest_path.display(),
            created = manifest_created,
            dirs = created_dirs.len(),
            "Project initialized"
        );

        Ok(InitReport {
            manifest_path: manifest_path.to_path_buf(),
            manifest_created,
            created_dirs,
        })
    }

    /// Associate a local file with a remote document, replacing any previous link.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for an empty remote ID, or a store error.
    pub fn link(
        &self,
        manifest_path: &Path,
        local_path: &str,
        remote_id: &str,
    ) -> Result<ManifestEntry> {
        let remote_id = remote_id.trim();
        if remote_id.is_empty() {
            return Err(AppError::InvalidArgument {
                message: "Remote document ID must not be empty".into(),
            });
        }

        let key = manifest_key(local_path);
        let mut manifest = self.store.read(manifest_path)?;

        let entry = manifest.record(key.clone(), remote_id, None).clone();
        self.store.write(&manifest, manifest_path)?;

        tracing::info!(path = %key, %remote_id, "Linked");
        Ok(entry)
    }

    /// Remove the link for a local file.
    ///
    /// # Errors
    /// Returns `NotLinked` if there is no entry for the file.
    pub fn unlink(&self, manifest_path: &Path, local_path: &str) -> Result<ManifestEntry> {
        let key = manifest_key(local_path);
        let mut manifest = self.store.read(manifest_path)?;

        let entry = manifest
            .remove(&key)
            .ok_or_else(|| AppError::NotLinked { path: key.clone() })?;
        self.store.write(&manifest, manifest_path)?;

        tracing::info!(path = %key, remote_id = %entry.gdoc_id, "Unlinked");
        Ok(entry)
    }

    /// Push a local Markdown file to its remote document, creating one if needed.
    ///
    /// # Errors
    /// Returns `Io` if the source is missing, `Conversion` if the tool fails,
    /// or a remote/store error. The manifest is only written after every
    /// other step has succeeded.
    pub fn push(
        &self,
        manifest_path: &Path,
        local_path: &str,
        options: &PushOptions,
    ) -> Result<SyncOutcome> {
        let key = manifest_key(local_path);

        if options.dry_run {
            let manifest = self.store.read(manifest_path)?;
            return Ok(SyncOutcome::Planned(push_plan(&manifest, &key, options)));
        }

        let source = Path::new(local_path);
        if !source.is_file() {
            return Err(AppError::Io {
                message: format!("Source file not found: {local_path}"),
                source: None,
            });
        }

        // A corrupt manifest stops the push before any external work.
        let mut manifest = self.store.read(manifest_path)?;

        let workdir = tempfile::tempdir()
            .map_err(|e| AppError::io("Failed to create working directory", e))?;
        let docx = workdir.path().join("upload.docx");

        convert_forward(self.invoker, source, &docx, options.reference_doc.as_deref())?;

        let content = fs::read(&docx)
            .map_err(|e| AppError::io("Failed to read converted document", e))?;

        self.remote.authenticate()?;

        let existing = manifest.remote_id(&key).map(str::to_string);
        let (remote_id, created) = if let Some(remote_id) = existing {
            self.remote.update_document(&remote_id, &content)?;
            (remote_id, false)
        } else {
            let title = document_title(source);
            let remote_id =
                self.remote
                    .create_document(&title, &content, options.folder_id.as_deref())?;
            (remote_id, true)
        };

        if let Some(format) = &options.format {
            self.remote.apply_formatting(&remote_id, format)?;
        }

        let synced_at = Utc::now();
        manifest.record(key.clone(), remote_id.clone(), Some(synced_at));
        self.store.write(&manifest, manifest_path)?;

        tracing::info!(path = %key, %remote_id, created, "Pushed");

        Ok(SyncOutcome::Pushed {
            remote_id,
            created,
            synced_at,
        })
    }

    /// Pull a linked remote document back into the local Markdown file.
    ///
    /// # Errors
    /// Returns `NotLinked` (in both modes) before any other work if the file
    /// has no remote association, otherwise remote, conversion or store errors.
    pub fn pull(
        &self,
        manifest_path: &Path,
        local_path: &str,
        options: PullOptions,
    ) -> Result<SyncOutcome> {
        let key = manifest_key(local_path);
        let mut manifest = self.store.read(manifest_path)?;

        let remote_id = manifest
            .remote_id(&key)
            .map(str::to_string)
            .ok_or_else(|| AppError::NotLinked { path: key.clone() })?;

        if options.dry_run {
            return Ok(SyncOutcome::Planned(vec![
                PlanStep::Authenticate,
                PlanStep::ExportDocument { remote_id },
                PlanStep::ConvertToMarkdown,
                PlanStep::SaveTo {
                    path: local_path.to_string(),
                },
            ]));
        }

        self.remote.authenticate()?;
        let content = self.remote.export_document(&remote_id)?;

        let workdir = tempfile::tempdir()
            .map_err(|e| AppError::io("Failed to create working directory", e))?;
        let docx = workdir.path().join("download.docx");
        let markdown = workdir.path().join("download.md");

        fs::write(&docx, &content)
            .map_err(|e| AppError::io("Failed to write exported document", e))?;

        convert_reverse(self.invoker, &docx, &markdown)?;

        // Only touch the local file once conversion has succeeded.
        let destination = Path::new(local_path);
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::io(format!("Failed to create {}", parent.display()), e)
            })?;
        }
        fs::copy(&markdown, destination)
            .map_err(|e| AppError::io(format!("Failed to write {local_path}"), e))?;

        let synced_at = Utc::now();
        manifest.record(key.clone(), remote_id.clone(), Some(synced_at));
        self.store.write(&manifest, manifest_path)?;

        tracing::info!(path = %key, %remote_id, "Pulled");

        Ok(SyncOutcome::Pulled {
            remote_id,
            synced_at,
        })
    }

    /// Report every linked file. Read-only.
    ///
    /// # Errors
    /// Returns `ManifestParse` if the manifest is corrupt.
    pub fn status(&self, manifest_path: &Path) -> Result<Vec<StatusEntry>> {
        let manifest = self.store.read(manifest_path)?;

        Ok(manifest
            .files
            .iter()
            .map(|(path, entry)| StatusEntry {
                local_path: path.clone(),
                remote_id: entry.gdoc_id.clone(),
                last_sync: entry.last_sync,
                state: FileState::of(Some(entry)),
                local: local_state(Path::new(path), entry.last_sync),
            })
            .collect())
    }
}

fn push_plan(manifest: &Manifest, key: &str, options: &PushOptions) -> Vec<PlanStep> {
    let mut steps = vec![
        PlanStep::ReadSource {
            path: key.to_string(),
        },
        PlanStep::ConvertToDocx,
    ];

    if let Some(reference) = &options.reference_doc {
        steps.push(PlanStep::ApplyReferenceDoc {
            path: reference.clone(),
        });
    }

    steps.push(PlanStep::Authenticate);

    steps.push(match manifest.remote_id(key) {
        Some(remote_id) => PlanStep::UpdateDocument {
            remote_id: remote_id.to_string(),
        },
        None => PlanStep::CreateDocument {
            folder_id: options.folder_id.clone(),
        },
    });

    if options.format.is_some() {
        steps.push(PlanStep::ApplyFormatting);
    }

    steps
}

fn document_title(source: &Path) -> String {
    source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled")
        .to_string()
}

fn local_state(path: &Path, last_sync: Option<DateTime<Utc>>) -> LocalState {
    let Ok(modified) = fs::metadata(path).and_then(|m| m.modified()) else {
        return LocalState::Missing;
    };

    match last_sync {
        Some(synced) if DateTime::<Utc>::from(modified) <= synced => LocalState::Clean,
        _ => LocalState::Modified,
    }
}
