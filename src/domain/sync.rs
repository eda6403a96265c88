//! Sync-related domain models.
//!
//! Per-file sync state, operation options, dry-run plans and the
//! status rows reported for linked files.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::formatting::FormatOptions;
use super::manifest::ManifestEntry;

/// Sync state of a single file within one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileState {
    /// No manifest entry exists for the file.
    Unlinked,
    /// Entry exists with a remote ID, but no sync has completed.
    Linked,
    /// A push or pull completed and the timestamp was recorded.
    Synced,
}

impl FileState {
    /// Derive the state from an optional manifest entry.
    #[must_use]
    pub fn of(entry: Option<&ManifestEntry>) -> Self {
        match entry {
            None => Self::Unlinked,
            Some(e) if e.gdoc_id.is_empty() => Self::Unlinked,
            Some(e) if e.last_sync.is_none() => Self::Linked,
            Some(_) => Self::Synced,
        }
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlinked => write!(f, "unlinked"),
            Self::Linked => write!(f, "linked"),
            Self::Synced => write!(f, "synced"),
        }
    }
}

/// Condition of the local file relative to its last sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LocalState {
    /// The file does not exist on disk.
    Missing,
    /// Modified after the last sync, or never synced.
    Modified,
    /// Unchanged since the last sync.
    Clean,
}

impl fmt::Display for LocalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::Modified => write!(f, "modified"),
            Self::Clean => write!(f, "clean"),
        }
    }
}

/// Options for a push.
#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    /// Folder to create new remote documents in.
    pub folder_id: Option<String>,
    /// Style reference document for Markdown → DOCX.
    pub reference_doc: Option<PathBuf>,
    /// Formatting to apply after upload, if any.
    pub format: Option<FormatOptions>,
    /// Report the plan without doing anything.
    pub dry_run: bool,
}

/// Options for a pull.
#[derive(Debug, Clone, Copy, Default)]
pub struct PullOptions {
    /// Report the plan without doing anything.
    pub dry_run: bool,
}

/// One step of a dry-run plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    ReadSource { path: String },
    ConvertToDocx,
    ApplyReferenceDoc { path: PathBuf },
    Authenticate,
    CreateDocument { folder_id: Option<String> },
    UpdateDocument { remote_id: String },
    ApplyFormatting,
    ExportDocument { remote_id: String },
    ConvertToMarkdown,
    SaveTo { path: String },
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadSource { path } => write!(f, "Read {path}"),
            Self::ConvertToDocx => write!(f, "Would convert Markdown → DOCX"),
            Self::ApplyReferenceDoc { path } => {
                write!(f, "Would apply reference doc {}", path.display())
            }
            Self::Authenticate => write!(f, "Would authenticate with the remote document service"),
            Self::CreateDocument { folder_id: None } => write!(f, "Would create a new document"),
            Self::CreateDocument {
                folder_id: Some(folder),
            } => write!(f, "Would create a new document in folder {folder}"),
            Self::UpdateDocument { remote_id } => {
                write!(f, "Would update existing document {remote_id}")
            }
            Self::ApplyFormatting => {
                write!(f, "Would apply formatting (margins, line spacing, header)")
            }
            Self::ExportDocument { remote_id } => {
                write!(f, "Would export document {remote_id} as DOCX")
            }
            Self::ConvertToMarkdown => write!(f, "Would convert DOCX → Markdown"),
            Self::SaveTo { path } => write!(f, "Would save to {path}"),
        }
    }
}

/// Result of a push or pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Dry run: the ordered steps that would have run.
    Planned(Vec<PlanStep>),
    /// Local file uploaded.
    Pushed {
        remote_id: String,
        created: bool,
        synced_at: DateTime<Utc>,
    },
    /// Remote document downloaded to the local file.
    Pulled {
        remote_id: String,
        synced_at: DateTime<Utc>,
    },
}

/// Status of one linked file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub local_path: String,
    pub remote_id: String,
    pub last_sync: Option<DateTime<Utc>>,
    pub state: FileState,
    pub local: LocalState,
}

/// Result of initializing a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub manifest_path: PathBuf,
    /// False when a manifest already existed and was left alone.
    pub manifest_created: bool,
    pub created_dirs: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_state_transitions() {
        assert_eq!(FileState::of(None), FileState::Unlinked);

        let linked = ManifestEntry::linked("abc");
        assert_eq!(FileState::of(Some(&linked)), FileState::Linked);

        let mut synced = linked;
        synced.last_sync = Some(Utc::now());
        assert_eq!(FileState::of(Some(&synced)), FileState::Synced);
    }

    #[test]
    fn test_plan_step_mentions_folder() {
        let step = PlanStep::CreateDocument {
            folder_id: Some("folder42".into()),
        };
        assert!(step.to_string().contains("folder42"));
    }
}
