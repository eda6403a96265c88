//! Infrastructure layer - external adapters (subprocess, filesystem, remote).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod manifest_store;
pub mod pandoc;
pub mod remote;

pub use config::{ensure_config_exists, load_config};
pub use manifest_store::{JsonManifestStore, ManifestStore};
pub use pandoc::{convert, convert_forward, convert_reverse, PandocInvoker, ToolInvoker};
pub use remote::{LocalDocumentStore, RemoteDocuments};
