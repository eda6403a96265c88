//! Domain layer - core types and pure logic.
//!
//! This layer contains the manifest model, conversion argument building,
//! formatting payloads and error types, without any I/O.

pub mod config;
pub mod conversion;
pub mod error;
pub mod formatting;
pub mod manifest;
pub mod sync;

pub use config::{AppConfig, CONFIG_FILE_NAME};
pub use conversion::{build_forward_args, build_reverse_args, ConversionRequest, Direction};
pub use error::{AppError, Result};
pub use formatting::{build_formatting_requests, FormatOptions};
pub use manifest::{Manifest, ManifestEntry};
pub use sync::{
    FileState, InitReport, LocalState, PlanStep, PullOptions, PushOptions, StatusEntry,
    SyncOutcome,
};
