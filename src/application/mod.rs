//! Application layer - use cases and orchestration.
//!
//! This layer sequences sync operations and formats their results
//! for the console.

pub mod formatter;
pub mod sync_service;

pub use formatter::{format_init, format_outcome, format_status_table};
pub use sync_service::SyncService;
