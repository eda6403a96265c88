//! Domain-level error types for docsync.
//!
//! All errors are typed with `thiserror` and carry enough context (path,
//! remote ID, exit code) to diagnose a failure without extra logging.

use std::path::PathBuf;

use serde_json::error::Category;
use thiserror::Error;

/// Application-level errors surfaced to the invoking command.
#[derive(Error, Debug)]
pub enum AppError {
    /// The conversion tool exited with a non-zero status.
    #[error("Conversion failed ({direction}): pandoc exited with code {exit_code}{}", stderr_suffix(.stderr))]
    Conversion {
        direction: String,
        exit_code: i32,
        stderr: String,
    },

    /// The manifest file exists but is malformed or has unexpected values.
    #[error("Manifest at {path} {}: {source}", manifest_problem(.source))]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file has no remote document associated with it.
    #[error("{path} is not linked to a remote document. Run `docsync link {path} <remote-id>` first")]
    NotLinked { path: String },

    /// The conversion tool binary is missing from the environment.
    #[error("Conversion tool '{tool}' not found. Install Pandoc from https://pandoc.org/installing.html or set [pandoc] binary in docsync.toml")]
    ToolNotFound { tool: String },

    /// The remote document service rejected an operation.
    #[error("Remote document error: {message}")]
    Remote { message: String },

    /// A caller-supplied value was rejected.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// JSON serialization failed.
    #[error("JSON error: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Tell a syntax error apart from JSON that parses but has the wrong shape.
fn manifest_problem(err: &serde_json::Error) -> &'static str {
    match err.classify() {
        Category::Data => "does not match the manifest schema",
        Category::Io => "could not be read",
        Category::Syntax | Category::Eof => "is not valid JSON",
    }
}

impl AppError {
    /// Create a JSON error.
    pub fn json_parse(err: serde_json::Error) -> Self {
        Self::JsonParse {
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Create a remote service error.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
