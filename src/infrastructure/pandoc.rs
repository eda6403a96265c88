//! Pandoc subprocess invocation.
//!
//! Runs the conversion tool synchronously and normalizes its result into
//! an exit code plus captured output. Calls block until the tool exits;
//! there is no timeout.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use crate::domain::{
    build_forward_args, build_reverse_args, AppError, ConversionRequest, Direction, Result,
};

/// Exit code reported when the process produced none.
const NO_EXIT_CODE: i32 = 1;

/// Captured result of one tool run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Build an output record, mapping a missing exit code to failure.
    #[must_use]
    pub fn from_parts(code: Option<i32>, stdout: String, stderr: String) -> Self {
        Self {
            exit_code: code.unwrap_or(NO_EXIT_CODE),
            stdout,
            stderr,
        }
    }

    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Lines of stderr that are warnings rather than failures.
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.stderr.lines().filter(|l| l.contains("Warning"))
    }
}

/// Something that can run the conversion tool.
#[cfg_attr(test, mockall::automock)]
pub trait ToolInvoker {
    /// Run the tool with the given arguments and wait for it to exit.
    ///
    /// # Errors
    /// Returns `ToolNotFound` if the binary is not installed.
    fn invoke(&self, args: &[String]) -> Result<ToolOutput>;
}

/// Invoker for a Pandoc binary on `PATH` or at a fixed location.
#[derive(Debug, Clone)]
pub struct PandocInvoker {
    binary: String,
}

impl PandocInvoker {
    #[must_use]
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// First line of `<tool> --version`.
    ///
    /// # Errors
    /// Returns `ToolNotFound` if the binary is missing, or `Config` if it fails.
    pub fn version(&self) -> Result<String> {
        let output = self.invoke(&["--version".to_string()])?;
        if !output.success() {
            return Err(AppError::Config {
                message: format!(
                    "'{} --version' exited with code {}",
                    self.binary, output.exit_code
                ),
            });
        }

        Ok(output.stdout.lines().next().unwrap_or_default().to_string())
    }
}

impl ToolInvoker for PandocInvoker {
    fn invoke(&self, args: &[String]) -> Result<ToolOutput> {
        tracing::debug!(binary = %self.binary, ?args, "Invoking conversion tool");

        let output = match Command::new(&self.binary).args(args).output() {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::ToolNotFound {
                    tool: self.binary.clone(),
                });
            }
            Err(e) => {
                tracing::warn!(binary = %self.binary, error = %e, "Failed to start conversion tool");
                return Ok(ToolOutput::from_parts(None, String::new(), e.to_string()));
            }
        };

        Ok(ToolOutput::from_parts(
            output.status.code(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ))
    }
}

fn run_checked(invoker: &dyn ToolInvoker, args: &[String], direction: Direction) -> Result<()> {
    let output = invoker.invoke(args)?;

    for warning in output.warnings() {
        tracing::warn!(direction = %direction.label(), "{warning}");
    }

    if !output.success() {
        return Err(AppError::Conversion {
            direction: direction.label(),
            exit_code: output.exit_code,
            stderr: output.stderr,
        });
    }

    tracing::info!(direction = %direction.label(), "Conversion complete");
    Ok(())
}

/// Convert Markdown to DOCX.
///
/// # Errors
/// Returns `Conversion` if the tool exits non-zero.
pub fn convert_forward(
    invoker: &dyn ToolInvoker,
    source: &Path,
    destination: &Path,
    reference_doc: Option<&Path>,
) -> Result<()> {
    let args = build_forward_args(source, destination, reference_doc);
    run_checked(invoker, &args, Direction::FORWARD)
}

/// Convert DOCX to Markdown.
///
/// # Errors
/// Returns `Conversion` if the tool exits non-zero.
pub fn convert_reverse(invoker: &dyn ToolInvoker, source: &Path, destination: &Path) -> Result<()> {
    let args = build_reverse_args(source, destination);
    run_checked(invoker, &args, Direction::REVERSE)
}

/// Convert between any supported pair of formats, inferred from extensions.
///
/// # Errors
/// Returns `InvalidArgument` for unsupported formats, `Io` if the destination
/// directory cannot be created, or `Conversion` if the tool fails.
pub fn convert(invoker: &dyn ToolInvoker, request: &ConversionRequest) -> Result<Direction> {
    let direction = request.direction()?;

    if let Some(parent) = request.destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::io(format!("Failed to create directory {}", parent.display()), e)
        })?;
    }

    run_checked(invoker, &request.args(direction), direction)?;
    Ok(direction)
}
