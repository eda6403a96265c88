//! Conversion requests and Pandoc argument construction.
//!
//! Argument building is pure so it can be exercised without spawning
//! the conversion tool.

use std::fmt;
use std::path::{Path, PathBuf};

use super::error::{AppError, Result};

/// Document formats the tool knows how to convert between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    Markdown,
    Docx,
    Html,
    Epub,
}

impl DocFormat {
    /// Detect a format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "docx" => Some(Self::Docx),
            "html" | "htm" => Some(Self::Html),
            "epub" => Some(Self::Epub),
            _ => None,
        }
    }

    /// Short name used in direction labels.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Docx => "docx",
            Self::Html => "html",
            Self::Epub => "epub",
        }
    }
}

impl fmt::Display for DocFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Source and target format of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Direction {
    pub from: DocFormat,
    pub to: DocFormat,
}

impl Direction {
    /// Markdown to DOCX, used when pushing.
    pub const FORWARD: Self = Self {
        from: DocFormat::Markdown,
        to: DocFormat::Docx,
    };

    /// DOCX to Markdown, used when pulling.
    pub const REVERSE: Self = Self {
        from: DocFormat::Docx,
        to: DocFormat::Markdown,
    };

    /// Human-readable label such as `md → docx`.
    #[must_use]
    pub fn label(self) -> String {
        format!("{} → {}", self.from, self.to)
    }

    /// Whether a reference document applies to this direction.
    #[must_use]
    pub fn accepts_reference_doc(self) -> bool {
        self == Self::FORWARD
    }
}

/// A single conversion to perform. Built per invocation, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub reference_doc: Option<PathBuf>,
}

impl ConversionRequest {
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            reference_doc: None,
        }
    }

    /// Attach an optional style reference document.
    #[must_use]
    pub fn with_reference_doc(mut self, reference_doc: Option<PathBuf>) -> Self {
        self.reference_doc = reference_doc;
        self
    }

    /// Work out the direction from the file extensions.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for unsupported extensions or same-format pairs.
    pub fn direction(&self) -> Result<Direction> {
        let detect = |path: &Path| {
            DocFormat::from_path(path).ok_or_else(|| AppError::InvalidArgument {
                message: format!(
                    "Unsupported document format: {} (expected .md, .docx, .html or .epub)",
                    path.display()
                ),
            })
        };

        let from = detect(&self.source)?;
        let to = detect(&self.destination)?;

        if from == to {
            return Err(AppError::InvalidArgument {
                message: format!("Source and destination are both {from}"),
            });
        }

        Ok(Direction { from, to })
    }

    /// Build the argument list for this request.
    ///
    /// The reference document is only passed through for Markdown → DOCX.
    #[must_use]
    pub fn args(&self, direction: Direction) -> Vec<String> {
        if direction.accepts_reference_doc() {
            build_forward_args(
                &self.source,
                &self.destination,
                self.reference_doc.as_deref(),
            )
        } else {
            build_reverse_args(&self.source, &self.destination)
        }
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Arguments for Markdown → document conversion.
#[must_use]
pub fn build_forward_args(
    source: &Path,
    destination: &Path,
    reference_doc: Option<&Path>,
) -> Vec<String> {
    let mut args = vec![path_arg(source), "-o".to_string(), path_arg(destination)];

    if let Some(reference) = reference_doc {
        args.push("--reference-doc".to_string());
        args.push(path_arg(reference));
    }

    args
}

/// Arguments for document → Markdown conversion.
#[must_use]
pub fn build_reverse_args(source: &Path, destination: &Path) -> Vec<String> {
    vec![path_arg(source), "-o".to_string(), path_arg(destination)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_args_without_reference() {
        let args = build_forward_args(Path::new("a.md"), Path::new("a.docx"), None);
        assert_eq!(args, vec!["a.md", "-o", "a.docx"]);
    }

    #[test]
    fn test_forward_args_with_reference() {
        let args = build_forward_args(
            Path::new("a.md"),
            Path::new("a.docx"),
            Some(Path::new("ref.docx")),
        );
        assert_eq!(
            args,
            vec!["a.md", "-o", "a.docx", "--reference-doc", "ref.docx"]
        );
    }

    #[test]
    fn test_reverse_args() {
        let args = build_reverse_args(Path::new("a.docx"), Path::new("a.md"));
        assert_eq!(args, vec!["a.docx", "-o", "a.md"]);
    }

    #[test]
    fn test_direction_labels() {
        assert_eq!(Direction::FORWARD.label(), "md → docx");
        assert_eq!(Direction::REVERSE.label(), "docx → md");
    }

    #[test]
    fn test_direction_from_extensions() {
        let req = ConversionRequest::new("book/ch1.Markdown", "dist/ch1.epub");
        let dir = req.direction().unwrap();
        assert_eq!(dir.from, DocFormat::Markdown);
        assert_eq!(dir.to, DocFormat::Epub);
        assert_eq!(dir.label(), "md → epub");
    }

    #[test]
    fn test_direction_rejects_unknown_and_same_format() {
        assert!(ConversionRequest::new("a.txt", "a.docx").direction().is_err());
        assert!(ConversionRequest::new("a.md", "b.md").direction().is_err());
    }

    #[test]
    fn test_reference_doc_ignored_outside_forward() {
        let req = ConversionRequest::new("a.md", "a.html")
            .with_reference_doc(Some(PathBuf::from("ref.docx")));
        let dir = req.direction().unwrap();
        assert_eq!(req.args(dir), vec!["a.md", "-o", "a.html"]);

        let req = ConversionRequest::new("a.md", "a.docx")
            .with_reference_doc(Some(PathBuf::from("ref.docx")));
        let dir = req.direction().unwrap();
        assert_eq!(req.args(dir).len(), 5);
    }
}
