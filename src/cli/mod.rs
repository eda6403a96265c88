//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// docsync - write in Markdown, convert with Pandoc, sync with remote documents.
#[derive(Parser, Debug)]
#[command(name = "docsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the sync manifest (overrides config).
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,

    /// Path to a docsync.toml config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the manifest, default config and project directories.
    Init,

    /// Link a local Markdown file to an existing remote document.
    Link {
        /// Local Markdown file.
        file: String,

        /// Remote document ID.
        remote_id: String,
    },

    /// Remove the link for a local file.
    Unlink {
        /// Local Markdown file.
        file: String,
    },

    /// Convert a Markdown file and upload it, creating a document if unlinked.
    Push {
        /// Local Markdown file.
        file: String,

        /// Folder to create new documents in.
        #[arg(long)]
        folder_id: Option<String>,

        /// Reference DOCX for styles.
        #[arg(long)]
        refdoc: Option<PathBuf>,

        /// Apply margins, line spacing and header after upload.
        #[arg(long)]
        format: bool,

        /// Show what would happen without doing it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Download a linked document and convert it back to Markdown.
    Pull {
        /// Local Markdown file.
        file: String,

        /// Show what would happen without doing it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show linked files and when they were last synced.
    Status,

    /// Convert between Markdown, DOCX, HTML and EPUB by file extension.
    Convert {
        /// Input file.
        input: PathBuf,

        /// Output file.
        output: PathBuf,

        /// Reference DOCX for styles (Markdown → DOCX only).
        #[arg(long)]
        refdoc: Option<PathBuf>,
    },

    /// Check that the conversion tool is installed.
    Check,
}
