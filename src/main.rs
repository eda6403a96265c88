//! docsync - keep Markdown manuscripts in sync with remote documents.
//!
//! Converts documents with Pandoc and tracks which local file belongs to
//! which remote document in a JSON manifest.
//!
//! QUICK START:
//!   docsync init                         # Manifest, config and folders
//!   docsync push content/ch1.md          # Create or update the remote doc
//!   docsync push content/ch1.md --dry-run
//!   docsync pull content/ch1.md          # Bring remote edits back
//!   docsync status                       # What is linked, and when it synced

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{format_init, format_outcome, format_status_table, SyncService};
use cli::{Cli, Commands};
use domain::{AppConfig, ConversionRequest, PullOptions, PushOptions};
use infrastructure::{
    ensure_config_exists, load_config, JsonManifestStore, LocalDocumentStore, PandocInvoker,
};

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
fn run(cli: Cli) -> domain::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let manifest_path = cli
        .manifest
        .clone()
        .unwrap_or_else(|| config.paths.manifest.clone());

    let invoker = PandocInvoker::new(config.pandoc.binary.clone());
    let store = JsonManifestStore;
    let remote = LocalDocumentStore::new(config.paths.remote_dir.clone());
    let service = SyncService::new(&invoker, &store, &remote);

    match cli.command {
        Commands::Init => cmd_init(&service, &manifest_path)?,
        Commands::Link { file, remote_id } => {
            service.link(&manifest_path, &file, &remote_id)?;
            println!(
                "{} Linked {} → {}",
                "✓".green().bold(),
                file,
                remote_id.cyan()
            );
        }
        Commands::Unlink { file } => {
            let entry = service.unlink(&manifest_path, &file)?;
            println!(
                "{} Unlinked {} (was {})",
                "✓".green().bold(),
                file,
                entry.gdoc_id
            );
        }
        Commands::Push {
            file,
            folder_id,
            refdoc,
            format,
            dry_run,
        } => {
            let options = push_options(&config, folder_id, refdoc, format, dry_run);
            let outcome = service.push(&manifest_path, &file, &options)?;
            println!("{}", format_outcome(&file, &outcome));
        }
        Commands::Pull { file, dry_run } => {
            let outcome = service.pull(&manifest_path, &file, PullOptions { dry_run })?;
            println!("{}", format_outcome(&file, &outcome));
        }
        Commands::Status => {
            let entries = service.status(&manifest_path)?;
            println!("{}", format_status_table(&entries));
        }
        Commands::Convert {
            input,
            output,
            refdoc,
        } => cmd_convert(&invoker, &config, input, output, refdoc)?,
        Commands::Check => {
            let version = invoker.version()?;
            println!("{} {}", "✓".green().bold(), version);
        }
    }

    Ok(())
}

/// Initialize a project in the working directory, where local paths resolve.
fn cmd_init(service: &SyncService<'_>, manifest_path: &Path) -> domain::Result<()> {
    let project_dir = Path::new(".");
    let report = service.init(manifest_path, project_dir)?;
    let config_created = ensure_config_exists(project_dir)?;

    println!("{}", format_init(&report, config_created.as_deref()));
    Ok(())
}

/// One-off conversion without touching the manifest.
fn cmd_convert(
    invoker: &PandocInvoker,
    config: &AppConfig,
    input: PathBuf,
    output: PathBuf,
    refdoc: Option<PathBuf>,
) -> domain::Result<()> {
    let request = ConversionRequest::new(input, output)
        .with_reference_doc(refdoc.or_else(|| config.push.reference_doc.clone()));

    let direction = infrastructure::convert(invoker, &request)?;

    println!(
        "{} Converted {} → {} ({})",
        "✓".green().bold(),
        request.source.display(),
        request.destination.display(),
        direction.label()
    );
    Ok(())
}

/// Merge push flags with configured defaults.
fn push_options(
    config: &AppConfig,
    folder_id: Option<String>,
    refdoc: Option<PathBuf>,
    format: bool,
    dry_run: bool,
) -> PushOptions {
    PushOptions {
        folder_id: folder_id.or_else(|| config.push.folder_id.clone()),
        reference_doc: refdoc.or_else(|| config.push.reference_doc.clone()),
        format: format.then(|| config.format.clone()),
        dry_run,
    }
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}
