//! Console output formatting.
//!
//! Renders status tables, dry-run plans and operation summaries.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{FileState, InitReport, LocalState, PlanStep, StatusEntry, SyncOutcome};

/// Formats linked files as a table.
pub fn format_status_table(entries: &[StatusEntry]) -> String {
    if entries.is_empty() {
        return "No linked files. Use `docsync link <file> <remote-id>` or `docsync push <file>`."
            .to_string();
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["File", "Remote ID", "Last sync", "State", "Local"]);

    for entry in entries {
        let last_sync = entry.last_sync.map_or_else(
            || "never".to_string(),
            |dt| dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        );

        table.add_row(vec![
            entry.local_path.clone(),
            truncate(&entry.remote_id, 24),
            last_sync,
            entry.state.to_string(),
            entry.local.to_string(),
        ]);
    }

    let synced = entries
        .iter()
        .filter(|e| e.state == FileState::Synced)
        .count();
    let modified = entries
        .iter()
        .filter(|e| e.local == LocalState::Modified)
        .count();

    format!(
        "{table}\n\n{} linked, {} synced, {} modified locally",
        entries.len().to_string().cyan(),
        synced.to_string().green(),
        modified.to_string().yellow()
    )
}

/// Formats a dry-run plan as a numbered list.
pub fn format_plan(title: &str, steps: &[PlanStep]) -> String {
    let mut out = format!("{} {}\n", "[dry run]".yellow().bold(), title);
    for (i, step) in steps.iter().enumerate() {
        out.push_str(&format!("  {}. {step}\n", i + 1));
    }
    out.push_str("No changes were made.");
    out
}

/// Formats the result of a push or pull.
pub fn format_outcome(local_path: &str, outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Planned(steps) => format_plan(&format!("Plan for {local_path}"), steps),
        SyncOutcome::Pushed {
            remote_id,
            created: true,
            ..
        } => format!(
            "{} Pushed {} → new document {}",
            "✓".green().bold(),
            local_path,
            remote_id.cyan()
        ),
        SyncOutcome::Pushed { remote_id, .. } => format!(
            "{} Pushed {} → updated {}",
            "✓".green().bold(),
            local_path,
            remote_id.cyan()
        ),
        SyncOutcome::Pulled { remote_id, .. } => format!(
            "{} Pulled {} → {}",
            "✓".green().bold(),
            remote_id.cyan(),
            local_path
        ),
    }
}

/// Formats the result of `init`.
pub fn format_init(report: &InitReport, config_created: Option<&std::path::Path>) -> String {
    let mut out = String::new();

    if report.manifest_created {
        out.push_str(&format!(
            "{} Created manifest {}\n",
            "✓".green().bold(),
            report.manifest_path.display()
        ));
    } else {
        out.push_str(&format!(
            "{} Manifest {} already exists, left unchanged\n",
            "•".blue(),
            report.manifest_path.display()
        ));
    }

    if let Some(path) = config_created {
        out.push_str(&format!(
            "{} Created config {}\n",
            "✓".green().bold(),
            path.display()
        ));
    }

    for dir in &report.created_dirs {
        out.push_str(&format!("{} Created {}/\n", "✓".green(), dir.display()));
    }

    out.trim_end().to_string()
}

/// Truncates a string to max length with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len - 3).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(state: FileState, local: LocalState) -> StatusEntry {
        StatusEntry {
            local_path: "content/ch1.md".into(),
            remote_id: "abc123".into(),
            last_sync: (state == FileState::Synced).then(Utc::now),
            state,
            local,
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world!", 8), "hello...");
    }

    #[test]
    fn test_status_table_lists_entries() {
        colored::control::set_override(false);
        let out = format_status_table(&[
            entry(FileState::Linked, LocalState::Modified),
            entry(FileState::Synced, LocalState::Clean),
        ]);
        assert!(out.contains("content/ch1.md"));
        assert!(out.contains("abc123"));
        assert!(out.contains("never"));
        assert!(out.contains("2 linked, 1 synced, 1 modified locally"));
    }

    #[test]
    fn test_empty_status_has_hint() {
        assert!(format_status_table(&[]).contains("docsync link"));
    }

    #[test]
    fn test_plan_is_numbered() {
        colored::control::set_override(false);
        let out = format_plan(
            "Plan",
            &[PlanStep::Authenticate, PlanStep::ConvertToMarkdown],
        );
        assert!(out.contains("  1. Would authenticate"));
        assert!(out.contains("  2. Would convert DOCX → Markdown"));
        assert!(out.ends_with("No changes were made."));
    }
}
