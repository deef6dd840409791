use std::path::Path;

use chrono::{NaiveDate, TimeZone, Utc};
use colored::Colorize;

use entity_audit::adapters::audit::json_lines_writer::AuditQuery;
use entity_audit::{AuditAction, AuditChange, AuditEntry, AuditError, Result};

use crate::cli::context;
use crate::cli::output;

/// Execute the `entity-audit log` command.
///
/// Displays the JSON lines trail with optional filters for entity,
/// actor, action, date and entry count.
pub fn execute(
    config_path: &Path,
    entity: Option<&str>,
    actor: Option<&str>,
    action: Option<AuditAction>,
    since: Option<&str>,
    last: Option<usize>,
) -> Result<()> {
    let config = context::load_config(config_path)?;
    let reader =
        context::trail_reader(&config, config_path).ok_or_else(|| AuditError::InvalidConfig {
            detail: "No json_lines writer configured, nothing to read.".into(),
        })?;

    let since_dt = since.map(parse_since).transpose()?;

    let filter = AuditQuery {
        entity: entity.map(str::to_string),
        actor: actor.map(str::to_string),
        action,
        since: since_dt,
    };
    let entries = reader.query(&filter)?;

    if entries.is_empty() {
        output::header("entity-audit log");
        output::warning("No audit entries found");
        if entity.is_some() || actor.is_some() || action.is_some() || since.is_some() {
            output::hint("Try removing filters to see all entries.");
        }
        return Ok(());
    }

    // Apply --last N (take from the end)
    let skip = last.map_or(0, |n| entries.len().saturating_sub(n));
    let display = &entries[skip..];

    output::header(&format!("entity-audit log ({} entries)", display.len()));
    println!();

    for entry in display {
        print_entry(entry);
    }

    Ok(())
}

/// Parse a date string (ISO 8601: `YYYY-MM-DD`) into a UTC DateTime.
fn parse_since(s: &str) -> Result<chrono::DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| AuditError::InvalidConfig {
        detail: format!("Invalid date format: '{s}'. Expected ISO 8601 (YYYY-MM-DD), e.g. 2026-01-15"),
    })?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| AuditError::InvalidConfig {
        detail: format!("Invalid date: '{s}'"),
    })?;
    Ok(Utc.from_utc_datetime(&midnight))
}

/// Print a single audit entry as a formatted row, followed by its changes.
fn print_entry(entry: &AuditEntry) {
    let date = entry.timestamp.format("%Y-%m-%d %H:%M:%S");
    let actor = entry.actor.as_deref().unwrap_or("—").dimmed().to_string();

    println!(
        "  {} {} {:<10} {}#{} {}",
        date.to_string().dimmed(),
        "│".dimmed(),
        format_action(entry.action),
        entry.entity.bold(),
        entry.entity_id,
        actor,
    );

    for change in &entry.changes {
        print_change(change);
    }
}

fn print_change(change: &AuditChange) {
    println!(
        "  {:>21} {}: {} → {}",
        "",
        change.property,
        format_value(change.old_value.as_deref()).red(),
        format_value(change.new_value.as_deref()).green(),
    );
}

fn format_value(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("{v:?}"),
        None => "null".to_string(),
    }
}

/// Format an AuditAction as a colored string.
fn format_action(action: AuditAction) -> String {
    match action {
        AuditAction::Added => "added".green().to_string(),
        AuditAction::Modified => "modified".yellow().to_string(),
        AuditAction::Deleted => "deleted".red().to_string(),
    }
}
