use std::path::Path;

use colored::Colorize;

use entity_audit::Result;
use entity_audit::adapters::audit::json_lines_writer::AuditQuery;
use entity_audit::config::app_config::{AppConfig, WriterEntry};

use crate::cli::context;
use crate::cli::output;

/// Execute the `entity-audit status` command.
///
/// Displays whether auditing is enabled, the writer chain in dispatch
/// order, and how many entries the JSON lines trail holds.
pub fn execute(config_path: &Path) -> Result<()> {
    let config = context::load_config(config_path)?;

    output::header("entity-audit status");
    println!("  Config: {}", config_path.display().to_string().cyan());
    if !config_path.exists() {
        output::hint("not found, using defaults");
    }

    if config.audit.enabled {
        output::success("Auditing enabled");
    } else {
        output::warning("Auditing disabled");
    }

    print_writers(&config, config_path);
    print_trail(&config, config_path)?;

    Ok(())
}

/// Print the "Writers" section in dispatch order.
fn print_writers(config: &AppConfig, config_path: &Path) {
    println!("\n{}", "  Writers".bold());

    if config.writers.is_empty() {
        output::warning("No writers configured");
        return;
    }

    for (i, writer) in config.writers.iter().enumerate() {
        match writer {
            WriterEntry::JsonLines { log_file } => println!(
                "  {}. {} → {}",
                i + 1,
                writer.kind().cyan(),
                context::base_dir(config_path).join(log_file).display()
            ),
            WriterEntry::Tracing => println!("  {}. {}", i + 1, writer.kind().cyan()),
        }
    }
}

/// Print the "Trail" section with the entry count.
fn print_trail(config: &AppConfig, config_path: &Path) -> Result<()> {
    println!("\n{}", "  Trail".bold());

    let Some(reader) = context::trail_reader(config, config_path) else {
        output::warning("No json_lines writer, trail is not stored locally");
        return Ok(());
    };

    if !reader.log_path().exists() {
        output::warning(&format!("{} not created yet", reader.log_path().display()));
        return Ok(());
    }

    let count = reader.query(&AuditQuery::default())?.len();
    output::success(&format!("{count} entries in {}", reader.log_path().display()));
    Ok(())
}
