pub mod commands;
pub mod context;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};

use entity_audit::AuditAction;

/// Inspect the audit trail written by entity-audit.
#[derive(Parser, Debug)]
#[command(name = "entity-audit", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the audit config file
    #[arg(long, global = true, default_value = "audit.toml", env = "ENTITY_AUDIT_CONFIG")]
    pub config: String,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the recorded audit trail
    Log {
        /// Filter by entity type name
        #[arg(long)]
        entity: Option<String>,
        /// Filter by actor (case-insensitive substring)
        #[arg(long)]
        actor: Option<String>,
        /// Filter by action
        #[arg(long, value_enum)]
        action: Option<ActionArg>,
        /// Filter entries since this date (ISO 8601)
        #[arg(long)]
        since: Option<String>,
        /// Show last N entries
        #[arg(long)]
        last: Option<usize>,
    },

    /// Show audit configuration and trail status
    Status,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ActionArg {
    Added,
    Modified,
    Deleted,
}

impl From<ActionArg> for AuditAction {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Added => AuditAction::Added,
            ActionArg::Modified => AuditAction::Modified,
            ActionArg::Deleted => AuditAction::Deleted,
        }
    }
}
