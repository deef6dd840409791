pub mod json_lines_writer;
pub mod memory_writer;
pub mod tracing_writer;

use std::path::Path;

use crate::config::app_config::{AppConfig, WriterEntry};
use crate::core::services::audit_coordinator::AuditCoordinator;

use json_lines_writer::JsonLinesWriter;
use tracing_writer::TracingWriter;

/// Build a coordinator with the configured writers, in file order.
/// JSON lines files are resolved against `base_dir`.
///
/// Returns `None` when auditing is disabled.
pub fn coordinator_from_config(config: &AppConfig, base_dir: &Path) -> Option<AuditCoordinator> {
    if !config.audit.enabled {
        return None;
    }

    let coordinator = config
        .writers
        .iter()
        .fold(AuditCoordinator::new(), |coordinator, entry| match entry {
            WriterEntry::JsonLines { log_file } => {
                coordinator.with_writer(JsonLinesWriter::new(base_dir, log_file))
            }
            WriterEntry::Tracing => coordinator.with_writer(TracingWriter),
        });

    Some(coordinator)
}
