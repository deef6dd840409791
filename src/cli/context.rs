use std::path::Path;

use entity_audit::Result;
use entity_audit::adapters::audit::json_lines_writer::JsonLinesWriter;
use entity_audit::config::app_config::AppConfig;

/// Directory that relative writer paths resolve against: the one
/// holding the config file.
pub fn base_dir(config_path: &Path) -> &Path {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Load the config, falling back to defaults when the file is absent.
pub fn load_config(config_path: &Path) -> Result<AppConfig> {
    AppConfig::load_or_default(config_path)
}

/// Reader for the trail of the first JSON lines writer, if one is
/// configured.
pub fn trail_reader(config: &AppConfig, config_path: &Path) -> Option<JsonLinesWriter> {
    config
        .json_log_file()
        .map(|log_file| JsonLinesWriter::new(base_dir(config_path), log_file))
}
