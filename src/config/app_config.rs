use serde::Deserialize;
use std::path::Path;

use crate::core::errors::{AuditError, Result};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "audit.toml";

/// Default JSON lines trail file name.
pub const DEFAULT_LOG_FILE: &str = "audit.log";

/// Current format version supported by this build.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// Top-level configuration read from `audit.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub audit: AuditSection,
    /// Writers in dispatch order.
    #[serde(default = "default_writers")]
    pub writers: Vec<WriterEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            audit: AuditSection::default(),
            writers: default_writers(),
        }
    }
}

impl AppConfig {
    /// Load the configuration from `path`.
    ///
    /// After parsing, validates writer file names to prevent path
    /// traversal from a tampered config file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AuditError::InvalidConfig {
                detail: format!("{} not found", path.display()),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| AuditError::InvalidConfig {
            detail: format!("Failed to parse audit config: {e}"),
        })?;

        if config.audit.format_version > CURRENT_FORMAT_VERSION {
            return Err(AuditError::FormatVersionTooNew {
                config_version: config.audit.format_version,
                supported_version: CURRENT_FORMAT_VERSION,
            });
        }

        for writer in &config.writers {
            if let WriterEntry::JsonLines { log_file } = writer {
                validate_simple_filename(log_file, "audit log file")?;
            }
        }

        Ok(config)
    }

    /// File name of the first JSON lines writer, if any.
    pub fn json_log_file(&self) -> Option<&str> {
        self.writers.iter().find_map(|w| match w {
            WriterEntry::JsonLines { log_file } => Some(log_file.as_str()),
            WriterEntry::Tracing => None,
        })
    }
}

/// The `[audit]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditSection {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Format version for backward compatibility. Defaults to 1 if missing.
    #[serde(default = "default_format_version")]
    pub format_version: u32,
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            format_version: default_format_version(),
        }
    }
}

/// One `[[writers]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WriterEntry {
    JsonLines {
        #[serde(default = "default_log_file")]
        log_file: String,
    },
    Tracing,
}

impl WriterEntry {
    pub fn kind(&self) -> &'static str {
        match self {
            WriterEntry::JsonLines { .. } => "json_lines",
            WriterEntry::Tracing => "tracing",
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_format_version() -> u32 {
    1
}

fn default_log_file() -> String {
    DEFAULT_LOG_FILE.to_string()
}

fn default_writers() -> Vec<WriterEntry> {
    vec![WriterEntry::JsonLines {
        log_file: default_log_file(),
    }]
}

/// Reject anything but a bare file name: no separators, no `..`.
pub fn validate_simple_filename(name: &str, what: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\')
        || Path::new(name).is_absolute();

    if invalid {
        return Err(AuditError::InvalidConfig {
            detail: format!("Invalid {what} '{name}': expected a plain file name"),
        });
    }
    Ok(())
}
