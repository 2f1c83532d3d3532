//! core::config::schema
//!
//! Configuration file schema.
//!
//! # Example
//!
//! ```toml
//! bind = "0.0.0.0"
//! port = 8000
//! data_dir = "data"
//! static_dir = "static"
//! log_level = "info"
//! max_body_bytes = 1048576
//! ```
//!
//! Every key is optional. Unknown keys are rejected so typos surface as
//! errors instead of being silently ignored.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Log levels accepted by `log_level`.
pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Address the HTTP server binds to
    pub bind: Option<String>,

    /// TCP port the HTTP server listens on
    pub port: Option<u16>,

    /// Directory holding `doc.json`
    pub data_dir: Option<PathBuf>,

    /// Directory served for `/`, `/static/*` and top-level files
    pub static_dir: Option<PathBuf>,

    /// Default log filter when `RUST_LOG` is unset
    pub log_level: Option<String>,

    /// Largest accepted request body
    pub max_body_bytes: Option<usize>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == Some(0) {
            return Err(ConfigError::InvalidValue("port must be non-zero".into()));
        }

        if self.max_body_bytes == Some(0) {
            return Err(ConfigError::InvalidValue(
                "max_body_bytes must be greater than zero".into(),
            ));
        }

        if let Some(level) = &self.log_level {
            if !VALID_LOG_LEVELS.contains(&level.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid log_level '{}', must be one of: {}",
                    level,
                    VALID_LOG_LEVELS.join(", ")
                )));
            }
        }

        if let Some(bind) = &self.bind {
            if bind.trim().is_empty() {
                return Err(ConfigError::InvalidValue("bind cannot be empty".into()));
            }
        }

        Ok(())
    }
}
