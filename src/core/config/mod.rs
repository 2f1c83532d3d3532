//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. Environment (`PORT`)
//! 4. CLI flags (applied by the caller through [`Overrides`])
//!
//! # Config File Locations
//!
//! Searched in order, first existing file wins:
//! 1. `--config <path>` (must exist)
//! 2. `$LINECOOK_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/linecook/config.toml`
//! 4. `~/.linecook/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use linecook::core::config::{Config, Overrides};
//!
//! let mut config = Config::load(None).unwrap();
//! config.apply(Overrides::from_env().unwrap());
//! config.apply(Overrides { port: Some(9000), ..Default::default() });
//! config.validate().unwrap();
//!
//! println!("listening on {}:{}", config.bind(), config.port());
//! ```

pub mod schema;

pub use schema::FileConfig;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "LINECOOK_CONFIG";

/// Environment variable overriding the listen port.
pub const PORT_ENV: &str = "PORT";

const DEFAULT_BIND: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Values layered over the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Overrides {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `PORT` is set but not a port number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup(PORT_ENV) {
            Some(raw) if !raw.trim().is_empty() => Some(raw.trim().parse::<u16>().map_err(|e| {
                ConfigError::InvalidValue(format!("{PORT_ENV}='{raw}' is not a valid port: {e}"))
            })?),
            _ => None,
        };
        Ok(Self {
            port,
            ..Default::default()
        })
    }
}

/// Effective configuration.
///
/// Accessor methods apply defaults for anything left unset.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: FileConfig,
    /// Path the file settings were read from, if any
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `explicit` or the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if `explicit` does not exist, or if a config file
    /// exists but cannot be read or parsed. A missing default file is not
    /// an error (defaults are used).
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(explicit, |key| std::env::var(key).ok(), dirs::home_dir())
    }

    /// Load configuration with an injected environment and home directory.
    pub fn load_with(
        explicit: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
        home: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::from_path(path);
        }

        for path in Self::candidate_paths(lookup, home) {
            if path.exists() {
                return Self::from_path(&path);
            }
        }

        // No config found, use defaults
        Ok(Self::default())
    }

    /// Default search locations, most specific first.
    fn candidate_paths(
        lookup: impl Fn(&str) -> Option<String>,
        home: Option<PathBuf>,
    ) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(path) = lookup(CONFIG_ENV) {
            paths.push(PathBuf::from(path));
        }
        if let Some(xdg_home) = lookup("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_home).join("linecook/config.toml"));
        }
        if let Some(home) = home {
            paths.push(home.join(".linecook/config.toml"));
        }
        paths
    }

    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: FileConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        Ok(Self {
            file,
            loaded_from: Some(path.to_path_buf()),
        })
    }

    /// Layer `overrides` over the current values. Unset fields are ignored.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(bind) = overrides.bind {
            self.file.bind = Some(bind);
        }
        if let Some(port) = overrides.port {
            self.file.port = Some(port);
        }
        if let Some(dir) = overrides.data_dir {
            self.file.data_dir = Some(dir);
        }
        if let Some(dir) = overrides.static_dir {
            self.file.static_dir = Some(dir);
        }
        if let Some(level) = overrides.log_level {
            self.file.log_level = Some(level);
        }
    }

    /// Validate the effective values after all layers are applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.file.validate()
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Address to bind. Defaults to `0.0.0.0`.
    pub fn bind(&self) -> &str {
        self.file.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    /// Port to listen on. Defaults to `8000`.
    pub fn port(&self) -> u16 {
        self.file.port.unwrap_or(DEFAULT_PORT)
    }

    /// Directory holding the document. Defaults to `data`.
    pub fn data_dir(&self) -> PathBuf {
        self.file
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    /// Directory of static assets. Defaults to `static`.
    pub fn static_dir(&self) -> PathBuf {
        self.file
            .static_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR))
    }

    /// Default log filter. Defaults to `info`.
    pub fn log_level(&self) -> &str {
        self.file.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Largest accepted request body in bytes. Defaults to 1 MiB.
    pub fn max_body_bytes(&self) -> usize {
        self.file.max_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES)
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}
