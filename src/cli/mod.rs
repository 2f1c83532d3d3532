//! cli
//!
//! Command-line interface layer for LineCook.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Resolve the effective configuration
//! - Initialize logging
//! - Delegate to command handlers
//!
//! # Configuration Precedence
//!
//! Lowest to highest: built-in defaults, config file, `$PORT`, command-line
//! flags. `RUST_LOG` replaces the configured log filter when set.

pub mod args;
pub mod commands;

pub use args::{Cli, Command, Shell};

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

use crate::core::config::{Config, Overrides};
use crate::core::paths::DataPaths;
use crate::core::store::DocumentStore;

/// Resolved settings shared by all command handlers.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
}

impl Context {
    /// Open the document store under the configured data directory.
    pub fn open_store(&self) -> Result<DocumentStore> {
        let paths = DataPaths::new(self.config.data_dir());
        DocumentStore::open(paths).with_context(|| {
            format!(
                "failed to open data directory '{}'",
                self.config.data_dir().display()
            )
        })
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    // Completion needs neither config nor logging.
    if let Command::Completion { shell } = cli.command {
        return commands::completion(shell);
    }

    let config = resolve_config(&cli)?;
    init_tracing(config.log_level());
    if let Some(path) = config.loaded_from() {
        tracing::debug!(path = %path.display(), "loaded config");
    }

    let ctx = Context { config };
    commands::dispatch(cli.command, &ctx)
}

/// Layer defaults, config file, environment and flags.
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply(Overrides::from_env()?);
    config.apply(cli.overrides());
    config.validate()?;
    Ok(config)
}

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays machine readable.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
