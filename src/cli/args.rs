//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Read configuration from this file
//! - `--data-dir <path>`: Directory holding `doc.json`
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Only log warnings and errors

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::Overrides;

/// LineCook - a single-document task board with optimistic concurrency
#[derive(Parser, Debug)]
#[command(name = "linecook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the default locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding the document
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Config overrides carried by the command line.
    ///
    /// Only fields the user actually passed are set, so these layer on top
    /// of the file and environment.
    pub fn overrides(&self) -> Overrides {
        let mut overrides = Overrides {
            data_dir: self.data_dir.clone(),
            log_level: self.log_level_flag().map(str::to_string),
            ..Overrides::default()
        };
        if let Command::Serve {
            bind,
            port,
            static_dir,
        } = &self.command
        {
            overrides.bind = bind.clone();
            overrides.port = *port;
            overrides.static_dir = static_dir.clone();
        }
        overrides
    }

    /// Log level forced by `--debug` or `--quiet`, if any.
    pub fn log_level_flag(&self) -> Option<&'static str> {
        if self.debug {
            Some("debug")
        } else if self.quiet {
            Some("warn")
        } else {
            None
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server
    #[command(
        name = "serve",
        long_about = "Run the HTTP server.\n\n\
            Serves the document API under /api and the web client from the \
            static directory. The document is seeded on startup if it does \
            not exist yet.",
        after_help = "\
EXAMPLES:
    # Listen on all interfaces, port 8000
    linecook serve

    # Local only, another port
    linecook serve --bind 127.0.0.1 --port 9000

    # PORT in the environment works too
    PORT=9000 linecook serve"
    )]
    Serve {
        /// Address to bind
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,

        /// Port to listen on (overrides $PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory of static web assets
        #[arg(long, value_name = "DIR")]
        static_dir: Option<PathBuf>,
    },

    /// Print the current document as JSON
    Show,

    /// Print the tasks that are not done as JSON
    #[command(name = "inprogress")]
    InProgress,

    /// Print the task list as an indented tree
    Tree,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
