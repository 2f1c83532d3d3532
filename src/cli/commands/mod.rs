//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the document store from the resolved configuration
//! 2. Calls the gateway (or the server, for `serve`)
//! 3. Formats and displays output
//!
//! Handlers never write `doc.json` themselves. Every mutation goes through
//! the gateway's compare-and-swap.

mod completion;
mod inprogress;
mod serve;
mod show;
mod tree;

pub use completion::completion;
pub use inprogress::inprogress;
pub use serve::serve;
pub use show::show;
pub use tree::{render as render_tree, tree};

use crate::cli::args::Command;
use crate::cli::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Serve { .. } => serve::serve(ctx),
        Command::Show => show::show(ctx),
        Command::InProgress => inprogress::inprogress(ctx),
        Command::Tree => tree::tree(ctx),
        Command::Completion { shell } => completion::completion(shell),
    }
}
