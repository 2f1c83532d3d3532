//! show command - Print the current document

use anyhow::Result;

use crate::cli::Context;
use crate::gateway::Gateway;

/// Print the document, seeding it first if needed.
pub fn show(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let doc = Gateway::new(&store).get_document()?;
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
