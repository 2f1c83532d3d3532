//! inprogress command - Print the tasks that are not done

use anyhow::Result;

use crate::cli::Context;
use crate::gateway::Gateway;

/// Print in-progress tasks as a JSON array, exactly as stored.
pub fn inprogress(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let tasks = Gateway::new(&store).get_in_progress()?;
    println!("{}", serde_json::to_string_pretty(&tasks)?);
    Ok(())
}
