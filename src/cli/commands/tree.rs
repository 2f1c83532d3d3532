//! tree command - Print the task list as an outline
//!
//! Each line is `[x]` or `[ ]` followed by the title, indented two spaces
//! per level. A collapsed task with children gets a trailing `+`; its
//! children are still listed.

use anyhow::Result;

use crate::cli::Context;
use crate::core::task::TaskForest;
use crate::gateway::Gateway;

/// Print the task forest.
pub fn tree(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let forest = Gateway::new(&store).get_task_forest()?;

    if forest.is_empty() {
        println!("No tasks.");
        return Ok(());
    }

    print!("{}", render(&forest));
    Ok(())
}

/// Render `forest` as an indented outline, one task per line.
pub fn render(forest: &TaskForest) -> String {
    let mut out = String::new();
    forest.walk(|node, depth| {
        let mark = if node.task().done { "[x]" } else { "[ ]" };
        let fold = if node.task().collapsed && node.has_children() {
            " +"
        } else {
            ""
        };
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!("{mark} {}{fold}\n", node.task().title));
    });
    out
}
