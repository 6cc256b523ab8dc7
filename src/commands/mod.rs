pub mod config;
pub mod export;
pub mod plan;
pub mod replay;

use fulcrum_core::SyncSnapshot;

use crate::render::Render;

/// Print the form as a table, or as JSON for scripting.
pub fn print_snapshot(snapshot: &SyncSnapshot, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        println!("{}", snapshot.render());
    }
    Ok(())
}
