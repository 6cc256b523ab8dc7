use std::path::Path;

use anyhow::Result;
use fulcrum_core::config::FulcrumConfig;

use super::print_snapshot;
use crate::render::Render;
use crate::script::Script;

pub fn run(path: &Path, json: bool, verbose: bool, config: &FulcrumConfig) -> Result<()> {
    let script = Script::load(path)?;
    let (sync, transitions) = script.run(config.repeat_interval())?;

    if verbose && !json {
        for (n, transition) in transitions.iter().enumerate() {
            println!("  {:>2}. {}", n, transition.render());
        }
        println!();
    }

    print_snapshot(&sync.snapshot(), json)
}
