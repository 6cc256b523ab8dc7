use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fulcrum_core::config::FulcrumConfig;
use fulcrum_core::ics::{Series, generate_ics};
use fulcrum_core::{FulcrumError, Submission};
use owo_colors::OwoColorize;

use crate::script::Script;

pub fn run(
    path: &Path,
    title: String,
    location: Option<String>,
    description: Option<String>,
    output: Option<String>,
    config: &FulcrumConfig,
) -> Result<()> {
    let script = Script::load(path)?;
    let (sync, _) = script.run(config.repeat_interval())?;
    let tz = config.tz()?;

    let submission = match Submission::from_sync(&sync, tz) {
        Ok(submission) => submission,
        Err(FulcrumError::Blocked(errors)) => {
            eprintln!("{}", "  Form has errors:".red());
            for error in &errors {
                eprintln!("    {} {}", error.field.bold(), error.message);
            }
            anyhow::bail!("Refusing to export {} with {} error(s)", path.display(), errors.len());
        }
        Err(e) => return Err(e.into()),
    };

    let series = Series::new(title)
        .with_location(location)
        .with_description(description);
    let ics = generate_ics(&series, &submission)?;

    match output {
        Some(output) => {
            let output = PathBuf::from(shellexpand::tilde(&output).into_owned());
            std::fs::write(&output, ics)
                .with_context(|| format!("Could not write {}", output.display()))?;
            println!(
                "{}",
                format!(
                    "  Exported {} {} to {}",
                    submission.len(),
                    if submission.len() == 1 { "occurrence" } else { "occurrences" },
                    output.display()
                )
                .green()
            );
        }
        None => print!("{}", ics),
    }

    Ok(())
}
