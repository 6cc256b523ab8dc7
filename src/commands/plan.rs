use anyhow::{Context, Result};
use fulcrum_core::config::FulcrumConfig;
use fulcrum_core::local_time::parse_local_datetime;
use fulcrum_core::{EventDuration, RecurrenceSync};
use owo_colors::OwoColorize;

use super::print_snapshot;

/// Fill in the first row, then add `repeat` rows following the pattern.
pub fn run(
    start: String,
    end: Option<String>,
    duration: Option<String>,
    repeat: usize,
    json: bool,
    config: &FulcrumConfig,
) -> Result<()> {
    let start = parse_local_datetime(&start).context("Invalid --start")?;

    let mut sync = RecurrenceSync::new().with_repeat_interval(config.repeat_interval());
    sync.initialise();
    let first = sync.id_at(0).context("Form has no rows")?;
    sync.set_start(first, Some(start));

    if let Some(duration) = duration {
        sync.set_duration(&duration_text(&duration)?);
    }
    if let Some(end) = end {
        let end = parse_local_datetime(&end).context("Invalid --end")?;
        sync.set_end(first, Some(end));
    }

    for _ in 0..repeat {
        if sync.add_entry().added.is_none() {
            eprintln!("{}", "  Could not add more repeats".yellow());
            break;
        }
    }

    print_snapshot(&sync.snapshot(), json)
}

/// Accept `DD:HH:MM` as-is, otherwise a humantime duration like `1h 30m`.
fn duration_text(input: &str) -> Result<String> {
    if EventDuration::parse(input).is_some() {
        return Ok(input.to_string());
    }

    let std_dur = humantime::parse_duration(input)
        .with_context(|| format!("Could not parse duration: \"{}\"", input))?;
    Ok(EventDuration::from_std(std_dur).to_string())
}
