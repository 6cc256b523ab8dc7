//! Replay scripts: a starting form plus a list of edits, in TOML.
//!
//! ```toml
//! duration = "00:02:00"
//!
//! [[rows]]
//! start = "2024-01-01T18:00"
//!
//! [[steps]]
//! action = "add"
//!
//! [[steps]]
//! action = "set_end"
//! entry = 0
//! value = "2024-01-01T21:00"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Duration;
use fulcrum_core::local_time::parse_field;
use fulcrum_core::{EntryId, RecurrenceSync, Transition};
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct Script {
    /// Initial contents of the duration field.
    #[serde(default)]
    pub duration: String,

    #[serde(default)]
    pub rows: Vec<Row>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Row {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

/// One user edit. Entries are addressed by their position at the time of the step.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    SetStart { entry: usize, value: String },
    SetEnd { entry: usize, value: String },
    SetDuration { value: String },
    Add,
    Remove { entry: usize },
}

impl Script {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read script {}", path.display()))?;
        let script =
            Self::parse(&content).with_context(|| format!("Invalid script {}", path.display()))?;
        tracing::debug!(path = %path.display(), rows = script.rows.len(), steps = script.steps.len(), "loaded script");
        Ok(script)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Build the form as the page would render it and run `initialise`.
    pub fn build(&self, repeat_interval: Duration) -> Result<(RecurrenceSync, Transition)> {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let start = parse_field(&row.start).with_context(|| format!("rows[{}].start", i))?;
                let end = parse_field(&row.end).with_context(|| format!("rows[{}].end", i))?;
                Ok((start, end))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut sync =
            RecurrenceSync::with_rows(rows, &self.duration).with_repeat_interval(repeat_interval);
        let initial = sync.initialise();

        Ok((sync, initial))
    }

    /// Build, then apply every step in order. Returns all transitions, `initialise` first.
    pub fn run(&self, repeat_interval: Duration) -> Result<(RecurrenceSync, Vec<Transition>)> {
        let (mut sync, initial) = self.build(repeat_interval)?;
        let mut transitions = vec![initial];

        for (n, step) in self.steps.iter().enumerate() {
            let transition = apply(&mut sync, step).with_context(|| format!("steps[{}]", n))?;
            transitions.push(transition);
        }

        Ok((sync, transitions))
    }
}

fn apply(sync: &mut RecurrenceSync, step: &Step) -> Result<Transition> {
    let transition = match step {
        Step::SetStart { entry, value } => {
            let id = resolve(sync, *entry)?;
            sync.set_start(id, parse_field(value)?)
        }
        Step::SetEnd { entry, value } => {
            let id = resolve(sync, *entry)?;
            sync.set_end(id, parse_field(value)?)
        }
        Step::SetDuration { value } => sync.set_duration(value),
        Step::Add => sync.add_entry(),
        Step::Remove { entry } => {
            let id = resolve(sync, *entry)?;
            sync.remove_entry(id)
        }
    };
    Ok(transition)
}

fn resolve(sync: &RecurrenceSync, position: usize) -> Result<EntryId> {
    sync.id_at(position).ok_or_else(|| {
        anyhow::anyhow!(
            "No entry at position {} (form has {} {})",
            position,
            sync.len(),
            if sync.len() == 1 { "entry" } else { "entries" }
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fulcrum_core::Operation;

    const WEEKLY: &str = r#"
duration = ""

[[rows]]
start = "2024-01-08T10:00"

[[steps]]
action = "set_end"
entry = 0
value = "2024-01-08T12:00"

[[steps]]
action = "add"

[[steps]]
action = "add"
"#;

    #[test]
    fn parses_tagged_steps() {
        let script = Script::parse(WEEKLY).unwrap();
        assert_eq!(script.rows.len(), 1);
        assert_eq!(
            script.steps[0],
            Step::SetEnd {
                entry: 0,
                value: "2024-01-08T12:00".into()
            }
        );
        assert_eq!(script.steps[1], Step::Add);
    }

    #[test]
    fn run_replays_every_step() {
        let (sync, transitions) = Script::parse(WEEKLY).unwrap().run(Duration::days(7)).unwrap();

        assert_eq!(transitions.len(), 4);
        assert_eq!(transitions[0].operation, Operation::Initialise);
        assert_eq!(sync.duration_text(), "00:02:00");
        assert_eq!(sync.len(), 3);
        assert_eq!(
            sync.entries()[2].end.map(|e| e.format("%Y-%m-%dT%H:%M").to_string()),
            Some("2024-01-22T12:00".into())
        );
    }

    #[test]
    fn empty_script_is_one_blank_row() {
        let (sync, _) = Script::parse("").unwrap().run(Duration::days(7)).unwrap();
        assert_eq!(sync.len(), 1);
        assert!(!sync.add_enabled());
    }

    #[test]
    fn out_of_range_entry_names_the_step() {
        let script = Script::parse(
            r#"
[[steps]]
action = "remove"
entry = 3
"#,
        )
        .unwrap();

        let err = script.run(Duration::days(7)).unwrap_err();
        assert_eq!(err.to_string(), "steps[0]");
        assert!(format!("{:#}", err).contains("No entry at position 3"));
    }

    #[test]
    fn malformed_row_names_the_field() {
        let script = Script::parse("[[rows]]\nstart = \"tomorrow\"\n").unwrap();
        let err = script.run(Duration::days(7)).unwrap_err();
        assert_eq!(err.to_string(), "rows[0].start");
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(Script::parse("[[steps]]\naction = \"explode\"\n").is_err());
    }
}
