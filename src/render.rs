//! TUI rendering for fulcrum-core types.
//!
//! Extension traits that add colored terminal rendering using owo_colors.

use fulcrum_core::local_time::format_field;
use fulcrum_core::{Operation, SyncSnapshot, TimeEntry, Transition};
use owo_colors::OwoColorize;

/// Width of a `YYYY-MM-DDTHH:MM` field.
const FIELD_WIDTH: usize = 16;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for TimeEntry {
    fn render(&self) -> String {
        let start = pad(&format_field(self.start.as_ref()));
        let end = pad(&format_field(self.end.as_ref()));

        if self.validity.is_valid() {
            format!("{}  {}", start, end)
        } else {
            format!("{}  {}  {}", start, end.red(), self.validity.message().red())
        }
    }
}

/// Empty fields show as a dimmed placeholder of the same width.
fn pad(value: &str) -> String {
    if value.is_empty() {
        format!("{:<width$}", "-", width = FIELD_WIDTH).dimmed().to_string()
    } else {
        format!("{:<width$}", value, width = FIELD_WIDTH)
    }
}

impl Render for SyncSnapshot {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        let duration = if self.duration_text.is_empty() {
            "unset".dimmed().to_string()
        } else {
            self.duration_text.clone()
        };
        if self.duration_validity.is_valid() {
            lines.push(format!("{} {}", "Duration:".bold(), duration));
        } else {
            lines.push(format!(
                "{} {}  {}",
                "Duration:".bold(),
                duration.red(),
                self.duration_validity.message().red()
            ));
        }

        lines.push(format!(
            "   {}  {}  {}",
            "#".dimmed(),
            pad_header("start"),
            pad_header("end")
        ));
        for (i, entry) in self.entries.iter().enumerate() {
            lines.push(format!("  {:>2}  {}", i + 1, entry.render()));
        }

        if !self.add_enabled {
            lines.push("(set the first start time to add repeats)".dimmed().to_string());
        }

        lines.join("\n")
    }
}

fn pad_header(name: &str) -> String {
    format!("{:<width$}", name, width = FIELD_WIDTH).dimmed().to_string()
}

impl Render for Transition {
    fn render(&self) -> String {
        let name = match self.operation {
            Operation::Initialise => "initialise",
            Operation::StartChanged => "start changed",
            Operation::EndChanged => "end changed",
            Operation::DurationChanged => "duration changed",
            Operation::EntryAdded => "entry added",
            Operation::EntryRemoved => "entry removed",
            Operation::Validate => "validate",
        };

        if self.is_noop() {
            return format!("{} {}", name, "(no change)".dimmed());
        }

        let mut parts = Vec::new();
        if !self.changed.is_empty() {
            let ids: Vec<String> = self.changed.iter().map(|id| id.to_string()).collect();
            parts.push(format!("updated {}", ids.join(" ")));
        }
        if let Some(id) = self.added {
            parts.push(format!("added {}", id).green().to_string());
        }
        if let Some(id) = self.removed {
            parts.push(format!("removed {}", id).red().to_string());
        }
        if self.duration_changed {
            parts.push("duration".yellow().to_string());
        }

        format!("{} {}", name, parts.join(", ").dimmed())
    }
}
