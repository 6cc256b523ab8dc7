mod commands;
mod render;
mod script;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fulcrum_core::config::FulcrumConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fulcrum")]
#[command(about = "Plan recurring society events and export them as iCalendar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out a repeating event from its first occurrence
    Plan {
        /// Start of the first occurrence (e.g. "2025-03-20T18:00")
        #[arg(short, long)]
        start: String,

        /// End of the first occurrence; defines the duration of every repeat
        #[arg(short, long)]
        end: Option<String>,

        /// Duration as DD:HH:MM or e.g. "2h 30m"
        #[arg(short, long)]
        duration: Option<String>,

        /// Number of repeats to add after the first occurrence
        #[arg(short, long, default_value_t = 0)]
        repeat: usize,

        /// Print the form as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply a script of form edits and show the result
    Replay {
        script: PathBuf,

        /// Print the form as JSON
        #[arg(long)]
        json: bool,

        /// Show what each step changed
        #[arg(short, long)]
        verbose: bool,
    },
    /// Replay a script and write the occurrences as an .ics file
    Export {
        script: PathBuf,

        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Output path (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show config path and settings
    Config {
        /// Set the timezone event times are entered in (IANA name)
        #[arg(long)]
        timezone: Option<String>,

        /// Set the days between repeats before a pattern exists
        #[arg(long)]
        repeat_interval_days: Option<i64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = FulcrumConfig::load()?;

    match cli.command {
        Commands::Plan {
            start,
            end,
            duration,
            repeat,
            json,
        } => commands::plan::run(start, end, duration, repeat, json, &config),
        Commands::Replay {
            script,
            json,
            verbose,
        } => commands::replay::run(&script, json, verbose, &config),
        Commands::Export {
            script,
            title,
            location,
            description,
            output,
        } => commands::export::run(&script, title, location, description, output, &config),
        Commands::Config {
            timezone,
            repeat_interval_days,
        } => commands::config::run(config, timezone, repeat_interval_days),
    }
}
