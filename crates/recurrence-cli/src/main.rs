//! `recur` CLI -- preview and finalize recurring event drafts from the command line.
//!
//! A draft is the JSON form of `RecurrenceDraft`:
//!
//! ```json
//! {
//!   "window": {"base_date": "2024-01-01", "start_time": "09:00", "end_time": "10:00"},
//!   "spec": {"kind": "weekly", "weekdays": ["Mon", "Wed"], "terminator": {"by_count": 4}},
//!   "exclusions": ["2024-01-03T09:00:00"]
//! }
//! ```
//!
//! ## Usage
//!
//! ```sh
//! # Preview occurrences (stdin → stdout)
//! cat draft.json | recur expand
//!
//! # One line per occurrence
//! recur expand -i draft.json --text
//!
//! # Rows to persist, base occurrence first
//! recur finalize -i draft.json -o rows.json
//!
//! # Duration of a window in minutes
//! recur duration --start 09:00 --end 10:30
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use recurrence_engine::{EventWindow, GeneratedOccurrence, RecurrenceDraft};
use serde::Serialize;
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "recur",
    version,
    about = "Recurring event occurrence generator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log engine decisions to stderr (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Preview the occurrences of a draft, exclusions applied
    Expand {
        /// Draft JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Print one occurrence per line instead of JSON
        #[arg(long)]
        text: bool,
    },
    /// Produce the event rows to persist, base occurrence first
    Finalize {
        /// Draft JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print the duration of a start/end window in minutes
    Duration {
        /// Start time of day (HH:MM or HH:MM:SS)
        #[arg(long)]
        start: String,
        /// End time of day (HH:MM or HH:MM:SS)
        #[arg(long)]
        end: String,
    },
}

/// A row handed to the persistence layer. Each occurrence is stored independently.
#[derive(Serialize)]
struct EventRow {
    start: String,
    end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    arrival: Option<String>,
}

impl From<&GeneratedOccurrence> for EventRow {
    fn from(o: &GeneratedOccurrence) -> Self {
        Self {
            start: o.start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            end: o.end.format("%Y-%m-%dT%H:%M:%S").to_string(),
            arrival: o
                .arrival
                .map(|a| a.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Expand { input, text } => {
            let draft = read_draft(input.as_deref())?;
            let occurrences = draft.preview();

            if text {
                for o in &occurrences {
                    println!("{}  {} -> {}", o.id, o.start, o.end);
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&occurrences)?);
            }
        }
        Commands::Finalize { input, output } => {
            let draft = read_draft(input.as_deref())?;
            let occurrences = draft
                .finalize()
                .context("Draft cannot be finalized")?;
            let rows: Vec<EventRow> = occurrences.iter().map(EventRow::from).collect();
            let json = serde_json::to_string_pretty(&rows)?;
            write_output(output.as_deref(), &json)?;
        }
        Commands::Duration { start, end } => {
            // The date is irrelevant to a same-day duration.
            let window = EventWindow::new(NaiveDate::default(), start, end);
            let duration = recurrence_engine::compute_duration(&window)
                .context("Failed to compute duration")?;
            println!("{}", duration.num_minutes());
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_draft(path: Option<&str>) -> Result<RecurrenceDraft> {
    let json = read_input(path)?;
    serde_json::from_str(&json).context("Failed to parse draft JSON")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
