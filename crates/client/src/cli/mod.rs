// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use clap::{Parser, Subcommand, ValueEnum};

pub use args::{ActivityFields, TripFields};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const QUICKSTART_HELP: &str = "\
Get started:
  tripsync create Tokyo --budget 1500    Plan a trip
  tripsync list                          List trips
  tripsync --offline update <id> --title \"Spring\"
                                         Edit without a connection
  tripsync sync                          Push queued edits";

#[derive(Parser)]
#[command(name = "tripsync")]
#[command(about = "Offline-first trip planner client")]
#[command(
    long_about = "Offline-first trip planner client.\n\n\
    Edits made without a connection are applied locally, queued, and replayed \
    against the trip service on the next sync."
)]
#[command(version)]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Work from the local cache only, without probing the network
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    // ─────────────────────────────────────────────────────────────────────────
    // Trips
    // ─────────────────────────────────────────────────────────────────────────
    /// List trips
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Show a trip and its itinerary
    #[command(arg_required_else_help = true)]
    Show {
        /// Trip ID
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Plan a new trip
    #[command(
        arg_required_else_help = true,
        after_help = "Examples:\n  \
        tripsync create Tokyo                          Destination only\n  \
        tripsync create Lisbon --budget 900            With a budget\n  \
        tripsync create Oslo --start 2026-06-01 --end 2026-06-05"
    )]
    Create {
        /// Destination
        #[arg(value_parser = non_empty_string)]
        destination: String,

        #[command(flatten)]
        fields: TripFields,

        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Edit a trip's properties
    #[command(arg_required_else_help = true)]
    Update {
        /// Trip ID
        id: String,

        /// New destination
        #[arg(long, value_parser = non_empty_string)]
        destination: Option<String>,

        #[command(flatten)]
        fields: TripFields,
    },

    /// Delete a trip
    #[command(arg_required_else_help = true)]
    Delete {
        /// Trip ID
        id: String,
    },

    /// Reorder a trip's itinerary on the server (online only)
    #[command(arg_required_else_help = true)]
    Optimize {
        /// Trip ID
        id: String,
    },

    /// Edit, delete or replace activities
    #[command(subcommand)]
    Activity(ActivityCommand),

    // ─────────────────────────────────────────────────────────────────────────
    // Sync
    // ─────────────────────────────────────────────────────────────────────────
    /// Replay queued edits and refresh the local cache
    Sync,

    /// Show queued edits
    Pending {
        /// Show operations that exceeded the retry ceiling instead
        #[arg(long)]
        dead: bool,

        /// Discard every dead letter
        #[arg(long, requires = "dead", conflicts_with = "requeue")]
        clear: bool,

        /// Move every dead letter back onto the queue with its attempts reset
        #[arg(long, requires = "dead")]
        requeue: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Show network and sync status
    Status {
        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Stay running and sync whenever the connection comes back
    Watch {
        /// Seconds between connectivity probes (overrides config)
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[derive(Subcommand)]
pub enum ActivityCommand {
    /// Edit an activity
    #[command(arg_required_else_help = true)]
    Update {
        /// Activity ID
        id: String,

        #[command(flatten)]
        fields: ActivityFields,
    },

    /// Delete an activity (online only)
    #[command(arg_required_else_help = true)]
    Delete {
        /// Activity ID
        id: String,
    },

    /// Ask the server for an alternative activity (online only)
    #[command(arg_required_else_help = true)]
    Replace {
        /// Activity ID
        id: String,

        /// What to avoid or prefer in the alternative
        #[arg(long, short)]
        reason: Option<String>,
    },
}

#[cfg(test)]
#[path = "../cli_tests.rs"]
mod tests;
