//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Personal time tracker.
///
/// Tracks work intervals with tags (`+tag`), a project (`proj:name`) and an
/// external reference (`ref:id`), and summarizes them by day and week.
#[derive(Debug, Parser)]
#[command(name = "gott", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the running interval.
    Status,

    /// Start tracking, stopping whatever is running.
    Start {
        /// Annotation, `+tag`, `proj:name` and `ref:id` tokens.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },

    /// Stop the running interval.
    Stop,

    /// Discard the running interval.
    Cancel,

    /// Re-describe the running interval.
    Annotate {
        /// Annotation, `+tag`, `proj:name` and `ref:id` tokens.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },

    /// Start a new interval like the most recent one.
    #[command(name = "continue")]
    Continue,

    /// Add a duration for a day without clock times.
    Track {
        /// `today`, `yesterday` or a date in the format YYYY-MM-DD.
        date: String,

        /// Elapsed time, e.g. 1h30m.
        duration: String,

        /// Annotation, `+tag`, `proj:name` and `ref:id` tokens.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },

    /// Print intervals grouped by week and day.
    Summary {
        /// Filters: today, yesterday, week, month, all, YYYY-MM-DD, +tag, proj:name.
        filters: Vec<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Edit intervals in an external editor.
    Edit {
        /// Filters: today, yesterday, week, month, all, YYYY-MM-DD, +tag, proj:name.
        filters: Vec<String>,
    },
}
