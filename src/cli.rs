use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Community events: schedule events, collect star ratings, review analytics
/// and ask for AI event ideas
#[derive(Parser, Debug, Clone)]
#[command(name = "community_events")]
#[command(version, long_about = None)]
pub struct Args {
    /// Use in-memory database for testing
    #[arg(long, global = true)]
    pub test: bool,

    /// Custom database file path
    #[arg(long, value_name = "PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Override the date stamped on new rows (YYYY-MM-DD format)
    #[arg(long, value_name = "DATE", global = true)]
    pub override_date: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Start the HTTP API
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Create a new event
    AddEvent {
        #[arg(long)]
        title: String,
        #[arg(long)]
        location: String,
        /// Event date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Start time (HH:MM or HH:MM:SS)
        #[arg(long)]
        time: NaiveTime,
        #[arg(long)]
        description: String,
    },
    /// List events by date
    Events {
        /// Newest date first
        #[arg(long)]
        desc: bool,
    },
    /// Rate an event from 1 to 5 stars
    SubmitFeedback {
        #[arg(long)]
        event_id: i64,
        #[arg(long)]
        rating: i32,
        #[arg(long)]
        comment: Option<String>,
    },
    /// List submitted feedback, newest first
    Feedback,
    /// Print rating analytics
    Analytics {
        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// Generate event ideas from the most recent events
    Suggest,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Validate the override_date argument if provided
    pub fn validate_override_date(&self) -> Result<Option<NaiveDate>, String> {
        match &self.override_date {
            Some(date_str) => NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| {
                    format!(
                        "Invalid date format for --override-date: '{}'. Expected YYYY-MM-DD",
                        date_str
                    )
                }),
            None => Ok(None),
        }
    }
}
