use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::domain::{GroupId, MatchOrderingStrategy};

#[derive(Parser, Debug)]
#[command(author, version, about = "Standings and match scheduling for racket-sport tournaments")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Print ranked standings computed from a snapshot file
    Standings {
        /// Tournament snapshot (JSON)
        snapshot: PathBuf,
        /// Only this group
        #[arg(short, long)]
        group: Option<GroupId>,
    },
    /// Calculate the match order of a snapshot file
    Order {
        /// Tournament snapshot (JSON)
        snapshot: PathBuf,
        /// One of balanced_load, court_efficient, time_sequential, group_clustered
        #[arg(short, long, default_value = "time_sequential")]
        strategy: MatchOrderingStrategy,
        /// Recalculate even if the snapshot is already ordered
        #[arg(short, long)]
        force: bool,
        /// Write the updated snapshot here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Assign courts and times to unscheduled matches inside a date range
    Schedule {
        /// Tournament snapshot (JSON)
        snapshot: PathBuf,
        /// Range start (ISO-8601)
        #[arg(long)]
        start: String,
        /// Range end (ISO-8601)
        #[arg(long)]
        end: String,
        /// Defaults to the snapshot's last strategy, then the configured one
        #[arg(short, long)]
        strategy: Option<MatchOrderingStrategy>,
        /// Write the updated snapshot here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}
