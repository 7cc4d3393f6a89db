use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "emberarc", version, about = "A terminal companion for 30-day discipline arcs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the arc status: day, streak, momentum, week summary
    Status,
    /// Mark one pillar on the current day
    Mark {
        /// Pillar name (body, mind, focus)
        pillar: String,
        /// Chosen task label
        #[arg(long)]
        task: Option<String>,
        /// Free-text reflection note
        #[arg(long)]
        note: Option<String>,
        /// Unmark the pillar instead
        #[arg(long)]
        undo: bool,
    },
    /// Show one day's record
    Day {
        /// Day number 1-30 (defaults to the current day)
        number: Option<u32>,
    },
    /// Show full-arc statistics
    Stats {
        /// Add a 30-day completion strip
        #[arg(long)]
        week: bool,
        /// Emit machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Finalize the arc if day 30 is reached and the full-day quota is met
    Complete,
    /// Start a fresh arc after completing one
    New,
    /// Discard the current arc and start over
    Reset {
        /// Skip the confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Show or change configuration
    Config {
        /// Grant or revoke full-arc access (true/false)
        #[arg(long)]
        entitled: Option<bool>,
    },
    /// Export a plain-text arc summary to stdout
    Export,
}
