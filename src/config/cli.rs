use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "leaderboard")]
#[command(about = "Ranks badge and arcade completions from a CSV roster")]
pub struct Cli {
    /// Path to TOML configuration file (defaults to ./leaderboard.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rank a roster file offline without touching the store
    Rank {
        #[arg(long)]
        csv: PathBuf,

        /// JSON object of email -> fixed rank
        #[arg(long)]
        overrides: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Only show participants whose name or email contains this text
        #[arg(long)]
        search: Option<String>,
    },

    /// Parse a roster and replace the stored participants with it
    Import {
        #[arg(long)]
        csv: PathBuf,

        /// Parse and report without committing
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage fixed rankings
    Overrides {
        #[command(subcommand)]
        action: OverrideAction,
    },

    /// Write the current leaderboard to the export directory
    Export {
        /// Override export.output_path
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Run the HTTP API
    Serve {
        /// Override server.port
        #[arg(short, long)]
        port: Option<u16>,

        /// Emit JSON log lines
        #[arg(long)]
        json_logs: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum OverrideAction {
    /// Print the stored mapping
    List,
    /// Pin one participant to a rank
    Set { email: String, rank: u32 },
    /// Remove one participant's fixed rank
    Remove { email: String },
    /// Replace the mapping with a JSON object file
    Load { file: PathBuf },
}
