use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "duplicaci", version, about = "Run duplicacy locally, in a container, or over ssh")]
pub struct Cli {
    /// Config file
    #[arg(short, long, global = true, default_value = crate::config::DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Print commands without executing them
    #[arg(short = 'd', long = "dry-run", global = true)]
    pub dry_run: bool,

    /// Show composed commands and debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a duplicacy command through the configured context
    Exec {
        /// Storage whose password should be exported
        #[arg(short, long, default_value = "")]
        storage: String,

        #[arg(last = true, required = true)]
        args: Vec<String>,
    },

    /// Print the composed command with secrets masked
    Compose {
        #[arg(short, long, default_value = "")]
        storage: String,

        #[arg(last = true, required = true)]
        args: Vec<String>,
    },

    /// Back up to each storage
    Backup {
        #[arg(required = true)]
        storages: Vec<String>,

        /// Extra backup flags, replacing `[backup] options`
        #[arg(long, allow_hyphen_values = true)]
        options: Option<String>,
    },

    /// Prune old revisions from each storage
    Prune {
        #[arg(required = true)]
        storages: Vec<String>,

        /// Retention flags, replacing the configured retention
        #[arg(long, allow_hyphen_values = true)]
        options: Option<String>,
    },

    /// Check storages and record their statistics
    Check {
        #[arg(required = true)]
        storages: Vec<String>,

        /// Print statistics but don't persist them
        #[arg(long)]
        no_stats: bool,
    },

    /// Parse a saved `check -tabular` report ("-" for stdin)
    Parse { file: PathBuf },
}
