use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "skillrt", version, about = "Agent Skill Runtime demo CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a skill document and execute it from a fresh input map.
    Run {
        /// Path to a skill document (Markdown + YAML frontmatter).
        skill_file: PathBuf,

        /// Input map as a JSON object; defaults to `{}`.
        #[arg(long, conflicts_with = "input_file")]
        input: Option<String>,

        /// Read the input map as JSON from a file instead of `--input`.
        #[arg(long)]
        input_file: Option<PathBuf>,
    },

    /// Resume a suspended execution previously reported by `run` or `resume`.
    Resume {
        /// The same skill document the execution was started from.
        skill_file: PathBuf,

        /// The `executionId` printed when the execution suspended.
        execution_id: String,

        /// User-supplied input satisfying the await step's schema.
        #[arg(long, conflicts_with = "input_file")]
        input: Option<String>,

        #[arg(long)]
        input_file: Option<PathBuf>,
    },

    /// Sweep every suspended execution older than the configured timeout.
    Sweep,
}
