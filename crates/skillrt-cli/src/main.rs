use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod result_json;
mod snapshot_files;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Run { skill_file, input, input_file } => commands::run(&cwd, skill_file, input, input_file).await,
        Commands::Resume {
            skill_file,
            execution_id,
            input,
            input_file,
        } => commands::resume(&cwd, skill_file, execution_id, input, input_file).await,
        Commands::Sweep => commands::sweep(&cwd).await,
    }
}
