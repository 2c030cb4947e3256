//! Cardforge CLI - command-line interface for card set generation

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, init, run, stats};

#[derive(Parser)]
#[command(name = "cardforge")]
#[command(about = "Batch AI card set generation pipeline", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter run configuration
    Init {
        /// Theme prompt seeded into the config
        #[arg(long)]
        theme: Option<String>,

        /// Where to write the config file
        #[arg(long, default_value = "cardforge.toml")]
        output: String,
    },

    /// Generate a full card set
    Run {
        /// Path to the run config TOML
        #[arg(long, default_value = "cardforge.toml")]
        config: String,

        /// Override the number of batches
        #[arg(long)]
        batches: Option<u32>,

        /// Override the theme prompt
        #[arg(long)]
        theme: Option<String>,

        /// Override the output directory
        #[arg(long)]
        output: Option<String>,

        /// Completion backend (mock, ollama)
        #[arg(long, default_value = "ollama")]
        completion_backend: String,

        /// Image job backend (mock, comfy)
        #[arg(long, default_value = "comfy")]
        image_backend: String,

        /// Render backend (mock, http)
        #[arg(long, default_value = "http")]
        render_backend: String,

        /// Skip basic land generation
        #[arg(long)]
        no_lands: bool,
    },

    /// Show statistics from a checkpoint file
    Stats {
        /// Path to a set_batch_<n>.json or set_complete.json checkpoint
        checkpoint: String,
    },

    /// Show the resolved backend configuration
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { theme, output } => init::run(theme.as_deref(), &output),
        Commands::Run {
            config,
            batches,
            theme,
            output,
            completion_backend,
            image_backend,
            render_backend,
            no_lands,
        } => run::run(run::RunArgs {
            config,
            batches,
            theme,
            output,
            completion_backend,
            image_backend,
            render_backend,
            no_lands,
        }),
        Commands::Stats { checkpoint } => stats::run(&checkpoint),
        Commands::Check => check::run(),
    }
}
