use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sensorgraph", version, about = "Sensor reading pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the configured source over the trailing window and summarise it
    Run {
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write the rendered chart to this SVG file
        #[arg(long)]
        svg: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Process local line-delimited JSON files or directories
    Files {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        svg: Option<PathBuf>,
        #[arg(long)]
        json: bool,
        #[arg(long)]
        min_readings: Option<usize>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        #[arg(long)]
        time_scaled: bool,
    },
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    Show {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    Init {
        path: PathBuf,
    },
}
