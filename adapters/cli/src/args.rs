//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Pipe Flow: lay pipes from the queue before the clock runs out, then watch the water go.
#[derive(Parser, Debug, Default)]
#[command(name = "pipe-flow")]
#[command(about = "Terminal pipe-laying puzzle", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    /// TOML file with game settings; flags below override it
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Seed for board layout and tile generation
    #[arg(short, long)]
    pub(crate) seed: Option<u64>,

    /// Number of board columns
    #[arg(long)]
    pub(crate) columns: Option<u32>,

    /// Number of board rows
    #[arg(long)]
    pub(crate) rows: Option<u32>,

    /// Number of blocked cells per round
    #[arg(long)]
    pub(crate) blocked: Option<u32>,

    /// Round duration in milliseconds
    #[arg(long)]
    pub(crate) round_ms: Option<u64>,

    /// Number of visible tiles in the queue
    #[arg(long)]
    pub(crate) queue_length: Option<usize>,

    /// Play the given number of rounds with random moves and print the scores
    #[arg(long, value_name = "ROUNDS")]
    pub(crate) autoplay: Option<u32>,
}
