#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Pipe Flow in a terminal.

mod args;
mod session;
mod settings;
mod terminal;

use std::io;

use anyhow::Result;
use clap::Parser;
use log::info;

use crate::{
    args::Cli,
    session::Session,
    terminal::{LoggedAudio, TerminalBackend},
};

/// Entry point for the Pipe Flow command-line interface.
fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = settings::resolve(&cli)?;
    let seed = cli.seed.unwrap_or_else(rand::random);
    info!("starting {} with seed {seed}", config.game_name);

    match cli.autoplay {
        Some(rounds) => {
            let summaries = session::autoplay(config, seed, rounds)?;
            for (index, round) in summaries.iter().enumerate() {
                println!(
                    "round {}: score {} (longest branch {}, max {}){}",
                    index + 1,
                    round.score,
                    round.longest_branch,
                    round.best,
                    if round.new_best { " new best" } else { "" }
                );
            }
            Ok(())
        }
        None => {
            let backend = TerminalBackend::new(io::stdout().lock());
            let mut session = Session::new(config, seed, backend, LoggedAudio, true)?;
            session.run(io::stdin().lock())
        }
    }
}
