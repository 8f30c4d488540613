//! Interactive and automated play loops.

use std::{
    io::{BufRead, Write},
    thread,
    time::{Duration, Instant},
};

use anyhow::{bail, Context, Result};
use log::info;
use pipe_flow_core::{CellCoord, Event, GamePhase, SelectionRejection, WELCOME_BANNER};
use pipe_flow_rendering::{cues_for, AudioSink, Color, Presentation, RenderingBackend, Scene};
use pipe_flow_system_game_flow::{GameConfig, GameFlow};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::terminal::TerminalBackend;

const BACKGROUND: Color = Color::from_rgb_u8(18, 24, 38);

const USAGE: &str = "commands: <column> <row> places the next pipe, r restarts, q quits";

/// A line of player input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Place(CellCoord),
    Restart,
    Quit,
    Unknown(String),
}

/// Parses a line of input; blank lines yield `None`.
pub(crate) fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let command = match line {
        "q" | "quit" => Command::Quit,
        "r" | "restart" => Command::Restart,
        _ => {
            let mut parts = line.split_whitespace();
            let column = parts.next().and_then(|part| part.parse().ok());
            let row = parts.next().and_then(|part| part.parse().ok());
            match (column, row, parts.next()) {
                (Some(column), Some(row), None) => Command::Place(CellCoord::new(column, row)),
                _ => Command::Unknown(line.to_owned()),
            }
        }
    };

    Some(command)
}

/// Game wired to a terminal backend and an audio sink.
pub(crate) struct Session<W, A> {
    game: GameFlow,
    backend: TerminalBackend<W>,
    audio: A,
    events: Vec<Event>,
    animate_water: bool,
}

impl<W: Write, A: AudioSink> Session<W, A> {
    /// Boots a game straight into its first round and draws it.
    pub(crate) fn new(
        config: GameConfig,
        seed: u64,
        backend: TerminalBackend<W>,
        audio: A,
        animate_water: bool,
    ) -> Result<Self> {
        let game = GameFlow::new(config, seed).context("failed to set up the game")?;
        let mut session = Self {
            game,
            backend,
            audio,
            events: Vec::new(),
            animate_water,
        };

        session.backend.message(WELCOME_BANNER)?;
        session.backend.message(USAGE)?;
        session.game.assets_ready(&mut session.events);
        session
            .game
            .start(&mut session.events)
            .context("failed to start the first round")?;
        session.flush()?;
        Ok(session)
    }

    /// Reads commands until `q` or end of input.
    ///
    /// Wall-clock time between lines drives the round countdown.
    pub(crate) fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        let mut last = Instant::now();
        for line in input.lines() {
            let line = line.context("failed to read input")?;
            let now = Instant::now();
            self.advance(now.duration_since(last))?;
            last = now;

            let Some(command) = parse_command(&line) else {
                continue;
            };
            if !self.handle(command)? {
                break;
            }
        }

        Ok(())
    }

    fn handle(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Quit => return Ok(false),
            Command::Restart => self
                .game
                .restart(&mut self.events)
                .context("failed to restart the round")?,
            Command::Place(cell) => match self.game.pending_move() {
                Some(token) => self.game.select(cell, token, &mut self.events),
                None => self
                    .backend
                    .message("no move is awaited right now; press r for a new round")?,
            },
            Command::Unknown(line) => {
                self.backend.message(&format!("unknown command `{line}`"))?;
                self.backend.message(USAGE)?;
            }
        }

        self.flush()?;
        Ok(true)
    }

    fn advance(&mut self, elapsed: Duration) -> Result<()> {
        self.game.tick(elapsed, &mut self.events);
        let step = self
            .game
            .config()
            .water_step_delay
            .max(self.game.config().tick_interval);
        while self.game.phase() == GamePhase::Evaluating {
            self.flush()?;
            if self.animate_water {
                thread::sleep(step);
            }
            self.game.tick(step, &mut self.events);
        }

        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        if self.events.is_empty() {
            return Ok(());
        }

        for cue in cues_for(&self.events) {
            self.audio.play(cue);
        }
        let events = std::mem::take(&mut self.events);
        for event in &events {
            if let Some(text) = describe(event) {
                self.backend.message(&text)?;
            }
        }

        let presentation = Presentation::new(
            self.game.config().game_name.clone(),
            BACKGROUND,
            Scene::capture(&self.game),
        );
        self.backend.present(&presentation)
    }

    #[cfg(test)]
    pub(crate) fn game(&self) -> &GameFlow {
        &self.game
    }

    #[cfg(test)]
    pub(crate) fn into_backend(self) -> TerminalBackend<W> {
        self.backend
    }
}

fn describe(event: &Event) -> Option<String> {
    match event {
        Event::SelectionRejected { cell, reason } => {
            let why = match reason {
                SelectionRejection::NotAwaitingMove => "no move is awaited",
                SelectionRejection::StaleToken => "the move already ended",
                SelectionRejection::InactiveCell => "the cell is not free",
                SelectionRejection::OutOfBounds => "the cell is outside the board",
            };
            Some(format!(
                "cannot place at ({}, {}): {why}",
                cell.column(),
                cell.row()
            ))
        }
        Event::MovesExhausted => Some(String::from("board full, waiting for the timer")),
        Event::TimerExpired => Some(String::from("time is up, water is flowing")),
        Event::RoundFinished {
            score,
            longest_branch,
            best,
            new_best,
        } => Some(format!(
            "round over: {score} cells reached, longest branch {longest_branch}, max {best}{}",
            if *new_best { " (new best!)" } else { "" }
        )),
        _ => None,
    }
}

/// Outcome of one automatically played round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RoundSummary {
    pub(crate) score: u32,
    pub(crate) longest_branch: u32,
    pub(crate) best: u32,
    pub(crate) new_best: bool,
}

/// Plays `rounds` rounds with random legal moves on a simulated clock.
pub(crate) fn autoplay(config: GameConfig, seed: u64, rounds: u32) -> Result<Vec<RoundSummary>> {
    let move_time = config.tick_interval * 4;
    let water_step = config.water_step_delay.max(config.tick_interval);
    let mut game = GameFlow::new(config, seed).context("failed to set up the game")?;
    let mut picker = ChaCha8Rng::seed_from_u64(seed.rotate_left(32));
    let mut events = Vec::new();
    let mut summaries = Vec::new();

    game.assets_ready(&mut events);
    game.start(&mut events)
        .context("failed to start the first round")?;

    while summaries.len() < rounds as usize {
        match game.phase() {
            GamePhase::BoardActive => {
                if let Some(token) = game.pending_move() {
                    let candidates = game.grid().active_cells();
                    if let Some(cell) = candidates.choose(&mut picker) {
                        game.select(*cell, token, &mut events);
                    }
                }
                game.tick(move_time, &mut events);
            }
            GamePhase::Evaluating => game.tick(water_step, &mut events),
            GamePhase::RoundResult => game
                .restart(&mut events)
                .context("failed to restart the round")?,
            phase @ (GamePhase::Loading | GamePhase::MainMenu) => {
                bail!("autoplay stalled in {phase:?}")
            }
        }

        for event in events.drain(..) {
            if let Event::RoundFinished {
                score,
                longest_branch,
                best,
                new_best,
            } = event
            {
                info!("autoplay round {}: {score}", summaries.len() + 1);
                summaries.push(RoundSummary {
                    score,
                    longest_branch,
                    best,
                    new_best,
                });
            }
        }
    }

    Ok(summaries)
}
