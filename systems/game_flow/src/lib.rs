#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn loop controller for Pipe Flow.
//!
//! [`GameFlow`] walks the phases `Loading → MainMenu → BoardActive →
//! Evaluating → RoundResult`, alternating player placements with the round
//! countdown and, once the countdown elapses, letting water flow from the
//! start cell. Adapters feed it external signals (assets ready, start and
//! restart actions, cell selections, elapsed time) and render the [`Event`]
//! values it emits.

mod config;
mod results;
mod timer;

pub use config::GameConfig;
pub use results::ResultBoard;
pub use timer::{Countdown, CountdownProgress};

use std::time::Duration;

use log::{debug, info, warn};
use pipe_flow_core::{
    CellCoord, ConfigError, Event, GamePhase, MoveToken, Pipe, SelectionRejection,
};
use pipe_flow_system_tile_queue::{TileGenerator, TileQueue};
use pipe_flow_system_water_flow::{FlowTree, WaterFlow};
use pipe_flow_world::Grid;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Orchestrates rounds over a grid, a tile queue and a countdown.
#[derive(Debug)]
pub struct GameFlow {
    config: GameConfig,
    phase: GamePhase,
    grid: Grid,
    queue: TileQueue,
    countdown: Countdown,
    flow: Option<WaterFlow>,
    water_accumulator: Duration,
    results: ResultBoard,
    last_flow: Option<FlowTree>,
    moves_exhausted: bool,
    rng: ChaCha8Rng,
}

impl GameFlow {
    /// Creates a controller in the loading phase.
    ///
    /// The configuration is validated up front; `seed` drives every random
    /// choice so sessions are reproducible.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let grid = Grid::new(config.grid)?;
        let queue = TileQueue::new(config.queue_length, TileGenerator::new());
        let countdown = Countdown::new(config.round_duration, config.tick_interval);

        Ok(Self {
            config,
            phase: GamePhase::Loading,
            grid,
            queue,
            countdown,
            flow: None,
            water_accumulator: Duration::ZERO,
            results: ResultBoard::new(),
            last_flow: None,
            moves_exhausted: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Signals that external resources are ready; moves to the main menu.
    pub fn assets_ready(&mut self, out: &mut Vec<Event>) {
        if self.phase == GamePhase::Loading {
            self.set_phase(GamePhase::MainMenu, out);
        }
    }

    /// Handles the start action from the main menu and begins the first round.
    pub fn start(&mut self, out: &mut Vec<Event>) -> Result<(), ConfigError> {
        if self.phase != GamePhase::MainMenu {
            debug!("start ignored in {:?}", self.phase);
            return Ok(());
        }

        info!("start clicked");
        self.begin_round(out)
    }

    /// Abandons the current round and begins a fresh one.
    ///
    /// Has no effect before the first round was started. When the new board
    /// cannot host a start cell the controller falls back to the main menu
    /// with the clock stopped, and no result is recorded.
    pub fn restart(&mut self, out: &mut Vec<Event>) -> Result<(), ConfigError> {
        match self.phase {
            GamePhase::Loading | GamePhase::MainMenu => {
                debug!("restart ignored in {:?}", self.phase);
                Ok(())
            }
            GamePhase::BoardActive | GamePhase::Evaluating | GamePhase::RoundResult => {
                info!("restart");
                self.begin_round(out)
            }
        }
    }

    /// Delivers a player selection carrying the token of the move it answers.
    ///
    /// On success the queue's current tile lands on `cell` and the next move
    /// is awaited; otherwise a [`Event::SelectionRejected`] is emitted.
    pub fn select(&mut self, cell: CellCoord, token: MoveToken, out: &mut Vec<Event>) {
        if self.phase != GamePhase::BoardActive {
            out.push(Event::SelectionRejected {
                cell,
                reason: SelectionRejection::NotAwaitingMove,
            });
            return;
        }

        let queue = &mut self.queue;
        let rng = &mut self.rng;
        let mut placed: Option<Pipe> = None;
        let outcome = self.grid.resolve_move(token, cell, |target| {
            if let Some(pipe) = queue.take_current(rng) {
                if target.place_pipe(pipe) {
                    placed = Some(pipe);
                }
            }
        });

        match (outcome, placed) {
            (Ok(cell), Some(pipe)) => {
                debug!(
                    "placed {:?} at ({}, {})",
                    pipe.kind(),
                    cell.column(),
                    cell.row()
                );
                out.push(Event::PipePlaced { cell, pipe });
                self.await_next_move(out);
            }
            (Ok(cell), None) => {
                out.push(Event::SelectionRejected {
                    cell,
                    reason: SelectionRejection::InactiveCell,
                });
                self.await_next_move(out);
            }
            (Err(reason), _) => {
                out.push(Event::SelectionRejected { cell, reason });
            }
        }
    }

    /// Advances the round clock or the water flow by `dt`.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        match self.phase {
            GamePhase::BoardActive => {
                let progress = self.countdown.advance(dt);
                if progress.ticks > 0 {
                    out.push(Event::TimeAdvanced {
                        remaining: self.countdown.remaining(),
                    });
                }
                if progress.expired {
                    out.push(Event::TimerExpired);
                    self.begin_evaluation(out);
                }
            }
            GamePhase::Evaluating => self.advance_water(dt, out),
            GamePhase::Loading | GamePhase::MainMenu | GamePhase::RoundResult => {}
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Configuration the controller was built with.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Board state.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Upcoming tiles.
    #[must_use]
    pub const fn queue(&self) -> &TileQueue {
        &self.queue
    }

    /// Tile the next placement will use.
    #[must_use]
    pub fn current_pipe(&self) -> Option<&Pipe> {
        self.queue.current()
    }

    /// Coordinate of the round's start cell.
    #[must_use]
    pub fn start_cell(&self) -> Option<CellCoord> {
        self.grid.start_cell().map(|cell| cell.coord())
    }

    /// Token the next selection must carry, if a move is awaited.
    #[must_use]
    pub const fn pending_move(&self) -> Option<MoveToken> {
        self.grid.pending_move()
    }

    /// Reports whether the board ran out of cells before the timer elapsed.
    #[must_use]
    pub const fn moves_exhausted(&self) -> bool {
        self.moves_exhausted
    }

    /// Time left in the round.
    #[must_use]
    pub const fn remaining_time(&self) -> Duration {
        self.countdown.remaining()
    }

    /// Cells reached by the water in the current or most recent round.
    #[must_use]
    pub fn current_score(&self) -> u32 {
        match (&self.flow, &self.last_flow) {
            (Some(flow), _) => flow.tree().reached(),
            (None, Some(tree)) => tree.reached(),
            (None, None) => 0,
        }
    }

    /// Best score across rounds.
    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.results.best()
    }

    /// Every recorded round score.
    #[must_use]
    pub const fn results(&self) -> &ResultBoard {
        &self.results
    }

    /// Flow tree of the most recently finished round.
    #[must_use]
    pub const fn last_flow(&self) -> Option<&FlowTree> {
        self.last_flow.as_ref()
    }

    fn begin_round(&mut self, out: &mut Vec<Event>) -> Result<(), ConfigError> {
        self.flow = None;
        self.last_flow = None;
        self.water_accumulator = Duration::ZERO;
        self.moves_exhausted = false;

        let start = match self.grid.reset(Pipe::start(), &mut self.rng) {
            Ok(start) => start,
            Err(error) => {
                warn!("round setup failed: {error}");
                self.countdown.stop();
                self.queue.deactivate();
                self.set_phase(GamePhase::MainMenu, out);
                return Err(error);
            }
        };
        out.push(Event::BoardReset {
            start,
            blocked: self.grid.blocked_cells(),
        });

        self.queue.reset(&mut self.rng);
        self.grid.activate();
        self.countdown.reset();
        self.set_phase(GamePhase::BoardActive, out);
        self.await_next_move(out);
        Ok(())
    }

    fn await_next_move(&mut self, out: &mut Vec<Event>) {
        match self.grid.await_move() {
            Some(token) => out.push(Event::MoveAwaited {
                token,
                candidates: self.grid.active_cells().len(),
            }),
            None => {
                debug!("no active cells left, waiting for the timer");
                self.moves_exhausted = true;
                out.push(Event::MovesExhausted);
            }
        }
    }

    fn begin_evaluation(&mut self, out: &mut Vec<Event>) {
        self.grid.deactivate();
        self.queue.deactivate();
        self.flow = WaterFlow::from_start(&self.grid);
        self.water_accumulator = Duration::ZERO;
        self.set_phase(GamePhase::Evaluating, out);
        self.advance_water(Duration::ZERO, out);
    }

    fn advance_water(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let delay = self.config.water_step_delay;
        let finished = match self.flow.as_mut() {
            Some(flow) => {
                if delay.is_zero() {
                    while !flow.is_finished() {
                        emit_wave(flow, &mut self.grid, out);
                    }
                } else {
                    self.water_accumulator = self.water_accumulator.saturating_add(dt);
                    while self.water_accumulator >= delay && !flow.is_finished() {
                        self.water_accumulator -= delay;
                        emit_wave(flow, &mut self.grid, out);
                    }
                }
                flow.is_finished()
            }
            None => true,
        };

        if finished {
            self.finish_round(out);
        }
    }

    fn finish_round(&mut self, out: &mut Vec<Event>) {
        let tree = self.flow.take().map(WaterFlow::into_tree);
        let score = tree.as_ref().map_or(0, FlowTree::reached);
        let longest_branch = tree.as_ref().map_or(0, FlowTree::longest_branch);
        let new_best = self.results.record(score);
        info!("new result: {score} (best {})", self.results.best());

        out.push(Event::RoundFinished {
            score,
            longest_branch,
            best: self.results.best(),
            new_best,
        });
        self.last_flow = tree;
        self.grid.deactivate();
        self.set_phase(GamePhase::RoundResult, out);
    }

    fn set_phase(&mut self, phase: GamePhase, out: &mut Vec<Event>) {
        if self.phase == phase {
            return;
        }

        debug!("{}: {:?} -> {:?}", self.config.game_name, self.phase, phase);
        self.phase = phase;
        out.push(Event::PhaseChanged { phase });
    }
}

fn emit_wave(flow: &mut WaterFlow, grid: &mut Grid, out: &mut Vec<Event>) {
    for node in flow.advance(grid) {
        out.push(Event::CellFilled {
            cell: node.cell(),
            depth: node.depth(),
        });
    }
}
