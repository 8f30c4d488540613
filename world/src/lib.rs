#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for Pipe Flow.
//!
//! The [`Grid`] exclusively owns every [`Cell`], re-randomises blockers and the
//! start cell each round, hands out the race between active cells for the next
//! player move, and answers the connection-matching question that water flow
//! depends on: which neighbours can water move into from a given cell.

mod cell;

pub use cell::{Cell, CellState};

use log::{debug, trace};
use pipe_flow_core::{
    CellCoord, ConfigError, Direction, GridConfig, MoveToken, Pipe, SelectionRejection,
};
use rand::Rng;

/// Neighbouring cell that water can move into, together with the direction taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Neighbour {
    direction: Direction,
    cell: CellCoord,
}

impl Neighbour {
    /// Creates a new neighbour descriptor.
    #[must_use]
    pub const fn new(direction: Direction, cell: CellCoord) -> Self {
        Self { direction, cell }
    }

    /// Direction from the origin cell toward the neighbour.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Coordinate of the neighbour.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }
}

/// Fixed-size board of cells.
#[derive(Clone, Debug)]
pub struct Grid {
    config: GridConfig,
    cells: Vec<Cell>,
    start: Option<CellCoord>,
    generation: u64,
    pending: Option<MoveToken>,
}

impl Grid {
    /// Builds an empty grid after validating the configuration.
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut cells = Vec::with_capacity(usize::try_from(config.capacity()).unwrap_or(0));
        for row in 0..config.rows() {
            for column in 0..config.columns() {
                cells.push(Cell::new(CellCoord::new(column, row)));
            }
        }

        Ok(Self {
            config,
            cells,
            start: None,
            generation: 0,
            pending: None,
        })
    }

    /// Configuration the grid was built from.
    #[must_use]
    pub const fn config(&self) -> GridConfig {
        self.config
    }

    /// Iterates every cell in grid-scan order (row by row, left to right).
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Bounds-checked lookup by column and row.
    #[must_use]
    pub fn find_cell(&self, column: u32, row: u32) -> Option<&Cell> {
        self.cell(CellCoord::new(column, row))
    }

    /// Bounds-checked lookup by coordinate.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        self.index(coord).and_then(|index| self.cells.get(index))
    }

    /// Mutable bounds-checked lookup by coordinate.
    pub fn cell_mut(&mut self, coord: CellCoord) -> Option<&mut Cell> {
        let index = self.index(coord)?;
        self.cells.get_mut(index)
    }

    /// Cell holding the start tile, if a round has been set up.
    #[must_use]
    pub fn start_cell(&self) -> Option<&Cell> {
        self.start.and_then(|coord| self.cell(coord))
    }

    /// Cells blocked for the current round in grid-scan order.
    #[must_use]
    pub fn blocked_cells(&self) -> Vec<CellCoord> {
        self.cells
            .iter()
            .filter(|cell| cell.is_blocked())
            .map(Cell::coord)
            .collect()
    }

    /// Clears the board and re-randomises blockers and the start cell.
    ///
    /// Exactly `blocked` distinct cells are blocked, then the start cell is
    /// drawn from the unblocked cells outside the last row and receives
    /// `start_pipe`. Any pending move wait is abandoned.
    pub fn reset<R: Rng>(
        &mut self,
        start_pipe: Pipe,
        rng: &mut R,
    ) -> Result<CellCoord, ConfigError> {
        self.cancel_move();
        self.start = None;
        for cell in &mut self.cells {
            cell.reset();
        }

        let capacity = self.cells.len();
        let target = usize::try_from(self.config.blocked())
            .unwrap_or(usize::MAX)
            .min(capacity);
        let mut chosen: Vec<usize> = Vec::with_capacity(target);
        while chosen.len() < target {
            let index = rng.gen_range(0..capacity);
            if !chosen.contains(&index) {
                chosen.push(index);
            }
        }
        for index in chosen {
            let _ = self.cells[index].block();
        }

        let last_row = self.config.rows().saturating_sub(1);
        let candidates: Vec<CellCoord> = self
            .cells
            .iter()
            .filter(|cell| !cell.is_blocked() && cell.coord().row() < last_row)
            .map(Cell::coord)
            .collect();
        if candidates.is_empty() {
            return Err(ConfigError::NoStartCandidates);
        }

        let start = candidates[rng.gen_range(0..candidates.len())];
        let _ = self.set_start_pipe(start, start_pipe);
        debug!(
            "grid reset: start at ({}, {}), {} blocked",
            start.column(),
            start.row(),
            target
        );
        Ok(start)
    }

    /// Designates `coord` as the start cell holding `pipe`.
    ///
    /// The previous start cell, if any, is emptied. Fails for coordinates
    /// outside the grid and for blocked cells.
    pub fn set_start_pipe(&mut self, coord: CellCoord, pipe: Pipe) -> bool {
        let Some(index) = self.index(coord) else {
            return false;
        };
        if self.cells[index].is_blocked() {
            return false;
        }

        if let Some(previous) = self.start.take() {
            if let Some(cell) = self.cell_mut(previous) {
                cell.reset();
            }
        }

        self.cells[index].install_start(pipe);
        self.start = Some(coord);
        true
    }

    /// Blocks the cell at `coord`; occupied cells are left untouched.
    pub fn block_cell(&mut self, coord: CellCoord) -> bool {
        self.cell_mut(coord).is_some_and(Cell::block)
    }

    /// Places `pipe` directly into the cell at `coord`.
    pub fn place_pipe(&mut self, coord: CellCoord, pipe: Pipe) -> bool {
        self.cell_mut(coord)
            .is_some_and(|cell| cell.place_pipe(pipe))
    }

    /// Flags the pipe at `coord` as filled.
    pub fn mark_filled(&mut self, coord: CellCoord) -> bool {
        match self.cell_mut(coord) {
            Some(cell) if cell.has_pipe() => {
                cell.mark_filled();
                true
            }
            _ => false,
        }
    }

    /// Makes every unblocked, empty, non-start cell selectable.
    pub fn activate(&mut self) {
        for cell in &mut self.cells {
            if !cell.is_blocked() && !cell.has_pipe() && !cell.is_start() {
                cell.set_active(true);
            }
        }
    }

    /// Makes every unblocked, empty cell unselectable and abandons any move wait.
    pub fn deactivate(&mut self) {
        self.cancel_move();
        for cell in &mut self.cells {
            if !cell.is_blocked() && !cell.has_pipe() {
                cell.set_active(false);
            }
        }
    }

    /// Snapshot of the cells that currently accept a tile, in grid-scan order.
    #[must_use]
    pub fn active_cells(&self) -> Vec<CellCoord> {
        self.cells
            .iter()
            .filter(|cell| cell.is_active())
            .map(Cell::coord)
            .collect()
    }

    /// Reports whether at least one cell accepts a tile.
    #[must_use]
    pub fn has_active_cells(&self) -> bool {
        self.cells.iter().any(Cell::is_active)
    }

    /// Starts a race between every active cell for the next player move.
    ///
    /// Listeners from earlier waits are dropped before the new generation is
    /// armed. Returns `None` when no cell is active.
    pub fn await_move(&mut self) -> Option<MoveToken> {
        self.cancel_move();
        self.generation = self.generation.wrapping_add(1);
        let token = MoveToken::new(self.generation);

        let mut armed = 0_usize;
        for cell in &mut self.cells {
            if cell.await_selection(token) {
                armed += 1;
            }
        }

        if armed == 0 {
            return None;
        }

        trace!("awaiting move {} across {armed} cells", token.get());
        self.pending = Some(token);
        Some(token)
    }

    /// Token of the outstanding move wait, if any.
    #[must_use]
    pub const fn pending_move(&self) -> Option<MoveToken> {
        self.pending
    }

    /// Delivers a player selection to the race identified by `token`.
    ///
    /// The winning cell runs `on_move` exactly once; every other listener of
    /// the race is disarmed.
    pub fn resolve_move<F>(
        &mut self,
        token: MoveToken,
        coord: CellCoord,
        on_move: F,
    ) -> Result<CellCoord, SelectionRejection>
    where
        F: FnOnce(&mut Cell),
    {
        if self.pending != Some(token) {
            return Err(SelectionRejection::StaleToken);
        }

        let index = self.index(coord).ok_or(SelectionRejection::OutOfBounds)?;
        if !self.cells[index].resolve_selection(token, on_move) {
            return Err(SelectionRejection::InactiveCell);
        }

        self.cancel_move();
        Ok(coord)
    }

    /// Abandons the outstanding move wait.
    pub fn cancel_move(&mut self) {
        self.pending = None;
        for cell in &mut self.cells {
            cell.cancel_selection();
        }
    }

    /// Reports whether the pipes at `from` and its neighbour in `direction`
    /// face each other across their shared edge.
    #[must_use]
    pub fn connects(&self, from: CellCoord, direction: Direction) -> bool {
        let Some(origin) = self.cell(from).and_then(Cell::pipe) else {
            return false;
        };
        let Some(neighbour) = self
            .neighbour_cell(from, direction)
            .and_then(Cell::pipe)
        else {
            return false;
        };

        origin.connects(direction) && neighbour.connects(direction.opposite())
    }

    /// Neighbours that water flowing out of `coord` can move into.
    ///
    /// A neighbour qualifies when it exists, is not blocked, holds a pipe, is
    /// not the start cell, is not yet filled, and the two pipes face each
    /// other across the shared edge. Results follow the clockwise direction
    /// order starting at north.
    #[must_use]
    pub fn valid_neighbours(&self, coord: CellCoord) -> Vec<Neighbour> {
        Direction::ALL
            .into_iter()
            .filter_map(|direction| {
                let neighbour = self.neighbour_cell(coord, direction)?;
                let eligible = !neighbour.is_blocked()
                    && neighbour.has_pipe()
                    && !neighbour.is_start()
                    && !neighbour.is_filled()
                    && self.connects(coord, direction);
                eligible.then(|| Neighbour::new(direction, neighbour.coord()))
            })
            .collect()
    }

    fn neighbour_cell(&self, coord: CellCoord, direction: Direction) -> Option<&Cell> {
        coord
            .neighbor(direction)
            .and_then(|neighbour| self.cell(neighbour))
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        if coord.column() < self.config.columns() && coord.row() < self.config.rows() {
            let row = usize::try_from(coord.row()).ok()?;
            let column = usize::try_from(coord.column()).ok()?;
            let width = usize::try_from(self.config.columns()).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
