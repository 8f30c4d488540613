//! Single grid slot and its per-round lifecycle.

use pipe_flow_core::{CellCoord, MoveToken, Pipe};

/// Observable lifecycle state of a cell's contents.
///
/// Activity and the start designation are orthogonal to this state and are
/// queried separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellState {
    /// No pipe, not blocked.
    EmptyUnblocked,
    /// No pipe, blocked for the round.
    EmptyBlocked,
    /// Holds a pipe that water has not reached.
    Occupied,
    /// Holds a pipe that water reached. Terminal for the round.
    Filled,
}

/// A single grid slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    coord: CellCoord,
    blocked: bool,
    pipe: Option<Pipe>,
    active: bool,
    start: bool,
    listener: Option<MoveToken>,
}

impl Cell {
    /// Creates an empty, unblocked, inactive cell.
    #[must_use]
    pub const fn new(coord: CellCoord) -> Self {
        Self {
            coord,
            blocked: false,
            pipe: None,
            active: false,
            start: false,
            listener: None,
        }
    }

    /// Grid coordinate of the cell.
    #[must_use]
    pub const fn coord(&self) -> CellCoord {
        self.coord
    }

    /// Reports whether the cell sits at the provided coordinates.
    #[must_use]
    pub fn matches_coordinates(&self, column: u32, row: u32) -> bool {
        self.coord.column() == column && self.coord.row() == row
    }

    /// Reports whether the cell is blocked for the round.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Reports whether the cell holds a pipe.
    #[must_use]
    pub const fn has_pipe(&self) -> bool {
        self.pipe.is_some()
    }

    /// Pipe held by the cell, if any.
    #[must_use]
    pub const fn pipe(&self) -> Option<&Pipe> {
        self.pipe.as_ref()
    }

    /// Reports whether the cell accepts player selection.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Reports whether the cell holds the round's start tile.
    #[must_use]
    pub const fn is_start(&self) -> bool {
        self.start
    }

    /// Reports whether water reached the cell's pipe.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.pipe.is_some_and(|pipe| pipe.is_filled())
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CellState {
        match (&self.pipe, self.blocked) {
            (Some(pipe), _) if pipe.is_filled() => CellState::Filled,
            (Some(_), _) => CellState::Occupied,
            (None, true) => CellState::EmptyBlocked,
            (None, false) => CellState::EmptyUnblocked,
        }
    }

    /// Blocks the cell for the round.
    ///
    /// An occupied cell keeps its pipe and stays unblocked; the return value
    /// reports whether the flag was set.
    pub fn block(&mut self) -> bool {
        if self.pipe.is_some() {
            return false;
        }

        self.blocked = true;
        self.active = false;
        self.listener = None;
        true
    }

    /// Lifts the blocked flag.
    pub fn unblock(&mut self) {
        self.blocked = false;
    }

    /// Places a pipe in the cell and takes the cell out of play.
    ///
    /// Returns `false` without touching the cell when it already holds a
    /// pipe or is blocked.
    pub fn place_pipe(&mut self, pipe: Pipe) -> bool {
        if self.pipe.is_some() || self.blocked {
            return false;
        }

        self.pipe = Some(pipe);
        self.active = false;
        self.listener = None;
        true
    }

    /// Clears the contained pipe, returning it.
    pub fn remove_pipe(&mut self) -> Option<Pipe> {
        self.pipe.take()
    }

    /// Toggles whether the cell accepts player selection.
    ///
    /// Blocked and occupied cells never become active.
    pub fn set_active(&mut self, active: bool) {
        self.active = active && !self.blocked && self.pipe.is_none() && !self.start;
        if !self.active {
            self.listener = None;
        }
    }

    /// Flags the contained pipe as having received water. Idempotent.
    pub fn mark_filled(&mut self) {
        if let Some(pipe) = self.pipe.as_mut() {
            pipe.mark_filled();
        }
    }

    /// Arms the cell to receive the selection identified by `token`.
    ///
    /// Only active cells can be armed; the return value reports whether the
    /// listener is in place.
    pub fn await_selection(&mut self, token: MoveToken) -> bool {
        if !self.active {
            return false;
        }

        self.listener = Some(token);
        true
    }

    /// Reports whether the cell is waiting for the selection identified by `token`.
    #[must_use]
    pub fn is_awaiting(&self, token: MoveToken) -> bool {
        self.listener == Some(token)
    }

    /// Delivers a player selection to the cell.
    ///
    /// When the cell is armed with `token`, the listener is removed and
    /// `on_selected` runs with the cell. Any other token is ignored, so a
    /// listener from an earlier wait can never fire.
    pub fn resolve_selection<F>(&mut self, token: MoveToken, on_selected: F) -> bool
    where
        F: FnOnce(&mut Cell),
    {
        if self.listener != Some(token) {
            return false;
        }

        self.listener = None;
        on_selected(self);
        true
    }

    /// Drops any pending selection listener.
    pub fn cancel_selection(&mut self) {
        self.listener = None;
    }

    /// Returns the cell to the empty, unblocked, inactive state.
    pub fn reset(&mut self) {
        let _ = self.remove_pipe();
        self.unblock();
        self.set_active(false);
        self.start = false;
    }

    pub(crate) fn install_start(&mut self, pipe: Pipe) {
        self.reset();
        self.pipe = Some(pipe);
        self.start = true;
    }
}
