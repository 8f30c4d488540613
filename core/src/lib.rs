#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pipe Flow engine.
//!
//! This crate defines the vocabulary every other crate speaks: the four
//! cardinal [`Direction`] values, the quarter-turn [`Orientation`] applied to a
//! tile, the closed set of [`TileKind`] archetypes and the placed [`Pipe`]
//! instance built from them. The grid owns cells holding pipes, systems derive
//! water flow and tile supply from it, and the controller broadcasts [`Event`]
//! values so adapters can present the board and play sounds without reaching
//! into game state.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Pipe Flow.";

/// Cardinal directions a pipe may connect through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction whose cell adjoins on the matching side of a shared edge.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Position of the direction within the clockwise cycle.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Returns the direction reached after applying the provided orientation.
    #[must_use]
    pub fn rotated(self, orientation: Orientation) -> Self {
        rotate(self, orientation)
    }

    const fn bit(self) -> u8 {
        1 << self.index()
    }
}

/// Rotates `direction` clockwise by the quarter turns encoded in `orientation`.
///
/// Every consumer that needs to know where a rotated tile points goes through
/// this function; the cycle wraps from west back to north.
#[must_use]
pub fn rotate(direction: Direction, orientation: Orientation) -> Direction {
    let steps = usize::from(orientation.quarter_turns());
    Direction::ALL[(direction.index() + steps) % Direction::ALL.len()]
}

/// Clockwise quarter-turn rotation applied to a tile.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Orientation {
    /// Unrotated.
    #[default]
    Deg0,
    /// One clockwise quarter turn.
    Deg90,
    /// Two clockwise quarter turns.
    Deg180,
    /// Three clockwise quarter turns.
    Deg270,
}

impl Orientation {
    /// All orientations in increasing rotation order.
    pub const ALL: [Orientation; 4] = [
        Orientation::Deg0,
        Orientation::Deg90,
        Orientation::Deg180,
        Orientation::Deg270,
    ];

    /// Number of clockwise quarter turns represented by the orientation.
    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }

    /// Rotation expressed in degrees.
    #[must_use]
    pub const fn degrees(self) -> u16 {
        self.quarter_turns() as u16 * 90
    }

    /// Builds an orientation from degrees.
    ///
    /// Any multiple of 90 is accepted and normalised modulo 360, so `360`
    /// maps to [`Orientation::Deg0`]. Other values yield `None`.
    #[must_use]
    pub const fn from_degrees(degrees: u16) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }

        match (degrees / 90) % 4 {
            0 => Some(Self::Deg0),
            1 => Some(Self::Deg90),
            2 => Some(Self::Deg180),
            _ => Some(Self::Deg270),
        }
    }
}

/// Closed set of tile shapes, each carrying its unrotated connections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Connects north and south.
    Straight,
    /// Connects east and south.
    Curved,
    /// Connects all four directions.
    Cross,
    /// Fixed origin tile that releases water toward the south.
    Start,
}

impl TileKind {
    /// Archetypes the tile generator draws from.
    pub const PLACEABLE: [TileKind; 3] = [TileKind::Straight, TileKind::Curved, TileKind::Cross];

    /// Unrotated connection directions of the archetype.
    #[must_use]
    pub const fn base_directions(self) -> &'static [Direction] {
        match self {
            Self::Straight => &[Direction::North, Direction::South],
            Self::Curved => &[Direction::East, Direction::South],
            Self::Cross => &Direction::ALL,
            Self::Start => &[Direction::South],
        }
    }

    /// Texture reference used by presentation for an empty pipe of this kind.
    #[must_use]
    pub const fn sprite_name(self) -> &'static str {
        match self {
            Self::Straight => "straight",
            Self::Curved => "curved",
            Self::Cross => "cross",
            Self::Start => "start",
        }
    }

    /// Texture reference used by presentation once water reached the pipe.
    #[must_use]
    pub const fn filled_sprite_name(self) -> &'static str {
        match self {
            Self::Straight => "straight_filled",
            Self::Curved => "curved_filled",
            Self::Cross => "cross_filled",
            Self::Start => "start_filled",
        }
    }
}

/// Compact set of directions a pipe connects through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Connections(u8);

impl Connections {
    /// Set containing no directions.
    pub const EMPTY: Self = Self(0);

    /// Collects the provided directions into a set.
    #[must_use]
    pub fn from_directions<I>(directions: I) -> Self
    where
        I: IntoIterator<Item = Direction>,
    {
        directions
            .into_iter()
            .fold(Self::EMPTY, |set, direction| set.with(direction))
    }

    /// Returns a copy of the set that also contains `direction`.
    #[must_use]
    pub const fn with(self, direction: Direction) -> Self {
        Self(self.0 | direction.bit())
    }

    /// Reports whether the set contains `direction`.
    #[must_use]
    pub const fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Number of directions in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Reports whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the contained directions in clockwise order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }
}

/// Placed tile instance: an archetype turned to an orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pipe {
    kind: TileKind,
    orientation: Orientation,
    filled: bool,
    active: bool,
}

impl Pipe {
    /// Creates an unfilled, inactive pipe.
    #[must_use]
    pub const fn new(kind: TileKind, orientation: Orientation) -> Self {
        Self {
            kind,
            orientation,
            filled: false,
            active: false,
        }
    }

    /// Creates the fixed tile placed on the start cell every round.
    #[must_use]
    pub const fn start() -> Self {
        Self::new(TileKind::Start, Orientation::Deg0)
    }

    /// Archetype of the pipe.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Orientation applied to the archetype.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Effective connection directions, derived from the archetype and the
    /// current orientation on every call.
    #[must_use]
    pub fn connections(&self) -> Connections {
        Connections::from_directions(
            self.kind
                .base_directions()
                .iter()
                .map(|direction| rotate(*direction, self.orientation)),
        )
    }

    /// Reports whether the pipe opens toward `direction`.
    #[must_use]
    pub fn connects(&self, direction: Direction) -> bool {
        self.connections().contains(direction)
    }

    /// Reports whether water has flowed through the pipe.
    #[must_use]
    pub const fn is_filled(&self) -> bool {
        self.filled
    }

    /// Reports whether the pipe is currently interactable.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Flags the pipe as having received water.
    pub fn mark_filled(&mut self) {
        self.filled = true;
    }

    /// Toggles whether the pipe is currently interactable.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Clears the filled and active flags.
    pub fn reset(&mut self) {
        self.filled = false;
        self.active = false;
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Coordinate one step away in `direction`.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant;
    /// upper bounds are the grid's concern.
    #[must_use]
    pub fn neighbor(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => self.row.checked_sub(1).map(|row| Self::new(self.column, row)),
            Direction::East => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
            Direction::South => self.row.checked_add(1).map(|row| Self::new(self.column, row)),
            Direction::West => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
        }
    }
}

/// Dimensions and blocker count of the playing grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    columns: u32,
    rows: u32,
    blocked: u32,
}

impl GridConfig {
    /// Creates a new grid configuration.
    #[must_use]
    pub const fn new(columns: u32, rows: u32, blocked: u32) -> Self {
        Self {
            columns,
            rows,
            blocked,
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of cells blocked on every reset.
    #[must_use]
    pub const fn blocked(&self) -> u32 {
        self.blocked
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        u64::from(self.columns) * u64::from(self.rows)
    }

    /// Checks that a grid built from this configuration can host a round.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            });
        }

        if self.rows < 2 {
            return Err(ConfigError::NoStartRow { rows: self.rows });
        }

        let capacity = self.capacity();
        if u64::from(self.blocked) >= capacity {
            return Err(ConfigError::TooManyBlockedCells {
                blocked: self.blocked,
                capacity,
            });
        }

        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::new(9, 7, 6)
    }
}

/// Configuration problems that prevent a round from being set up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The grid has no cells.
    #[error("grid must have at least one column and one row (got {columns}x{rows})")]
    EmptyGrid {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// The start cell may not sit in the last row, so one row is never enough.
    #[error("grid needs at least two rows to host a start cell (got {rows})")]
    NoStartRow {
        /// Configured row count.
        rows: u32,
    },
    /// Blocking would cover the whole grid.
    #[error("cannot block {blocked} cells in a grid of {capacity}")]
    TooManyBlockedCells {
        /// Configured blocker count.
        blocked: u32,
        /// Total number of cells in the grid.
        capacity: u64,
    },
    /// Every cell outside the last row ended up blocked.
    #[error("no unblocked cell is left outside the last row for the start tile")]
    NoStartCandidates,
    /// The tile queue would never offer a tile.
    #[error("tile queue length must be positive")]
    EmptyTileQueue,
    /// The countdown would never advance.
    #[error("timer tick interval must be positive")]
    ZeroTickInterval,
}

/// Phases of the game loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GamePhase {
    /// Waiting for external resources.
    Loading,
    /// Waiting for the start action.
    MainMenu,
    /// Accepting player moves while the round timer runs.
    BoardActive,
    /// Water is flowing from the start cell.
    Evaluating,
    /// The round has been scored and awaits a restart.
    RoundResult,
}

/// Generation counter identifying one outstanding move wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoveToken(u64);

impl MoveToken {
    /// Creates a token with the provided generation.
    #[must_use]
    pub const fn new(generation: u64) -> Self {
        Self(generation)
    }

    /// Retrieves the generation carried by the token.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Reasons a cell selection may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectionRejection {
    /// No move is being awaited in the current phase.
    NotAwaitingMove,
    /// The selection belongs to a move wait that already resolved or was abandoned.
    StaleToken,
    /// The selected cell is not accepting tiles.
    InactiveCell,
    /// The coordinate lies outside the grid.
    OutOfBounds,
}

/// Events broadcast by the game controller for presentation and audio layers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that the controller entered a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: GamePhase,
    },
    /// Confirms that the board was re-randomised.
    BoardReset {
        /// Cell holding the start tile.
        start: CellCoord,
        /// Cells blocked for this round in grid-scan order.
        blocked: Vec<CellCoord>,
    },
    /// Announces that the controller is waiting for the player to pick a cell.
    MoveAwaited {
        /// Token the selection must carry.
        token: MoveToken,
        /// Number of cells currently accepting a tile.
        candidates: usize,
    },
    /// Confirms that a tile left the queue and landed on a cell.
    PipePlaced {
        /// Cell that received the pipe.
        cell: CellCoord,
        /// Pipe that was placed.
        pipe: Pipe,
    },
    /// Reports that a selection was refused.
    SelectionRejected {
        /// Coordinate the player selected.
        cell: CellCoord,
        /// Specific reason the selection failed.
        reason: SelectionRejection,
    },
    /// Reports that no cell accepts tiles any more; scoring waits for the timer.
    MovesExhausted,
    /// Indicates that the round countdown advanced.
    TimeAdvanced {
        /// Time left on the countdown.
        remaining: Duration,
    },
    /// Indicates that the round countdown elapsed.
    TimerExpired,
    /// Confirms that water reached a cell.
    CellFilled {
        /// Cell whose pipe received water.
        cell: CellCoord,
        /// Number of hops from the start cell.
        depth: u32,
    },
    /// Reports the outcome of a finished round.
    RoundFinished {
        /// Number of cells the water reached.
        score: u32,
        /// Hops along the deepest branch of the flow.
        longest_branch: u32,
        /// Best score across all rounds so far.
        best: u32,
        /// Whether the displayed maximum should be refreshed.
        new_best: bool,
    },
}
