#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for Pipe Flow adapters.

use std::time::Duration;

use anyhow::Result as AnyResult;
use glam::Vec2;
use pipe_flow_core::{CellCoord, Event, GamePhase, GridConfig, Pipe, TileKind};
use pipe_flow_system_game_flow::GameFlow;
use pipe_flow_system_tile_queue::QueuedTile;
use pipe_flow_world::Cell;

/// Opacity applied to blocked cells.
pub const BLOCKED_ALPHA: f32 = 0.2;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Pixel geometry of the board and the tile queue beside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoardLayout {
    /// Number of columns on the board.
    pub columns: u32,
    /// Number of rows on the board.
    pub rows: u32,
    /// Side length of a cell.
    pub cell_size: f32,
    /// Gap between neighbouring cells.
    pub padding: f32,
    /// Top-left corner of the board.
    pub origin: Vec2,
}

impl BoardLayout {
    /// Side length of a cell in pixels.
    pub const CELL_SIZE: f32 = 32.0;

    /// Gap between board cells in pixels.
    pub const PADDING: f32 = 5.0;

    /// Gap between queued tiles in pixels.
    pub const QUEUE_PADDING: f32 = 10.0;

    /// Creates a layout for the provided grid anchored at the origin.
    #[must_use]
    pub const fn new(grid: GridConfig) -> Self {
        Self {
            columns: grid.columns(),
            rows: grid.rows(),
            cell_size: Self::CELL_SIZE,
            padding: Self::PADDING,
            origin: Vec2::ZERO,
        }
    }

    /// Moves the board so its top-left corner sits at `origin`.
    pub fn relayout(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    /// Distance between the origins of two neighbouring cells.
    #[must_use]
    pub fn stride(&self) -> f32 {
        self.cell_size + self.padding
    }

    /// Width of the board without trailing padding.
    #[must_use]
    pub fn width(&self) -> f32 {
        extent(self.columns, self.cell_size, self.padding)
    }

    /// Height of the board without trailing padding.
    #[must_use]
    pub fn height(&self) -> f32 {
        extent(self.rows, self.cell_size, self.padding)
    }

    /// Top-left corner of the cell at `coord`.
    #[must_use]
    pub fn cell_origin(&self, coord: CellCoord) -> Vec2 {
        self.origin
            + Vec2::new(
                coord.column() as f32 * self.stride(),
                coord.row() as f32 * self.stride(),
            )
    }

    /// Centre of the cell at `coord`.
    #[must_use]
    pub fn cell_center(&self, coord: CellCoord) -> Vec2 {
        self.cell_origin(coord) + Vec2::splat(self.cell_size * 0.5)
    }

    /// Resolves a pointer position to the cell beneath it.
    ///
    /// Positions outside the board or inside the padding between cells hit
    /// nothing.
    #[must_use]
    pub fn cell_at(&self, position: Vec2) -> Option<CellCoord> {
        let local = position - self.origin;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }

        let stride = self.stride();
        let column = (local.x / stride).floor();
        let row = (local.y / stride).floor();
        if local.x - column * stride >= self.cell_size || local.y - row * stride >= self.cell_size
        {
            return None;
        }

        let (column, row) = (column as u32, row as u32);
        if column >= self.columns || row >= self.rows {
            return None;
        }

        Some(CellCoord::new(column, row))
    }

    /// Top-left corner of the queued tile in `slot`.
    ///
    /// The queue is stacked vertically one cell to the right of the board,
    /// with the current tile on top.
    #[must_use]
    pub fn queue_slot_position(&self, slot: usize) -> Vec2 {
        let x = self.origin.x + self.width() + self.cell_size;
        let y = self.origin.y + slot as f32 * (self.cell_size + Self::QUEUE_PADDING);
        Vec2::new(x, y)
    }
}

fn extent(count: u32, cell_size: f32, padding: f32) -> f32 {
    if count == 0 {
        return 0.0;
    }

    count as f32 * cell_size + (count - 1) as f32 * padding
}

/// Texture a presentation layer draws for a board element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// Empty cell background.
    Cell,
    /// Pipe sprite for a tile kind.
    Pipe {
        /// Archetype of the pipe.
        kind: TileKind,
        /// Whether the water-filled variant is shown.
        filled: bool,
    },
}

impl SpriteKey {
    /// Sprite for the provided pipe.
    #[must_use]
    pub const fn for_pipe(pipe: &Pipe) -> Self {
        Self::Pipe {
            kind: pipe.kind(),
            filled: pipe.is_filled(),
        }
    }

    /// Asset name of the sprite.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cell => "cell",
            Self::Pipe {
                kind,
                filled: false,
            } => kind.sprite_name(),
            Self::Pipe { kind, filled: true } => kind.filled_sprite_name(),
        }
    }
}

/// Snapshot of a single board cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPresentation {
    /// Coordinate of the cell.
    pub coord: CellCoord,
    /// Top-left corner in pixels.
    pub position: Vec2,
    /// Opacity of the cell background.
    pub alpha: f32,
    /// Pipe sprite drawn on top of the cell, if it holds one.
    pub pipe: Option<SpriteKey>,
    /// Clockwise rotation of the pipe sprite in degrees.
    pub rotation_degrees: u16,
    /// Whether water reached the cell.
    pub filled: bool,
    /// Whether the cell accepts the current tile.
    pub active: bool,
    /// Whether the cell holds the start tile.
    pub start: bool,
    /// Whether the cell is blocked for this round.
    pub blocked: bool,
}

impl CellPresentation {
    fn capture(cell: &Cell, layout: &BoardLayout) -> Self {
        let pipe = cell.pipe();
        Self {
            coord: cell.coord(),
            position: layout.cell_origin(cell.coord()),
            alpha: if cell.is_blocked() { BLOCKED_ALPHA } else { 1.0 },
            pipe: pipe.map(SpriteKey::for_pipe),
            rotation_degrees: pipe.map_or(0, |pipe| pipe.orientation().degrees()),
            filled: cell.is_filled(),
            active: cell.is_active(),
            start: cell.is_start(),
            blocked: cell.is_blocked(),
        }
    }
}

/// Snapshot of a tile waiting in the queue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueuedTilePresentation {
    /// Slot index, zero being the current tile.
    pub slot: usize,
    /// Top-left corner in pixels.
    pub position: Vec2,
    /// Sprite of the tile.
    pub sprite: SpriteKey,
    /// Clockwise rotation of the sprite in degrees.
    pub rotation_degrees: u16,
    /// Whether the tile is the one being offered.
    pub active: bool,
}

impl QueuedTilePresentation {
    fn capture(tile: &QueuedTile, layout: &BoardLayout) -> Self {
        Self {
            slot: tile.slot(),
            position: layout.queue_slot_position(tile.slot()),
            sprite: SpriteKey::for_pipe(tile.pipe()),
            rotation_degrees: tile.pipe().orientation().degrees(),
            active: tile.pipe().is_active(),
        }
    }
}

/// Describes everything a backend needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Phase the controller is in.
    pub phase: GamePhase,
    /// Board geometry.
    pub layout: BoardLayout,
    /// Cells in grid-scan order.
    pub cells: Vec<CellPresentation>,
    /// Queued tiles, current tile first.
    pub queue: Vec<QueuedTilePresentation>,
    /// Countdown label.
    pub timer_label: String,
    /// Best score label.
    pub max_label: String,
    /// Cells reached by the water in the current or last round.
    pub score: u32,
}

impl Scene {
    /// Captures the visible state of a game.
    #[must_use]
    pub fn capture(game: &GameFlow) -> Self {
        let layout = BoardLayout::new(game.grid().config());
        Self {
            phase: game.phase(),
            cells: game
                .grid()
                .cells()
                .map(|cell| CellPresentation::capture(cell, &layout))
                .collect(),
            queue: game
                .queue()
                .iter()
                .map(|tile| QueuedTilePresentation::capture(tile, &layout))
                .collect(),
            timer_label: timer_label(game.remaining_time()),
            max_label: max_label(game.best_score()),
            score: game.current_score(),
            layout,
        }
    }

    /// Presentation of the cell at `coord`.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<&CellPresentation> {
        self.cells.iter().find(|cell| cell.coord == coord)
    }
}

/// Formats the countdown as seconds and tenths, e.g. `Time: 29:9`.
#[must_use]
pub fn timer_label(remaining: Duration) -> String {
    let millis = remaining.as_millis();
    format!("Time: {}:{}", (millis / 1000) % 60, (millis % 1000) / 100)
}

/// Formats the best score, e.g. `Max: 12`.
#[must_use]
pub fn max_label(best: u32) -> String {
    format!("Max: {best}")
}

/// Sound effects triggered by game events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// Menu or restart button press.
    Click,
    /// A tile landed on the board.
    Placement,
    /// Water entered a pipe.
    WaterFlow,
    /// The round finished.
    Finish,
}

/// Fire-and-forget sound output.
pub trait AudioSink {
    /// Starts playing the cue without waiting for it to finish.
    fn play(&mut self, cue: AudioCue);
}

/// Derives the sound effects for a batch of events.
#[must_use]
pub fn cues_for(events: &[Event]) -> Vec<AudioCue> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::BoardReset { .. } => Some(AudioCue::Click),
            Event::PipePlaced { .. } => Some(AudioCue::Placement),
            Event::CellFilled { .. } => Some(AudioCue::WaterFlow),
            Event::RoundFinished { .. } => Some(AudioCue::Finish),
            _ => None,
        })
        .collect()
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title shown by the backend.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Pipe Flow scenes.
pub trait RenderingBackend {
    /// Draws one frame.
    fn present(&mut self, presentation: &Presentation) -> AnyResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipe_flow_system_game_flow::GameConfig;

    fn layout(columns: u32, rows: u32) -> BoardLayout {
        BoardLayout::new(GridConfig::new(columns, rows, 0))
    }

    #[test]
    fn byte_channels_scale_to_unit_range() {
        assert_eq!(
            Color::from_rgb_u8(255, 0, 51),
            Color::new(1.0, 0.0, 0.2, 1.0)
        );
    }

    #[test]
    fn board_extent_excludes_trailing_padding() {
        let layout = layout(9, 7);
        assert_eq!(layout.width(), 9.0 * 32.0 + 8.0 * 5.0);
        assert_eq!(layout.height(), 7.0 * 32.0 + 6.0 * 5.0);
    }

    #[test]
    fn cell_centers_hit_their_cells() {
        let mut layout = layout(4, 3);
        layout.relayout(Vec2::new(100.0, 40.0));
        for row in 0..3 {
            for column in 0..4 {
                let coord = CellCoord::new(column, row);
                assert_eq!(layout.cell_at(layout.cell_center(coord)), Some(coord));
            }
        }
    }

    #[test]
    fn padding_and_outside_positions_hit_nothing() {
        let layout = layout(4, 3);
        assert_eq!(layout.cell_at(Vec2::new(34.0, 10.0)), None);
        assert_eq!(layout.cell_at(Vec2::new(-1.0, 10.0)), None);
        assert_eq!(layout.cell_at(Vec2::new(10.0, 3.0 * 37.0 + 1.0)), None);
        assert_eq!(layout.cell_at(Vec2::new(37.0, 0.0)), Some(CellCoord::new(1, 0)));
    }

    #[test]
    fn queue_slots_stack_beside_the_board() {
        let layout = layout(2, 2);
        assert_eq!(layout.queue_slot_position(0), Vec2::new(69.0 + 32.0, 0.0));
        assert_eq!(layout.queue_slot_position(2), Vec2::new(101.0, 84.0));
    }

    #[test]
    fn labels_match_the_hud_format() {
        assert_eq!(timer_label(Duration::from_secs(30)), "Time: 30:0");
        assert_eq!(timer_label(Duration::from_millis(12_300)), "Time: 12:3");
        assert_eq!(timer_label(Duration::ZERO), "Time: 0:0");
        assert_eq!(max_label(7), "Max: 7");
    }

    #[test]
    fn sprite_names_follow_fill_state() {
        let mut pipe = Pipe::new(TileKind::Cross, pipe_flow_core::Orientation::Deg90);
        assert_eq!(SpriteKey::for_pipe(&pipe).name(), TileKind::Cross.sprite_name());
        pipe.mark_filled();
        assert_eq!(
            SpriteKey::for_pipe(&pipe).name(),
            TileKind::Cross.filled_sprite_name()
        );
        assert_eq!(SpriteKey::Cell.name(), "cell");
    }

    #[test]
    fn cues_follow_events() {
        let events = vec![
            Event::PhaseChanged {
                phase: GamePhase::Evaluating,
            },
            Event::CellFilled {
                cell: CellCoord::new(0, 1),
                depth: 1,
            },
            Event::TimerExpired,
            Event::RoundFinished {
                score: 1,
                longest_branch: 1,
                best: 1,
                new_best: true,
            },
        ];
        assert_eq!(
            cues_for(&events),
            vec![AudioCue::WaterFlow, AudioCue::Finish]
        );
    }

    #[test]
    fn capture_reflects_the_board() {
        let mut game = GameFlow::new(GameConfig::default(), 11).expect("valid configuration");
        let mut events = Vec::new();
        game.assets_ready(&mut events);
        game.start(&mut events).expect("round starts");

        let scene = Scene::capture(&game);
        assert_eq!(scene.phase, GamePhase::BoardActive);
        assert_eq!(scene.cells.len(), 63);
        assert_eq!(scene.queue.len(), 7);
        assert!(scene.queue[0].active);
        assert!(scene.queue[1..].iter().all(|tile| !tile.active));
        assert_eq!(scene.timer_label, "Time: 30:0");
        assert_eq!(scene.max_label, "Max: 0");

        let blocked: Vec<&CellPresentation> =
            scene.cells.iter().filter(|cell| cell.blocked).collect();
        assert_eq!(blocked.len(), 6);
        assert!(blocked.iter().all(|cell| cell.alpha == BLOCKED_ALPHA));

        let start = game.start_cell().expect("start designated");
        let start = scene.cell(start).expect("start captured");
        assert!(start.start);
        assert_eq!(
            start.pipe,
            Some(SpriteKey::Pipe {
                kind: TileKind::Start,
                filled: false,
            })
        );
    }
}
