//! Text backend drawing the board with box-drawing glyphs.

use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use log::debug;
use pipe_flow_core::{Connections, Direction, GamePhase, Orientation, Pipe};
use pipe_flow_rendering::{
    AudioCue, AudioSink, CellPresentation, Presentation, RenderingBackend, SpriteKey,
};

const EMPTY_GLYPH: char = '·';
const ACTIVE_GLYPH: char = '+';
const BLOCKED_GLYPH: char = '▓';

/// Rendering backend writing frames to any byte sink.
#[derive(Debug)]
pub(crate) struct TerminalBackend<W> {
    out: W,
}

impl<W: Write> TerminalBackend<W> {
    pub(crate) const fn new(out: W) -> Self {
        Self { out }
    }

    /// Writes a free-form status line below the board.
    pub(crate) fn message(&mut self, text: &str) -> AnyResult<()> {
        writeln!(self.out, "{text}").context("failed to write to terminal")
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn present(&mut self, presentation: &Presentation) -> AnyResult<()> {
        let frame = render_frame(presentation);
        self.out
            .write_all(frame.as_bytes())
            .and_then(|()| self.out.flush())
            .context("failed to draw frame")
    }
}

/// Audio sink that only records cues in the log.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LoggedAudio;

impl AudioSink for LoggedAudio {
    fn play(&mut self, cue: AudioCue) {
        debug!("audio cue {cue:?}");
    }
}

fn render_frame(presentation: &Presentation) -> String {
    let scene = &presentation.scene;
    let mut frame = String::new();
    frame.push_str(&format!("== {} ==\n", presentation.window_title));
    frame.push_str(&format!(
        "{}   {}   Score: {}   [{}]\n",
        scene.timer_label,
        scene.max_label,
        scene.score,
        phase_label(scene.phase)
    ));

    frame.push_str("   ");
    for column in 0..scene.layout.columns {
        frame.push_str(&format!("{:>2}", column % 100));
    }
    frame.push('\n');

    for row in 0..scene.layout.rows {
        frame.push_str(&format!("{:>2} ", row % 100));
        for cell in scene.cells.iter().filter(|cell| cell.coord.row() == row) {
            frame.push(' ');
            frame.push(cell_glyph(cell));
        }
        frame.push('\n');
    }

    frame.push_str("Next:");
    for tile in &scene.queue {
        frame.push(' ');
        frame.push(sprite_glyph(tile.sprite, tile.rotation_degrees));
    }
    frame.push('\n');
    frame
}

fn phase_label(phase: GamePhase) -> &'static str {
    match phase {
        GamePhase::Loading => "loading",
        GamePhase::MainMenu => "menu",
        GamePhase::BoardActive => "place pipes",
        GamePhase::Evaluating => "water flowing",
        GamePhase::RoundResult => "round over",
    }
}

fn cell_glyph(cell: &CellPresentation) -> char {
    if cell.blocked {
        return BLOCKED_GLYPH;
    }

    match cell.pipe {
        Some(sprite) => sprite_glyph(sprite, cell.rotation_degrees),
        None if cell.active => ACTIVE_GLYPH,
        None => EMPTY_GLYPH,
    }
}

fn sprite_glyph(sprite: SpriteKey, rotation_degrees: u16) -> char {
    match sprite {
        SpriteKey::Cell => EMPTY_GLYPH,
        SpriteKey::Pipe { kind, filled } => {
            let orientation = Orientation::from_degrees(rotation_degrees).unwrap_or_default();
            pipe_glyph(Pipe::new(kind, orientation).connections(), filled)
        }
    }
}

/// Box-drawing character for a set of openings; heavy strokes once water arrived.
fn pipe_glyph(connections: Connections, filled: bool) -> char {
    let open = |direction| connections.contains(direction);
    let shape = (
        open(Direction::North),
        open(Direction::East),
        open(Direction::South),
        open(Direction::West),
    );

    let (light, heavy) = match shape {
        (true, true, true, true) => ('┼', '╋'),
        (true, false, true, false) => ('│', '┃'),
        (false, true, false, true) => ('─', '━'),
        (false, true, true, false) => ('┌', '┏'),
        (false, false, true, true) => ('┐', '┓'),
        (true, true, false, false) => ('└', '┗'),
        (true, false, false, true) => ('┘', '┛'),
        (false, false, true, false) => ('╷', '╻'),
        (true, false, false, false) => ('╵', '╹'),
        (false, true, false, false) => ('╶', '╺'),
        (false, false, false, true) => ('╴', '╸'),
        (true, true, true, false) => ('├', '┣'),
        (true, false, true, true) => ('┤', '┫'),
        (false, true, true, true) => ('┬', '┳'),
        (true, true, false, true) => ('┴', '┻'),
        (false, false, false, false) => (EMPTY_GLYPH, EMPTY_GLYPH),
    };

    if filled {
        heavy
    } else {
        light
    }
}
