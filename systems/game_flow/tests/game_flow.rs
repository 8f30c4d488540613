use std::time::Duration;

use pipe_flow_core::{
    CellCoord, ConfigError, Direction, Event, GamePhase, GridConfig, MoveToken, Pipe,
    SelectionRejection,
};
use pipe_flow_system_game_flow::{GameConfig, GameFlow};

const SEED: u64 = 0x5eed_f10e;

fn config(columns: u32, rows: u32, blocked: u32) -> GameConfig {
    GameConfig {
        grid: GridConfig::new(columns, rows, blocked),
        round_duration: Duration::from_secs(1),
        water_step_delay: Duration::ZERO,
        ..GameConfig::default()
    }
}

fn started(config: GameConfig, seed: u64) -> (GameFlow, Vec<Event>) {
    let mut game = GameFlow::new(config, seed).expect("valid configuration");
    let mut events = Vec::new();
    game.assets_ready(&mut events);
    game.start(&mut events).expect("round starts");
    (game, events)
}

fn pending(game: &GameFlow) -> MoveToken {
    game.pending_move().expect("controller awaits a move")
}

fn first_candidate(game: &GameFlow) -> CellCoord {
    game.grid()
        .active_cells()
        .first()
        .copied()
        .expect("an active cell remains")
}

fn phases(events: &[Event]) -> Vec<GamePhase> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::PhaseChanged { phase } => Some(*phase),
            _ => None,
        })
        .collect()
}

#[test]
fn walks_from_loading_to_an_active_board() {
    let mut game = GameFlow::new(GameConfig::default(), SEED).expect("valid configuration");
    assert_eq!(game.phase(), GamePhase::Loading);

    let mut events = Vec::new();
    game.start(&mut events).expect("ignored start");
    assert!(events.is_empty(), "start before assets are ready is ignored");

    game.assets_ready(&mut events);
    assert_eq!(game.phase(), GamePhase::MainMenu);

    game.start(&mut events).expect("round starts");
    assert_eq!(game.phase(), GamePhase::BoardActive);
    assert_eq!(phases(&events), vec![GamePhase::MainMenu, GamePhase::BoardActive]);

    let start = game.start_cell().expect("start designated");
    assert!(start.row() < GridConfig::default().rows() - 1);
    assert_eq!(game.grid().blocked_cells().len(), 6);

    let candidates = events.iter().find_map(|event| match event {
        Event::MoveAwaited { candidates, .. } => Some(*candidates),
        _ => None,
    });
    assert_eq!(candidates, Some(9 * 7 - 6 - 1));
    assert_eq!(game.queue().len(), 7);
}

#[test]
fn placement_consumes_the_queue_head() {
    let (mut game, _) = started(GameConfig::default(), SEED);
    let head = game.current_pipe().expect("queue populated");
    assert!(head.is_active());
    let expected = Pipe::new(head.kind(), head.orientation());
    let target = first_candidate(&game);

    let mut events = Vec::new();
    game.select(target, pending(&game), &mut events);

    assert_eq!(
        events.first(),
        Some(&Event::PipePlaced {
            cell: target,
            pipe: expected,
        })
    );
    assert!(matches!(events.get(1), Some(Event::MoveAwaited { .. })));
    let cell = game.grid().cell(target).expect("cell exists");
    assert!(cell.has_pipe());
    assert!(!cell.is_active());
    assert_eq!(game.queue().len(), 7);
}

#[test]
fn stale_token_is_rejected() {
    let (mut game, _) = started(GameConfig::default(), SEED);
    let stale = pending(&game);
    let mut events = Vec::new();
    game.select(first_candidate(&game), stale, &mut events);

    let fresh = pending(&game);
    assert_ne!(stale, fresh);

    events.clear();
    let target = first_candidate(&game);
    game.select(target, stale, &mut events);
    assert_eq!(
        events,
        vec![Event::SelectionRejected {
            cell: target,
            reason: SelectionRejection::StaleToken,
        }]
    );
    assert!(!game.grid().cell(target).expect("cell exists").has_pipe());
    assert_eq!(game.pending_move(), Some(fresh));
}

#[test]
fn start_cell_cannot_be_selected() {
    let (mut game, _) = started(GameConfig::default(), SEED);
    let start = game.start_cell().expect("start designated");
    let token = pending(&game);

    let mut events = Vec::new();
    game.select(start, token, &mut events);
    assert_eq!(
        events,
        vec![Event::SelectionRejected {
            cell: start,
            reason: SelectionRejection::InactiveCell,
        }]
    );
    assert_eq!(game.pending_move(), Some(token));

    events.clear();
    game.select(CellCoord::new(40, 40), token, &mut events);
    assert_eq!(
        events,
        vec![Event::SelectionRejected {
            cell: CellCoord::new(40, 40),
            reason: SelectionRejection::OutOfBounds,
        }]
    );
}

#[test]
fn selections_outside_the_board_phase_are_refused() {
    let mut game = GameFlow::new(GameConfig::default(), SEED).expect("valid configuration");
    let mut events = Vec::new();
    game.select(CellCoord::new(0, 0), MoveToken::new(1), &mut events);
    assert_eq!(
        events,
        vec![Event::SelectionRejected {
            cell: CellCoord::new(0, 0),
            reason: SelectionRejection::NotAwaitingMove,
        }]
    );
}

#[test]
fn exhausted_board_waits_for_the_timer() {
    let (mut game, _) = started(config(1, 2, 0), SEED);
    assert_eq!(game.start_cell(), Some(CellCoord::new(0, 0)));

    let mut events = Vec::new();
    game.select(CellCoord::new(0, 1), pending(&game), &mut events);
    assert_eq!(events.last(), Some(&Event::MovesExhausted));
    assert!(game.moves_exhausted());
    assert_eq!(game.phase(), GamePhase::BoardActive);
    assert_eq!(game.pending_move(), None);

    events.clear();
    game.tick(Duration::from_millis(500), &mut events);
    assert_eq!(game.phase(), GamePhase::BoardActive);
    assert_eq!(
        events,
        vec![Event::TimeAdvanced {
            remaining: Duration::from_millis(500),
        }]
    );

    events.clear();
    game.tick(Duration::from_millis(500), &mut events);
    assert_eq!(game.phase(), GamePhase::RoundResult);
    assert!(events.contains(&Event::TimerExpired));
    assert_eq!(
        phases(&events),
        vec![GamePhase::Evaluating, GamePhase::RoundResult]
    );

    let finished = events.iter().find_map(|event| match event {
        Event::RoundFinished { score, .. } => Some(*score),
        _ => None,
    });
    let score = finished.expect("round finished");
    assert!(score <= 1);
    assert_eq!(game.current_score(), score);
    assert_eq!(game.results().results(), &[score]);
}

#[test]
fn water_is_paced_by_the_step_delay() {
    let slow = GameConfig {
        water_step_delay: Duration::from_millis(500),
        ..config(3, 3, 0)
    };
    let (mut game, _) = started(slow, SEED);

    let mut events = Vec::new();
    game.tick(Duration::from_secs(1), &mut events);
    assert_eq!(game.phase(), GamePhase::Evaluating);
    assert!(game.grid().active_cells().is_empty());
    assert_eq!(game.pending_move(), None);

    events.clear();
    game.tick(Duration::from_millis(499), &mut events);
    assert!(events.is_empty());

    game.tick(Duration::from_millis(1), &mut events);
    assert_eq!(game.phase(), GamePhase::RoundResult);
    assert_eq!(
        events.last(),
        Some(&Event::PhaseChanged {
            phase: GamePhase::RoundResult,
        })
    );
    assert!(events.contains(&Event::RoundFinished {
        score: 0,
        longest_branch: 0,
        best: 0,
        new_best: false,
    }));
}

#[test]
fn restart_begins_a_fresh_round() {
    let (mut game, _) = started(config(4, 4, 2), SEED);
    let mut events = Vec::new();
    game.select(first_candidate(&game), pending(&game), &mut events);
    game.tick(Duration::from_millis(300), &mut events);
    assert_eq!(game.remaining_time(), Duration::from_millis(700));

    events.clear();
    game.restart(&mut events).expect("restart succeeds");
    assert_eq!(game.phase(), GamePhase::BoardActive);
    assert_eq!(game.remaining_time(), Duration::from_secs(1));
    assert!(!game.moves_exhausted());
    assert!(matches!(events.first(), Some(Event::BoardReset { .. })));
    assert!(game.grid().cells().all(|cell| !cell.has_pipe() || cell.is_start()));
    assert_eq!(game.grid().active_cells().len(), 16 - 2 - 1);
    assert!(game.results().results().is_empty());
}

#[test]
fn best_score_survives_restarts() {
    let (mut game, _) = started(config(3, 3, 0), SEED);
    let mut events = Vec::new();
    for _ in 0..3 {
        game.tick(Duration::from_secs(1), &mut events);
        assert_eq!(game.phase(), GamePhase::RoundResult);
        game.restart(&mut events).expect("restart succeeds");
    }

    assert_eq!(game.results().results(), &[0, 0, 0]);
    assert_eq!(game.best_score(), 0);
    assert!(events.iter().all(|event| !matches!(
        event,
        Event::RoundFinished { new_best: true, .. }
    )));
}

#[test]
fn same_seed_replays_the_same_session() {
    fn session(seed: u64) -> Vec<Event> {
        let (mut game, mut events) = started(GameConfig::default(), seed);
        for _ in 0..10 {
            let target = first_candidate(&game);
            game.select(target, pending(&game), &mut events);
        }
        game.tick(Duration::from_secs(30), &mut events);
        game.tick(Duration::from_secs(30), &mut events);
        events
    }

    assert_eq!(session(SEED), session(SEED));
}

#[test]
fn invalid_configuration_is_rejected_up_front() {
    let result = GameFlow::new(config(9, 1, 0), SEED);
    assert_eq!(result.err(), Some(ConfigError::NoStartRow { rows: 1 }));

    let result = GameFlow::new(config(0, 7, 0), SEED);
    assert_eq!(
        result.err(),
        Some(ConfigError::EmptyGrid {
            columns: 0,
            rows: 7,
        })
    );
}

#[test]
fn failed_restart_returns_to_the_menu_without_a_result() {
    // Two blockers on a 1x3 board leave no start candidate when they cover both upper cells.
    let (mut game, error, events) = (0..256)
        .find_map(|seed| {
            let mut game = GameFlow::new(config(1, 3, 2), seed).expect("valid configuration");
            let mut events = Vec::new();
            game.assets_ready(&mut events);
            game.start(&mut events).ok()?;
            events.clear();
            let error = game.restart(&mut events).err()?;
            Some((game, error, events))
        })
        .expect("some seed blocks every start candidate on restart");

    assert_eq!(error, ConfigError::NoStartCandidates);
    assert_eq!(
        events.last(),
        Some(&Event::PhaseChanged {
            phase: GamePhase::MainMenu,
        })
    );
    assert_eq!(game.phase(), GamePhase::MainMenu);
    assert_eq!(game.start_cell(), None);
    assert_eq!(game.pending_move(), None);
    assert_eq!(game.remaining_time(), Duration::ZERO);
    assert!(!game.queue().is_active());

    let mut events = Vec::new();
    game.tick(Duration::from_secs(2), &mut events);
    assert!(events.is_empty());
    assert_eq!(game.phase(), GamePhase::MainMenu);
    assert!(game.results().results().is_empty());
}

/// Plays a 1x4 board whose start sits in the top row, accepting the seed only
/// when every tile dealt runs north to south.
fn connected_column(seed: u64) -> Option<GameFlow> {
    let (mut game, _) = started(config(1, 4, 0), seed);
    if game.start_cell() != Some(CellCoord::new(0, 0)) {
        return None;
    }

    let mut events = Vec::new();
    for row in 1..4 {
        let head = game.current_pipe()?;
        if !(head.connects(Direction::North) && head.connects(Direction::South)) {
            return None;
        }
        game.select(CellCoord::new(0, row), pending(&game), &mut events);
    }

    Some(game)
}

#[test]
fn connected_column_records_its_length() {
    let mut game = (0..1024)
        .find_map(connected_column)
        .expect("some seed deals a straight column");
    assert!(game.moves_exhausted());

    let mut events = Vec::new();
    game.tick(Duration::from_secs(1), &mut events);
    assert_eq!(game.phase(), GamePhase::RoundResult);
    assert!(events.contains(&Event::RoundFinished {
        score: 3,
        longest_branch: 3,
        best: 3,
        new_best: true,
    }));
    assert_eq!(game.current_score(), 3);
    assert_eq!(game.best_score(), 3);
    assert!((1..4).all(|row| game
        .grid()
        .find_cell(0, row)
        .is_some_and(|cell| cell.is_filled())));

    events.clear();
    game.restart(&mut events).expect("restart succeeds");
    game.tick(Duration::from_secs(1), &mut events);
    let finished = events.iter().find_map(|event| match event {
        Event::RoundFinished {
            score,
            best,
            new_best,
            ..
        } => Some((*score, *best, *new_best)),
        _ => None,
    });

    assert_eq!(finished, Some((0, 3, false)));
    assert_eq!(game.current_score(), 0);
    assert_eq!(game.best_score(), 3);
    assert_eq!(game.results().results(), &[3, 0]);
}
