use pipe_flow_system_tile_queue::{TileGenerator, TileQueue};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const QUEUE_LENGTH: usize = 7;

fn populated_queue(seed: u64) -> (TileQueue, ChaCha8Rng) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut queue = TileQueue::new(QUEUE_LENGTH, TileGenerator::new());
    queue.populate(&mut rng);
    (queue, rng)
}

#[test]
fn length_is_invariant_across_takes() {
    let (mut queue, mut rng) = populated_queue(42);
    assert_eq!(queue.len(), QUEUE_LENGTH);

    for _ in 0..50 {
        assert_eq!(queue.len(), QUEUE_LENGTH);
        let taken = queue.take_current(&mut rng);
        assert!(taken.is_some(), "populated queue must always yield a tile");
        assert_eq!(queue.len(), QUEUE_LENGTH);
    }
}

#[test]
fn take_current_returns_the_previous_head() {
    let (mut queue, mut rng) = populated_queue(7);
    let head = *queue.current().expect("populated queue has a head");

    let taken = queue.take_current(&mut rng).expect("tile available");
    assert_eq!(taken.kind(), head.kind());
    assert_eq!(taken.orientation(), head.orientation());
}

#[test]
fn only_the_head_is_active() {
    let (mut queue, mut rng) = populated_queue(3);
    queue.activate();

    for _ in 0..5 {
        let active: Vec<bool> = queue.iter().map(|tile| tile.pipe().is_active()).collect();
        assert!(active[0], "head must be active");
        assert!(
            active[1..].iter().all(|flag| !flag),
            "tail tiles must stay inactive"
        );

        let taken = queue.take_current(&mut rng).expect("tile available");
        assert!(!taken.is_active(), "handed-out tile must be inactive");
    }
}

#[test]
fn deactivate_clears_every_tile() {
    let (mut queue, _) = populated_queue(3);
    queue.activate();
    queue.deactivate();

    assert!(!queue.is_active());
    assert!(queue.iter().all(|tile| !tile.pipe().is_active()));
}

#[test]
fn reset_repopulates_and_reactivates() {
    let (mut queue, mut rng) = populated_queue(21);
    queue.deactivate();

    queue.reset(&mut rng);

    assert_eq!(queue.len(), QUEUE_LENGTH);
    assert!(queue.is_active());
    assert!(queue.current().is_some_and(|pipe| pipe.is_active()));
}

#[test]
fn empty_queue_populates_on_demand() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut queue = TileQueue::new(3, TileGenerator::new());
    assert!(queue.is_empty());

    assert!(queue.take_current(&mut rng).is_some());
    assert_eq!(queue.len(), 3);
}

#[test]
fn same_seed_yields_same_sequence() {
    let (mut first, mut first_rng) = populated_queue(1234);
    let (mut second, mut second_rng) = populated_queue(1234);

    for _ in 0..20 {
        assert_eq!(
            first.take_current(&mut first_rng),
            second.take_current(&mut second_rng)
        );
    }
}
