#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tile supply for Pipe Flow: a random generator and the fixed-length queue
//! of upcoming tiles the player places next.

use std::collections::VecDeque;

use log::trace;
use pipe_flow_core::{Orientation, Pipe, TileKind};
use rand::Rng;

/// Stateless factory of randomly shaped, randomly turned pipes.
#[derive(Clone, Copy, Debug)]
pub struct TileGenerator {
    archetypes: [TileKind; 3],
}

impl Default for TileGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TileGenerator {
    /// Creates a generator drawing from the placeable archetypes.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            archetypes: TileKind::PLACEABLE,
        }
    }

    /// Produces a new pipe with a uniformly drawn archetype and orientation.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Pipe {
        let kind = self.archetypes[rng.gen_range(0..self.archetypes.len())];
        let orientation = Orientation::ALL[rng.gen_range(0..Orientation::ALL.len())];
        Pipe::new(kind, orientation)
    }
}

/// Pipe waiting in the queue together with its display slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueuedTile {
    pipe: Pipe,
    slot: usize,
}

impl QueuedTile {
    /// Pipe waiting to be placed.
    #[must_use]
    pub const fn pipe(&self) -> &Pipe {
        &self.pipe
    }

    /// Display position counted from the head of the queue.
    #[must_use]
    pub const fn slot(&self) -> usize {
        self.slot
    }
}

/// Continuously replenished sequence of upcoming tiles.
///
/// Once populated, the queue holds exactly `length` tiles after every
/// operation; taking the head always appends a fresh tile at the tail.
#[derive(Clone, Debug)]
pub struct TileQueue {
    length: usize,
    tiles: VecDeque<QueuedTile>,
    generator: TileGenerator,
    active: bool,
}

impl TileQueue {
    /// Creates an empty queue that will hold `length` tiles once populated.
    #[must_use]
    pub fn new(length: usize, generator: TileGenerator) -> Self {
        Self {
            length,
            tiles: VecDeque::with_capacity(length),
            generator,
            active: false,
        }
    }

    /// Fills the queue up to its configured length.
    pub fn populate<R: Rng>(&mut self, rng: &mut R) {
        while self.tiles.len() < self.length {
            let slot = self.tiles.len();
            let pipe = self.generator.generate(rng);
            self.tiles.push_back(QueuedTile { pipe, slot });
        }
    }

    /// Tile currently offered to the player.
    #[must_use]
    pub fn current(&self) -> Option<&Pipe> {
        self.tiles.front().map(QueuedTile::pipe)
    }

    /// Removes the head tile and appends a freshly generated one at the tail.
    ///
    /// Remaining tiles move up one slot. The returned pipe is inactive.
    pub fn take_current<R: Rng>(&mut self, rng: &mut R) -> Option<Pipe> {
        if self.tiles.is_empty() {
            self.populate(rng);
        }

        let mut head = self.tiles.pop_front()?;
        head.pipe.set_active(false);
        self.append_new(rng);

        if self.active {
            if let Some(next) = self.tiles.front_mut() {
                next.pipe.set_active(true);
            }
        }

        trace!(
            "took {:?} at {}°",
            head.pipe.kind(),
            head.pipe.orientation().degrees()
        );
        Some(head.pipe)
    }

    /// Marks the head tile as the one being offered.
    pub fn activate(&mut self) {
        self.active = true;
        if let Some(head) = self.tiles.front_mut() {
            head.pipe.set_active(true);
        }
    }

    /// Stops offering any tile.
    pub fn deactivate(&mut self) {
        self.active = false;
        for tile in &mut self.tiles {
            tile.pipe.set_active(false);
        }
    }

    /// Discards every queued tile, repopulates and re-activates the head.
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        self.tiles.clear();
        self.populate(rng);
        self.activate();
    }

    /// Reports whether the queue is offering its head tile.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Number of tiles currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether the queue holds no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Configured number of visible tiles.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    /// Iterates queued tiles from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &QueuedTile> {
        self.tiles.iter()
    }

    fn append_new<R: Rng>(&mut self, rng: &mut R) {
        for tile in &mut self.tiles {
            tile.slot = tile.slot.saturating_sub(1);
        }

        let slot = self.tiles.len();
        let pipe = self.generator.generate(rng);
        self.tiles.push_back(QueuedTile { pipe, slot });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn generator_only_produces_placeable_archetypes() {
        let generator = TileGenerator::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..200 {
            let pipe = generator.generate(&mut rng);
            assert_ne!(pipe.kind(), TileKind::Start);
            assert!(!pipe.is_filled());
            assert!(!pipe.is_active());
        }
    }

    #[test]
    fn generator_covers_every_archetype_and_orientation() {
        let generator = TileGenerator::new();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let pipes: Vec<Pipe> = (0..400).map(|_| generator.generate(&mut rng)).collect();

        for kind in TileKind::PLACEABLE {
            assert!(pipes.iter().any(|pipe| pipe.kind() == kind), "{kind:?} never drawn");
        }
        for orientation in Orientation::ALL {
            assert!(
                pipes.iter().any(|pipe| pipe.orientation() == orientation),
                "{orientation:?} never drawn"
            );
        }
    }

    #[test]
    fn slots_close_the_gap_after_taking_the_head() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut queue = TileQueue::new(4, TileGenerator::new());
        queue.populate(&mut rng);
        let second = *queue.iter().nth(1).expect("second tile").pipe();

        let _ = queue.take_current(&mut rng);

        let slots: Vec<usize> = queue.iter().map(QueuedTile::slot).collect();
        assert_eq!(slots, vec![0, 1, 2, 3]);
        assert_eq!(queue.current(), Some(&second));
    }
}
