//! Move providers: the player-side [`Policy`] trait and the random agents.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::{random_tile_value, Board, Direction, Pos, Tile};

/// A player that picks a slide direction for a board snapshot.
///
/// `None` means the player has no move, which the game treats as game over.
pub trait Policy {
    fn choose_move(&mut self, board: &Board) -> Option<Direction>;
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn choose_move(&mut self, board: &Board) -> Option<Direction> { (**self).choose_move(board) }
}

/// Uniformly random legal direction.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new() -> Self { Self { rng: StdRng::from_entropy() } }

    pub fn with_seed(seed: u64) -> Self { Self { rng: StdRng::seed_from_u64(seed) } }
}

impl Default for RandomPolicy { fn default() -> Self { Self::new() } }

impl Policy for RandomPolicy {
    fn choose_move(&mut self, board: &Board) -> Option<Direction> {
        let moves = board.available_moves();
        if moves.is_empty() {
            return None;
        }
        Some(moves[self.rng.gen_range(0..moves.len())])
    }
}

/// The tile-spawning opponent: a uniformly random empty cell, holding a 2
/// with probability `two_probability` and a 4 otherwise.
pub struct RandomOpponent {
    rng: StdRng,
    two_probability: f64,
}

impl RandomOpponent {
    pub const DEFAULT_TWO_PROBABILITY: f64 = 0.9;

    pub fn new() -> Self {
        Self { rng: StdRng::from_entropy(), two_probability: Self::DEFAULT_TWO_PROBABILITY }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), two_probability: Self::DEFAULT_TWO_PROBABILITY }
    }

    pub fn two_probability(mut self, p: f64) -> Self {
        self.two_probability = p;
        self
    }

    /// Choose where to spawn and what, or `None` on a full board.
    pub fn choose_placement(&mut self, board: &Board) -> Option<(Pos, Tile)> {
        let cells = board.available_cells();
        if cells.is_empty() {
            return None;
        }
        let pos = cells[self.rng.gen_range(0..cells.len())];
        Some((pos, self.tile_value()))
    }

    /// Draw a spawn value on its own (used for the opening tiles).
    pub fn tile_value(&mut self) -> Tile { random_tile_value(&mut self.rng, self.two_probability) }
}

impl Default for RandomOpponent { fn default() -> Self { Self::new() } }
