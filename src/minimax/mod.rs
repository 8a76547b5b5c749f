//! Time-bounded alpha-beta minimax policy for 2048.
//!
//! The player maximizes; the opponent is modeled as a minimizer that places a
//! 2 or 4 in a handful of sampled empty cells. Depth adapts to the board: the
//! fewer empty cells, the deeper the search. Every expansion polls a deadline,
//! so a call returns the best move found so far once time runs out.
//!
//! Quick start
//! ```
//! use minimax_2048::engine::Board;
//! use minimax_2048::minimax::{Minimax, MinimaxConfig};
//!
//! let board = Board::from_rows(&[
//!     [2, 0, 0, 0],
//!     [0, 0, 0, 0],
//!     [0, 0, 2, 0],
//!     [0, 0, 0, 0],
//! ]).unwrap();
//! let cfg = MinimaxConfig { depth_cap: Some(4), ..MinimaxConfig::default() };
//! let mut ai = Minimax::with_seed(cfg, 42);
//! let dir = ai.best_move(&board).unwrap();
//! assert!(board.available_moves().contains(&dir));
//! ```

use std::time::Duration;

use crate::engine::Direction;

mod search;

pub use search::Minimax;

/// Search knobs. Defaults reproduce the reference player.
///
/// - `time_limit`: wall-clock budget per [`Minimax::best_move`] call.
/// - `alpha`/`beta`: initial window at the root.
/// - `sample_width`: opponent placements sampled per minimizing node.
/// - `two_probability`: chance that a sampled placement is a 2 (else 4).
/// - `depth_cap`: optional hard cap on the dynamic depth limit.
/// - `pruning`: disable to get the exhaustive reference search.
#[derive(Debug, Clone)]
pub struct MinimaxConfig {
    pub time_limit: Duration,
    pub alpha: f64,
    pub beta: f64,
    pub sample_width: usize,
    pub two_probability: f64,
    pub depth_cap: Option<u32>,
    pub pruning: bool,
}

impl Default for MinimaxConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_millis(200),
            alpha: 2.0,
            beta: 4096.0,
            sample_width: 5,
            two_probability: 0.9,
            depth_cap: None,
            pruning: true,
        }
    }
}

/// Root result of a search: the chosen direction (if any) and its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    pub dir: Option<Direction>,
    pub score: f64,
}

/// Diagnostics from the most recent call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchStats {
    /// Nodes visited, both layers.
    pub nodes: u64,
    /// Depth limit used for the call.
    pub max_layer: u32,
    /// Alpha and beta cutoffs taken.
    pub cutoffs: u64,
    /// The deadline stopped at least one expansion.
    pub timed_out: bool,
    /// The move was picked at random because the search produced none.
    pub fallback: bool,
    pub elapsed: Duration,
}

/// Dynamic depth limit for a root with `empty` empty cells.
///
/// `round(e^(18 / (empty + 3) + 1))`, lowered to the next even number so the
/// last ply is an opponent reply.
///
/// ```
/// use minimax_2048::minimax::depth_limit;
/// assert_eq!(depth_limit(13), 8);
/// assert_eq!(depth_limit(0), 1096);
/// ```
pub fn depth_limit(empty: usize) -> u32 {
    let raw = (18.0 / (empty as f64 + 3.0) + 1.0).exp().round() as u32;
    raw - raw % 2
}
