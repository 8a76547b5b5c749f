//! Leaf scoring for the minimax search.

use crate::engine::Board;

const TILE_WEIGHT: f64 = 0.2;
const EMPTY_WEIGHT: f64 = 0.8;
const EPSILON: f64 = 1e-4;

/// Score `board` against the search bound currently in force.
///
/// `bound` is the alpha (max layers) or beta (min layers) value handed to the
/// leaf, not a tile. Growth room is measured as `log2(max_tile - bound + ε)`,
/// which is NaN when the bound exceeds the best tile; NaN never compares
/// greater or smaller, so such a leaf cannot displace a best score.
///
/// ```
/// use minimax_2048::engine::Board;
/// use minimax_2048::eval::evaluate;
///
/// let b = Board::from_rows(&[[8, 0], [0, 0]]).unwrap();
/// let score = evaluate(&b, 2.0);
/// assert!((score - (0.2 * (6.0001f64).log2() + 0.8 * 3.0)).abs() < 1e-9);
/// ```
#[inline]
pub fn evaluate(board: &Board, bound: f64) -> f64 {
    let growth = (board.max_tile() as f64 - bound + EPSILON).log2();
    TILE_WEIGHT * growth + EMPTY_WEIGHT * board.count_empty() as f64
}
