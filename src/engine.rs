//! Board state and slide/merge transitions for an N×N 2048 board.
//!
//! A [`Board`] is a plain value: cloning it yields an independent grid, so
//! search branches can mutate their copy freely.
//!
//! ```
//! use minimax_2048::engine::{Board, Direction};
//!
//! let mut b = Board::from_rows(&[
//!     [2, 0, 2, 0],
//!     [0, 0, 0, 0],
//!     [0, 0, 0, 0],
//!     [0, 0, 0, 4],
//! ]).unwrap();
//! assert!(b.shift(Direction::Left));
//! assert_eq!(b.cells()[0], 4);
//! assert_eq!(b.max_tile(), 4);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cell value: 0 for empty, otherwise a power of two (>= 2).
pub type Tile = u64;

/// A direction to slide/merge tiles.
///
/// The discriminants are the interop encoding (0=Up, 1=Down, 2=Left, 3=Right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    /// All four directions in encoding order.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Unit vector as `(row delta, col delta)`.
    #[inline]
    pub fn vector(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    #[inline]
    pub fn index(self) -> u8 { self as u8 }
}

impl TryFrom<u8> for Direction {
    type Error = DirectionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::Up),
            1 => Ok(Direction::Down),
            2 => Ok(Direction::Left),
            3 => Ok(Direction::Right),
            other => Err(DirectionError::OutOfRange(other)),
        }
    }
}

impl From<Direction> for u8 {
    fn from(dir: Direction) -> Self { dir.index() }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        };
        f.write_str(s)
    }
}

/// A cell coordinate; both components index from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self { Pos { row, col } }

    /// The neighboring position one step along `dir`, if it is non-negative.
    ///
    /// The result may still lie past the far edge; bounds are the board's concern.
    #[inline]
    pub fn step(self, dir: Direction) -> Option<Pos> {
        let (dr, dc) = dir.vector();
        Some(Pos { row: self.row.checked_add_signed(dr)?, col: self.col.checked_add_signed(dc)? })
    }
}

impl From<(usize, usize)> for Pos {
    fn from((row, col): (usize, usize)) -> Self { Pos { row, col } }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("board must have at least one row")]
    EmptyBoard,
    #[error("board has {rows} rows of {cols} cells; it must be square")]
    NotSquare { rows: usize, cols: usize },
    #[error("expected {expected} cells, found {found}")]
    CellCount { expected: usize, found: usize },
    #[error("cell ({row}, {col}) holds {value}, which is neither 0 nor a power of two >= 2")]
    InvalidTile { row: usize, col: usize, value: Tile },
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionError {
    #[error("direction code {0} is out of range (expected 0..=3)")]
    OutOfRange(u8),
}

/// Square 2048 board stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    cells: Vec<Tile>,
}

impl Default for Board {
    fn default() -> Self { Board::new(Board::DEFAULT_SIZE) }
}

impl Board {
    /// Side length of the classic game.
    pub const DEFAULT_SIZE: usize = 4;

    /// An empty `size`×`size` board.
    pub fn new(size: usize) -> Self {
        Board { size, cells: vec![0; size * size] }
    }

    /// Build a board from rows, validating squareness and tile values.
    pub fn from_rows<const N: usize>(rows: &[[Tile; N]]) -> Result<Self, BoardError> {
        if rows.len() != N {
            return Err(BoardError::NotSquare { rows: rows.len(), cols: N });
        }
        Board::from_cells(N, rows.iter().flatten().copied().collect())
    }

    /// Build a `size`×`size` board from row-major cells.
    pub fn from_cells(size: usize, cells: Vec<Tile>) -> Result<Self, BoardError> {
        if size == 0 {
            return Err(BoardError::EmptyBoard);
        }
        if cells.len() != size * size {
            return Err(BoardError::CellCount { expected: size * size, found: cells.len() });
        }
        if let Some(idx) = cells.iter().position(|&v| v == 1 || (v != 0 && !v.is_power_of_two())) {
            return Err(BoardError::InvalidTile { row: idx / size, col: idx % size, value: cells[idx] });
        }
        Ok(Board { size, cells })
    }

    #[inline]
    pub fn size(&self) -> usize { self.size }

    /// Row-major view of every cell.
    #[inline]
    pub fn cells(&self) -> &[Tile] { &self.cells }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> + '_ {
        self.cells.chunks(self.size.max(1))
    }

    /// All empty positions in row-major order.
    pub fn available_cells(&self) -> Vec<Pos> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 0)
            .map(|(idx, _)| Pos::new(idx / self.size, idx % self.size))
            .collect()
    }

    /// Number of empty cells.
    #[inline]
    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    /// Highest tile on the board (0 when empty).
    #[inline]
    pub fn max_tile(&self) -> Tile {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all tiles. Sliding never changes it.
    #[inline]
    pub fn tile_sum(&self) -> Tile { self.cells.iter().sum() }

    /// True if `pos` lies outside the board.
    #[inline]
    pub fn cross_bound(&self, pos: Pos) -> bool {
        pos.row >= self.size || pos.col >= self.size
    }

    /// Value at `pos`, or `None` when out of bounds.
    #[inline]
    pub fn cell(&self, pos: Pos) -> Option<Tile> {
        if self.cross_bound(pos) { None } else { Some(self.cells[pos.row * self.size + pos.col]) }
    }

    /// True iff `pos` is on the board and currently empty.
    #[inline]
    pub fn can_insert(&self, pos: Pos) -> bool { self.cell(pos) == Some(0) }

    /// Unchecked write; the caller validates `pos` (see [`Board::can_insert`]).
    #[inline]
    pub fn set_cell_value(&mut self, pos: Pos, value: Tile) {
        debug_assert!(!self.cross_bound(pos), "set_cell_value out of bounds: {:?}", pos);
        self.cells[pos.row * self.size + pos.col] = value;
    }

    /// Place an opponent tile. Same contract as [`Board::set_cell_value`].
    #[inline]
    pub fn insert_tile(&mut self, pos: Pos, value: Tile) { self.set_cell_value(pos, value) }

    /// Slide and merge every line toward `dir` in place.
    ///
    /// Returns whether any cell changed.
    ///
    /// ```
    /// use minimax_2048::engine::{Board, Direction};
    /// let mut b = Board::from_rows(&[[0, 2], [2, 2]]).unwrap();
    /// assert!(b.shift(Direction::Up));
    /// assert_eq!(b.cells(), &[2, 4, 0, 0][..]);
    /// assert!(!b.shift(Direction::Up));
    /// ```
    pub fn shift(&mut self, dir: Direction) -> bool {
        let n = self.size;
        let mut moved = false;
        let mut line: Vec<Tile> = Vec::with_capacity(n);
        for lane in 0..n {
            line.clear();
            line.extend((0..n).map(|step| self.cells[line_index(n, dir, lane, step)]).filter(|&v| v != 0));
            merge_line(&mut line);
            for step in 0..n {
                let idx = line_index(n, dir, lane, step);
                let value = line.get(step).copied().unwrap_or(0);
                if self.cells[idx] != value {
                    self.cells[idx] = value;
                    moved = true;
                }
            }
        }
        moved
    }

    /// The board after sliding toward `dir`, or `None` if nothing would change.
    #[inline]
    pub fn shifted(&self, dir: Direction) -> Option<Board> {
        let mut next = self.clone();
        if next.shift(dir) { Some(next) } else { None }
    }

    /// Fast game-not-over check against all four directions.
    #[inline]
    pub fn can_move(&self) -> bool { self.can_move_in(&Direction::ALL) }

    /// True iff some cell is empty, or some tile has an empty or equal
    /// neighbor along one of `dirs`.
    ///
    /// This is a single board scan and does not simulate the moves, so an
    /// empty board reports `true` even though no slide changes it.
    pub fn can_move_in(&self, dirs: &[Direction]) -> bool {
        for row in 0..self.size {
            for col in 0..self.size {
                let pos = Pos::new(row, col);
                let value = self.cells[row * self.size + col];
                if value == 0 {
                    return true;
                }
                for &dir in dirs {
                    let adjacent = pos.step(dir).and_then(|p| self.cell(p));
                    if adjacent == Some(value) || adjacent == Some(0) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Directions that change the board, found by trial.
    #[inline]
    pub fn available_moves(&self) -> Vec<Direction> { self.available_moves_in(&Direction::ALL) }

    /// The subset of `dirs`, in order, whose slide changes the board.
    pub fn available_moves_in(&self, dirs: &[Direction]) -> Vec<Direction> {
        dirs.iter().copied().filter(|&dir| self.shifted(dir).is_some()).collect()
    }
}

/// Draw an opponent tile value: 2 with probability `two_probability`, else 4.
#[inline]
pub fn random_tile_value<R: Rng + ?Sized>(rng: &mut R, two_probability: f64) -> Tile {
    if rng.gen::<f64>() < two_probability { 2 } else { 4 }
}

/// Flat index of the `step`-th cell of `lane`, counting from the edge tiles move toward.
#[inline(always)]
fn line_index(n: usize, dir: Direction, lane: usize, step: usize) -> usize {
    let far = n - 1 - step;
    let (row, col) = match dir {
        Direction::Up => (step, lane),
        Direction::Down => (far, lane),
        Direction::Left => (lane, step),
        Direction::Right => (lane, far),
    };
    row * n + col
}

/// Single left-to-right merge pass over a gap-free line.
fn merge_line(line: &mut Vec<Tile>) {
    let mut i = 0;
    while i + 1 < line.len() {
        if line[i] == line[i + 1] {
            line[i] *= 2;
            line.remove(i + 1);
        }
        i += 1;
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(self.size * 8);
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f, "{}", rule)?;
            }
            let line: Vec<String> = row.iter().map(|&v| format_val(v)).collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}

fn format_val(val: Tile) -> String {
    match val {
        0 => " ".repeat(7),
        x => format!("{:^7}", x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn board(rows: &[[Tile; 4]]) -> Board { Board::from_rows(rows).unwrap() }

    fn slid_row(row: [Tile; 4], dir: Direction) -> ([Tile; 4], bool) {
        let mut b = board(&[row, [0; 4], [0; 4], [0; 4]]);
        let moved = b.shift(dir);
        let mut out = [0; 4];
        out.copy_from_slice(&b.cells()[..4]);
        (out, moved)
    }

    /// Boards reached by playing seeded random games.
    fn corpus(seed: u64) -> Vec<Board> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut boards = vec![Board::new(4)];
        let mut b = Board::new(4);
        for _ in 0..200 {
            let empty = b.available_cells();
            if empty.is_empty() {
                b = Board::new(4);
                continue;
            }
            let pos = empty[rng.gen_range(0..empty.len())];
            b.insert_tile(pos, random_tile_value(&mut rng, 0.9));
            boards.push(b.clone());
            let dir = Direction::ALL[rng.gen_range(0..4)];
            b.shift(dir);
            boards.push(b.clone());
        }
        boards
    }

    #[test]
    fn it_merge_line() {
        let cases: [(Vec<Tile>, Vec<Tile>); 6] = [
            (vec![], vec![]),
            (vec![2], vec![2]),
            (vec![2, 2], vec![4]),
            (vec![2, 2, 2, 2], vec![4, 4]),
            (vec![4, 2, 2], vec![4, 4]),
            (vec![2, 4, 2, 4], vec![2, 4, 2, 4]),
        ];
        for (mut input, expected) in cases {
            merge_line(&mut input);
            assert_eq!(input, expected);
        }
    }

    #[test]
    fn it_shift_row_examples() {
        assert_eq!(slid_row([2, 0, 2, 0], Direction::Left), ([4, 0, 0, 0], true));
        assert_eq!(slid_row([2, 2, 2, 2], Direction::Left), ([4, 4, 0, 0], true));
        assert_eq!(slid_row([0, 0, 0, 2], Direction::Right), ([0, 0, 0, 2], false));
        assert_eq!(slid_row([2, 2, 2, 0], Direction::Right), ([0, 0, 2, 4], true));
        assert_eq!(slid_row([4, 4, 8, 0], Direction::Left), ([8, 8, 0, 0], true));
    }

    #[test]
    fn test_move_left_right() {
        let start = board(&[[2, 4, 8, 16], [2, 8, 8, 4], [4, 0, 0, 4], [2, 0, 0, 4]]);
        let mut left = start.clone();
        assert!(left.shift(Direction::Left));
        assert_eq!(left, board(&[[2, 4, 8, 16], [2, 16, 4, 0], [8, 0, 0, 0], [2, 4, 0, 0]]));
        let mut right = start;
        assert!(right.shift(Direction::Right));
        assert_eq!(right, board(&[[2, 4, 8, 16], [0, 2, 16, 4], [0, 0, 0, 8], [0, 0, 2, 4]]));
    }

    #[test]
    fn test_move_up_down() {
        let start = board(&[[2, 2, 4, 2], [4, 8, 0, 0], [8, 8, 0, 0], [16, 4, 4, 4]]);
        let mut up = start.clone();
        assert!(up.shift(Direction::Up));
        assert_eq!(up, board(&[[2, 2, 8, 2], [4, 16, 0, 4], [8, 4, 0, 0], [16, 0, 0, 0]]));
        let mut down = start;
        assert!(down.shift(Direction::Down));
        assert_eq!(down, board(&[[2, 0, 0, 0], [4, 2, 0, 0], [8, 16, 0, 2], [16, 4, 8, 4]]));
    }

    #[test]
    fn it_works_on_other_sizes() {
        let mut b = Board::from_rows(&[[2, 2, 4], [0, 0, 0], [4, 0, 4]]).unwrap();
        assert!(b.shift(Direction::Left));
        assert_eq!(b.cells(), &[4, 4, 0, 0, 0, 0, 8, 0, 0][..]);
        let mut tiny = Board::from_rows(&[[2]]).unwrap();
        assert!(!tiny.shift(Direction::Down));
        assert!(!tiny.can_move());
    }

    #[test]
    fn it_rejects_bad_grids() {
        assert_eq!(Board::from_rows::<0>(&[]), Err(BoardError::EmptyBoard));
        assert_eq!(Board::from_rows(&[[2, 0, 0]]), Err(BoardError::NotSquare { rows: 1, cols: 3 }));
        assert_eq!(
            Board::from_cells(2, vec![2, 0, 0]),
            Err(BoardError::CellCount { expected: 4, found: 3 })
        );
        assert_eq!(
            Board::from_rows(&[[2, 3], [0, 0]]),
            Err(BoardError::InvalidTile { row: 0, col: 1, value: 3 })
        );
        assert!(Board::from_rows(&[[1, 0], [0, 0]]).is_err());
    }

    #[test]
    fn it_direction_codes() {
        for (code, dir) in Direction::ALL.iter().enumerate() {
            assert_eq!(Direction::try_from(code as u8), Ok(*dir));
            assert_eq!(u8::from(*dir), code as u8);
        }
        assert_eq!(Direction::try_from(4), Err(DirectionError::OutOfRange(4)));
        assert_eq!(Direction::Up.vector(), (-1, 0));
        assert_eq!(Direction::Right.vector(), (0, 1));
    }

    #[test]
    fn it_cell_queries() {
        let b = board(&[[0, 2, 0, 0], [0, 0, 0, 0], [0, 0, 8, 0], [0, 0, 0, 0]]);
        assert_eq!(b.cell(Pos::new(0, 1)), Some(2));
        assert_eq!(b.cell(Pos::new(4, 0)), None);
        assert_eq!(b.cell(Pos::new(0, 4)), None);
        assert!(b.can_insert(Pos::new(0, 0)));
        assert!(!b.can_insert(Pos::new(0, 1)));
        assert!(!b.can_insert(Pos::new(9, 9)));
        assert_eq!(b.max_tile(), 8);
        assert_eq!(b.count_empty(), 14);
        let cells = b.available_cells();
        assert_eq!(cells.len(), 14);
        assert_eq!(cells[0], Pos::new(0, 0));
        assert_eq!(cells[1], Pos::new(0, 2));
        assert!(cells.windows(2).all(|w| (w[0].row, w[0].col) < (w[1].row, w[1].col)));
        assert_eq!(Board::new(4).max_tile(), 0);
    }

    #[test]
    fn it_clone_is_independent() {
        let original = board(&[[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut copy = original.clone();
        copy.set_cell_value(Pos::new(3, 3), 4);
        copy.shift(Direction::Right);
        assert_eq!(original.cells()[0], 2);
        assert_eq!(original.cells()[15], 0);
    }

    #[test]
    fn it_empty_board_can_move_but_has_no_moves() {
        let b = Board::new(4);
        assert!(b.can_move());
        assert!(b.available_moves().is_empty());
    }

    #[test]
    fn it_full_board_without_merges_is_stuck() {
        let b = board(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(!b.can_move());
        assert!(b.available_moves().is_empty());
        let c = board(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 8, 8]]);
        assert!(c.can_move());
        assert_eq!(c.available_moves(), vec![Direction::Left, Direction::Right]);
        assert!(!c.can_move_in(&[Direction::Up, Direction::Down]));
    }

    #[test]
    fn it_preserves_tile_sum() {
        for b in corpus(42) {
            for dir in Direction::ALL {
                let mut next = b.clone();
                next.shift(dir);
                assert_eq!(next.tile_sum(), b.tile_sum(), "{:?} {}", dir, b);
            }
        }
    }

    #[test]
    fn it_noop_shift_is_idempotent() {
        for b in corpus(7) {
            for dir in Direction::ALL {
                let mut next = b.clone();
                if !next.shift(dir) {
                    assert_eq!(next, b);
                    assert!(!next.shift(dir));
                    assert_eq!(next, b);
                }
            }
        }
    }

    #[test]
    fn it_available_moves_match_trial() {
        for b in corpus(99) {
            let moves = b.available_moves();
            for dir in Direction::ALL {
                let mut next = b.clone();
                assert_eq!(next.shift(dir), moves.contains(&dir));
            }
            let any_empty = !b.available_cells().is_empty();
            let any_pair = (0..4).any(|r| {
                (0..4).any(|c| {
                    let v = b.cells()[r * 4 + c];
                    (c + 1 < 4 && b.cells()[r * 4 + c + 1] == v) || (r + 1 < 4 && b.cells()[(r + 1) * 4 + c] == v)
                })
            });
            assert_eq!(b.can_move(), any_empty || any_pair);
            if b.max_tile() > 0 {
                assert_eq!(b.can_move(), !moves.is_empty());
            }
        }
    }

    #[test]
    fn it_tile_draw_respects_probability() {
        let mut rng = StdRng::seed_from_u64(5);
        let twos = (0..10_000).filter(|_| random_tile_value(&mut rng, 0.9) == 2).count();
        assert!((8_700..9_300).contains(&twos), "twos = {}", twos);
        assert_eq!(random_tile_value(&mut rng, 1.0), 2);
        assert_eq!(random_tile_value(&mut rng, 0.0), 4);
    }

    #[test]
    fn it_displays_grid() {
        let b = board(&[[2, 0, 0, 0], [0, 2048, 0, 0], [0; 4], [0; 4]]);
        let text = b.to_string();
        assert_eq!(text.lines().count(), 7);
        assert!(text.contains(" 2048  "));
    }
}
