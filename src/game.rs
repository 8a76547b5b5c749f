//! Turn loop pairing a player [`Policy`] with the random tile opponent.
//!
//! The player moves first; turns then alternate. Every agent sees a clone of
//! the authoritative board, and its answer is validated before it is applied.
//!
//! ```
//! use minimax_2048::game::{EndReason, Game, GameConfig};
//! use minimax_2048::policy::RandomPolicy;
//!
//! let cfg = GameConfig { enforce_time: false, ..GameConfig::default() };
//! let mut game = Game::with_seed(cfg, RandomPolicy::with_seed(1), 2).unwrap();
//! let summary = game.play();
//! assert_eq!(summary.end_reason, EndReason::NoMoves);
//! assert!(summary.max_tile >= 4);
//! ```

use std::time::{Duration, Instant};

use log::{info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::engine::{Board, Tile};
use crate::policy::{Policy, RandomOpponent};

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub size: usize,
    pub initial_tiles: usize,
    pub two_probability: f64,
    /// Wall-clock budget per turn; exceeding `turn_limit + allowance` ends the game.
    pub turn_limit: Duration,
    pub allowance: Duration,
    pub enforce_time: bool,
    /// Stop after this many turns (player and opponent turns both count).
    pub max_turns: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            size: Board::DEFAULT_SIZE,
            initial_tiles: 2,
            two_probability: RandomOpponent::DEFAULT_TWO_PROBABILITY,
            turn_limit: Duration::from_millis(200),
            allowance: Duration::from_millis(50),
            enforce_time: true,
            max_turns: None,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("board size must be at least 1")]
    ZeroSize,
    #[error("cannot place {tiles} initial tiles on a {size}x{size} board")]
    TooManyInitialTiles { tiles: usize, size: usize },
}

/// Why a game stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    NoMoves,
    InvalidPlayerMove,
    InvalidPlacement,
    TimeExceeded,
    TurnLimit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub max_tile: Tile,
    /// Player moves applied.
    pub moves: u64,
    pub turns: u64,
    pub tile_sum: Tile,
    pub end_reason: EndReason,
    pub elapsed_ms: u64,
    pub final_board: Vec<Tile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Turn {
    Player,
    Opponent,
}

pub struct Game<P: Policy> {
    cfg: GameConfig,
    board: Board,
    player: P,
    opponent: RandomOpponent,
}

impl<P: Policy> Game<P> {
    /// New game on an empty board seeded with the opening tiles.
    pub fn new(cfg: GameConfig, player: P) -> Result<Self, GameError> {
        let opponent = RandomOpponent::new().two_probability(cfg.two_probability);
        Self::opening(cfg, player, opponent)
    }

    /// Like [`Game::new`], with the opponent's randomness fixed by `seed`.
    pub fn with_seed(cfg: GameConfig, player: P, seed: u64) -> Result<Self, GameError> {
        let opponent = RandomOpponent::with_seed(seed).two_probability(cfg.two_probability);
        Self::opening(cfg, player, opponent)
    }

    /// Resume from an existing position; no opening tiles are added.
    pub fn from_board(cfg: GameConfig, board: Board, player: P, seed: u64) -> Self {
        let opponent = RandomOpponent::with_seed(seed).two_probability(cfg.two_probability);
        Game { cfg, board, player, opponent }
    }

    fn opening(cfg: GameConfig, player: P, mut opponent: RandomOpponent) -> Result<Self, GameError> {
        if cfg.size == 0 {
            return Err(GameError::ZeroSize);
        }
        if cfg.initial_tiles > cfg.size * cfg.size {
            return Err(GameError::TooManyInitialTiles { tiles: cfg.initial_tiles, size: cfg.size });
        }
        let mut board = Board::new(cfg.size);
        for _ in 0..cfg.initial_tiles {
            if let Some((pos, value)) = opponent.choose_placement(&board) {
                board.insert_tile(pos, value);
            }
        }
        Ok(Game { cfg, board, player, opponent })
    }

    #[inline]
    pub fn board(&self) -> &Board { &self.board }

    #[inline]
    pub fn player(&self) -> &P { &self.player }

    /// True once no slide or placement is possible.
    #[inline]
    pub fn is_over(&self) -> bool { !self.board.can_move() }

    pub fn play(&mut self) -> GameSummary { self.play_with(|_| {}) }

    /// Play to the end, calling `on_turn` with the board after the opening
    /// and after every applied turn.
    pub fn play_with<F: FnMut(&Board)>(&mut self, mut on_turn: F) -> GameSummary {
        let start = Instant::now();
        let budget = self.cfg.turn_limit + self.cfg.allowance;
        let mut turn = Turn::Player;
        let mut moves = 0u64;
        let mut turns = 0u64;
        let mut max_tile = self.board.max_tile();
        on_turn(&self.board);

        let end_reason = loop {
            if self.is_over() {
                break EndReason::NoMoves;
            }
            if self.cfg.max_turns.is_some_and(|limit| turns >= limit) {
                break EndReason::TurnLimit;
            }
            // Agents only ever see a copy.
            let snapshot = self.board.clone();
            let turn_start = Instant::now();
            match turn {
                Turn::Player => {
                    let Some(dir) = self.player.choose_move(&snapshot) else {
                        break EndReason::NoMoves;
                    };
                    if !self.board.can_move_in(&[dir]) {
                        warn!("invalid player move {} at turn {}", dir, turns);
                        break EndReason::InvalidPlayerMove;
                    }
                    self.board.shift(dir);
                    moves += 1;
                    max_tile = max_tile.max(self.board.max_tile());
                    trace!("turn {}: player {}", turns, dir);
                }
                Turn::Opponent => match self.opponent.choose_placement(&snapshot) {
                    Some((pos, value)) if self.board.can_insert(pos) => {
                        self.board.insert_tile(pos, value);
                        trace!("turn {}: opponent {} at ({}, {})", turns, value, pos.row, pos.col);
                    }
                    _ => {
                        warn!("invalid opponent placement at turn {}", turns);
                        break EndReason::InvalidPlacement;
                    }
                },
            }
            turns += 1;
            on_turn(&self.board);
            let spent = turn_start.elapsed();
            if self.cfg.enforce_time && spent > budget {
                warn!("turn {} took {:?}, over the {:?} budget", turns, spent, budget);
                break EndReason::TimeExceeded;
            }
            turn = match turn {
                Turn::Player => Turn::Opponent,
                Turn::Opponent => Turn::Player,
            };
        };

        let summary = GameSummary {
            max_tile,
            moves,
            turns,
            tile_sum: self.board.tile_sum(),
            end_reason,
            elapsed_ms: start.elapsed().as_millis() as u64,
            final_board: self.board.cells().to_vec(),
        };
        info!(
            "game over ({:?}): max tile {}, {} moves, {} turns, {} ms",
            summary.end_reason, summary.max_tile, summary.moves, summary.turns, summary.elapsed_ms
        );
        summary
    }
}
