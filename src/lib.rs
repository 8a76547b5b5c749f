//! minimax-2048: a 2048 game engine + time-bounded alpha-beta player
//!
//! This crate provides:
//! - An N×N `Board` value type with slide/merge transitions (`engine` module)
//! - A leaf heuristic for the search (`eval` module)
//! - A depth-adaptive, deadline-polling minimax player with sampled opponent
//!   replies (`minimax` module)
//! - The `Policy` trait plus random player/opponent agents (`policy` module)
//! - A turn loop that plays full games and reports a summary (`game` module)
//!
//! Quick start:
//! ```
//! use minimax_2048::engine::Board;
//! use minimax_2048::minimax::{Minimax, MinimaxConfig};
//! use minimax_2048::policy::{Policy, RandomOpponent};
//!
//! let mut opponent = RandomOpponent::with_seed(42);
//! let mut board = Board::new(4);
//! for _ in 0..2 {
//!     let (pos, value) = opponent.choose_placement(&board).unwrap();
//!     board.insert_tile(pos, value);
//! }
//!
//! let cfg = MinimaxConfig { depth_cap: Some(4), ..MinimaxConfig::default() };
//! let mut player = Minimax::with_seed(cfg, 7);
//! let dir = player.choose_move(&board).unwrap();
//! assert!(board.shift(dir));
//! ```
//!
//! Full games are easiest through `game::Game`, which alternates the two
//! agents and stops on game over, an invalid move or a blown turn budget.
//!
pub mod engine;
pub mod eval;
pub mod game;
pub mod minimax;
pub mod policy;
