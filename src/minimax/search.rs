use std::time::Instant;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use crate::engine::{random_tile_value, Board, Direction};
use crate::eval::evaluate;
use crate::policy::Policy;

use super::{depth_limit, MinimaxConfig, SearchOutcome, SearchStats};

/// Alpha-beta minimax with sampled opponent replies and a per-call deadline.
///
/// Holds no search state between calls beyond its RNG and the last stats.
pub struct Minimax {
    cfg: MinimaxConfig,
    stats: SearchStats,
    rng: StdRng,
}

impl Minimax {
    pub fn new() -> Self { Self::with_config(MinimaxConfig::default()) }

    pub fn with_config(cfg: MinimaxConfig) -> Self {
        Self { cfg, stats: SearchStats::default(), rng: StdRng::from_entropy() }
    }

    /// Deterministic searcher: opponent sampling and fallback moves derive from `seed`.
    pub fn with_seed(cfg: MinimaxConfig, seed: u64) -> Self {
        Self { cfg, stats: SearchStats::default(), rng: StdRng::seed_from_u64(seed) }
    }

    #[inline]
    pub fn config(&self) -> &MinimaxConfig { &self.cfg }

    /// Statistics from the last call to [`Self::best_move`] or [`Self::search`].
    #[inline]
    pub fn last_stats(&self) -> SearchStats { self.stats }

    /// Pick the player's move, or `None` when no direction changes the board.
    ///
    /// Falls back to a uniformly random legal move if the deadline struck
    /// before any branch improved on the initial bound.
    pub fn best_move(&mut self, board: &Board) -> Option<Direction> {
        let moves = board.available_moves();
        if moves.is_empty() {
            self.stats = SearchStats::default();
            debug!("no legal moves; nothing to search");
            return None;
        }
        let outcome = self.search(board);
        if outcome.dir.is_some() {
            return outcome.dir;
        }
        let dir = moves[self.rng.gen_range(0..moves.len())];
        self.stats.fallback = true;
        debug!("search produced no move; random fallback {}", dir);
        Some(dir)
    }

    /// Run the root maximizing search without the random fallback.
    pub fn search(&mut self, board: &Board) -> SearchOutcome {
        let start = Instant::now();
        let seed: u64 = self.rng.gen();
        let max_layer = self.max_layer(board);
        let mut ctx = Ctx {
            cfg: &self.cfg,
            deadline: start + self.cfg.time_limit,
            max_layer,
            seed,
            nodes: 0,
            cutoffs: 0,
            timed_out: false,
        };
        let outcome = maximize(&mut ctx, board, self.cfg.alpha, self.cfg.beta, 1);
        let stats = SearchStats {
            nodes: ctx.nodes,
            max_layer,
            cutoffs: ctx.cutoffs,
            timed_out: ctx.timed_out,
            fallback: false,
            elapsed: start.elapsed(),
        };
        debug!(
            "search: layers={} nodes={} cutoffs={} timed_out={} elapsed={:?} -> {:?} ({:.4})",
            stats.max_layer, stats.nodes, stats.cutoffs, stats.timed_out, stats.elapsed, outcome.dir, outcome.score
        );
        self.stats = stats;
        outcome
    }

    fn max_layer(&self, board: &Board) -> u32 {
        let dynamic = depth_limit(board.count_empty());
        match self.cfg.depth_cap {
            Some(cap) => {
                let capped = dynamic.min(cap).max(2);
                capped - capped % 2
            }
            None => dynamic,
        }
    }
}

impl Default for Minimax { fn default() -> Self { Self::new() } }

impl Policy for Minimax {
    fn choose_move(&mut self, board: &Board) -> Option<Direction> { self.best_move(board) }
}

/// Per-call parameters and counters, threaded through the recursion.
struct Ctx<'a> {
    cfg: &'a MinimaxConfig,
    deadline: Instant,
    max_layer: u32,
    seed: u64,
    nodes: u64,
    cutoffs: u64,
    timed_out: bool,
}

impl Ctx<'_> {
    #[inline]
    fn is_terminal(&self, board: &Board, layer: u32) -> bool {
        layer >= self.max_layer || !board.can_move()
    }

    #[inline]
    fn time_over(&mut self) -> bool {
        if Instant::now() >= self.deadline {
            self.timed_out = true;
        }
        self.timed_out
    }

    /// Sampling RNG for one opponent node, a pure function of the node.
    ///
    /// The seed is a splitmix64 fold over the search seed, the layer and the
    /// cells, so the same node maps to the same stream on every toolchain.
    fn node_rng(&self, board: &Board, layer: u32) -> StdRng {
        StdRng::seed_from_u64(node_seed(self.seed, board, layer))
    }
}

fn node_seed(seed: u64, board: &Board, layer: u32) -> u64 {
    let mut h = splitmix64(seed ^ u64::from(layer));
    for &cell in board.cells() {
        h = splitmix64(h ^ cell);
    }
    h
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

fn maximize(ctx: &mut Ctx<'_>, board: &Board, mut alpha: f64, beta: f64, layer: u32) -> SearchOutcome {
    ctx.nodes += 1;
    if ctx.is_terminal(board, layer) {
        return SearchOutcome { dir: None, score: evaluate(board, alpha) };
    }
    let mut best = SearchOutcome { dir: None, score: alpha };
    for dir in Direction::ALL {
        let Some(child) = board.shifted(dir) else { continue };
        if ctx.time_over() {
            break;
        }
        let score = minimize(ctx, &child, alpha, beta, layer + 1).score;
        if score > best.score {
            best = SearchOutcome { dir: Some(dir), score };
        }
        if ctx.cfg.pruning && best.score >= beta {
            ctx.cutoffs += 1;
            break;
        }
        if best.score > alpha {
            alpha = best.score;
        }
    }
    best
}

fn minimize(ctx: &mut Ctx<'_>, board: &Board, alpha: f64, mut beta: f64, layer: u32) -> SearchOutcome {
    ctx.nodes += 1;
    let cells = board.available_cells();
    if cells.is_empty() || ctx.is_terminal(board, layer) {
        return SearchOutcome { dir: None, score: evaluate(board, beta) };
    }
    let mut rng = ctx.node_rng(board, layer);
    let picks = index::sample(&mut rng, cells.len(), ctx.cfg.sample_width.min(cells.len()));
    let mut min_score = beta;
    for idx in picks.into_iter() {
        if ctx.time_over() {
            break;
        }
        let mut child = board.clone();
        child.insert_tile(cells[idx], random_tile_value(&mut rng, ctx.cfg.two_probability));
        let score = maximize(ctx, &child, alpha, beta, layer + 1).score;
        if score < min_score {
            min_score = score;
        }
        if ctx.cfg.pruning && min_score <= alpha {
            ctx.cutoffs += 1;
            break;
        }
        if min_score < beta {
            beta = min_score;
        }
    }
    SearchOutcome { dir: None, score: min_score }
}
