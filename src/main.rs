use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use minimax_2048::engine::Board;
use minimax_2048::game::{EndReason, Game, GameConfig, GameSummary};
use minimax_2048::minimax::{Minimax, MinimaxConfig};
use minimax_2048::policy::{Policy, RandomPolicy};

#[derive(Parser, Debug)]
#[command(name = "minimax-2048", version, about = "Play 2048 with a time-bounded alpha-beta player")]
struct Args {
    /// Number of games to play (run in parallel when > 1)
    #[arg(short = 'n', long, default_value_t = 1)]
    games: u32,
    /// Base seed; game i uses seed + i. Omit for entropy.
    #[arg(long)]
    seed: Option<u64>,
    /// Board side length
    #[arg(long, default_value_t = Board::DEFAULT_SIZE)]
    size: usize,
    /// Search deadline per move, in milliseconds
    #[arg(long, default_value_t = 200)]
    time_limit_ms: u64,
    /// Per-turn budget enforced by the game, in milliseconds (plus a 50 ms allowance)
    #[arg(long, default_value_t = 200)]
    turn_limit_ms: u64,
    /// Hard cap on the dynamic search depth
    #[arg(long)]
    depth_cap: Option<u32>,
    /// Do not end the game when a turn exceeds its budget
    #[arg(long)]
    no_time_enforcement: bool,
    /// Use the uniformly random player instead of minimax
    #[arg(long)]
    random: bool,
    /// Print summaries as JSON lines
    #[arg(long)]
    json: bool,
    /// Suppress board printing and progress output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    if args.games == 0 {
        bail!("--games must be at least 1");
    }

    let game_cfg = GameConfig {
        size: args.size,
        turn_limit: Duration::from_millis(args.turn_limit_ms),
        enforce_time: !args.no_time_enforcement,
        ..GameConfig::default()
    };
    let search_cfg = MinimaxConfig {
        time_limit: Duration::from_millis(args.time_limit_ms),
        depth_cap: args.depth_cap,
        ..MinimaxConfig::default()
    };

    if args.games == 1 {
        let show = !args.quiet && !args.json;
        let summary = play_one(&args, &game_cfg, &search_cfg, args.seed, show)?;
        report(&args, &summary)?;
        return Ok(());
    }

    let pb = if args.quiet || args.json { ProgressBar::hidden() } else { ProgressBar::new(args.games as u64) };
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} games ({eta})")
            .context("progress template")?
            .progress_chars("=>-"),
    );
    let summaries: Vec<GameSummary> = (0..args.games)
        .into_par_iter()
        .map(|i| {
            let seed = args.seed.map(|s| s.wrapping_add(i as u64));
            let r = play_one(&args, &game_cfg, &search_cfg, seed, false);
            pb.inc(1);
            r
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    pb.finish_and_clear();

    for summary in &summaries {
        report(&args, summary)?;
    }
    if !args.json {
        let best = summaries.iter().map(|s| s.max_tile).max().unwrap_or(0);
        let mean = summaries.iter().map(|s| s.max_tile as f64).sum::<f64>() / summaries.len() as f64;
        let timeouts = summaries.iter().filter(|s| s.end_reason == EndReason::TimeExceeded).count();
        println!("games: {} | best tile: {} | mean max tile: {:.1} | timeouts: {}", summaries.len(), best, mean, timeouts);
    }
    Ok(())
}

fn play_one(
    args: &Args,
    game_cfg: &GameConfig,
    search_cfg: &MinimaxConfig,
    seed: Option<u64>,
    show: bool,
) -> anyhow::Result<GameSummary> {
    let player: Box<dyn Policy> = match (args.random, seed) {
        (true, Some(s)) => Box::new(RandomPolicy::with_seed(s)),
        (true, None) => Box::new(RandomPolicy::new()),
        (false, Some(s)) => Box::new(Minimax::with_seed(search_cfg.clone(), s)),
        (false, None) => Box::new(Minimax::with_config(search_cfg.clone())),
    };
    let mut game = match seed {
        Some(s) => Game::with_seed(game_cfg.clone(), player, s.rotate_left(32)),
        None => Game::new(game_cfg.clone(), player),
    }
    .context("setting up game")?;
    let summary = if show { game.play_with(|board| println!("{}", board)) } else { game.play() };
    Ok(summary)
}

fn report(args: &Args, summary: &GameSummary) -> anyhow::Result<()> {
    if args.json {
        println!("{}", serde_json::to_string(summary)?);
    } else {
        println!(
            "Max tile: {} | moves: {} | turns: {} | ended: {:?} | {} ms",
            summary.max_tile, summary.moves, summary.turns, summary.end_reason, summary.elapsed_ms
        );
    }
    Ok(())
}
