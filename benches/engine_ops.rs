use criterion::{criterion_group, criterion_main, Criterion};
use minimax_2048::engine::{Board, Direction};
use minimax_2048::policy::RandomOpponent;
use std::hint::black_box;

fn corpus() -> Vec<Board> {
    let mut opp = RandomOpponent::with_seed(42);
    let mut boards = vec![Board::new(4)];
    let mut b = Board::new(4);
    for _ in 0..2 {
        if let Some((pos, v)) = opp.choose_placement(&b) { b.insert_tile(pos, v); }
    }
    boards.push(b.clone());
    // Derive a variety of densities deterministically
    let seq = [Direction::Left, Direction::Up, Direction::Right, Direction::Down];
    for i in 0..40 {
        if b.shift(seq[i % seq.len()]) {
            if let Some((pos, v)) = opp.choose_placement(&b) { b.insert_tile(pos, v); }
        }
        boards.push(b.clone());
    }
    boards
}

fn bench_shift(c: &mut Criterion) {
    let boards = corpus();
    for dir in Direction::ALL {
        c.bench_function(&format!("shift/{}", dir), |bch| {
            bch.iter(|| {
                let mut acc = 0usize;
                for bd in &boards {
                    let mut next = bd.clone();
                    acc += next.shift(dir) as usize;
                }
                black_box(acc)
            })
        });
    }
}

fn bench_queries(c: &mut Criterion) {
    let boards = corpus();
    c.bench_function("query/available_moves", |bch| {
        bch.iter(|| {
            let mut acc = 0usize;
            for bd in &boards { acc += bd.available_moves().len(); }
            black_box(acc)
        })
    });
    c.bench_function("query/can_move", |bch| {
        bch.iter(|| {
            let mut acc = 0usize;
            for bd in &boards { acc += bd.can_move() as usize; }
            black_box(acc)
        })
    });
    c.bench_function("query/available_cells", |bch| {
        bch.iter(|| {
            let mut acc = 0usize;
            for bd in &boards { acc += bd.available_cells().len(); }
            black_box(acc)
        })
    });
}

criterion_group!(engine_ops, bench_shift, bench_queries);
criterion_main!(engine_ops);
