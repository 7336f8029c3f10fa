use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use granada_core::{
    AutoPlayer, Deductions, GameConfig, GameSession, Minesweeper, Move,
};

/// Expert board with the safe half of the field opened up, so the passes
/// have a realistic numbered frontier to scan.
fn opened_expert_board() -> Minesweeper {
    let mut game = Minesweeper::new(GameConfig::expert().with_seed(7));
    for x in 0..30 {
        for y in 0..8 {
            if !game.has_mine_at((x, y)).unwrap() {
                game.make_move(Move::reveal((x, y))).unwrap();
            }
        }
    }
    game
}

fn bench_solver_passes(c: &mut Criterion) {
    let game = opened_expert_board();
    c.bench_function("solver/analyze", |b| {
        b.iter(|| Deductions::analyze(black_box(&game)).unwrap())
    });
}

fn bench_flood_fill(c: &mut Criterion) {
    let empty = Minesweeper::with_mine_coords(60, 60, &[]).unwrap();
    c.bench_function("engine/flood_fill_3600_cells", |b| {
        b.iter_batched(
            || empty.clone(),
            |mut game| game.make_move(Move::reveal((0, 0))).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

fn bench_auto_play(c: &mut Criterion) {
    let game = Minesweeper::new(GameConfig::beginner().with_seed(42));
    c.bench_function("player/auto_play_beginner", |b| {
        b.iter_batched(
            || GameSession::new(game.clone(), AutoPlayer::with_seed(42)),
            |mut session| session.play_to_end().unwrap(),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_solver_passes,
    bench_flood_fill,
    bench_auto_play
);
criterion_main!(benches);
