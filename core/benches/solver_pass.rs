use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use sapper_core::{Game, GameConfig};

fn opened_board(seed: u64) -> Game {
    let mut game = Game::new(GameConfig::new((16, 16), 40), seed);
    game.reveal((8, 8)).unwrap();
    game
}

fn bench_first_reveal(c: &mut Criterion) {
    c.bench_function("first_reveal_16x16_40", |b| {
        b.iter(|| opened_board(black_box(7)))
    });
}

fn bench_solver_fixed_point(c: &mut Criterion) {
    c.bench_function("solver_fixed_point_16x16_40", |b| {
        b.iter(|| {
            let mut game = opened_board(black_box(7));
            while !game.is_finished() {
                let flagged = game.auto_flag().has_update();
                let revealed = game.auto_reveal().has_update();
                if !flagged && !revealed {
                    break;
                }
            }
            game
        })
    });
}

criterion_group!(benches, bench_first_reveal, bench_solver_fixed_point);
criterion_main!(benches);
