use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use az_core::{initial_state, Azul};
use az_mcts::{MctsBot, MctsConfig};

fn bench_search(c: &mut Criterion) {
    let mut g = c.benchmark_group("az_mcts_search");
    g.sample_size(10);
    for &steps in &[50u32, 200u32] {
        g.bench_with_input(BenchmarkId::new("step_n", steps), &steps, |b, &n| {
            b.iter(|| {
                let mut engine = Azul::new(11);
                let s = initial_state(&mut engine).expect("deal");
                let mut bot = MctsBot::new(engine, s, 0, MctsConfig::default()).expect("bot");
                black_box(bot.step_n(n).ok())
            })
        });
    }
    g.finish();
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
