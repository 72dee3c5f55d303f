//! Criterion benchmarks for the analytics hot paths.
//!
//! Benchmarks:
//! 1. Bootstrap kernel (5000 trials, 7/30/90-day horizons)
//! 2. Full projector over a realistic trade history
//! 3. Trade statistics aggregation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use botdash_core::domain::TradeRecord;
use botdash_core::monte_carlo::{
    simulate_final_balances, MonteCarloConfig, MonteCarloProjector, ReturnSample, DEFAULT_TRIALS,
};
use botdash_core::stats::TradeStatistics;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_trades(n: usize) -> Vec<TradeRecord> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..n)
        .map(|i| {
            let pnl = (i as f64 * 0.7).sin() * 25.0 + 2.0;
            let mut t = TradeRecord::with_pnl("BTC/USDT", pnl);
            let exit = base + chrono::Duration::days((i / 3) as i64);
            t.exit_time = Some(format!("{exit}T12:00:00Z"));
            t.reason = Some(if i % 2 == 0 { "breakout" } else { "reversal" }.into());
            t
        })
        .collect()
}

// ── 1. Kernel ────────────────────────────────────────────────────────

fn bench_kernel(c: &mut Criterion) {
    let trades = make_trades(300);
    let sample = ReturnSample::daily_returns(&trades, 1000.0);
    let mut group = c.benchmark_group("bootstrap_kernel");
    for horizon in [7usize, 30, 90] {
        group.bench_with_input(BenchmarkId::from_parameter(horizon), &horizon, |b, &h| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(42);
                simulate_final_balances(
                    black_box(&sample.values),
                    1000.0,
                    h,
                    DEFAULT_TRIALS,
                    &mut rng,
                )
            })
        });
    }
    group.finish();
}

// ── 2. Projector ─────────────────────────────────────────────────────

fn bench_projector(c: &mut Criterion) {
    let trades = make_trades(300);
    let sample = ReturnSample::daily_returns(&trades, 1000.0);
    let projector = MonteCarloProjector::new(MonteCarloConfig {
        seed: Some(42),
        ..MonteCarloConfig::default()
    });
    c.bench_function("project_all_7_30_90", |b| {
        b.iter(|| projector.project_all(black_box(&sample), 1000.0, &[7, 30, 90]))
    });
}

// ── 3. Statistics ────────────────────────────────────────────────────

fn bench_statistics(c: &mut Criterion) {
    let trades = make_trades(2000);
    c.bench_function("trade_statistics_2000", |b| {
        b.iter(|| TradeStatistics::compute(black_box(&trades), 1000.0))
    });
}

criterion_group!(benches, bench_kernel, bench_projector, bench_statistics);
criterion_main!(benches);
