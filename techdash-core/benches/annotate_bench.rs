//! Criterion benchmarks for the indicator engine.
//!
//! Benchmarks:
//! 1. Full `annotate` over long series
//! 2. Rolling kernels (mean, sample std, max via monotonic deque)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use techdash_core::annotate;
use techdash_core::data::synthetic_bars;
use techdash_core::domain::{PriceSeries, CLOSE, HIGH};
use techdash_core::indicators::rolling::{rolling_max, rolling_mean, rolling_std};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(years: i64) -> PriceSeries {
    let start = chrono::NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
    let end = start + chrono::Duration::days(365 * years);
    PriceSeries::from_bars("BENCH", &synthetic_bars("BENCH", start, end))
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_annotate(c: &mut Criterion) {
    let mut group = c.benchmark_group("annotate");
    for years in [1, 10, 25] {
        let series = make_series(years);
        group.bench_with_input(BenchmarkId::from_parameter(series.len()), &series, |b, s| {
            b.iter(|| annotate(black_box(s)).unwrap())
        });
    }
    group.finish();
}

fn bench_rolling(c: &mut Criterion) {
    let series = make_series(25);
    let close = series.column(CLOSE).unwrap();
    let high = series.column(HIGH).unwrap();

    let mut group = c.benchmark_group("rolling");
    group.bench_function("mean_50", |b| b.iter(|| rolling_mean(black_box(close), 50)));
    group.bench_function("std_20", |b| b.iter(|| rolling_std(black_box(close), 20)));
    group.bench_function("max_14", |b| b.iter(|| rolling_max(black_box(high), 14)));
    group.finish();
}

criterion_group!(benches, bench_annotate, bench_rolling);
criterion_main!(benches);
