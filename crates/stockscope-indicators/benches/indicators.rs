//! Benchmarks for indicator implementations.

use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stockscope_core::traits::Indicator;
use stockscope_core::types::{PricePoint, PriceSeries, Symbol};
use stockscope_indicators::{compute_indicators, BollingerBands, Ema, IndicatorSpec, Rsi, Sma};

fn generate_test_series(size: usize) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
    let points = (0..size)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            PricePoint::new(start + Days::new(i as u64), close, close + 1.0, close - 1.0, close, 1e6)
        })
        .collect();
    PriceSeries::new(Symbol::parse("BENCH").unwrap(), points).unwrap()
}

fn benchmark_moving_averages(c: &mut Criterion) {
    let mut group = c.benchmark_group("MovingAverage");

    for size in [1000, 10000].iter() {
        let series = generate_test_series(*size);

        group.bench_with_input(BenchmarkId::new("sma", size), &series, |b, series| {
            let sma = Sma::new(20).unwrap();
            b.iter(|| sma.calculate(black_box(series)))
        });

        group.bench_with_input(BenchmarkId::new("ema", size), &series, |b, series| {
            let ema = Ema::new(20).unwrap();
            b.iter(|| ema.calculate(black_box(series)))
        });
    }

    group.finish();
}

fn benchmark_rsi(c: &mut Criterion) {
    let mut group = c.benchmark_group("RSI");

    for size in [1000, 10000].iter() {
        let series = generate_test_series(*size);

        group.bench_with_input(BenchmarkId::new("wilder", size), &series, |b, series| {
            let rsi = Rsi::new(14).unwrap();
            b.iter(|| rsi.calculate(black_box(series)))
        });
    }

    group.finish();
}

fn benchmark_bollinger(c: &mut Criterion) {
    let mut group = c.benchmark_group("Bollinger");

    for size in [1000, 10000].iter() {
        let series = generate_test_series(*size);

        group.bench_with_input(BenchmarkId::new("20_2", size), &series, |b, series| {
            let bb = BollingerBands::standard();
            b.iter(|| bb.calculate(black_box(series)))
        });
    }

    group.finish();
}

fn benchmark_standard_set(c: &mut Criterion) {
    let series = generate_test_series(2520);
    let specs = IndicatorSpec::standard_set();

    c.bench_function("standard_set_10y", |b| {
        b.iter(|| compute_indicators(black_box(&series), black_box(&specs)))
    });
}

criterion_group!(
    benches,
    benchmark_moving_averages,
    benchmark_rsi,
    benchmark_bollinger,
    benchmark_standard_set
);
criterion_main!(benches);
