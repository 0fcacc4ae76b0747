// ============================================================================
// MDN Benchmarks
// ============================================================================
//
// Benchmark Categories:
// 1. Placement - Integer and real values entering the grid with carries
// 2. Arithmetic - Sums and products of dense numbers of growing size
// 3. Division - Exact and inexact principal-line division
// 4. Serialization - Pretty text and binary snapshots
// ============================================================================

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mdn2d::io::binary::{read_binary, write_binary};
use mdn2d::io::text::{parse_text, render_pretty};
use mdn2d::prelude::*;
use std::hint::black_box;

fn dense(side: i32) -> DigitGrid {
    let mut grid = DigitGrid::new(Mdn2dConfig::decimal()).unwrap();
    for x in 0..side {
        for y in 0..side {
            grid.set_value(Coord::new(x, y), (x * 3 + y * 7) % 9 + 1).unwrap();
        }
    }
    grid
}

// ============================================================================
// Placement Benchmarks
// ============================================================================

fn benchmark_placement(c: &mut Criterion) {
    let mut group = c.benchmark_group("placement");

    for value in [9i64, 999, 999_999].iter() {
        group.bench_with_input(BenchmarkId::new("add_integer", value), value, |b, &value| {
            b.iter(|| {
                let mut grid = DigitGrid::default();
                grid.add_integer(Coord::ORIGIN, black_box(value)).unwrap();
                black_box(grid.len())
            });
        });
    }

    group.bench_function("add_real", |b| {
        b.iter(|| {
            let mut grid = DigitGrid::default();
            grid.add_real(Coord::ORIGIN, black_box(123.456), 6, false, Fraxis::X)
                .unwrap();
            black_box(grid.len())
        });
    });

    group.finish();
}

// ============================================================================
// Arithmetic Benchmarks
// ============================================================================

fn benchmark_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("arithmetic");

    for side in [2, 4, 8].iter() {
        let lhs = dense(*side);
        let rhs = dense(*side);

        group.bench_with_input(BenchmarkId::new("plus", side), &(&lhs, &rhs), |b, (l, r)| {
            b.iter(|| {
                let mut ans = DigitGrid::default();
                l.plus(r, &mut ans).unwrap();
                black_box(ans)
            });
        });

        group.bench_with_input(
            BenchmarkId::new("multiply", side),
            &(&lhs, &rhs),
            |b, (l, r)| {
                b.iter(|| {
                    let mut ans = DigitGrid::default();
                    l.multiply(r, &mut ans).unwrap();
                    black_box(ans)
                });
            },
        );
    }

    group.finish();
}

// ============================================================================
// Division Benchmarks
// ============================================================================

fn benchmark_division(c: &mut Criterion) {
    let mut group = c.benchmark_group("division");

    let mut divisor = DigitGrid::default();
    divisor.set_values([(Coord::ORIGIN, 3), (Coord::new(1, 0), 1)]).unwrap();
    let mut exact = divisor.clone();
    exact.multiply_scalar(4).unwrap();
    let mut one = DigitGrid::default();
    one.set_value(Coord::ORIGIN, 1).unwrap();

    group.bench_function("exact", |b| {
        b.iter(|| {
            let mut q = DigitGrid::default();
            black_box(exact.divide(&divisor, &mut q, Fraxis::X).unwrap())
        });
    });

    group.bench_function("inexact_alternating", |b| {
        b.iter(|| {
            let mut q = DigitGrid::default();
            black_box(one.divide(&divisor, &mut q, Fraxis::Default).unwrap())
        });
    });

    group.finish();
}

// ============================================================================
// Serialization Benchmarks
// ============================================================================

fn benchmark_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");
    let grid = dense(16);
    let options = TextOptions::default();
    let text = render_pretty(&grid, &options);
    let mut bytes = Vec::new();
    write_binary(&mut bytes, "bench", &grid).unwrap();

    group.bench_function("render_pretty", |b| {
        b.iter(|| black_box(render_pretty(&grid, &options)))
    });
    group.bench_function("parse_pretty", |b| {
        b.iter(|| black_box(parse_text(&text).unwrap()))
    });
    group.bench_function("write_binary", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(bytes.len());
            write_binary(&mut out, "bench", &grid).unwrap();
            black_box(out)
        })
    });
    group.bench_function("read_binary", |b| {
        b.iter(|| black_box(read_binary(&mut bytes.as_slice()).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_placement,
    benchmark_arithmetic,
    benchmark_division,
    benchmark_serialization
);
criterion_main!(benches);
