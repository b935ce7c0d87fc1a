//! GAP Performance Benchmarks
//!
//! - Observation throughput as the state space grows
//! - Path search latency on a learned grid, cold and from the plan cache

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gap_planner::{ActionId, GapLearner, LearnerConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MOVES: [(i64, i64); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Random walk over a `size × size` grid, returning the learned model
fn learned_grid(size: i64, steps: usize) -> GapLearner<(i64, i64)> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut gap = GapLearner::new(LearnerConfig::new(4).with_initial_capacity(16)).unwrap();
    let mut pos = (0, 0);

    for _ in 0..steps {
        let action = rng.gen_range(0..4u32);
        let (dx, dy) = MOVES[action as usize];
        let next = (pos.0 + dx, pos.1 + dy);
        let after = if (0..size).contains(&next.0) && (0..size).contains(&next.1) {
            next
        } else {
            pos
        };
        gap.observe(pos, after, ActionId(action)).unwrap();
        pos = after;
    }
    gap
}

// ============ OBSERVE BENCHMARKS ============

fn bench_observe(c: &mut Criterion) {
    let mut group = c.benchmark_group("observe");

    for size in [8i64, 16, 32].iter() {
        let steps = (size * size * 40) as usize;
        group.throughput(Throughput::Elements(steps as u64));
        group.bench_with_input(BenchmarkId::new("grid", size), size, |b, &size| {
            b.iter(|| black_box(learned_grid(size, steps)));
        });
    }

    group.finish();
}

// ============ PLANNER BENCHMARKS ============

fn bench_find_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_path");

    for size in [8i64, 16, 32].iter() {
        let gap = learned_grid(*size, (size * size * 40) as usize);
        let goal = (size - 1, size - 1);

        group.bench_with_input(BenchmarkId::new("cold", size), &gap, |b, gap| {
            b.iter_batched(
                || {
                    let mut gap = gap.clone();
                    gap.clear_plan();
                    gap
                },
                |mut gap| black_box(gap.find_path(&(0, 0), &goal).unwrap()),
                criterion::BatchSize::LargeInput,
            );
        });

        let mut warm = gap.clone();
        let plan = warm.find_path(&(0, 0), &goal).unwrap().unwrap();
        let resume = *warm.label(plan.states[1]).unwrap();
        group.bench_function(BenchmarkId::new("cached", size), |b| {
            b.iter(|| black_box(warm.find_path(&resume, &goal).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_observe, bench_find_path);
criterion_main!(benches);
