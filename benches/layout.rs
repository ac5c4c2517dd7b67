//! Layout query benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pipeline_layout::{LadderLayout, TreeLayout};

fn benchmark_unit_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("unit_count");

    for base_width in [64usize, 1024, 65536] {
        group.bench_with_input(
            BenchmarkId::new("ladder", base_width),
            &base_width,
            |b, &base_width| {
                let layout = LadderLayout::new(base_width, 4).unwrap();
                b.iter(|| black_box(layout.unit_count()));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("tree", base_width),
            &base_width,
            |b, &base_width| {
                let layout = TreeLayout::new(base_width, 4).unwrap();
                b.iter(|| black_box(layout.unit_count()));
            },
        );
    }
    group.finish();
}

fn benchmark_wiring_table(c: &mut Criterion) {
    // Resolving every (unit, slot) pair is the generator's hot path.
    let mut group = c.benchmark_group("wiring_table");

    for base_width in [64usize, 1024] {
        group.bench_with_input(
            BenchmarkId::from_parameter(base_width),
            &base_width,
            |b, &base_width| {
                let ladder = LadderLayout::new(base_width, 4).unwrap();
                let tree = TreeLayout::new(base_width, 4).unwrap();
                b.iter(|| {
                    let mut sum = 0usize;
                    for unit in ladder.units() {
                        for slot in 0..unit.width {
                            sum += ladder.unit_input_address(unit.index, slot).unwrap();
                        }
                    }
                    for unit in tree.units() {
                        for slot in 0..unit.width {
                            sum += tree.unit_input_address(unit.index, slot).unwrap();
                        }
                    }
                    black_box(sum)
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, benchmark_unit_count, benchmark_wiring_table);
criterion_main!(benches);
