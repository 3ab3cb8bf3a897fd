use bitgrid::bitmap::{row_bytes, set_bit};
use bitgrid::engine::{Resolver, RowScratch};
use bitgrid::meta::ResolverMeta;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const NUM_LABELS: usize = 81;

fn build_rows(num_targets: usize) -> Vec<u8> {
    let bytes_per_row = row_bytes(NUM_LABELS);
    let mut rows = vec![0u8; num_targets * bytes_per_row];
    for target in 0..num_targets {
        for k in (0..NUM_LABELS).filter(|k| (target * 13 + k) % 5 == 0) {
            set_bit(&mut rows[target * bytes_per_row..], k as u64);
        }
    }
    rows
}

fn meta(num_targets: usize) -> ResolverMeta {
    ResolverMeta {
        num_labels: NUM_LABELS,
        max_label_len: 8,
        row_bytes: row_bytes(NUM_LABELS),
        min_target: 0,
        max_target: num_targets as u32 - 1,
        labels: (0..NUM_LABELS).map(|k| format!("label-{:02}", k)).collect(),
    }
}

fn bench_memory_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_resolve");
    for size in [1_000usize, 10_000, 100_000] {
        let rows = build_rows(size);
        let resolver = Resolver::memory_from_rows(&rows, meta(size)).unwrap();
        let mut scratch = RowScratch::new();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut target = 0u32;
            b.iter(|| {
                target = (target + 7919) % size as u32;
                black_box(resolver.resolve_vec(target, &mut scratch).unwrap())
            });
        });
    }
    group.finish();
}

fn bench_deflate_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("deflate_resolve");
    // Lookup cost grows with the skip distance, so bench early, middle, and
    // late targets over one fixed-size matrix.
    let size = 50_000usize;
    let rows = build_rows(size);
    let resolver = Resolver::deflate_from_rows(&rows, meta(size)).unwrap();
    let mut scratch = RowScratch::new();

    for target in [0u32, 25_000, 49_999] {
        group.bench_with_input(
            BenchmarkId::from_parameter(target),
            &target,
            |b, &target| {
                b.iter(|| black_box(resolver.resolve_vec(target, &mut scratch).unwrap()));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_memory_resolve, bench_deflate_resolve);
criterion_main!(benches);
