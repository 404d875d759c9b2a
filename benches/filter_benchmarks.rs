use criterion::{
    BenchmarkId, Criterion, Throughput, criterion_group, criterion_main,
};
use rand::RngCore;
use std::hint::black_box;
use tamper_gate::known_good::{DEFAULT_SEEDS, build_filter, seed_fingerprints};
use tamper_gate::{
    FilterConfigBuilder, Fingerprint, HashFunction, default_hash_function,
    digest_slice_hash_function,
};

// Helper to create random payloads of a given size
fn generate_payloads(count: usize, len: usize) -> Vec<Vec<u8>> {
    let mut rng = rand::rng();
    (0..count)
        .map(|_| {
            let mut payload = vec![0u8; len];
            rng.fill_bytes(&mut payload);
            payload
        })
        .collect()
}

fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint");

    for len in [64, 4 * 1024, 256 * 1024] {
        let payload = generate_payloads(1, len).remove(0);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(len),
            &payload,
            |b, p| b.iter(|| Fingerprint::of(black_box(p))),
        );
    }
    group.finish();
}

fn bench_test(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_test");
    let queries: Vec<Fingerprint> = generate_payloads(1_000, 32)
        .iter()
        .map(|p| Fingerprint::of(p))
        .collect();
    let corpus = seed_fingerprints(&DEFAULT_SEEDS);

    let hash_functions: [(&str, HashFunction); 2] = [
        ("double_hashing", default_hash_function),
        ("digest_slices", digest_slice_hash_function),
    ];
    for (name, hash_function) in hash_functions {
        let config = FilterConfigBuilder::default()
            .hash_function(hash_function)
            .build()
            .unwrap();
        let filter = build_filter(config, &corpus).unwrap();

        group.bench_function(name, |b| {
            b.iter(|| {
                for fp in &queries {
                    black_box(filter.test(fp.as_ref()).unwrap());
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fingerprint, bench_test);
criterion_main!(benches);
