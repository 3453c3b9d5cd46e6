use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sha256_bench(c: &mut Criterion) {
    let data = [0xABu8; 256];

    c.bench_function("sha256_256B", |b| {
        b.iter(|| tally_crypto::sha256(black_box(&data)))
    });
}

fn chain_digest_bench(c: &mut Criterion) {
    let previous = "ab".repeat(32);
    let payload = r#"{"vote":{"questionId":"q1","choice":"A","voterId":"v1","createdAt":1700000000000},"timestamp":1700000000000}"#;

    c.bench_function("chain_digest", |b| {
        b.iter(|| {
            tally_crypto::chain_digest(black_box(&previous), black_box(payload), b"salt")
        })
    });
}

fn shared_secret_bench(c: &mut Criterion) {
    let secret = tally_crypto::SharedSecret::new(b"admin-key-0123456789").unwrap();

    c.bench_function("shared_secret_matches", |b| {
        b.iter(|| secret.matches(black_box(b"admin-key-0123456788")))
    });
}

criterion_group!(benches, sha256_bench, chain_digest_bench, shared_secret_bench);
criterion_main!(benches);
