//! Benchmark for the incremental nonce search

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use vanity_core::{Alphabet, CommitPayload, DesiredPrefix, Engine, search_from};

const BODY: &[u8] = b"tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904\n\
author Ada Lovelace <ada@example.com> 1700000000 +0000\n\
committer Ada Lovelace <ada@example.com> 1700000000 +0000\n\
\n\
benchmark commit message\n";

fn bench_exhaust_subtree(c: &mut Criterion) {
    let payload = CommitPayload::new(BODY);
    let alphabet = Alphabet::base36();
    // Eight hex characters are practically never matched by 36^3 candidates
    let prefix: DesiredPrefix = "ffffffff".parse().unwrap();

    c.bench_function("search_36^3", |b| {
        b.iter(|| {
            let mut engine = Engine::new(&alphabet, &prefix);
            engine.run(black_box(payload.seed(b"", 3).unwrap())).unwrap();
            engine.candidates()
        })
    });
}

fn bench_first_match(c: &mut Criterion) {
    let payload = CommitPayload::new(BODY);
    let alphabet = Alphabet::base36();
    let prefix: DesiredPrefix = "abc".parse().unwrap();

    c.bench_function("search_prefix_abc", |b| {
        b.iter(|| search_from(black_box(payload.seed(b"", 5).unwrap()), 5, &alphabet, &prefix).unwrap())
    });
}

fn bench_direct_hash(c: &mut Criterion) {
    let payload = CommitPayload::new(BODY);

    c.bench_function("object_id_direct", |b| {
        b.iter(|| payload.object_id(black_box(b"00d7")))
    });
}

criterion_group!(benches, bench_exhaust_subtree, bench_first_match, bench_direct_hash);
criterion_main!(benches);
