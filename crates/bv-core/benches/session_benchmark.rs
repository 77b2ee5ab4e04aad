//! Session Store Benchmarks
//!
//! Measures performance of:
//! - Attachment encoding and decoding
//! - Session persistence
//! - Session listing

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde_json::json;
use tokio::runtime::Runtime;

use bv_core::session::{Attachments, Blob, CallerState, Session, SessionStore};
use bv_core::session::{decode_attachments, encode_attachments};

fn attachments(count: usize, size: usize) -> Attachments {
    (0..count)
        .map(|i| (format!("item-{}", i), Blob::new("audio/mpeg", vec![i as u8; size])))
        .collect()
}

fn session_with_audio(count: usize, size: usize) -> Session {
    let caller = CallerState {
        item_audio_blobs: attachments(count, size),
        ..CallerState::default()
    };
    let item_pool: Vec<usize> = (0..count).collect();
    Session::new(json!({"mode": "words", "itemPool": item_pool})).with_caller_state(caller)
}

/// Benchmark attachment transcoding
fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("attachment_codec");

    for size in [1024usize, 64 * 1024] {
        let blobs = attachments(10, size);
        group.throughput(Throughput::Bytes((10 * size) as u64));

        group.bench_with_input(BenchmarkId::new("encode", size), &blobs, |b, blobs| {
            b.iter(|| encode_attachments(black_box(blobs)))
        });

        let encoded = encode_attachments(&blobs);
        group.bench_with_input(BenchmarkId::new("decode", size), &encoded, |b, encoded| {
            b.iter(|| decode_attachments(black_box(encoded)))
        });
    }

    group.finish();
}

/// Benchmark session persistence
fn bench_session_persistence(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("session_persistence");

    group.bench_function("save_session", |b| {
        let store = SessionStore::in_memory();
        b.iter(|| {
            let mut session = session_with_audio(5, 4096);
            rt.block_on(store.save(&mut session)).unwrap()
        })
    });

    group.bench_function("get_session", |b| {
        let store = SessionStore::in_memory();
        let mut session = session_with_audio(5, 4096);
        let id = rt.block_on(store.save(&mut session)).unwrap();

        b.iter(|| rt.block_on(store.get(black_box(id))).unwrap())
    });

    group.bench_function("list_sessions", |b| {
        let store = SessionStore::in_memory();
        for _ in 0..50 {
            let mut session = session_with_audio(5, 4096);
            rt.block_on(store.save(&mut session)).unwrap();
        }

        b.iter(|| rt.block_on(store.list()).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_codec, bench_session_persistence);
criterion_main!(benches);
