// Criterion benchmarks for Lume Connect

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lume_connect::core::{MatchingEngine, Messenger};
use lume_connect::models::{RatingKind, SendMessageRequest};
use lume_connect::services::{MemoryDirectory, MemorySink, MemoryStore};
use std::sync::Arc;
use uuid::Uuid;

fn build_services() -> (Arc<MemoryDirectory>, MatchingEngine, Messenger) {
    let directory = Arc::new(MemoryDirectory::new());
    let store = Arc::new(MemoryStore::new());
    let sink = Arc::new(MemorySink::new());

    let engine = MatchingEngine::new(
        directory.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        sink.clone(),
    );
    let messenger = Messenger::new(directory.clone(), store.clone(), store.clone(), sink);

    (directory, engine, messenger)
}

fn send_req(sender: Uuid, receiver: Uuid, match_id: Uuid, content: &str) -> SendMessageRequest {
    SendMessageRequest {
        sender_id: sender,
        receiver_id: receiver,
        match_id,
        content: content.to_string(),
    }
}

fn bench_rate_and_match(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("rate_and_match_pair", |b| {
        b.iter(|| {
            rt.block_on(async {
                let (directory, engine, _) = build_services();
                let a = directory.seed("bench_a").await;
                let b = directory.seed("bench_b").await;

                engine.rate_user(a, b, RatingKind::Like).await.unwrap();
                engine
                    .rate_user(b, a, RatingKind::Like)
                    .await
                    .unwrap()
                    .expect("mutual like should match")
            })
        });
    });
}

fn bench_history_read(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("history_read");

    for message_count in [10, 100, 1000].iter() {
        let (directory, engine, messenger) = build_services();

        let (a, match_id) = rt.block_on(async {
            let a = directory.seed("bench_a").await;
            let b = directory.seed("bench_b").await;
            engine.rate_user(a, b, RatingKind::Like).await.unwrap();
            let m = engine
                .rate_user(b, a, RatingKind::Like)
                .await
                .unwrap()
                .expect("mutual like should match");

            for i in 0..*message_count {
                let (sender, receiver) = if i % 2 == 0 { (a, b) } else { (b, a) };
                messenger
                    .send(&send_req(sender, receiver, m.id, &format!("message {}", i)))
                    .await
                    .unwrap();
            }

            (a, m.id)
        });

        group.bench_with_input(
            BenchmarkId::from_parameter(message_count),
            message_count,
            |bencher, _| {
                bencher.iter(|| {
                    rt.block_on(async { messenger.history(match_id, a).await.unwrap() })
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_rate_and_match, bench_history_read);
criterion_main!(benches);
