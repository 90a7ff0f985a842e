//! # Consensus Core Benchmarks
//!
//! Heartbeats arrive from every audit server every minute, so their codec
//! and validation sit on the hot path:
//!
//! | Benchmark | Path |
//! |-----------|------|
//! | `heartbeat_encode` | marshal a signed heartbeat |
//! | `heartbeat_decode` | dispatch + unmarshal from bytes |
//! | `heartbeat_validate` | drift, staleness and Ed25519 verification |
//! | `validate_batch` | parallel validation across the worker pool |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fc_01_identity_registry::{AuthorityStatus, Identity, IdentityRegistry};
use fc_02_messages::{Heartbeat, Message, Signable};
use fc_04_execution::adapters::{ManualClock, RecordingReplayHandler};
use fc_04_execution::{CoreConfig, MessageProcessor, ProcessorDependencies};
use shared_crypto::ServerKeyPair;
use shared_types::{ChainId, Timestamp};
use std::sync::Arc;
use std::time::Duration;

const NOW_SECS: u64 = 1_700_000_000;
const HEIGHT: u32 = 100;

fn chain(n: u8) -> ChainId {
    ChainId::new([n; 32])
}

fn signed_heartbeat(n: u8) -> Message {
    let mut hb = Heartbeat::new(Timestamp::from_secs(NOW_SECS), 42, HEIGHT, [0xAB; 32], chain(n));
    hb.sign(&ServerKeyPair::from_seed([n; 32])).unwrap();
    hb.into()
}

fn build_processor(audits: &[u8]) -> MessageProcessor {
    let registry = Arc::new(IdentityRegistry::new());
    for n in std::iter::once(&1u8).chain(audits) {
        let public_key = ServerKeyPair::from_seed([*n; 32]).public_key();
        registry.set_identity(Identity::new(chain(*n), public_key).with_signing_key(public_key));
        registry.create_authority(chain(*n));
        let status = if *n == 1 {
            AuthorityStatus::Federated
        } else {
            AuthorityStatus::Audit
        };
        registry.set_authority_status(&chain(*n), status).unwrap();
    }

    MessageProcessor::new(ProcessorDependencies {
        registry,
        identity_chain_id: chain(1),
        signing_key: ServerKeyPair::from_seed([1; 32]),
        salt_secret: [1; 32],
        replay: Arc::new(RecordingReplayHandler::new()),
        config: CoreConfig::default(),
        leader_height: HEIGHT,
    })
    .unwrap()
    .with_time_source(Arc::new(ManualClock::new(Timestamp::from_secs(NOW_SECS))))
}

fn bench_heartbeat_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("heartbeat-codec");
    let msg = signed_heartbeat(2);
    let bytes = msg.marshal_binary();

    group.bench_function("heartbeat_encode", |b| {
        b.iter(|| black_box(msg.marshal_binary()))
    });
    group.bench_function("heartbeat_decode", |b| {
        b.iter(|| black_box(Message::unmarshal_binary(black_box(&bytes)).unwrap()))
    });
    group.finish();
}

fn bench_heartbeat_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("heartbeat-validate");
    group.measurement_time(Duration::from_secs(10));
    let processor = build_processor(&[2]);
    let bytes = signed_heartbeat(2).marshal_binary();

    // Fresh decode each iteration so the signature cache is cold.
    group.bench_function("heartbeat_validate", |b| {
        b.iter(|| {
            let msg = Message::unmarshal_binary(&bytes).unwrap();
            black_box(processor.validate(&msg))
        })
    });

    for size in [10u8, 50, 100] {
        let audits: Vec<u8> = (2..2 + size).collect();
        let processor = build_processor(&audits);
        let encoded: Vec<Vec<u8>> = audits
            .iter()
            .map(|n| signed_heartbeat(*n).marshal_binary())
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("validate_batch", size), &encoded, |b, encoded| {
            b.iter(|| {
                let msgs: Vec<Message> = encoded
                    .iter()
                    .map(|bytes| Message::unmarshal_binary(bytes).unwrap())
                    .collect();
                black_box(processor.validate_batch(&msgs))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_heartbeat_codec, bench_heartbeat_validate);
criterion_main!(benches);
