// benches/recording_bench.rs
//! Hot-path overhead of `record_access`
//!
//! Two cases matter: an access the policy rejects (the dominant case
//! under the default policy, must stay lock-free) and an admitted access
//! paying for format + locked write + flush.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use memtrace::{
    AccessKind, MemoryAccess, OverflowPolicy, RecordAll, RecorderConfig, ThreadSelectPolicy,
    TraceFormat, TraceRecorder, TraceSink,
};
use std::sync::Arc;

fn rejected_access_recorder() -> TraceRecorder {
    TraceRecorder::new(
        TraceSink::from_writer(Box::new(std::io::sink())),
        Arc::new(ThreadSelectPolicy::default()),
        RecorderConfig::default(),
    )
}

fn admitted_access_recorder() -> TraceRecorder {
    TraceRecorder::new(
        TraceSink::from_writer(Box::new(std::io::sink())),
        Arc::new(RecordAll),
        RecorderConfig {
            format: TraceFormat::Annotated,
            buffer_enabled: true,
            buffer_capacity: 2000,
            overflow: OverflowPolicy::Wrap,
        },
    )
}

fn bench_record_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_access");

    let recorder = rejected_access_recorder();
    group.bench_function("rejected", |b| {
        b.iter(|| {
            recorder
                .record_access(black_box(MemoryAccess {
                    thread_id: 0,
                    kind: AccessKind::Read,
                    address: 0x7fff_0000_1000,
                    instruction_pointer: Some(0x40_1000),
                }))
                .unwrap()
        })
    });

    let recorder = admitted_access_recorder();
    group.bench_function("admitted", |b| {
        b.iter(|| {
            recorder
                .record_access(black_box(MemoryAccess {
                    thread_id: 2,
                    kind: AccessKind::Read,
                    address: 0x7fff_0000_1000,
                    instruction_pointer: Some(0x40_1000),
                }))
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_record_access);
criterion_main!(benches);
