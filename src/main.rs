// src/main.rs
//! Memtrace workload driver
//!
//! Stands in for the instrumentation engine: spawns a handful of worker
//! threads, fires the tracer hooks with a synthetic stream of memory
//! accesses the way an engine would per executed operand, then finalizes
//! the trace. Useful for exercising the full recording path and eyeballing
//! the log format without a real engine attached.

use anyhow::Result;
use memtrace::observability::{init_tracing, log_recorder_stats};
use memtrace::{AccessKind, MemoryAccess, ThreadId, TracerConfig, TracerHooks};
use rand::Rng;
use std::sync::Arc;
use std::thread;
use tracing::info;

const WORKER_THREADS: ThreadId = 3;
const ACCESSES_PER_THREAD: usize = 200;

fn main() -> Result<()> {
    init_tracing()?;

    info!("Starting memtrace workload driver v{}", env!("CARGO_PKG_VERSION"));

    let config = TracerConfig::load()?;
    info!("Configuration loaded: {:?}", config);

    let hooks = Arc::new(TracerHooks::from_config(&config)?);

    // The engine reports the main thread as id 0
    hooks.on_thread_begin(0)?;

    let mut handles = vec![];
    for thread_id in 1..=WORKER_THREADS {
        let hooks = Arc::clone(&hooks);
        handles.push(thread::spawn(move || -> Result<()> {
            hooks.on_thread_begin(thread_id)?;

            let mut rng = rand::thread_rng();
            for _ in 0..ACCESSES_PER_THREAD {
                let kind = if rng.gen_bool(0.5) {
                    AccessKind::Read
                } else {
                    AccessKind::Write
                };
                hooks.on_memory_access(MemoryAccess {
                    thread_id,
                    kind,
                    address: 0x7fff_0000_0000 + rng.gen_range(0..0x1_0000),
                    instruction_pointer: Some(0x40_0000 + rng.gen_range(0..0x4000)),
                })?;
            }

            hooks.on_thread_end(thread_id, 0)?;
            Ok(())
        }));
    }

    for handle in handles {
        handle
            .join()
            .expect("worker thread panicked")?;
    }

    hooks.on_thread_end(0, 0)?;
    hooks.on_program_exit()?;

    log_recorder_stats(&hooks.recorder().stats());
    info!("Trace written to {}", config.output.path.display());

    Ok(())
}
