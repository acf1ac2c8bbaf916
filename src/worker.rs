//! Ingestion workers.
//!
//! One dedicated thread drives each frame source through a small state
//! machine: ensure connected, assemble one frame, publish it. A failed
//! connect backs off briefly so a dead endpoint cannot hot-spin the thread;
//! a failed assembly (short read) loops straight back to the connection
//! check. A permanently exhausted source ends the worker cleanly.
//!
//! Shutdown is two-phase: a shared stop flag checked every iteration makes
//! the loop exit promptly, then the supervisor joins the thread. Either way
//! out, the worker signals its producer handle done so the queue can
//! complete; frames already enqueued still reach the consumer.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::assembler::FrameAssembler;
use crate::config::SourceConfig;
use crate::queue::{frame_queue, FrameConsumer, FrameProducer};
use crate::source::{self, FrameSource};

/// Pause after a failed connect attempt. Bounded, small, exists only to keep
/// a retry loop off the CPU.
pub const RECONNECT_PAUSE: Duration = Duration::from_millis(2);

pub struct IngestWorker {
    name: String,
    source: Box<dyn FrameSource>,
    assembler: FrameAssembler,
    producer: FrameProducer,
    stop: Arc<AtomicBool>,
}

impl IngestWorker {
    /// Build a worker that exclusively owns `source` and publishes to
    /// `producer`. Exactly one worker drives each source.
    pub fn new(
        name: &str,
        source: Box<dyn FrameSource>,
        assembler: FrameAssembler,
        producer: FrameProducer,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            name: name.to_string(),
            source,
            assembler,
            producer,
            stop,
        }
    }

    /// Convenience constructor: build source and assembler from one config
    /// record.
    pub fn from_config(
        config: &SourceConfig,
        producer: FrameProducer,
        stop: Arc<AtomicBool>,
    ) -> Result<Self> {
        let source = source::from_config(config)?;
        let assembler = FrameAssembler::new(config.params, config.frame_rate);
        Ok(Self::new(&config.name, source, assembler, producer, stop))
    }

    /// Spawn the worker on its own named thread.
    pub fn spawn(self) -> Result<WorkerHandle> {
        let name = self.name.clone();
        let join = std::thread::Builder::new()
            .name(format!("ingest-{}", name))
            .spawn(move || self.run())
            .with_context(|| format!("spawn ingest thread for source {}", name))?;
        Ok(WorkerHandle {
            name,
            join: Some(join),
        })
    }

    fn run(mut self) {
        log::info!("source {}: ingest started", self.name);
        while !self.stop.load(Ordering::SeqCst) && !self.source.is_finished() {
            if !self.source.is_connected() {
                log::debug!("source {}: reconnecting", self.name);
                if !self.source.connect() {
                    std::thread::sleep(RECONNECT_PAUSE);
                    continue;
                }
            }
            if let Some(frame) = self.assembler.next_frame(self.source.as_mut()) {
                log::debug!("source {}: publishing frame {}", self.name, frame.sequence());
                if !self.producer.push(frame) {
                    // Consumer side is gone; nothing left to feed.
                    break;
                }
            }
        }
        self.producer.done();
        log::info!(
            "source {}: ingest done after {} frames",
            self.name,
            self.assembler.next_sequence()
        );
    }
}

/// Join handle for one running worker.
pub struct WorkerHandle {
    name: String,
    join: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn join(&mut self) {
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                log::error!("ingest thread for source {} panicked", self.name);
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Supervisor
// ----------------------------------------------------------------------------

/// Runs one worker per valid source config, all feeding a single merged
/// queue. Per-source private queues are also possible by wiring
/// `IngestWorker` by hand; this is the daemon's topology.
pub struct Supervisor {
    stop: Arc<AtomicBool>,
    workers: Vec<WorkerHandle>,
}

impl Supervisor {
    /// Build sources and spawn their workers. A source that fails to
    /// construct is skipped with an error log; the rest still run. Returns
    /// the consumer end of the merged queue.
    pub fn start(configs: &[SourceConfig], queue_capacity: usize) -> (Self, FrameConsumer) {
        let (producer, consumer) = frame_queue(queue_capacity);
        let stop = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::new();
        for config in configs {
            let worker = match IngestWorker::from_config(config, producer.clone(), stop.clone()) {
                Ok(worker) => worker,
                Err(err) => {
                    log::error!("skipping source {}: {:#}", config.name, err);
                    continue;
                }
            };
            match worker.spawn() {
                Ok(handle) => workers.push(handle),
                Err(err) => log::error!("skipping source {}: {:#}", config.name, err),
            }
        }

        // Only worker-held handles keep the queue open; it completes when
        // the last worker signals done.
        drop(producer);

        (Self { stop, workers }, consumer)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Shared stop flag, for wiring into a signal handler.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Request all workers to stop and join them. Frames already enqueued
    /// stay available to the consumer.
    pub fn shutdown(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        for worker in &mut self.workers {
            worker.join();
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
