//! Bounded frame queue.
//!
//! The hand-off point between ingestion workers and the consumer, and the
//! only state shared across threads. Built on a bounded crossbeam channel:
//! `push` blocks while the queue is full, which is the backpressure that
//! keeps a slow consumer from buffering without bound.
//!
//! Completion is half-close: every producer handle is eventually consumed by
//! `done()` (or dropped), after which `pop` drains whatever is still
//! buffered and then returns `None`. Frames already enqueued are never lost
//! to completion.
//!
//! Both queue topologies work: clone the producer to merge several sources
//! into one queue, or give each source a private queue.

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::frame::Frame;

/// Default queue bound. Sized to absorb brief consumer stalls.
pub const DEFAULT_QUEUE_CAPACITY: usize = 128;

/// Create a bounded queue with the given capacity.
pub fn frame_queue(capacity: usize) -> (FrameProducer, FrameConsumer) {
    let (tx, rx) = bounded(capacity);
    (FrameProducer { tx }, FrameConsumer { rx })
}

/// Producer side. One handle per worker; clone to share a queue between
/// sources.
#[derive(Clone)]
pub struct FrameProducer {
    tx: Sender<Frame>,
}

impl FrameProducer {
    /// Publish one frame, blocking while the queue is at capacity.
    ///
    /// Returns false when the consumer side is gone, which the caller treats
    /// as a shutdown signal rather than an error.
    pub fn push(&self, frame: Frame) -> bool {
        self.tx.send(frame).is_ok()
    }

    /// Signal that this producer will publish no more frames. Consuming the
    /// handle makes the signal one-shot; the queue completes once every
    /// producer handle has been consumed or dropped.
    pub fn done(self) {}
}

/// Consumer side. This is the pull interface handed to the downstream
/// pipeline.
pub struct FrameConsumer {
    rx: Receiver<Frame>,
}

impl FrameConsumer {
    /// Take the next frame in arrival order, blocking while the queue is
    /// empty and not yet completed. Returns `None` only once the queue has
    /// completed and every buffered frame has been drained.
    pub fn pop(&self) -> Option<Frame> {
        self.rx.recv().ok()
    }

    /// Frames currently buffered.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
