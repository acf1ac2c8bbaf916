//! framefeed
//!
//! This crate implements multi-source ingestion of fixed-format raw frames:
//! file replay and TCP feeds are read by per-source worker threads,
//! assembled into complete frames, and handed to a downstream consumer
//! through a bounded queue.
//!
//! # Architecture
//!
//! Each configured source gets one dedicated ingestion worker. The worker
//! owns its source exclusively, keeps it connected (reconnecting after any
//! transient failure), assembles full frames from the raw byte stream, and
//! publishes them in order. The bounded queue is the only shared state:
//! a slow consumer blocks the workers rather than growing memory, and a
//! half-close signal lets the consumer drain every buffered frame before
//! treating the stream as ended.
//!
//! Per-source frame order is strict (sequence numbers 0, 1, 2, ... with no
//! gaps). When several sources share one queue, cross-source interleaving is
//! arrival order and nothing more.
//!
//! # Module Structure
//!
//! - `frame`: frame data model (geometry, rate, packed buffers, RGB views)
//! - `source`: the source contract and its file/TCP variants
//! - `assembler`: byte stream to `Frame` conversion
//! - `queue`: the bounded hand-off between workers and consumer
//! - `worker`: per-source ingestion threads and the supervisor
//! - `config`: TOML feed configuration

pub mod assembler;
pub mod config;
pub mod frame;
pub mod queue;
pub mod source;
pub mod worker;

pub use assembler::FrameAssembler;
pub use config::{FeedConfig, SourceConfig, SourceKind};
pub use frame::{Frame, FrameParameters, FrameRate, PixelFormat, RgbPixel, RgbView};
pub use queue::{frame_queue, FrameConsumer, FrameProducer, DEFAULT_QUEUE_CAPACITY};
pub use source::{FileSource, FrameSource, TcpClientSource, TcpServerSource};
pub use worker::{IngestWorker, Supervisor, WorkerHandle, RECONNECT_PAUSE};
