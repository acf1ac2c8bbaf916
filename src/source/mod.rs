//! Frame sources.
//!
//! A frame source produces the raw byte stream for consecutive frames from
//! one origin:
//! - `FileSource`: sequential replay from a local file, with optional loop
//! - `TcpClientSource`: outbound connection to a remote sender
//! - `TcpServerSource`: inbound listener serving one peer at a time
//!
//! The set of source kinds is closed and known, so construction goes through
//! `from_config` dispatch rather than open registration. Every source is
//! exclusively owned by its ingestion worker; nothing else touches the
//! underlying transport.
//!
//! The wire/byte format is raw packed pixels, frame-size chunks back to
//! back, with no length prefix or delimiter. Both ends agree on geometry out
//! of band through configuration.

use anyhow::{anyhow, Result};
use std::io::Read;

pub mod file;
pub mod tcp_client;
pub mod tcp_server;

pub use file::FileSource;
pub use tcp_client::TcpClientSource;
pub use tcp_server::TcpServerSource;

use crate::config::{SourceConfig, SourceKind};

const DEFAULT_TCP_HOST: &str = "127.0.0.1";

/// Contract every source variant satisfies.
///
/// A source is either connected (reads may succeed) or disconnected (reads
/// must not be attempted); the only transition to connected is an explicit
/// `connect` call. Reads past a disconnect return 0 until the worker
/// reconnects.
pub trait FrameSource: Send {
    /// Attempt to fill `buf`. Returns fewer than `buf.len()` bytes
    /// (including 0) on EOF, error, or disconnect; bytes beyond the returned
    /// count are untouched. Blocks only as long as the underlying transport
    /// blocks.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Non-blocking connection state query.
    fn is_connected(&self) -> bool;

    /// Attempt to establish or re-establish readability. Returns false on
    /// failure without panicking.
    fn connect(&mut self) -> bool;

    /// True once the source is permanently exhausted and must not be
    /// retried. Network sources never finish; disconnects are retryable.
    fn is_finished(&self) -> bool;
}

/// Construct the source described by `config`. A failure here excludes that
/// one source; the caller keeps running the rest of its set.
pub fn from_config(config: &SourceConfig) -> Result<Box<dyn FrameSource>> {
    match config.kind {
        SourceKind::File => Ok(Box::new(FileSource::from_config(config)?)),
        SourceKind::TcpClient => Ok(Box::new(TcpClientSource::from_config(config)?)),
        SourceKind::TcpServer => Ok(Box::new(TcpServerSource::from_config(config)?)),
    }
}

/// Resolve the host and port options shared by the TCP variants. The host
/// defaults to loopback with a warning; the port is required and must be in
/// 1-65535.
pub(crate) fn tcp_endpoint(config: &SourceConfig) -> Result<(String, u16)> {
    let host = match config.option("host") {
        Some(host) => host.to_string(),
        None => {
            log::warn!(
                "source {}: no host specified; using {}",
                config.name,
                DEFAULT_TCP_HOST
            );
            DEFAULT_TCP_HOST.to_string()
        }
    };

    let raw_port = config.require_option("port")?;
    let port: u32 = raw_port
        .parse()
        .map_err(|_| anyhow!("source {}: invalid port '{}'", config.name, raw_port))?;
    if port == 0 || port > u16::MAX as u32 {
        return Err(anyhow!("source {}: port {} out of range", config.name, port));
    }

    Ok((host, port as u16))
}

/// Fill `buf` from `reader`, stopping at EOF or error. Returns the byte
/// count and whether the transport is still usable.
pub(crate) fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> (usize, bool) {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return (filled, false),
            Ok(n) => filled += n,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => {
                log::debug!("read failed after {} bytes: {}", filled, err);
                return (filled, false);
            }
        }
    }
    (filled, true)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
