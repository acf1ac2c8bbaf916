//! Outbound TCP frame source.
//!
//! Dials a remote sender and reads raw frame bytes from the stream. A
//! network source is never finished; any disconnect is retryable.
//!
//! `connect` ALWAYS opens a fresh connection, replacing whatever was there
//! before. Calling it on a healthy source forcibly reconnects. That is the
//! intended contract: it lets the worker recover from a stale socket the OS
//! still reports as open, and it must not be "fixed" into a no-op.

use anyhow::Result;
use std::net::TcpStream;

use super::{read_full, tcp_endpoint, FrameSource};
use crate::config::SourceConfig;

pub struct TcpClientSource {
    host: String,
    port: u16,
    stream: Option<TcpStream>,
}

impl TcpClientSource {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            stream: None,
        }
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let (host, port) = tcp_endpoint(config)?;
        log::info!(
            "source {}: tcp client source host={} port={}",
            config.name,
            host,
            port
        );
        Ok(Self::new(&host, port))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FrameSource for TcpClientSource {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let Some(stream) = self.stream.as_mut() else {
            return 0;
        };
        let (n, healthy) = read_full(stream, buf);
        if !healthy {
            self.stream = None;
        }
        n
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn connect(&mut self) -> bool {
        // Unconditionally dial; an existing connection is dropped and
        // replaced.
        match TcpStream::connect((self.host.as_str(), self.port)) {
            Ok(stream) => {
                self.stream = Some(stream);
                true
            }
            Err(err) => {
                log::debug!("connect to {}:{} failed: {}", self.host, self.port, err);
                self.stream = None;
                false
            }
        }
    }

    fn is_finished(&self) -> bool {
        false
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
