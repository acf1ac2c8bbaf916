//! Inbound TCP frame source.
//!
//! Binds a listening socket at construction and serves exactly one peer at a
//! time. `connect` accepts the next inbound peer, replacing any previous
//! one; a peer disconnect shows up as a short read, after which the worker
//! reconnects by accepting again. Never finished.
//!
//! The listener runs in non-blocking mode so a pending accept cannot pin the
//! worker thread: no peer yet reads as a failed connect attempt and the
//! worker retries after its usual pause.

use anyhow::{Context, Result};
use std::net::{TcpListener, TcpStream};

use super::{read_full, tcp_endpoint, FrameSource};
use crate::config::SourceConfig;

pub struct TcpServerSource {
    listener: TcpListener,
    peer: Option<TcpStream>,
}

impl TcpServerSource {
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let listener = TcpListener::bind((host, port))
            .with_context(|| format!("bind frame listener on {}:{}", host, port))?;
        listener
            .set_nonblocking(true)
            .context("set frame listener non-blocking")?;
        Ok(Self {
            listener,
            peer: None,
        })
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let (host, port) = tcp_endpoint(config)?;
        log::info!(
            "source {}: tcp server source host={} port={}",
            config.name,
            host,
            port
        );
        Self::new(&host, port)
    }

    /// Actual bound address, useful when configured with port 0.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        self.listener.local_addr().context("frame listener address")
    }
}

impl FrameSource for TcpServerSource {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        let Some(peer) = self.peer.as_mut() else {
            return 0;
        };
        let (n, healthy) = read_full(peer, buf);
        if !healthy {
            self.peer = None;
        }
        n
    }

    fn is_connected(&self) -> bool {
        self.peer.is_some()
    }

    fn connect(&mut self) -> bool {
        match self.listener.accept() {
            Ok((peer, peer_addr)) => {
                // The accepted socket inherits non-blocking mode on some
                // platforms; reads must block.
                if let Err(err) = peer.set_nonblocking(false) {
                    log::warn!("failed to set peer {} blocking: {}", peer_addr, err);
                    return false;
                }
                log::info!("accepted frame peer {}", peer_addr);
                self.peer = Some(peer);
                true
            }
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => false,
            Err(err) => {
                log::warn!("accept failed: {}", err);
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
