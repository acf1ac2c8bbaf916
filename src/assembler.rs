//! Frame assembly.
//!
//! Turns a connected source's byte stream into complete `Frame` values. One
//! attempt reads exactly one frame worth of bytes; a short read fails the
//! whole attempt and no partial frame ever escapes. Sequence numbers are
//! issued 0, 1, 2, ... per source and only advance on success.
//!
//! Timestamps follow the source's rate policy: with a nominal frame rate the
//! timestamp is `sequence * frame_duration`; with no rate configured it is
//! the wall-clock assembly time.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::frame::{Frame, FrameParameters, FrameRate};
use crate::source::FrameSource;

pub struct FrameAssembler {
    params: FrameParameters,
    frame_rate: FrameRate,
    next_sequence: u64,
}

impl FrameAssembler {
    pub fn new(params: FrameParameters, frame_rate: FrameRate) -> Self {
        Self {
            params,
            frame_rate,
            next_sequence: 0,
        }
    }

    /// Sequence number the next successful frame will carry.
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Assemble one frame from `source`, or `None` when a short read spoiled
    /// the attempt. The caller discards the attempt and retries once the
    /// connection is re-established.
    pub fn next_frame(&mut self, source: &mut dyn FrameSource) -> Option<Frame> {
        let size = self.params.frame_size_bytes();
        let mut data = vec![0u8; size];

        let mut filled = 0;
        while filled < size {
            let wanted = size - filled;
            let n = source.read(&mut data[filled..]);
            if n < wanted {
                return None;
            }
            filled += n;
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let timestamp = self.timestamp_for(sequence);
        Some(Frame::new(self.params, data, sequence, timestamp))
    }

    fn timestamp_for(&self, sequence: u64) -> Duration {
        match self.frame_rate.frame_duration() {
            Some(duration) => {
                Duration::from_nanos((duration.as_nanos() as u64).saturating_mul(sequence))
            }
            None => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default(),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
