//! Local file frame source.
//!
//! Replays packed frames sequentially from a byte-addressable file. With
//! `loop` enabled, reaching end-of-file is not terminal: the next `connect`
//! rewinds to the start and clears the end condition. Without it, end-of-file
//! makes the source permanently finished.

use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::{Seek, SeekFrom};

use super::{read_full, FrameSource};
use crate::config::SourceConfig;

pub struct FileSource {
    path: String,
    file: File,
    loop_enabled: bool,
    at_eof: bool,
}

impl FileSource {
    pub fn new(path: &str, loop_enabled: bool) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("open frame file {}", path))?;
        Ok(Self {
            path: path.to_string(),
            file,
            loop_enabled,
            at_eof: false,
        })
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let path = config.require_option("path")?;
        let loop_enabled = match config.option("loop") {
            None => false,
            Some("true") => true,
            Some("false") => false,
            Some(other) => {
                return Err(anyhow!(
                    "source {}: option 'loop' must be true or false, got '{}'",
                    config.name,
                    other
                ))
            }
        };
        log::info!(
            "source {}: file source path={} loop={}",
            config.name,
            path,
            loop_enabled
        );
        Self::new(path, loop_enabled)
    }

    /// Absolute seek, clearing the end-of-file condition on success.
    pub fn seek(&mut self, pos: u64) -> bool {
        match self.file.seek(SeekFrom::Start(pos)) {
            Ok(_) => {
                self.at_eof = false;
                true
            }
            Err(err) => {
                log::warn!("seek to {} in {} failed: {}", pos, self.path, err);
                false
            }
        }
    }
}

impl FrameSource for FileSource {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        if self.at_eof {
            return 0;
        }
        let (n, healthy) = read_full(&mut self.file, buf);
        if !healthy {
            self.at_eof = true;
        }
        n
    }

    fn is_connected(&self) -> bool {
        !self.at_eof
    }

    fn connect(&mut self) -> bool {
        if self.at_eof && self.loop_enabled {
            return self.seek(0);
        }
        self.is_connected()
    }

    fn is_finished(&self) -> bool {
        self.at_eof && !self.loop_enabled
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
