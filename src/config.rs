//! Feed configuration.
//!
//! Loads a TOML file describing the frame sources to run. Each `[[source]]`
//! table carries a unique name, a source type, the frame geometry, an
//! optional nominal frame rate, and a string option map specific to the
//! source type (`path`/`loop` for files, `host`/`port` for TCP).
//!
//! Structurally invalid entries are skipped with a logged warning and the
//! rest of the list is still used; only an unreadable or unparseable file is
//! an error. Validation happens here, once, before any worker starts; the
//! resulting `SourceConfig` records are immutable afterward.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::frame::{FrameParameters, FrameRate, PixelFormat};
use crate::queue::DEFAULT_QUEUE_CAPACITY;

/// Environment variable naming the config file, honored by `FeedConfig::load`.
pub const CONFIG_ENV: &str = "FRAMEFEED_CONFIG";

const DEFAULT_PIXEL_FORMAT: &str = "RGB";

/// Type tag of a single frame source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    File,
    TcpClient,
    TcpServer,
}

impl SourceKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "file" => Some(SourceKind::File),
            "tcp_client" => Some(SourceKind::TcpClient),
            "tcp_server" => Some(SourceKind::TcpServer),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            SourceKind::File => "file",
            SourceKind::TcpClient => "tcp_client",
            SourceKind::TcpServer => "tcp_server",
        }
    }
}

/// Validated configuration for one frame source.
#[derive(Clone, Debug)]
pub struct SourceConfig {
    pub name: String,
    pub kind: SourceKind,
    pub params: FrameParameters,
    pub frame_rate: FrameRate,
    /// Source-type-specific options (`path`, `loop`, `host`, `port`).
    pub options: BTreeMap<String, String>,
}

impl SourceConfig {
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    pub fn require_option(&self, key: &str) -> Result<&str> {
        self.option(key)
            .ok_or_else(|| anyhow!("source {}: option '{}' is required", self.name, key))
    }
}

/// Top-level feed configuration: the queue bound and the source list.
#[derive(Debug)]
pub struct FeedConfig {
    pub queue_capacity: usize,
    pub sources: Vec<SourceConfig>,
}

// ----------------------------------------------------------------------------
// Raw file schema
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
struct FeedConfigFile {
    queue_capacity: Option<usize>,
    #[serde(default, rename = "source")]
    sources: Vec<SourceEntry>,
}

#[derive(Debug, Deserialize)]
struct SourceEntry {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    pixel_format: Option<String>,
    frame_rate: Option<FrameRateEntry>,
    #[serde(default)]
    options: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct FrameRateEntry {
    numerator: u32,
    #[serde(default = "default_denominator")]
    denominator: u32,
}

fn default_denominator() -> u32 {
    1
}

// ----------------------------------------------------------------------------
// Loading
// ----------------------------------------------------------------------------

impl FeedConfig {
    /// Load from the file named by `FRAMEFEED_CONFIG`.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV)
            .map_err(|_| anyhow!("{} must name a config file", CONFIG_ENV))?;
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: FeedConfigFile = toml::from_str(raw).context("parse config as TOML")?;

        let mut seen_names = BTreeSet::new();
        let mut sources = Vec::new();
        for (index, entry) in file.sources.into_iter().enumerate() {
            match validate_entry(entry, &mut seen_names) {
                Ok(source) => sources.push(source),
                Err(err) => {
                    log::warn!("skipping source entry #{}: {}", index, err);
                }
            }
        }

        Ok(Self {
            queue_capacity: file.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY),
            sources,
        })
    }
}

fn validate_entry(entry: SourceEntry, seen_names: &mut BTreeSet<String>) -> Result<SourceConfig> {
    let name = entry
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| anyhow!("missing source name"))?;
    if !seen_names.insert(name.clone()) {
        return Err(anyhow!("duplicate source name '{}'", name));
    }

    let kind_tag = entry
        .kind
        .ok_or_else(|| anyhow!("source {}: missing type", name))?;
    let kind = SourceKind::from_tag(&kind_tag)
        .ok_or_else(|| anyhow!("source {}: unknown type '{}'", name, kind_tag))?;

    let width = entry
        .width
        .ok_or_else(|| anyhow!("source {}: missing width", name))?;
    let height = entry
        .height
        .ok_or_else(|| anyhow!("source {}: missing height", name))?;
    if width == 0 || height == 0 {
        return Err(anyhow!(
            "source {}: width and height must be positive",
            name
        ));
    }

    let format_tag = entry
        .pixel_format
        .unwrap_or_else(|| DEFAULT_PIXEL_FORMAT.to_string());
    let pixel_format = PixelFormat::from_tag(&format_tag)
        .ok_or_else(|| anyhow!("source {}: unknown pixel format '{}'", name, format_tag))?;

    let frame_rate = match entry.frame_rate {
        Some(rate) => {
            if rate.denominator == 0 {
                return Err(anyhow!(
                    "source {}: frame rate denominator must be non-zero",
                    name
                ));
            }
            FrameRate::new(rate.numerator, rate.denominator)
        }
        None => FrameRate::default(),
    };

    Ok(SourceConfig {
        name,
        kind,
        params: FrameParameters {
            width,
            height,
            pixel_format,
        },
        frame_rate,
        options: entry.options,
    })
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
