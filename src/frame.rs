//! Frame data model.
//!
//! - `PixelFormat` / `FrameParameters`: fixed per-source geometry. The byte
//!   length of every frame from one source is `width * height * pixel_size`.
//! - `FrameRate`: rational rate in Hz. A numerator of 0 means "unspecified"
//!   and timestamps fall back to wall-clock arrival time.
//! - `Frame`: one owned, packed pixel buffer plus sequence number and
//!   timestamp. Frames are moved through the queue, never copied.
//! - `RgbView`: bounds-checked typed access to the pixel buffer. The format
//!   tag and buffer length are validated before any pixel is exposed; a
//!   mismatch is an explicit error, never an empty frame.

use anyhow::{anyhow, Result};
use std::time::Duration;

/// Pixel layout of a packed frame buffer. Closed set; adding a format must
/// not change the layout assumptions of existing ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// 3 bytes per pixel, R then G then B, no padding.
    Rgb,
}

impl PixelFormat {
    /// Bytes per pixel for this format.
    pub fn pixel_size(self) -> usize {
        match self {
            PixelFormat::Rgb => 3,
        }
    }

    /// Parse a configuration tag. Unknown tags are a configuration error at
    /// the call site.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "RGB" => Some(PixelFormat::Rgb),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            PixelFormat::Rgb => "RGB",
        }
    }
}

/// Immutable per-source frame geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameParameters {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
}

impl FrameParameters {
    /// Exact byte length of one frame. Non-zero for any validated config.
    pub fn frame_size_bytes(&self) -> usize {
        self.width as usize * self.height as usize * self.pixel_format.pixel_size()
    }
}

/// Frame rate in Hz as a rational number. The denominator is never zero
/// (enforced at configuration time). A numerator of 0 means the rate is
/// unspecified and frames carry wall-clock timestamps instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRate {
    pub numerator: u32,
    pub denominator: u32,
}

impl FrameRate {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// True when no nominal rate was configured.
    pub fn is_unspecified(&self) -> bool {
        self.numerator == 0
    }

    /// Duration of one frame at this rate, or None when unspecified.
    pub fn frame_duration(&self) -> Option<Duration> {
        if self.numerator == 0 {
            return None;
        }
        let nanos = 1_000_000_000u64 * self.denominator as u64 / self.numerator as u64;
        Some(Duration::from_nanos(nanos))
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

// ----------------------------------------------------------------------------
// Frame
// ----------------------------------------------------------------------------

/// One complete frame: an owned packed pixel buffer plus metadata.
///
/// Created by the assembler, moved into the queue, moved out by the
/// consumer. The buffer is freed when the frame is dropped.
#[derive(Debug)]
pub struct Frame {
    params: FrameParameters,
    /// Packed pixels, exactly `params.frame_size_bytes()` long.
    data: Vec<u8>,
    /// 0-based, strictly increasing per source with no gaps.
    sequence: u64,
    /// Either `sequence * frame_duration` or wall-clock time since the Unix
    /// epoch, depending on whether the source has a nominal rate.
    timestamp: Duration,
}

impl Frame {
    pub(crate) fn new(
        params: FrameParameters,
        data: Vec<u8>,
        sequence: u64,
        timestamp: Duration,
    ) -> Self {
        debug_assert_eq!(data.len(), params.frame_size_bytes());
        Self {
            params,
            data,
            sequence,
            timestamp,
        }
    }

    pub fn params(&self) -> FrameParameters {
        self.params
    }

    pub fn width(&self) -> u32 {
        self.params.width
    }

    pub fn height(&self) -> u32 {
        self.params.height
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.params.pixel_format
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }

    /// Packed pixel bytes. Consumers copy out of this slice before dropping
    /// the frame.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Typed RGB access. Fails when the frame is not RGB or when the buffer
    /// length does not match the declared geometry.
    pub fn rgb(&self) -> Result<RgbView<'_>> {
        if self.params.pixel_format != PixelFormat::Rgb {
            return Err(anyhow!(
                "frame pixel format is {}, not RGB",
                self.params.pixel_format.tag()
            ));
        }
        let expected = self.params.frame_size_bytes();
        if self.data.len() != expected {
            return Err(anyhow!(
                "frame buffer is {} bytes, expected {} for {}x{} RGB",
                self.data.len(),
                expected,
                self.params.width,
                self.params.height
            ));
        }
        Ok(RgbView {
            data: &self.data,
            width: self.params.width,
            height: self.params.height,
        })
    }
}

// ----------------------------------------------------------------------------
// Typed pixel access
// ----------------------------------------------------------------------------

/// One RGB pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RgbPixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Validated view over an RGB frame buffer. Only constructed after the
/// format tag and buffer length have been checked.
pub struct RgbView<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> RgbView<'a> {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at (x, y), or None when out of range.
    pub fn pixel(&self, x: u32, y: u32) -> Option<RgbPixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some(RgbPixel {
            r: self.data[i],
            g: self.data[i + 1],
            b: self.data[i + 2],
        })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb_params(width: u32, height: u32) -> FrameParameters {
        FrameParameters {
            width,
            height,
            pixel_format: PixelFormat::Rgb,
        }
    }

    #[test]
    fn frame_size_follows_geometry() {
        assert_eq!(rgb_params(2, 1).frame_size_bytes(), 6);
        assert_eq!(rgb_params(640, 480).frame_size_bytes(), 640 * 480 * 3);
    }

    #[test]
    fn frame_rate_duration() {
        assert_eq!(
            FrameRate::new(30, 1).frame_duration(),
            Some(Duration::from_nanos(33_333_333))
        );
        assert_eq!(
            FrameRate::new(30_000, 1_001).frame_duration(),
            Some(Duration::from_nanos(33_366_666))
        );
        assert!(FrameRate::default().frame_duration().is_none());
        assert!(FrameRate::default().is_unspecified());
    }

    #[test]
    fn rgb_view_reads_pixels_bounds_checked() {
        let params = rgb_params(2, 2);
        let data = vec![
            1, 2, 3, 4, 5, 6, //
            7, 8, 9, 10, 11, 12,
        ];
        let frame = Frame::new(params, data, 0, Duration::ZERO);

        let view = frame.rgb().expect("rgb view");
        assert_eq!(view.pixel(0, 0), Some(RgbPixel { r: 1, g: 2, b: 3 }));
        assert_eq!(view.pixel(1, 1), Some(RgbPixel { r: 10, g: 11, b: 12 }));
        assert_eq!(view.pixel(2, 0), None);
        assert_eq!(view.pixel(0, 2), None);
    }

    #[test]
    fn rgb_view_rejects_wrong_buffer_length() {
        // Bypass the assembler's sizing by constructing a short buffer.
        let params = rgb_params(2, 1);
        let frame = Frame {
            params,
            data: vec![0u8; 5],
            sequence: 0,
            timestamp: Duration::ZERO,
        };
        assert!(frame.rgb().is_err());
    }

    #[test]
    fn pixel_format_tags_round_trip() {
        assert_eq!(PixelFormat::from_tag("RGB"), Some(PixelFormat::Rgb));
        assert_eq!(PixelFormat::from_tag("YUV420"), None);
        assert_eq!(PixelFormat::Rgb.tag(), "RGB");
        assert_eq!(PixelFormat::Rgb.pixel_size(), 3);
    }
}
