//! Frame - the opaque image payload exchanged between producer and buffers.
//!
//! Frames are value-semantic: every hand-off clones. Pixel data lives in
//! `Bytes`, which is immutable and reference-counted, so clones are cheap
//! and no two components ever alias a mutable pixel buffer.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// Nanosecond timestamp stamped by the frame producer.
pub type TimestampNs = i64;

/// One day in nanoseconds. Timestamp gaps beyond this are treated as bogus.
pub const NANOS_PER_DAY: TimestampNs = 86_400_000_000_000;

/// Bytes per pixel for tightly packed RGB8 data.
pub const BYTES_PER_PIXEL: usize = 3;

/// An RGB8 image payload
///
/// The buffers never inspect pixel content; width/height are carried only
/// so the streaming side can decide whether a resize is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Bytes,
}

impl Frame {
    /// Build a frame from raw RGB8 bytes
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidFrame` when `data` is not exactly
    /// `width * height * 3` bytes.
    pub fn from_raw(width: u32, height: u32, data: Bytes) -> Result<Self, PipelineError> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(PipelineError::invalid_frame(format!(
                "expected {expected} bytes for {width}x{height} rgb8, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a single-color frame (placeholders, synthetic sources, tests)
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * BYTES_PER_PIXEL);
        for _ in 0..pixels {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data: Bytes::from(data),
        }
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// (height, width) in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        (self.height, self.width)
    }

    /// Raw pixel data
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl Default for Frame {
    /// Black 640x480 placeholder returned before any real frame arrives
    fn default() -> Self {
        Self::solid(640, 480, [0, 0, 0])
    }
}

/// A frame paired with its capture timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampedFrame {
    pub frame: Frame,
    pub timestamp_ns: TimestampNs,
}

impl TimestampedFrame {
    pub fn new(frame: Frame, timestamp_ns: TimestampNs) -> Self {
        Self {
            frame,
            timestamp_ns,
        }
    }
}
