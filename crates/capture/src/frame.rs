//! Frame data structures

use bytes::Bytes;

use crate::{CaptureError, CaptureResult};

/// Pixel format of a raw stream frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// RGBA 8-bit per channel
    Rgba8,
    /// BGRA 8-bit per channel (common for desktop capture backends)
    Bgra8,
}

impl PixelFormat {
    /// Bytes per pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => 4,
        }
    }
}

/// A frame as delivered by the live stream, stride and format preserved
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Raw pixel data
    pub data: Bytes,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Stride (bytes per row, may include padding)
    pub stride: u32,
    /// Pixel format
    pub format: PixelFormat,
}

impl RawFrame {
    /// Check that the payload covers `height` rows of `stride` bytes
    pub fn is_complete(&self) -> bool {
        self.data.len() >= self.stride as usize * self.height as usize
    }
}

/// An immutable still-image snapshot: tightly packed RGBA at the
/// source's intrinsic resolution.
///
/// The constructor is the only way to build one, so every
/// `FrameBuffer` in the system satisfies `data.len() == width * height * 4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    data: Bytes,
}

impl FrameBuffer {
    /// Expected payload length for the given dimensions
    pub fn expected_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 4
    }

    /// Build a snapshot, validating dimensions and payload length
    pub fn new(width: u32, height: u32, data: Bytes) -> CaptureResult<Self> {
        if width == 0 || height == 0 {
            return Err(CaptureError::InvalidDimensions { width, height });
        }

        let expected = Self::expected_len(width, height);
        if data.len() != expected {
            return Err(CaptureError::BufferSizeMismatch {
                actual: data.len(),
                expected,
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major, no padding
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Cheaply cloneable handle to the pixel payload
    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }
}
