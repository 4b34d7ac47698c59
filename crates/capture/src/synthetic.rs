//! Synthetic capture backend
//!
//! In-process stand-in for a platform capture API: a stream that
//! serves deterministic solid-color frames, and a provider that can be
//! put into the refusal modes a real sharing prompt can produce. Used
//! by the test suites and the demo harness.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::{
    CaptureError, CaptureOptions, CaptureProvider, CaptureResult, PixelFormat, RawFrame,
    VideoStream,
};

struct Inner {
    width: u32,
    height: u32,
    format: PixelFormat,
    row_padding: usize,
    fill: Mutex<[u8; 4]>,
    live: AtomicBool,
}

/// A live stream serving solid-color test frames.
///
/// Clones share the same underlying stream, so a test can keep a handle
/// while the session owns the boxed trait object.
#[derive(Clone)]
pub struct SyntheticStream {
    inner: Arc<Inner>,
}

impl SyntheticStream {
    /// Tightly packed RGBA stream, initially filled black
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_format(width, height, PixelFormat::Rgba8)
    }

    /// Stream delivering frames in the given pixel layout
    pub fn with_format(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            inner: Arc::new(Inner {
                width,
                height,
                format,
                row_padding: 0,
                fill: Mutex::new([0, 0, 0, 255]),
                live: AtomicBool::new(true),
            }),
        }
    }

    /// Pad each row by `bytes`, as strided backends do
    pub fn with_row_padding(self, bytes: usize) -> Self {
        let inner = Arc::new(Inner {
            width: self.inner.width,
            height: self.inner.height,
            format: self.inner.format,
            row_padding: bytes,
            fill: Mutex::new(*self.inner.fill.lock()),
            live: AtomicBool::new(self.inner.live.load(Ordering::SeqCst)),
        });
        Self { inner }
    }

    /// Change the solid fill color (logical RGBA)
    pub fn fill(&self, rgba: [u8; 4]) {
        *self.inner.fill.lock() = rgba;
    }

    /// Terminate the stream, as when the user revokes sharing
    pub fn end(&self) {
        self.inner.live.store(false, Ordering::SeqCst);
    }

    pub fn is_live(&self) -> bool {
        self.inner.live.load(Ordering::SeqCst)
    }
}

impl VideoStream for SyntheticStream {
    fn dimensions(&self) -> (u32, u32) {
        (self.inner.width, self.inner.height)
    }

    fn current_frame(&self) -> CaptureResult<RawFrame> {
        if !self.is_live() {
            return Err(CaptureError::SourceUnavailable);
        }

        let width = self.inner.width;
        let height = self.inner.height;
        let stride = width as usize * 4 + self.inner.row_padding;

        let [r, g, b, a] = *self.inner.fill.lock();
        let pixel = match self.inner.format {
            PixelFormat::Rgba8 => [r, g, b, a],
            PixelFormat::Bgra8 => [b, g, r, a],
        };

        let mut data = Vec::with_capacity(stride * height as usize);
        for _ in 0..height {
            for _ in 0..width {
                data.extend_from_slice(&pixel);
            }
            data.extend(std::iter::repeat_n(0u8, self.inner.row_padding));
        }

        Ok(RawFrame {
            data: Bytes::from(data),
            width,
            height,
            stride: stride as u32,
            format: self.inner.format,
        })
    }
}

enum Refusal {
    Denied,
    Cancelled,
}

/// Capture provider over synthetic streams
pub struct SyntheticProvider {
    width: u32,
    height: u32,
    stream: Option<SyntheticStream>,
    refusal: Option<Refusal>,
    last_options: Mutex<Option<CaptureOptions>>,
}

impl SyntheticProvider {
    /// Provider that hands out a fresh stream of the given size per request
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            stream: None,
            refusal: None,
            last_options: Mutex::new(None),
        }
    }

    /// Provider that always hands out the given stream
    pub fn with_stream(stream: SyntheticStream) -> Self {
        let (width, height) = stream.dimensions();
        Self {
            width,
            height,
            stream: Some(stream),
            refusal: None,
            last_options: Mutex::new(None),
        }
    }

    /// Provider simulating a refused sharing prompt
    pub fn denied() -> Self {
        Self {
            refusal: Some(Refusal::Denied),
            ..Self::new(0, 0)
        }
    }

    /// Provider simulating a cancelled source picker
    pub fn cancelled() -> Self {
        Self {
            refusal: Some(Refusal::Cancelled),
            ..Self::new(0, 0)
        }
    }

    /// Options passed on the most recent acquisition request
    pub fn last_options(&self) -> Option<CaptureOptions> {
        self.last_options.lock().clone()
    }
}

impl CaptureProvider for SyntheticProvider {
    fn request_capture(&self, options: &CaptureOptions) -> CaptureResult<Box<dyn VideoStream>> {
        *self.last_options.lock() = Some(options.clone());

        match self.refusal {
            Some(Refusal::Denied) => return Err(CaptureError::PermissionDenied),
            Some(Refusal::Cancelled) => return Err(CaptureError::NoSourceSelected),
            None => {}
        }

        let stream = match &self.stream {
            Some(stream) => stream.clone(),
            None => SyntheticStream::new(self.width, self.height),
        };
        Ok(Box::new(stream))
    }
}
