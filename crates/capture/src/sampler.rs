//! Still-frame sampling

use bytes::Bytes;
use tracing::debug;

use crate::{CaptureError, CaptureResult, FrameBuffer, FrameSource, PixelFormat, RawFrame};

/// Renders the current frame of a source into a fresh, tightly packed
/// RGBA snapshot at the source's intrinsic resolution.
///
/// No scaling policy is applied: the snapshot dimensions always equal
/// the dimensions the source reports at the moment of capture.
/// Sampling an unchanging source twice yields pixel-identical buffers.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameSampler;

impl FrameSampler {
    pub fn new() -> Self {
        Self
    }

    /// Extract a still snapshot from the source's current frame.
    ///
    /// Fails with `SourceUnavailable` when no session is bound and with
    /// `InvalidDimensions` when the stream has not produced a sized
    /// frame yet; a `FrameBuffer` is never zero-sized.
    pub fn capture_still(&self, source: &dyn FrameSource) -> CaptureResult<FrameBuffer> {
        let raw = source.current_frame()?;

        if raw.width == 0 || raw.height == 0 {
            return Err(CaptureError::InvalidDimensions {
                width: raw.width,
                height: raw.height,
            });
        }
        if !raw.is_complete() {
            return Err(CaptureError::CaptureFailed(format!(
                "truncated frame: {} bytes for {}x{} stride {}",
                raw.data.len(),
                raw.width,
                raw.height,
                raw.stride,
            )));
        }

        debug!(
            width = raw.width,
            height = raw.height,
            format = ?raw.format,
            "sampling still frame"
        );

        let rgba = rasterize_rgba(&raw);
        FrameBuffer::new(raw.width, raw.height, rgba)
    }
}

/// Copy a raw frame into a tight RGBA raster, stripping row padding and
/// swizzling BGRA where needed.
fn rasterize_rgba(raw: &RawFrame) -> Bytes {
    let width = raw.width as usize;
    let height = raw.height as usize;
    let stride = raw.stride as usize;
    let row_len = width * raw.format.bytes_per_pixel();

    let mut out = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        let row = &raw.data[y * stride..y * stride + row_len];
        match raw.format {
            PixelFormat::Rgba8 => out.extend_from_slice(row),
            PixelFormat::Bgra8 => {
                out.extend(
                    row.chunks_exact(4)
                        .flat_map(|chunk| [chunk[2], chunk[1], chunk[0], chunk[3]]),
                );
            }
        }
    }

    Bytes::from(out)
}
