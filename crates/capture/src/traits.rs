//! Capture trait abstractions

use crate::{CaptureResult, RawFrame};

/// Cursor rendering in captured frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// Cursor is composited into every frame
    Always,
    /// Cursor is never captured
    Never,
}

/// Capture acquisition options
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Cursor rendering mode
    pub cursor: CursorMode,
    /// Capture audio alongside video. The session manager forces this
    /// off; audio is outside the pipeline's scope.
    pub audio: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            cursor: CursorMode::Always,
            audio: false,
        }
    }
}

/// Provider of live capture streams (the OS/browser sharing facility)
///
/// Acquisition fails with `PermissionDenied` when the user refuses the
/// share, or `NoSourceSelected` when the picker is cancelled.
pub trait CaptureProvider: Send + Sync {
    /// Request a new live capture stream
    fn request_capture(&self, options: &CaptureOptions) -> CaptureResult<Box<dyn VideoStream>>;
}

/// A live video stream handle
///
/// Read-only: implementations expose the current picture without
/// mutating the underlying stream.
pub trait VideoStream: Send + Sync {
    /// Intrinsic dimensions of the stream
    fn dimensions(&self) -> (u32, u32);

    /// The current picture, in whatever layout the backend delivers
    fn current_frame(&self) -> CaptureResult<RawFrame>;
}

/// Current-frame view over the active capture session
///
/// Both operations fail with `SourceUnavailable` when no active session
/// is bound.
pub trait FrameSource: Send + Sync {
    /// Intrinsic dimensions of the bound stream at this moment
    fn current_dimensions(&self) -> CaptureResult<(u32, u32)>;

    /// The bound stream's current picture
    fn current_frame(&self) -> CaptureResult<RawFrame>;
}
