//! Capture error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Permission denied - screen capture was refused")]
    PermissionDenied,

    #[error("No capture source selected")]
    NoSourceSelected,

    #[error("Capture source unavailable")]
    SourceUnavailable,

    #[error("Capture session already active")]
    AlreadyActive,

    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Buffer size mismatch: got {actual} bytes, expected {expected}")]
    BufferSizeMismatch { actual: usize, expected: usize },

    #[error("Frame capture failed: {0}")]
    CaptureFailed(String),
}

pub type CaptureResult<T> = Result<T, CaptureError>;
