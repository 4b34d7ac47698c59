//! Detector Boundary - Pixel analyzer invocation for Framescan
//!
//! Wraps the external Game Boy display analyzer behind the
//! `PixelAnalyzer` trait and marshals frame buffers into it. The
//! analyzer itself (display location, status decoding) is supplied by
//! the host application; this crate only guarantees that every call
//! comes back as a structured `DetectionOutcome`.

mod client;
mod error;
mod traits;

pub use client::*;
pub use error::*;
pub use traits::*;
