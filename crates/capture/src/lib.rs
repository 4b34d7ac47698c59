//! Capture Session Management - Frame acquisition for Framescan
//!
//! Owns the lifecycle of a screen-share capture session and the
//! extraction of still frames from it:
//! - `SessionManager` acquires and releases the underlying video stream
//! - `BoundSource` exposes the current frame of the active session
//! - `FrameSampler` renders a deterministic RGBA snapshot on demand
//!
//! The OS-level capture mechanism itself stays behind the
//! `CaptureProvider` trait; `SyntheticProvider` is the in-process
//! implementation used by tests and the demo harness.

mod error;
mod frame;
mod sampler;
mod session;
mod synthetic;
mod traits;

pub use error::*;
pub use frame::*;
pub use sampler::*;
pub use session::*;
pub use synthetic::*;
pub use traits::*;
