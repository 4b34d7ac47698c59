//! Shared Vocabulary for Framescan
//!
//! This crate contains the outcome and state types shared between the
//! scan pipeline crates and any UI surface consuming them.

mod outcome;
mod scan;

pub use outcome::*;
pub use scan::*;

use std::time::Duration;

/// Default polling interval for periodic scanning
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
