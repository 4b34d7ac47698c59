//! Scan controller state and published events

use serde::{Deserialize, Serialize};

use crate::DetectionOutcome;

/// Scan controller state
///
/// UI labels are derived from this enumeration; it is the single source
/// of truth for whether periodic scanning is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanState {
    /// No scan in flight, no timer armed
    Idle,
    /// A one-shot scan is in flight; collapses back to `Idle` when it returns
    ScanningOnce,
    /// A recurring timer is armed and ticks are being scanned
    PollingActive,
}

impl ScanState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl std::fmt::Display for ScanState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::ScanningOnce => "scanning",
            Self::PollingActive => "polling",
        };
        write!(f, "{}", label)
    }
}

/// Event published by the scan controller to its observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanEvent {
    /// The controller state machine moved to a new state
    StateChanged(ScanState),
    /// One scan tick completed; exactly one of these per tick
    Outcome(DetectionOutcome),
}
