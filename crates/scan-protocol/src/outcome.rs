//! Detection outcome types

use serde::{Deserialize, Serialize};

/// Result of analyzing one frame for a recognizable device display.
///
/// Produced once per scan tick and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionOutcome {
    /// A device display was located and its status text decoded
    Found {
        /// Decoded status summary, e.g. "Level: 3, HP: 27"
        summary: String,
    },
    /// No display was found, or the analyzer failed
    NotFound {
        /// Analyzer- or pipeline-supplied failure reason
        reason: String,
    },
}

impl DetectionOutcome {
    pub fn found(summary: impl Into<String>) -> Self {
        Self::Found {
            summary: summary.into(),
        }
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound {
            reason: reason.into(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Decoded summary, if the scan succeeded
    pub fn summary(&self) -> Option<&str> {
        match self {
            Self::Found { summary } => Some(summary),
            Self::NotFound { .. } => None,
        }
    }

    /// Failure reason, if the scan came up empty
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Found { .. } => None,
            Self::NotFound { reason } => Some(reason),
        }
    }
}

impl std::fmt::Display for DetectionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Found { summary } => write!(f, "{}", summary),
            Self::NotFound { reason } => write!(f, "not found: {}", reason),
        }
    }
}
