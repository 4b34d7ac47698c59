//! Analyzer error types

use thiserror::Error;

/// Failure reported by the external pixel analyzer
#[derive(Debug, Clone, Error)]
pub enum AnalyzerError {
    /// No recognizable device display in the frame
    #[error("no device display detected")]
    DisplayNotFound,

    /// Analyzer-defined failure, message passed through verbatim
    #[error("{0}")]
    Analysis(String),
}

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;
