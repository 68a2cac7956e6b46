//! Error taxonomy for the orchestrator.
//!
//! Agent-level failures never surface here: the client and dispatcher
//! recover them into failed `AgentResponse`s. This module covers the
//! pre-dispatch failures that short-circuit an analysis before any agent
//! is invoked, plus the stable error code strings used on the wire.

use std::path::PathBuf;
use thiserror::Error;

/// Stable error codes carried in `AgentError.code` and surfaced to callers.
pub mod codes {
    pub const FILE_NOT_FOUND: &str = "FILE_NOT_FOUND";
    pub const UNSUPPORTED_MEDIA_TYPE: &str = "UNSUPPORTED_MEDIA_TYPE";
    pub const FILE_TOO_LARGE: &str = "FILE_TOO_LARGE";
    pub const AGENT_UNREACHABLE: &str = "AGENT_UNREACHABLE";
    pub const AGENT_TIMEOUT: &str = "AGENT_TIMEOUT";
    pub const AGENT_BAD_RESPONSE: &str = "AGENT_BAD_RESPONSE";
    /// All contributing agents failed; confidence is 0.0. A reported
    /// state, not a crash.
    pub const AGGREGATION_INDETERMINATE: &str = "AGGREGATION_INDETERMINATE";
}

/// A request failed validation before dispatch.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("media file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("media file too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },
}

impl AnalysisError {
    /// The wire code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::FileNotFound(_) => codes::FILE_NOT_FOUND,
            AnalysisError::UnsupportedMediaType(_) => codes::UNSUPPORTED_MEDIA_TYPE,
            AnalysisError::FileTooLarge { .. } => codes::FILE_TOO_LARGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AnalysisError::FileNotFound(PathBuf::from("/missing.mp4"));
        assert_eq!(err.code(), codes::FILE_NOT_FOUND);

        let err = AnalysisError::UnsupportedMediaType("txt".to_string());
        assert_eq!(err.code(), codes::UNSUPPORTED_MEDIA_TYPE);

        let err = AnalysisError::FileTooLarge {
            size: 10,
            limit: 5,
        };
        assert_eq!(err.code(), codes::FILE_TOO_LARGE);
        assert!(err.to_string().contains("10 bytes"));
    }
}
