//! Error types for the analysis pipeline.

use cad_decode::DecodeError;
use thiserror::Error;

/// Result type for analysis operations.
pub type AnalyzeResult<T> = Result<T, AnalyzeError>;

/// Errors that abort an analysis.
///
/// Only decoding-level conditions are fatal; estimator misses degrade
/// confidence instead of failing the request.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The file could not be decoded into geometry.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl AnalyzeError {
    /// True when the failure was an unrecognized file extension.
    #[must_use]
    pub const fn is_unsupported_format(&self) -> bool {
        matches!(self, Self::Decode(DecodeError::UnsupportedFormat { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_errors_pass_through() {
        let err = AnalyzeError::from(DecodeError::EmptyGeometry);
        assert!(err.to_string().contains("empty"));
        assert!(!err.is_unsupported_format());

        let err = AnalyzeError::from(DecodeError::UnsupportedFormat {
            filename: "a.stl".to_string(),
        });
        assert!(err.is_unsupported_format());
    }
}
