//! Error types for CAD file decoding.

use thiserror::Error;

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors that can occur while decoding a CAD file.
///
/// All of these are fatal for the request; recoverable conditions inside the
/// estimators are modeled as skipped estimates, not errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The filename extension is not in the allowed set.
    #[error("unsupported file format: {filename}")]
    UnsupportedFormat {
        /// The offending filename.
        filename: String,
    },

    /// The input exceeds the size bound.
    #[error("file too large: {bytes} bytes (limit {limit})")]
    FileTooLarge {
        /// Actual input size.
        bytes: usize,
        /// Enforced limit.
        limit: usize,
    },

    /// The underlying parser or tessellator reported failure.
    #[error("decode failure: {0}")]
    DecodeFailure(String),

    /// Parsing succeeded but produced no vertices.
    #[error("decoded geometry is empty")]
    EmptyGeometry,
}

impl DecodeError {
    /// Create a [`DecodeError::DecodeFailure`] with the given message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::DecodeFailure(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let err = DecodeError::UnsupportedFormat {
            filename: "part.xyz".to_string(),
        };
        assert!(err.to_string().contains("part.xyz"));

        let err = DecodeError::failure("tessellation failed");
        assert!(err.to_string().contains("tessellation failed"));
    }
}
