//! Error types for modelmux.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! Failure modes in the selection engine degrade rather than abort: a
//! provider whose CLI is missing or whose output cannot be parsed simply
//! contributes zero candidates, and "no usable provider" is an outcome,
//! not an error. The variants here cover the cases that do have to reach
//! the caller: configuration problems, host switch failures, and I/O.

use thiserror::Error;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Unexpected failure
    GeneralError = 1,
    /// Provider CLI not installed
    BinaryNotFound = 2,
    /// Parse/format errors, invalid provider, invalid configuration
    ParseError = 3,
    /// Timeout
    Timeout = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// Main error type for modelmux operations.
#[derive(Error, Debug)]
pub enum MuxError {
    /// Provider CLI tool not found in PATH.
    #[error("CLI tool not found: {name}")]
    CliNotFound { name: String },

    /// Provider fetch failed (non-zero exit, empty output, spawn failure).
    #[error("fetch failed for {provider}: {reason}")]
    FetchFailed { provider: String, reason: String },

    /// Provider fetch timed out.
    #[error("request timeout after {seconds}s for {provider}")]
    Timeout { provider: String, seconds: u64 },

    /// Failed to parse provider output.
    #[error("failed to parse response: {0}")]
    ParseResponse(String),

    /// Invalid provider name.
    #[error("invalid provider: {0}")]
    InvalidProvider(String),

    /// Error parsing the configuration file.
    #[error("config parse error at {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// Invalid value in configuration.
    #[error("invalid config value for '{key}': {message}")]
    ConfigInvalid { key: String, message: String },

    /// Generic configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The host model-switch call failed. Surfaced verbatim, never retried.
    #[error("model switch failed: {reason}")]
    HostSwitchFailed { reason: String },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MuxError {
    /// Map error to exit code.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::CliNotFound { .. } => ExitCode::BinaryNotFound,

            Self::ParseResponse(_)
            | Self::InvalidProvider(_)
            | Self::ConfigParse { .. }
            | Self::ConfigInvalid { .. }
            | Self::Config(_) => ExitCode::ParseError,

            Self::Timeout { .. } => ExitCode::Timeout,

            Self::FetchFailed { .. }
            | Self::HostSwitchFailed { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => ExitCode::GeneralError,
        }
    }

    /// Returns the provider name if this error is provider-specific.
    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::FetchFailed { provider, .. } | Self::Timeout { provider, .. } => Some(provider),
            Self::CliNotFound { name } => Some(name),
            Self::InvalidProvider(p) => Some(p),
            _ => None,
        }
    }
}

/// Result type alias for modelmux operations.
pub type Result<T> = std::result::Result<T, MuxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_correct() {
        assert_eq!(
            MuxError::CliNotFound {
                name: "claude".to_string()
            }
            .exit_code(),
            ExitCode::BinaryNotFound
        );
        assert_eq!(
            MuxError::Config("bad".to_string()).exit_code(),
            ExitCode::ParseError
        );
        assert_eq!(
            MuxError::InvalidProvider("nope".to_string()).exit_code(),
            ExitCode::ParseError
        );
        assert_eq!(
            MuxError::Timeout {
                provider: "codex".to_string(),
                seconds: 10,
            }
            .exit_code(),
            ExitCode::Timeout
        );
        assert_eq!(
            MuxError::HostSwitchFailed {
                reason: "exit code 1".to_string()
            }
            .exit_code(),
            ExitCode::GeneralError
        );
    }

    #[test]
    fn provider_extraction() {
        let err = MuxError::FetchFailed {
            provider: "gemini".to_string(),
            reason: "empty output".to_string(),
        };
        assert_eq!(err.provider(), Some("gemini"));

        let err = MuxError::Config("x".to_string());
        assert_eq!(err.provider(), None);
    }
}
