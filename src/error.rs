//! Error types and result aliases for blackpipe.
//!
//! This module defines the error handling infrastructure:
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used throughout the crate
//! - [`BlackpipeError`]: Typed failures callers may need to tell apart via
//!   `anyhow::Error::downcast_ref`

use anyhow::Result as AnyhowResult;

pub type Result<T> = AnyhowResult<T>;

/// Failures that are not ordinary formatter outcomes.
///
/// A formatter that ran and refused the input (syntax error and the like) is not
/// an error at all; see [`crate::apply::Applied::Rejected`].
#[derive(thiserror::Error, Debug)]
pub enum BlackpipeError {
    /// The formatter executable is missing or cannot be launched. Not retryable.
    #[error(
        "could not run `{command}`: {reason}. You may need to install the formatter and/or configure its command path (`command` in blackpipe.toml or --black-command)."
    )]
    ToolUnavailable { command: String, reason: String },

    /// The resolved encoding label is not one we can convert.
    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),

    /// The buffer holds characters the resolved encoding cannot represent.
    #[error("buffer contains characters that cannot be encoded as {encoding}")]
    Encode { encoding: String },

    /// Formatter output was not valid in the resolved encoding.
    #[error("formatter output is not valid {encoding}")]
    Decode { encoding: String },
}

impl BlackpipeError {
    #[must_use]
    pub fn is_tool_unavailable(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<Self>(),
            Some(Self::ToolUnavailable { .. })
        )
    }
}
