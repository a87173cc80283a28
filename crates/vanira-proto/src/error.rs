//! Error types for the protocol layer.

use thiserror::Error;

/// Reasons an inbound line could not be split into prefix, command and parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// The line was empty (or only whitespace).
    #[error("empty message")]
    EmptyMessage,

    /// A prefix was present but nothing followed it.
    #[error("message has a prefix but no command")]
    MissingCommand,

    /// The prefix marker was followed by nothing.
    #[error("empty prefix")]
    EmptyPrefix,
}

/// Reasons an outbound command could not be encoded onto the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// A parameter contained CR, LF or NUL and would have split the line.
    #[error("parameter contains a line break or NUL: {0:?}")]
    IllegalParameter(String),

    /// The encoded line would exceed the protocol maximum.
    #[error("encoded message too long: {actual} bytes (limit: {limit})")]
    MessageTooLong {
        /// Encoded length including CRLF.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },
}
