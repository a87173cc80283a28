//! Error hierarchy for the bot.
//!
//! Every connection-level failure is transient: it is logged and the outer
//! retry loop starts over. Only [`StartupError`] and configuration errors end
//! the process.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;
use vanira_proto::EncodeError;

// ============================================================================
// Outbound writes
// ============================================================================

/// Failure to put one command on the wire.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("refusing to send malformed command: {0}")]
    Encode(#[from] EncodeError),

    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

// ============================================================================
// Connection establishment
// ============================================================================

/// Why a connection attempt produced no usable connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("failed to resolve {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("{host}:{port} resolved to no addresses")]
    NoAddresses { host: String, port: u16 },

    #[error("failed to resolve bind address {addr}: {source}")]
    BindResolve {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("could not connect to any of {attempts} address(es), last error: {last}")]
    Exhausted { attempts: usize, last: io::Error },

    #[error("registration failed: {0}")]
    Register(#[from] SendError),
}

// ============================================================================
// Startup
// ============================================================================

/// Fatal problems detected before the first connection attempt.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("expected at most one argument (a resume descriptor), got {0}")]
    TooManyArguments(usize),

    #[error("invalid resume descriptor {0:?}: expected a positive integer")]
    BadResumeToken(String),

    #[error("cannot resume inherited connection: {0}")]
    Resume(#[source] io::Error),
}
