//! Driver error types.

use std::io;

use tcm_protocol::ProtocolError;
use thiserror::Error;

/// Errors returned by [`Tcm`](crate::Tcm) operations.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The module sent something the protocol layer rejected.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The channel ran out of bytes in the middle of a frame.
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Bytes requested.
        expected: usize,
        /// Bytes received before the channel closed.
        actual: usize,
    },

    /// No bytes arrived within the channel's read timeout.
    #[error("timed out waiting for the module")]
    Timeout,

    /// Underlying channel failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid driver configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DriverError {
    /// Protocol error carried by this error, if any.
    pub fn protocol(&self) -> Option<&ProtocolError> {
        match self {
            DriverError::Protocol(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
