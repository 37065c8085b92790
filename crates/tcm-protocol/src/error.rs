//! Protocol error types.

use thiserror::Error;

use crate::registry::Namespace;

/// Errors that can occur when encoding or decoding TCM frames.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// Received CRC does not match the one computed over the frame.
    #[error("checksum mismatch: computed 0x{expected:04X}, received 0x{actual:04X}")]
    ChecksumMismatch {
        /// CRC computed over the received bytes.
        expected: u16,
        /// CRC carried by the frame.
        actual: u16,
    },

    /// A frame arrived with a different identifier than the one required.
    #[error("unexpected frame id {actual} (expected {expected})")]
    UnexpectedFrame {
        /// Frame id the caller was waiting for.
        expected: u8,
        /// Frame id that arrived.
        actual: u8,
    },

    /// Frame id not produced by the module.
    #[error("unknown frame id: {0}")]
    UnknownFrame(u8),

    /// A get-config response echoed a different id than the request.
    #[error("response carries id {actual}, requested {expected}")]
    UnexpectedResponseId {
        /// Requested id.
        expected: u8,
        /// Id found in the response.
        actual: u8,
    },

    /// Id not present in the component or configuration registry.
    #[error("unknown {namespace} identifier: {id}")]
    UnknownIdentifier {
        /// Registry that was searched.
        namespace: Namespace,
        /// The identifier.
        id: u8,
    },

    /// A fixed header field in a response does not hold its constant value.
    #[error("{field} mismatch: expected {expected}, got {actual}")]
    ProtocolMismatch {
        /// Name of the field.
        field: &'static str,
        /// Constant value the protocol requires.
        expected: u8,
        /// Value received.
        actual: u8,
    },

    /// The module reported a non-zero status after a save.
    #[error("save failed with error code {code}")]
    SaveFailed {
        /// Status code returned by the module.
        code: u16,
    },

    /// Caller supplied an argument the protocol cannot express.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Frame or payload is shorter than its layout requires.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Minimum length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Frame length field exceeds what the decoder accepts.
    #[error("frame too long: maximum {max} bytes, got {actual}")]
    FrameTooLong {
        /// Maximum allowed length.
        max: usize,
        /// Length announced by the frame.
        actual: usize,
    },

    /// Operation is not valid in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl ProtocolError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ProtocolError::InvalidArgument(message.into())
    }

    /// Error for a payload that ended before `expected` bytes.
    pub fn too_short(expected: usize, actual: usize) -> Self {
        ProtocolError::FrameTooShort { expected, actual }
    }
}
