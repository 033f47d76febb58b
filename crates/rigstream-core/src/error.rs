//! Error types for rigstream

use thiserror::Error;

/// Why a datagram could not be turned into a [`PoseFrame`](crate::PoseFrame).
///
/// Decode errors are always recovered locally: the datagram is dropped and
/// ingestion continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Empty payload")]
    Empty,

    #[error("Payload is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("Malformed payload: {0}")]
    Malformed(String),

    #[error("Non-finite value in {field}")]
    NonFinite { field: String },
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum RigError {
    // Ingestion errors
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Encode error: {0}")]
    EncodeError(String),

    // Transport errors
    #[error("Socket error: {0}")]
    SocketError(String),

    #[error("Payload too large: {size} > {max}")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Receiver task panicked")]
    ReceiverPanicked,

    // Setup errors
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Result type for rigstream operations
pub type RigResult<T> = Result<T, RigError>;
