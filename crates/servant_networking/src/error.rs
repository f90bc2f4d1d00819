//! # Network Error Types
//!
//! Errors raised while decoding interaction packets or handing hits to the
//! simulation thread. The interceptor logs them; none reaches the host.

use thiserror::Error;

/// Errors that can occur in the interception layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Payload too short for the field being read.
    #[error("malformed packet: need {expected} bytes, got {actual}")]
    MalformedPacket {
        /// Bytes required.
        expected: usize,
        /// Bytes available.
        actual: usize,
    },

    /// Frame starts with a packet type this layer doesn't know.
    #[error("unknown packet type {0}")]
    UnknownPacketType(u8),

    /// The combat queue is at capacity; the hit was dropped.
    #[error("combat queue full")]
    QueueFull,

    /// The simulation side of the combat queue is gone.
    #[error("combat queue disconnected")]
    QueueDisconnected,
}

/// Result type for interception operations.
pub type NetworkResult<T> = Result<T, NetworkError>;
