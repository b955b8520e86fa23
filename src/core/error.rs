//! Error types for the radiolink protocol.

use thiserror::Error;

/// Reasons a received frame or message is rejected by the codec.
///
/// Channel noise is expected and not exceptional: the engine absorbs every
/// variant as a silent frame drop. The typed error exists so codec behavior
/// can be asserted in isolation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Frame length is not a multiple of the cipher block size.
    #[error("frame length {0} is not a multiple of the cipher block size")]
    Unaligned(usize),

    /// Message does not fit the frame budget.
    #[error("message too long: {actual} bytes (max {max})")]
    MessageTooLong {
        /// Actual message size.
        actual: usize,
        /// Maximum message size a frame can carry.
        max: usize,
    },

    /// Declared payload length exceeds the decrypted frame bounds.
    #[error("declared length {declared} exceeds frame capacity {capacity}")]
    LengthOutOfBounds {
        /// Length field from the frame header.
        declared: usize,
        /// Message bytes actually present after the header.
        capacity: usize,
    },

    /// Recomputed checksum does not match the transmitted one.
    #[error("checksum mismatch: computed 0x{computed:04x}, frame carries 0x{received:04x}")]
    ChecksumMismatch {
        /// Checksum recomputed over the received bytes.
        computed: u16,
        /// Checksum carried by the frame.
        received: u16,
    },

    /// Unknown message type byte.
    #[error("unknown message type: 0x{0:02x}")]
    UnknownType(u8),

    /// Message body shorter than its type requires.
    #[error("truncated message: expected at least {expected} bytes, got {actual}")]
    Truncated {
        /// Minimum size for the message type.
        expected: usize,
        /// Bytes actually present.
        actual: usize,
    },
}

/// Failures surfaced to the application by [`Node::send`](crate::Node::send)
/// and [`Node::start_send`](crate::Node::start_send).
///
/// This is the protocol's entire user-visible error surface: corruption,
/// replays, and forgeries are dropped silently and look like ordinary packet
/// loss to the sender.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// Payload exceeds the per-message budget; nothing was transmitted.
    #[error("payload too large: {actual} bytes (max {max})")]
    PayloadTooLarge {
        /// Requested payload size.
        actual: usize,
        /// Maximum payload a Data message can carry.
        max: usize,
    },

    /// A send is already in flight; only one outbound send exists at a time.
    #[error("another send is already in flight")]
    Busy,

    /// The nonce request phase exhausted its retry budget without a reply.
    #[error("nonce handshake timed out after {attempts} attempts")]
    HandshakeTimeout {
        /// Transmission attempts made.
        attempts: u8,
    },

    /// The data transfer phase exhausted its retry budget without an ack.
    #[error("data delivery timed out after {attempts} attempts")]
    DeliveryTimeout {
        /// Transmission attempts made.
        attempts: u8,
    },
}
