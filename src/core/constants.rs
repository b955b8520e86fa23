//! Protocol constants.
//!
//! These values are fixed by the wire format and MUST match on both peers.

use std::time::Duration;

// =============================================================================
// WIRE FORMAT
// =============================================================================

/// Block size of the cipher primitive; every wire frame is a multiple of it.
pub const CIPHER_BLOCK_SIZE: usize = 16;

/// Maximum frame size on the wire (two cipher blocks).
pub const MAX_FRAME_SIZE: usize = 32;

/// Frame header size (checksum + length).
pub const FRAME_HEADER_SIZE: usize = 3;

/// Maximum message size inside a frame (`MAX_FRAME_SIZE - FRAME_HEADER_SIZE`).
pub const MAX_MESSAGE_SIZE: usize = 29;

/// Longest message that still fits a single-block (16 byte) frame.
pub const SINGLE_BLOCK_MAX_MESSAGE: usize = 13;

/// Maximum application payload carried by a Data message
/// (message budget minus the type byte and two u16 nonces).
pub const MAX_PAYLOAD_SIZE: usize = 24;

/// Checksum accumulator initialization value.
pub const CHECKSUM_INIT: u16 = 0x1021;

// =============================================================================
// RETRY / TIMING
// =============================================================================

/// Interval between retransmissions of an unanswered frame.
pub const SEND_INTERVAL: Duration = Duration::from_millis(50);

/// Transmission attempts per phase (nonce request, data transfer) before a
/// send fails. The per-phase timeout is `SEND_RETRIES x SEND_INTERVAL`.
pub const SEND_RETRIES: u8 = 20;

// =============================================================================
// REPLAY DEFENSE
// =============================================================================

/// Slots in the responder's handshake table.
pub const AWAITER_SLOTS: usize = 5;

/// Lifetime of a handshake table entry. Must exceed the sender's worst-case
/// data phase (`SEND_RETRIES x SEND_INTERVAL`) or legitimate retries of a
/// slow exchange would be rejected as replays.
pub const AWAITER_TTL: Duration = Duration::from_secs(2);
