//! Frame encoding and decoding.
//!
//! Operates on plaintext buffers: encode runs before encryption, decode runs
//! after decryption. The checksum covers `[length] ++ payload`, stored
//! big-endian in the first two bytes.

use crate::core::{
    CIPHER_BLOCK_SIZE, FRAME_HEADER_SIZE, FrameError, MAX_FRAME_SIZE, MAX_MESSAGE_SIZE,
    SINGLE_BLOCK_MAX_MESSAGE,
};

use super::checksum;

/// Wire size for a message of `message_len` bytes: one cipher block when the
/// header and message fit it, two blocks otherwise.
pub fn wire_size(message_len: usize) -> usize {
    if message_len <= SINGLE_BLOCK_MAX_MESSAGE {
        CIPHER_BLOCK_SIZE
    } else {
        MAX_FRAME_SIZE
    }
}

/// Encode a message into a frame, returning the wire length (16 or 32).
///
/// The unused tail of `out` is zeroed; padding carries no meaning and is not
/// covered by the checksum.
pub fn encode(message: &[u8], out: &mut [u8; MAX_FRAME_SIZE]) -> Result<usize, FrameError> {
    if message.len() > MAX_MESSAGE_SIZE {
        return Err(FrameError::MessageTooLong {
            actual: message.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }

    let length = message.len() as u8;
    let check = checksum::compute(core::iter::once(length).chain(message.iter().copied()));

    out.fill(0);
    out[0..2].copy_from_slice(&check.to_be_bytes());
    out[2] = length;
    out[FRAME_HEADER_SIZE..FRAME_HEADER_SIZE + message.len()].copy_from_slice(message);

    Ok(wire_size(message.len()))
}

/// Decode a decrypted frame, returning the message bytes.
///
/// Rejects frames whose length is not a cipher block multiple, whose declared
/// length exceeds the budget or the frame bounds, or whose checksum does not
/// verify. The engine drops rejected frames silently.
pub fn decode(frame: &[u8]) -> Result<&[u8], FrameError> {
    if frame.is_empty() || frame.len() % CIPHER_BLOCK_SIZE != 0 {
        return Err(FrameError::Unaligned(frame.len()));
    }

    let declared = frame[2] as usize;
    let capacity = frame.len() - FRAME_HEADER_SIZE;
    if declared > MAX_MESSAGE_SIZE || declared > capacity {
        return Err(FrameError::LengthOutOfBounds { declared, capacity });
    }

    let message = &frame[FRAME_HEADER_SIZE..FRAME_HEADER_SIZE + declared];
    let computed = checksum::compute(core::iter::once(frame[2]).chain(message.iter().copied()));
    let received = u16::from_be_bytes([frame[0], frame[1]]);
    if computed != received {
        return Err(FrameError::ChecksumMismatch { computed, received });
    }

    Ok(message)
}
