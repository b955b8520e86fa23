//! Rolling shift-xor checksum.
//!
//! Not a table-driven CRC: the accumulator starts at `0x1021` and, for each
//! input byte, rotates left by one bit and XORs the byte in. Both peers must
//! run the identical bit-for-bit procedure. This is an integrity check
//! against channel noise, **not** a cryptographic authenticator; treat it
//! strictly as a corruption detector.

use crate::core::CHECKSUM_INIT;

/// Feed one byte into the accumulator.
#[inline]
pub fn update(checksum: u16, byte: u8) -> u16 {
    // Shift left, carrying the top bit into bit 0, then mix the byte in.
    checksum.rotate_left(1) ^ u16::from(byte)
}

/// Checksum a byte sequence from the standard initialization value.
pub fn compute<I>(bytes: I) -> u16
where
    I: IntoIterator<Item = u8>,
{
    bytes.into_iter().fold(CHECKSUM_INIT, update)
}
