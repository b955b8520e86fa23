//! Cipher adapter.
//!
//! The protocol encrypts whole frames with a keyed 16-byte block cipher in
//! chained mode. The block primitive is an external collaborator behind the
//! [`FrameCipher`] seam; [`Aes128Cbc`] is the provided implementation.

mod cbc;

pub use cbc::Aes128Cbc;

/// In-place frame encryption.
///
/// Callers guarantee buffer lengths are a multiple of the cipher block size;
/// the frame codec pads every frame accordingly before encryption.
pub trait FrameCipher {
    /// Encrypt `buf` in place.
    fn encrypt_in_place(&self, buf: &mut [u8]);

    /// Decrypt `buf` in place.
    fn decrypt_in_place(&self, buf: &mut [u8]);
}
