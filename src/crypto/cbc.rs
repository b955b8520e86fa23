//! AES-128 in chained (CBC) mode over whole frames.
//!
//! The initialization vector is the protocol's fixed all-zero block, reused
//! across all messages. Identical plaintexts therefore encrypt identically;
//! the wire format mitigates this by embedding a nonce in every message, so
//! no two legitimate messages share a plaintext. This is a structural
//! contract of the format inherited from the deployed fleet — a reviewable
//! security parameter, not an oversight to silently fix. There is no MAC:
//! the checksum inside the plaintext is a corruption detector only, and
//! authentication rests on possession of the key.

use aes::Aes128;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use zeroize::Zeroize;

use crate::core::CIPHER_BLOCK_SIZE;

use super::FrameCipher;

/// AES-128 frame cipher with the protocol's fixed zero IV.
///
/// The key is provisioned out-of-band, static for the device's lifetime, and
/// zeroized on drop.
pub struct Aes128Cbc {
    cipher: Aes128,
    key: [u8; CIPHER_BLOCK_SIZE],
}

impl Aes128Cbc {
    /// Create a frame cipher from a 16-byte pre-shared key.
    pub fn new(key: [u8; CIPHER_BLOCK_SIZE]) -> Self {
        let cipher = Aes128::new(GenericArray::from_slice(&key));
        Self { cipher, key }
    }
}

impl Drop for Aes128Cbc {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl FrameCipher for Aes128Cbc {
    fn encrypt_in_place(&self, buf: &mut [u8]) {
        debug_assert_eq!(buf.len() % CIPHER_BLOCK_SIZE, 0);

        let mut previous = [0u8; CIPHER_BLOCK_SIZE]; // zero IV
        for chunk in buf.chunks_exact_mut(CIPHER_BLOCK_SIZE) {
            for (byte, prev) in chunk.iter_mut().zip(previous.iter()) {
                *byte ^= prev;
            }
            self.cipher.encrypt_block(GenericArray::from_mut_slice(chunk));
            previous.copy_from_slice(chunk);
        }
    }

    fn decrypt_in_place(&self, buf: &mut [u8]) {
        debug_assert_eq!(buf.len() % CIPHER_BLOCK_SIZE, 0);

        let mut previous = [0u8; CIPHER_BLOCK_SIZE]; // zero IV
        let mut ciphertext = [0u8; CIPHER_BLOCK_SIZE];
        for chunk in buf.chunks_exact_mut(CIPHER_BLOCK_SIZE) {
            ciphertext.copy_from_slice(chunk);
            self.cipher.decrypt_block(GenericArray::from_mut_slice(chunk));
            for (byte, prev) in chunk.iter_mut().zip(previous.iter()) {
                *byte ^= prev;
            }
            previous = ciphertext;
        }
    }
}
