//! Wire format: the rolling checksum, the block-padded frame codec, and the
//! message codec layered inside it.
//!
//! A frame is the ciphertext unit exchanged over the radio:
//!
//! ```text
//! +-----------------+--------+------------------+------------------+
//! | Checksum        | Length | Payload          | Padding          |
//! | 2 bytes (BE16)  | 1 byte | `length` bytes   | zeroed on encode |
//! +-----------------+--------+------------------+------------------+
//! ```
//!
//! The wire size is always rounded up to the cipher block multiple: 16 bytes
//! when `length <= 13`, else 32. Padding bytes are not covered by the
//! checksum and carry no meaning.

pub mod checksum;
mod frame;
mod message;

pub use frame::{decode, encode, wire_size};
pub use message::Message;
