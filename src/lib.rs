//! # radiolink
//!
//! A secure, reliable point-to-point messaging protocol for battery-powered
//! wireless sensor nodes talking over a short-range, unreliable, unordered
//! radio link. Two peers (a gateway and a sensor node, symmetric in protocol
//! logic) exchange small encrypted datagrams; the protocol layers delivery
//! guarantees and replay protection on top of a transport that offers none:
//!
//! - **Framing**: checksummed, length-prefixed frames padded to the cipher
//!   block multiple (16 or 32 bytes on the wire)
//! - **Confidentiality**: AES-128 in chained mode with a pre-shared key
//! - **Reliability**: a two-phase nonce handshake with per-phase retries,
//!   turning the lossy channel into an at-least-once delivery service
//! - **Replay defense**: a bounded, time-aged table of observed handshakes
//!
//! The engine is single-threaded and cooperative: no async runtime, no
//! background threads, no blocking I/O primitives. The embedding application
//! either calls the blocking [`Node::send`] or drives [`Node::update`] from
//! its main loop. The radio driver, the sleep controller, and the block
//! cipher primitive are external collaborators reached through the
//! [`Channel`], [`Clock`], and [`FrameCipher`] seams, so the whole retry and
//! timeout machinery runs against simulated links and manual clocks in tests.
//!
//! ## Example
//!
//! ```no_run
//! use radiolink::prelude::*;
//! use rand::rngs::OsRng;
//! # struct MyRadio;
//! # impl Channel for MyRadio {
//! #     fn is_frame_available(&mut self) -> bool { false }
//! #     fn receive_frame(&mut self, _buf: &mut [u8; MAX_FRAME_SIZE]) -> usize { 0 }
//! #     fn transmit_frame(&mut self, _frame: &[u8]) {}
//! # }
//!
//! let key = [0x2Bu8; 16]; // provisioned out-of-band
//! let radio = MyRadio; // hardware channel adapter
//! let mut node = Node::new(radio, Aes128Cbc::new(key), OsRng, MonotonicClock::new());
//! node.on_message(|payload| {
//!     // decrypted, verified payload from the peer
//!     let _ = payload;
//! });
//!
//! // Blocking send: retries until acknowledged or the retry budget runs out.
//! node.send(&[0xAA, 0xBB]).unwrap();
//!
//! // Main loop: service inbound traffic while no send is outstanding.
//! loop {
//!     node.update();
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

// Core types, constants, and the hardware seams (always included)
pub mod core;

// Wire format: checksum, frame codec, message codec
pub mod wire;

// Cipher adapter (AES-128, chained mode)
pub mod crypto;

// Protocol engine: handshake, retries, replay defense
pub mod engine;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::*;
    pub use crate::crypto::{Aes128Cbc, FrameCipher};
    pub use crate::engine::{Node, NodeConfig, SendStatus};
    pub use crate::wire::Message;
}

// Re-export commonly used items at crate root
pub use crate::core::{Channel, Clock, FrameError, MonotonicClock, SendError};
pub use crate::crypto::{Aes128Cbc, FrameCipher};
pub use crate::engine::{Node, NodeConfig, SendStatus};
pub use crate::wire::Message;
