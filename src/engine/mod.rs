//! Protocol engine: the nonce handshake, the retry/ack state machine, and
//! the replay-defense table.
//!
//! One logical send is a two-phase exchange, each phase retried on a fixed
//! interval:
//!
//! ```text
//! sender                                responder
//!   | -- RequestNonce{challenge} ---------> |  store/reuse awaiter entry
//!   | <------------- Nonce{challenge, N1} --|
//!   | -- Data{N1, N2, payload} -----------> |  deliver if N1 is live
//!   | <----------------------- Ack{N2} -----|
//! ```
//!
//! Acceptance of a Data message is bounded to senders that completed a
//! recent, observed handshake: an attacker without the key cannot produce a
//! frame that decrypts and checksums correctly at all, and a replayed
//! legitimate frame is rejected once its handshake entry ages out.

mod awaiter;
mod node;
mod session;

pub use node::{Node, NodeConfig, SendStatus};
