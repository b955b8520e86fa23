//! Sender-side send session: one in-flight exchange at a time.

use std::time::Duration;

use crate::core::MAX_PAYLOAD_SIZE;

/// Which reply the in-flight session is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Phase 1: RequestNonce sent, waiting for the matching Nonce.
    AwaitingNonce {
        /// Challenge carried by the outstanding request.
        challenge: u16,
    },
    /// Phase 2: Data sent, waiting for the matching Ack.
    AwaitingAck {
        /// Nonce issued by the responder in phase 1.
        issued: u16,
        /// Correlation token of the outstanding Data message.
        correlation: u16,
    },
}

/// State of the single outbound send.
///
/// Owned exclusively by the engine; the payload is staged here so retries
/// retransmit identical bytes without borrowing from the caller.
#[derive(Debug)]
pub(crate) struct SendSession {
    pub(crate) phase: Phase,
    payload: [u8; MAX_PAYLOAD_SIZE],
    payload_len: usize,
    pub(crate) retries_left: u8,
    pub(crate) next_retransmit_at: Duration,
}

impl SendSession {
    /// Stage a payload and enter phase 1. `payload` must already be bounds
    /// checked by the caller.
    pub(crate) fn new(
        payload: &[u8],
        challenge: u16,
        retries_left: u8,
        next_retransmit_at: Duration,
    ) -> Self {
        let mut staged = [0u8; MAX_PAYLOAD_SIZE];
        staged[..payload.len()].copy_from_slice(payload);
        Self {
            phase: Phase::AwaitingNonce { challenge },
            payload: staged,
            payload_len: payload.len(),
            retries_left,
            next_retransmit_at,
        }
    }

    pub(crate) fn payload(&self) -> &[u8] {
        &self.payload[..self.payload_len]
    }

    /// Advance to phase 2 with a full fresh retry budget.
    pub(crate) fn advance_to_data(
        &mut self,
        issued: u16,
        correlation: u16,
        retries_left: u8,
        next_retransmit_at: Duration,
    ) {
        self.phase = Phase::AwaitingAck {
            issued,
            correlation,
        };
        self.retries_left = retries_left;
        self.next_retransmit_at = next_retransmit_at;
    }
}
