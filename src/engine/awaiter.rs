//! Replay-defense table: time-bounded records of in-progress handshakes.
//!
//! Entries are never explicitly deleted; they age out after the TTL and
//! their slots become implicitly free. Reusing a live entry for a repeated
//! challenge is what makes the responder's reply idempotent under sender
//! retries; recording the delivered correlation per entry is what keeps a
//! retransmitted Data from reaching the application twice.

use std::time::Duration;

use crate::core::AWAITER_SLOTS;

#[derive(Debug, Clone, Copy)]
struct Awaiter {
    challenge: u16,
    issued: u16,
    created_at: Duration,
    /// Correlation of the Data message already delivered under this entry.
    delivered: Option<u16>,
}

/// Verdict on an inbound Data message against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DataVerdict {
    /// First Data under this handshake: deliver and ack.
    Deliver,
    /// Same correlation seen before (the ack was lost): ack again,
    /// do not re-deliver.
    Duplicate,
    /// No live handshake issued this nonce: drop silently.
    Reject,
}

/// Fixed-size table of observed handshakes.
#[derive(Debug)]
pub(crate) struct AwaiterTable {
    slots: [Option<Awaiter>; AWAITER_SLOTS],
    ttl: Duration,
}

impl AwaiterTable {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            slots: [None; AWAITER_SLOTS],
            ttl,
        }
    }

    fn is_live(&self, entry: &Awaiter, now: Duration) -> bool {
        now.saturating_sub(entry.created_at) < self.ttl
    }

    /// Issued nonce of the live entry matching `challenge`, if any.
    pub(crate) fn issued_for_challenge(&self, challenge: u16, now: Duration) -> Option<u16> {
        self.slots
            .iter()
            .flatten()
            .find(|entry| entry.challenge == challenge && self.is_live(entry, now))
            .map(|entry| entry.issued)
    }

    /// Judge an inbound Data message: gate on a live issued nonce and
    /// suppress duplicates by their correlation.
    pub(crate) fn register_data(
        &mut self,
        issued: u16,
        correlation: u16,
        now: Duration,
    ) -> DataVerdict {
        let ttl = self.ttl;
        let Some(entry) = self
            .slots
            .iter_mut()
            .flatten()
            .find(|entry| entry.issued == issued && now.saturating_sub(entry.created_at) < ttl)
        else {
            return DataVerdict::Reject;
        };

        if entry.delivered == Some(correlation) {
            return DataVerdict::Duplicate;
        }
        entry.delivered = Some(correlation);
        DataVerdict::Deliver
    }

    /// Store a new entry in a free or expired slot.
    ///
    /// Returns `false` when every slot holds a live entry (table-full
    /// backpressure; self-healing once any entry ages out).
    pub(crate) fn insert(&mut self, challenge: u16, issued: u16, now: Duration) -> bool {
        let ttl = self.ttl;
        let Some(slot) = self.slots.iter_mut().find(|slot| {
            !slot
                .as_ref()
                .is_some_and(|entry| now.saturating_sub(entry.created_at) < ttl)
        }) else {
            return false;
        };

        *slot = Some(Awaiter {
            challenge,
            issued,
            created_at: now,
            delivered: None,
        });
        true
    }

    /// Number of live entries (exposed for tests via the node).
    pub(crate) fn live_count(&self, now: Duration) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|entry| self.is_live(entry, now))
            .count()
    }
}
