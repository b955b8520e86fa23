//! Seams to the external collaborators.
//!
//! The protocol engine never touches hardware directly: the radio is reached
//! through [`Channel`] and time through [`Clock`], so the retry and timeout
//! machinery runs unmodified against simulated links and manual clocks.

use std::time::{Duration, Instant};

use super::constants::MAX_FRAME_SIZE;

/// A half-duplex frame channel (the radio transceiver adapter).
///
/// Implementations own the hardware bring-up (channel and address
/// configuration) and MUST observe the half-duplex discipline internally:
/// stop listening, transmit, resume listening. The engine depends on that
/// discipline but does not implement it.
///
/// Frames may arrive reordered, duplicated, or not at all; the protocol
/// relies only on content-based correlation, never on arrival order.
pub trait Channel {
    /// Whether a received frame is waiting to be read.
    fn is_frame_available(&mut self) -> bool;

    /// Read one received frame into `buf`, returning its length in bytes.
    ///
    /// Returns 0 when no frame is available.
    fn receive_frame(&mut self, buf: &mut [u8; MAX_FRAME_SIZE]) -> usize;

    /// Transmit one frame. Delivery is best-effort; there is no error path,
    /// loss is handled by the retry layer above.
    fn transmit_frame(&mut self, frame: &[u8]);
}

/// A monotonic time source.
///
/// Reports elapsed time since an arbitrary per-node epoch. Timestamps are
/// never exchanged between peers, so the epochs need not agree.
pub trait Clock {
    /// Current monotonic time.
    fn now(&self) -> Duration;
}

/// Wall implementation of [`Clock`] over [`Instant`].
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    /// Create a clock starting at zero now.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}
