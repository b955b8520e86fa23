//! Shared test harness: simulated duplex radio link, loss injection, and a
//! manually advanced clock, so protocol timing runs without real hardware or
//! wall-clock delays.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use radiolink::prelude::*;

/// Pre-shared key used by both ends of the test link.
pub const KEY: [u8; 16] = [0x42; 16];

type Queue = Arc<Mutex<VecDeque<Vec<u8>>>>;

/// One end of an in-memory duplex link. Frames transmitted on one end become
/// available on the other; no loss or reordering unless injected.
pub struct SimChannel {
    rx: Queue,
    tx: Queue,
}

/// Create a connected pair of channel ends.
pub fn duplex() -> (SimChannel, SimChannel) {
    let ab: Queue = Arc::new(Mutex::new(VecDeque::new()));
    let ba: Queue = Arc::new(Mutex::new(VecDeque::new()));
    (
        SimChannel {
            rx: ba.clone(),
            tx: ab.clone(),
        },
        SimChannel { rx: ab, tx: ba },
    )
}

impl Channel for SimChannel {
    fn is_frame_available(&mut self) -> bool {
        !self.rx.lock().unwrap().is_empty()
    }

    fn receive_frame(&mut self, buf: &mut [u8; MAX_FRAME_SIZE]) -> usize {
        let Some(frame) = self.rx.lock().unwrap().pop_front() else {
            return 0;
        };
        buf[..frame.len()].copy_from_slice(&frame);
        frame.len()
    }

    fn transmit_frame(&mut self, frame: &[u8]) {
        self.tx.lock().unwrap().push_back(frame.to_vec());
    }
}

/// Loss injector: swallows the first `n` transmissions, then passes through.
pub struct DropFirst<C> {
    inner: C,
    remaining: usize,
}

impl<C> DropFirst<C> {
    pub fn new(inner: C, n: usize) -> Self {
        Self {
            inner,
            remaining: n,
        }
    }
}

impl<C: Channel> Channel for DropFirst<C> {
    fn is_frame_available(&mut self) -> bool {
        self.inner.is_frame_available()
    }

    fn receive_frame(&mut self, buf: &mut [u8; MAX_FRAME_SIZE]) -> usize {
        self.inner.receive_frame(buf)
    }

    fn transmit_frame(&mut self, frame: &[u8]) {
        if self.remaining > 0 {
            self.remaining -= 1;
            return;
        }
        self.inner.transmit_frame(frame);
    }
}

/// Loss injector: passes the first `n` transmissions through, then swallows
/// every later one.
pub struct PassFirst<C> {
    inner: C,
    remaining: usize,
}

impl<C> PassFirst<C> {
    pub fn new(inner: C, n: usize) -> Self {
        Self {
            inner,
            remaining: n,
        }
    }
}

impl<C: Channel> Channel for PassFirst<C> {
    fn is_frame_available(&mut self) -> bool {
        self.inner.is_frame_available()
    }

    fn receive_frame(&mut self, buf: &mut [u8; MAX_FRAME_SIZE]) -> usize {
        self.inner.receive_frame(buf)
    }

    fn transmit_frame(&mut self, frame: &[u8]) {
        if self.remaining == 0 {
            return;
        }
        self.remaining -= 1;
        self.inner.transmit_frame(frame);
    }
}

/// Counts transmissions passing through to the inner channel.
pub struct CountTx<C> {
    inner: C,
    count: Arc<AtomicUsize>,
}

impl<C> CountTx<C> {
    pub fn new(inner: C) -> (Self, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                count: count.clone(),
            },
            count,
        )
    }
}

impl<C: Channel> Channel for CountTx<C> {
    fn is_frame_available(&mut self) -> bool {
        self.inner.is_frame_available()
    }

    fn receive_frame(&mut self, buf: &mut [u8; MAX_FRAME_SIZE]) -> usize {
        self.inner.receive_frame(buf)
    }

    fn transmit_frame(&mut self, frame: &[u8]) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.inner.transmit_frame(frame);
    }
}

/// Manually advanced clock, shareable between the two ends of a link.
#[derive(Clone, Default)]
pub struct SharedClock(Arc<Mutex<Duration>>);

impl SharedClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, delta: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += delta;
    }
}

impl Clock for SharedClock {
    fn now(&self) -> Duration {
        *self.0.lock().unwrap()
    }
}

/// A node over any channel with the crate's reference configuration, a
/// seeded rng, and the shared manual clock.
pub fn sim_node<C: Channel>(
    channel: C,
    clock: SharedClock,
    seed: u64,
) -> Node<C, Aes128Cbc, StdRng, SharedClock> {
    Node::new(
        channel,
        Aes128Cbc::new(KEY),
        StdRng::seed_from_u64(seed),
        clock,
    )
}

/// Sink collecting payloads handed to the delivery callback.
#[derive(Clone, Default)]
pub struct DeliverySink(Arc<Mutex<Vec<Vec<u8>>>>);

impl DeliverySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler to register with [`Node::on_message`].
    pub fn handler(&self) -> impl FnMut(&[u8]) + Send + 'static + use<> {
        let inner = self.0.clone();
        move |payload: &[u8]| inner.lock().unwrap().push(payload.to_vec())
    }

    pub fn take(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().unwrap().is_empty()
    }
}
