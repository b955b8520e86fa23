//! The protocol node: sender and responder roles over one channel.

use std::time::Duration;

use rand::RngCore;

use crate::core::{
    AWAITER_TTL, CIPHER_BLOCK_SIZE, Channel, Clock, MAX_FRAME_SIZE, MAX_MESSAGE_SIZE,
    MAX_PAYLOAD_SIZE, SEND_INTERVAL, SEND_RETRIES, SendError,
};
use crate::crypto::FrameCipher;
use crate::wire::{self, Message};

use super::awaiter::{AwaiterTable, DataVerdict};
use super::session::{Phase, SendSession};

/// Tunable protocol timing. The defaults are the deployed reference values;
/// tests shrink them to run against manual or accelerated clocks.
#[derive(Debug, Clone, Copy)]
pub struct NodeConfig {
    /// Interval between retransmissions within a phase.
    pub send_interval: Duration,
    /// Transmission attempts per phase; values below 1 are clamped to 1.
    pub retries: u8,
    /// Lifetime of a replay-defense table entry.
    pub awaiter_ttl: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            send_interval: SEND_INTERVAL,
            retries: SEND_RETRIES,
            awaiter_ttl: AWAITER_TTL,
        }
    }
}

/// Observed state of the outbound send, from [`Node::poll_send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendStatus {
    /// No send in flight and no unclaimed outcome.
    Idle,
    /// A send is in flight.
    InFlight,
    /// The send finished; the outcome is claimed by this poll.
    Done(Result<(), SendError>),
}

/// A protocol node: one end of the point-to-point link.
///
/// Symmetric in protocol logic — a gateway and a sensor node run the same
/// type. Owns the replay-defense table and the single in-flight send
/// session; construction is explicit and there are no hidden statics, so
/// multiple nodes coexist in one test harness.
///
/// Single-threaded and cooperative: all work happens inside [`Node::update`]
/// (or the blocking [`Node::send`], which loops over it). Inbound frames are
/// serviced even while a send is outstanding, because the channel is only
/// half-duplex during the instant of transmission.
pub struct Node<C, F, R, K>
where
    C: Channel,
    F: FrameCipher,
    R: RngCore,
    K: Clock,
{
    channel: C,
    cipher: F,
    rng: R,
    clock: K,
    config: NodeConfig,
    awaiters: AwaiterTable,
    session: Option<SendSession>,
    outcome: Option<Result<(), SendError>>,
    handler: Option<Box<dyn FnMut(&[u8]) + Send>>,
}

impl<C, F, R, K> Node<C, F, R, K>
where
    C: Channel,
    F: FrameCipher,
    R: RngCore,
    K: Clock,
{
    /// Create a node with the reference timing configuration.
    pub fn new(channel: C, cipher: F, rng: R, clock: K) -> Self {
        Self::with_config(channel, cipher, rng, clock, NodeConfig::default())
    }

    /// Create a node with custom timing. `retries` is clamped to at least 1,
    /// so every send transmits at least once per phase.
    pub fn with_config(channel: C, cipher: F, rng: R, clock: K, mut config: NodeConfig) -> Self {
        config.retries = config.retries.max(1);
        Self {
            channel,
            cipher,
            rng,
            clock,
            awaiters: AwaiterTable::new(config.awaiter_ttl),
            config,
            session: None,
            outcome: None,
            handler: None,
        }
    }

    /// Register the delivery callback, invoked synchronously from within
    /// frame processing with each decrypted, verified payload. Must not
    /// block.
    pub fn on_message<H>(&mut self, handler: H)
    where
        H: FnMut(&[u8]) + Send + 'static,
    {
        self.handler = Some(Box::new(handler));
    }

    /// Send a payload, blocking until it is acknowledged or the retry budget
    /// runs out. Internally a cooperative busy-poll over [`Node::update`]:
    /// inbound traffic keeps being serviced while the send is outstanding.
    ///
    /// Worst case duration is `2 x retries x send_interval` (both phases
    /// exhausting their budgets).
    pub fn send(&mut self, payload: &[u8]) -> Result<(), SendError> {
        self.start_send(payload)?;
        loop {
            self.update();
            if let SendStatus::Done(outcome) = self.poll_send() {
                return outcome;
            }
            std::hint::spin_loop();
        }
    }

    /// Begin a send without blocking: transmit the first `RequestNonce` and
    /// arm the retry state. Drive it with [`Node::update`] and observe it
    /// with [`Node::poll_send`].
    ///
    /// Fails fast — transmitting nothing — when the payload exceeds
    /// [`MAX_PAYLOAD_SIZE`] or a send is already in flight.
    pub fn start_send(&mut self, payload: &[u8]) -> Result<(), SendError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(SendError::PayloadTooLarge {
                actual: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }
        if self.session.is_some() {
            return Err(SendError::Busy);
        }

        self.outcome = None;
        let challenge = self.fresh_nonce();
        let deadline = self.clock.now() + self.config.send_interval;
        self.session = Some(SendSession::new(
            payload,
            challenge,
            self.config.retries.saturating_sub(1),
            deadline,
        ));
        self.transmit_current();
        Ok(())
    }

    /// Pump the node: drain and dispatch inbound frames, then retransmit or
    /// fail the in-flight send if its deadline has passed.
    ///
    /// Call this from the application main loop whenever no blocking
    /// [`Node::send`] is running.
    pub fn update(&mut self) {
        self.pump_channel();
        self.check_retransmit();
    }

    /// Observe the outbound send. A `Done` result claims the outcome;
    /// subsequent polls return `Idle`.
    pub fn poll_send(&mut self) -> SendStatus {
        if let Some(outcome) = self.outcome.take() {
            return SendStatus::Done(outcome);
        }
        if self.session.is_some() {
            SendStatus::InFlight
        } else {
            SendStatus::Idle
        }
    }

    /// Number of live replay-defense entries (test observability).
    pub fn live_handshakes(&self) -> usize {
        self.awaiters.live_count(self.clock.now())
    }

    // --- inbound path -------------------------------------------------------

    fn pump_channel(&mut self) {
        while self.channel.is_frame_available() {
            let mut buf = [0u8; MAX_FRAME_SIZE];
            let len = self.channel.receive_frame(&mut buf);
            if len == 0 || len > MAX_FRAME_SIZE || len % CIPHER_BLOCK_SIZE != 0 {
                continue;
            }

            self.cipher.decrypt_in_place(&mut buf[..len]);
            // Corruption and forgeries are expected channel noise: any
            // rejection is a silent drop.
            let Ok(bytes) = wire::decode(&buf[..len]) else {
                continue;
            };
            let Ok(message) = Message::decode(bytes) else {
                continue;
            };
            self.dispatch(message);
        }
    }

    fn dispatch(&mut self, message: Message<'_>) {
        let now = self.clock.now();
        match message {
            Message::RequestNonce { challenge } => self.answer_nonce_request(challenge, now),
            Message::Data {
                issued,
                correlation,
                body,
            } => self.accept_data(issued, correlation, body, now),
            Message::Nonce { challenge, issued } => self.on_nonce(challenge, issued, now),
            Message::Ack { correlation } => self.on_ack(correlation),
        }
    }

    // --- responder role -----------------------------------------------------

    fn answer_nonce_request(&mut self, challenge: u16, now: Duration) {
        // Reuse the live entry for a retried request: the sender must never
        // be told two different valid nonces for one logical request.
        let issued = match self.awaiters.issued_for_challenge(challenge, now) {
            Some(issued) => issued,
            None => {
                let issued = self.fresh_nonce();
                if !self.awaiters.insert(challenge, issued, now) {
                    // Table full: drop the request, heals once a slot ages out.
                    return;
                }
                issued
            }
        };

        self.transmit(&Message::Nonce { challenge, issued });
    }

    fn accept_data(&mut self, issued: u16, correlation: u16, body: &[u8], now: Duration) {
        match self.awaiters.register_data(issued, correlation, now) {
            // No live handshake issued this nonce: expired, never happened,
            // or forged. Drop without a reply; the sender sees ordinary loss.
            DataVerdict::Reject => return,
            DataVerdict::Deliver => {
                if let Some(handler) = self.handler.as_mut() {
                    handler(body);
                }
            }
            // Retransmitted Data whose ack was lost: ack again without
            // handing the payload to the application a second time.
            DataVerdict::Duplicate => {}
        }
        self.transmit(&Message::Ack { correlation });
    }

    // --- sender role --------------------------------------------------------

    fn on_nonce(&mut self, challenge: u16, issued: u16, now: Duration) {
        let correlation = {
            let Some(session) = self.session.as_ref() else {
                return;
            };
            let Phase::AwaitingNonce { challenge: sent } = session.phase else {
                return;
            };
            if challenge != sent {
                return;
            }
            self.fresh_nonce()
        };

        // Advance immediately; the remaining phase 1 retry budget is not
        // waited out.
        let retries_left = self.config.retries.saturating_sub(1);
        let deadline = now + self.config.send_interval;
        if let Some(session) = self.session.as_mut() {
            session.advance_to_data(issued, correlation, retries_left, deadline);
        }
        self.transmit_current();
    }

    fn on_ack(&mut self, correlation: u16) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Phase::AwaitingAck {
            correlation: sent, ..
        } = session.phase
        else {
            return;
        };
        if correlation != sent {
            return;
        }

        self.session = None;
        self.outcome = Some(Ok(()));
    }

    fn check_retransmit(&mut self) {
        let now = self.clock.now();
        let failure = {
            let Some(session) = self.session.as_mut() else {
                return;
            };
            if now < session.next_retransmit_at {
                return;
            }

            if session.retries_left == 0 {
                Some(match session.phase {
                    Phase::AwaitingNonce { .. } => SendError::HandshakeTimeout {
                        attempts: self.config.retries,
                    },
                    Phase::AwaitingAck { .. } => SendError::DeliveryTimeout {
                        attempts: self.config.retries,
                    },
                })
            } else {
                session.retries_left -= 1;
                session.next_retransmit_at = now + self.config.send_interval;
                None
            }
        };

        match failure {
            Some(error) => {
                self.session = None;
                self.outcome = Some(Err(error));
            }
            None => self.transmit_current(),
        }
    }

    /// Retransmit the frame for the in-flight session's current phase.
    fn transmit_current(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let phase = session.phase;
        let mut staged = [0u8; MAX_PAYLOAD_SIZE];
        let payload_len = session.payload().len();
        staged[..payload_len].copy_from_slice(session.payload());

        match phase {
            Phase::AwaitingNonce { challenge } => {
                self.transmit(&Message::RequestNonce { challenge });
            }
            Phase::AwaitingAck {
                issued,
                correlation,
            } => {
                self.transmit(&Message::Data {
                    issued,
                    correlation,
                    body: &staged[..payload_len],
                });
            }
        }
    }

    // --- outbound path ------------------------------------------------------

    fn transmit(&mut self, message: &Message<'_>) {
        let mut plaintext = [0u8; MAX_MESSAGE_SIZE];
        let message_len = message.encode(&mut plaintext);

        let mut frame = [0u8; MAX_FRAME_SIZE];
        // Message sizes are bounded by construction; encode cannot reject.
        let Ok(wire_len) = wire::encode(&plaintext[..message_len], &mut frame) else {
            return;
        };

        self.cipher.encrypt_in_place(&mut frame[..wire_len]);
        self.channel.transmit_frame(&frame[..wire_len]);
    }

    fn fresh_nonce(&mut self) -> u16 {
        self.rng.next_u32() as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Aes128Cbc;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::VecDeque;

    /// Loopback test channel: transmissions land in `sent`, the test feeds
    /// `inbound` by hand.
    #[derive(Default)]
    struct TestChannel {
        sent: Vec<Vec<u8>>,
        inbound: VecDeque<Vec<u8>>,
    }

    impl Channel for TestChannel {
        fn is_frame_available(&mut self) -> bool {
            !self.inbound.is_empty()
        }

        fn receive_frame(&mut self, buf: &mut [u8; MAX_FRAME_SIZE]) -> usize {
            let Some(frame) = self.inbound.pop_front() else {
                return 0;
            };
            buf[..frame.len()].copy_from_slice(&frame);
            frame.len()
        }

        fn transmit_frame(&mut self, frame: &[u8]) {
            self.sent.push(frame.to_vec());
        }
    }

    struct TestClock(std::rc::Rc<std::cell::Cell<Duration>>);

    impl Clock for TestClock {
        fn now(&self) -> Duration {
            self.0.get()
        }
    }

    fn test_node() -> (
        Node<TestChannel, Aes128Cbc, StdRng, TestClock>,
        std::rc::Rc<std::cell::Cell<Duration>>,
    ) {
        let time = std::rc::Rc::new(std::cell::Cell::new(Duration::ZERO));
        let node = Node::new(
            TestChannel::default(),
            Aes128Cbc::new([0x42; 16]),
            StdRng::seed_from_u64(7),
            TestClock(time.clone()),
        );
        (node, time)
    }

    #[test]
    fn test_oversized_payload_fails_fast_without_transmitting() {
        let (mut node, _) = test_node();
        assert_eq!(
            node.start_send(&[0u8; 25]),
            Err(SendError::PayloadTooLarge {
                actual: 25,
                max: MAX_PAYLOAD_SIZE
            })
        );
        assert!(node.channel.sent.is_empty());
        assert_eq!(node.poll_send(), SendStatus::Idle);
    }

    #[test]
    fn test_second_send_is_rejected_while_in_flight() {
        let (mut node, _) = test_node();
        node.start_send(&[1, 2]).unwrap();
        assert_eq!(node.start_send(&[3, 4]), Err(SendError::Busy));
        assert_eq!(node.poll_send(), SendStatus::InFlight);
    }

    #[test]
    fn test_start_send_transmits_immediately() {
        let (mut node, _) = test_node();
        node.start_send(&[1, 2]).unwrap();
        assert_eq!(node.channel.sent.len(), 1);
        // Single-block frame: RequestNonce is 3 bytes
        assert_eq!(node.channel.sent[0].len(), 16);
    }

    #[test]
    fn test_handshake_times_out_after_exact_attempts() {
        let (mut node, time) = test_node();
        node.start_send(&[1, 2]).unwrap();

        for step in 0..SEND_RETRIES as u64 + 5 {
            time.set(Duration::from_millis(step * 50 + 50));
            node.update();
        }

        assert_eq!(
            node.poll_send(),
            SendStatus::Done(Err(SendError::HandshakeTimeout {
                attempts: SEND_RETRIES
            }))
        );
        assert_eq!(node.channel.sent.len(), SEND_RETRIES as usize);
    }

    #[test]
    fn test_zero_retries_is_clamped_to_one_attempt() {
        let time = std::rc::Rc::new(std::cell::Cell::new(Duration::ZERO));
        let mut node = Node::with_config(
            TestChannel::default(),
            Aes128Cbc::new([0x42; 16]),
            StdRng::seed_from_u64(7),
            TestClock(time.clone()),
            NodeConfig {
                retries: 0,
                ..NodeConfig::default()
            },
        );

        node.start_send(&[1]).unwrap();
        assert_eq!(node.channel.sent.len(), 1);

        time.set(Duration::from_millis(50));
        node.update();
        assert_eq!(
            node.poll_send(),
            SendStatus::Done(Err(SendError::HandshakeTimeout { attempts: 1 }))
        );
        assert_eq!(node.channel.sent.len(), 1);
    }

    #[test]
    fn test_retransmits_wait_for_the_interval() {
        let (mut node, time) = test_node();
        node.start_send(&[1, 2]).unwrap();

        time.set(Duration::from_millis(49));
        node.update();
        assert_eq!(node.channel.sent.len(), 1);

        time.set(Duration::from_millis(50));
        node.update();
        assert_eq!(node.channel.sent.len(), 2);
    }
}
