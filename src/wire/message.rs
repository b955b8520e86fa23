//! Message codec: the logical payload inside a frame.
//!
//! Discriminated by a leading type byte; u16 fields are big-endian:
//!
//! ```text
//! RequestNonce  0x01 | challenge (BE16)
//! Nonce         0x02 | challenge (BE16) | issued (BE16)
//! Data          0x03 | issued (BE16) | correlation (BE16) | body (<= 24 bytes)
//! Ack           0x04 | correlation (BE16)
//! ```

use crate::core::{FrameError, MAX_MESSAGE_SIZE, MAX_PAYLOAD_SIZE};

const TYPE_REQUEST_NONCE: u8 = 0x01;
const TYPE_NONCE: u8 = 0x02;
const TYPE_DATA: u8 = 0x03;
const TYPE_ACK: u8 = 0x04;

/// A protocol message. `Data` borrows its body from the decode buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message<'a> {
    /// Phase 1 request: ask the peer to issue a nonce for this challenge.
    RequestNonce {
        /// Fresh random value correlating the reply with this request.
        challenge: u16,
    },
    /// Phase 1 reply: the issued nonce, echoing the challenge.
    Nonce {
        /// Challenge copied from the request.
        challenge: u16,
        /// Nonce the responder will accept a Data message under.
        issued: u16,
    },
    /// Phase 2 request: the application payload.
    Data {
        /// Nonce issued by the responder in phase 1.
        issued: u16,
        /// Fresh random value correlating the ack with this message.
        correlation: u16,
        /// Application payload (at most [`MAX_PAYLOAD_SIZE`] bytes).
        body: &'a [u8],
    },
    /// Phase 2 reply: acknowledges a delivered Data message.
    Ack {
        /// Correlation copied from the Data message.
        correlation: u16,
    },
}

impl<'a> Message<'a> {
    /// Encode into `out`, returning the encoded length.
    ///
    /// Callers uphold the `Data` body bound; the engine never constructs an
    /// oversized body.
    pub fn encode(&self, out: &mut [u8; MAX_MESSAGE_SIZE]) -> usize {
        match *self {
            Message::RequestNonce { challenge } => {
                out[0] = TYPE_REQUEST_NONCE;
                out[1..3].copy_from_slice(&challenge.to_be_bytes());
                3
            }
            Message::Nonce { challenge, issued } => {
                out[0] = TYPE_NONCE;
                out[1..3].copy_from_slice(&challenge.to_be_bytes());
                out[3..5].copy_from_slice(&issued.to_be_bytes());
                5
            }
            Message::Data {
                issued,
                correlation,
                body,
            } => {
                out[0] = TYPE_DATA;
                out[1..3].copy_from_slice(&issued.to_be_bytes());
                out[3..5].copy_from_slice(&correlation.to_be_bytes());
                out[5..5 + body.len()].copy_from_slice(body);
                5 + body.len()
            }
            Message::Ack { correlation } => {
                out[0] = TYPE_ACK;
                out[1..3].copy_from_slice(&correlation.to_be_bytes());
                3
            }
        }
    }

    /// Decode a message from its wire bytes.
    pub fn decode(bytes: &'a [u8]) -> Result<Self, FrameError> {
        let (&kind, rest) = bytes
            .split_first()
            .ok_or(FrameError::Truncated {
                expected: 1,
                actual: 0,
            })?;

        let field = |offset: usize| -> Result<u16, FrameError> {
            let end = offset + 2;
            if rest.len() < end {
                return Err(FrameError::Truncated {
                    expected: end + 1,
                    actual: bytes.len(),
                });
            }
            Ok(u16::from_be_bytes([rest[offset], rest[offset + 1]]))
        };

        match kind {
            TYPE_REQUEST_NONCE => Ok(Message::RequestNonce {
                challenge: field(0)?,
            }),
            TYPE_NONCE => Ok(Message::Nonce {
                challenge: field(0)?,
                issued: field(2)?,
            }),
            TYPE_DATA => {
                let issued = field(0)?;
                let correlation = field(2)?;
                let body = &rest[4..];
                if body.len() > MAX_PAYLOAD_SIZE {
                    return Err(FrameError::MessageTooLong {
                        actual: bytes.len(),
                        max: MAX_MESSAGE_SIZE,
                    });
                }
                Ok(Message::Data {
                    issued,
                    correlation,
                    body,
                })
            }
            TYPE_ACK => Ok(Message::Ack {
                correlation: field(0)?,
            }),
            other => Err(FrameError::UnknownType(other)),
        }
    }
}
