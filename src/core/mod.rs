//! Core types shared by every layer: protocol constants, error types, and
//! the seams to the external collaborators (radio channel, time source).

mod constants;
mod error;
mod traits;

pub use constants::*;
pub use error::{FrameError, SendError};
pub use traits::{Channel, Clock, MonotonicClock};
