//! Deployment parameters that differ between boards.

pub use crate::status::StatusLayout;

/// Number of transfer descriptors the DMA controller provides.
pub const DESCRIPTOR_COUNT: usize = 128;

/// Largest byte count a single descriptor can describe (12-bit field).
pub const MAX_TRANSFER_BYTES: usize = 4095;

/// Every burst is started by exactly one peripheral request.
pub const REQUESTS_PER_BURST: u8 = 1;

/// Electrical level that means "pressed" for the button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Pressing pulls the line low (pull-up with switch to ground).
    ActiveLow,
    /// Pressing drives the line high.
    ActiveHigh,
}

impl Polarity {
    pub fn is_pressed(self, level_high: bool) -> bool {
        match self {
            Polarity::ActiveLow => !level_high,
            Polarity::ActiveHigh => level_high,
        }
    }
}

/// How the poller feeds a buffer when it is driven by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    /// The whole buffer is written when the feeder is started, blocking on
    /// the handshake bit before each element.
    #[default]
    Inline,
    /// At most one element per dispatcher iteration, and only if the
    /// handshake bit is already set. Never blocks.
    Incremental,
}
