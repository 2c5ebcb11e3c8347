//! Status register decoding.
//!
//! Datapath peripherals expose an 8-bit status register whose bit positions
//! are a property of the particular design, so the raw value is translated
//! into a fixed set of named bits through a [`StatusLayout`].

use bitflags::bitflags;

bitflags! {
    /// Named status bits, independent of where a peripheral puts them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusBits: u8 {
        /// The input register (or FIFO) can take another value.
        const READY_TO_ACCEPT = 1 << 0;
        /// The peripheral is still working on values it has been given.
        const BUSY = 1 << 1;
        /// Raw level of the button wired into the status register.
        const BUTTON_LEVEL = 1 << 2;
    }
}

/// Raw-register masks for each named bit. A `0` mask means the peripheral
/// does not report that bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLayout {
    pub ready: u8,
    pub busy: u8,
    pub button: u8,
}

impl StatusLayout {
    /// Accumulator datapath: `REQ` on bit 0, `BUSY` on bit 1.
    pub const ACCUMULATOR: StatusLayout = StatusLayout::new(0x01, 0x02, 0x00);

    /// Serial transmitter datapath: `DREQ` on bit 0, switch `SW1` on bit 1.
    pub const UART_TX: StatusLayout = StatusLayout::new(0x01, 0x00, 0x02);

    pub const fn new(ready: u8, busy: u8, button: u8) -> Self {
        StatusLayout {
            ready,
            busy,
            button,
        }
    }

    pub fn decode(&self, raw: u8) -> StatusBits {
        let mut bits = StatusBits::empty();
        bits.set(StatusBits::READY_TO_ACCEPT, raw & self.ready != 0);
        bits.set(StatusBits::BUSY, raw & self.busy != 0);
        bits.set(StatusBits::BUTTON_LEVEL, raw & self.button != 0);
        bits
    }
}
