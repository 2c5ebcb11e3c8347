use crate::{signal::Signal, status::StatusBits, target::Peripheral};

/// How a session learns that the peripheral has finished with its input.
#[derive(Debug, Clone, Copy)]
pub enum Completion<'a> {
    /// Done once `BUSY` reads clear. No interrupt involved.
    Polled,
    /// Done once the peripheral's ready interrupt has fired and `BUSY` reads
    /// clear.
    Latched(&'a Signal),
}

impl<'a> Completion<'a> {
    /// Drop a latch left over from an earlier cycle. Must happen before the
    /// feeder is armed, or a stale latch would confirm the new cycle.
    pub fn discard_stale(&self) {
        if let Completion::Latched(signal) = self {
            signal.take();
        }
    }

    /// A latched completion is cleared by observing it, so `true` is reported
    /// at most once per interrupt.
    ///
    /// The ready interrupt also fires whenever the input drains partway
    /// through a feed. A latch taken while the peripheral is still busy is
    /// dropped; the next drain latches again.
    pub fn is_done<T: Peripheral + ?Sized>(&self, target: &T) -> bool {
        match self {
            Completion::Polled => !target.status().contains(StatusBits::BUSY),
            Completion::Latched(signal) => {
                signal.take() && !target.status().contains(StatusBits::BUSY)
            }
        }
    }
}
