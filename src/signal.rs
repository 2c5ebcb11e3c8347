//! Latched flags shared between an interrupt handler and the main loop.
//!
//! Only an [`IrqHandle`] can set a [`Signal`], and setting it is all the handle
//! can do, so an interrupt handler holding one has no way to do anything
//! else to the state owned by the main loop.

use core::sync::atomic::{AtomicBool, Ordering};

/// A single-word flag, set from interrupt context and taken (read and
/// cleared in one step) by its consumer.
#[derive(Debug)]
pub struct Signal {
    flag: AtomicBool,
}

impl Signal {
    pub const fn new() -> Self {
        Signal {
            flag: AtomicBool::new(false),
        }
    }

    /// Capability to set this signal, for registration as an interrupt
    /// handler.
    pub const fn irq_handle(&self) -> IrqHandle<'_> {
        IrqHandle { signal: self }
    }

    pub(crate) fn set(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns whether the signal was set, clearing it.
    pub fn take(&self) -> bool {
        self.flag.swap(false, Ordering::AcqRel)
    }

    /// Observe without clearing.
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

impl Default for Signal {
    fn default() -> Self {
        Signal::new()
    }
}

/// Interrupt-side half of a [`Signal`].
#[derive(Debug, Clone, Copy)]
pub struct IrqHandle<'a> {
    signal: &'a Signal,
}

impl IrqHandle<'_> {
    #[inline(always)]
    pub fn fire(&self) {
        self.signal.set();
    }
}
