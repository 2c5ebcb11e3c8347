//! Busy-wait strategies.
//!
//! Every blocking point in the crate goes through [`Wait::until`]. Firmware
//! uses [`Spin`], which never gives up: a peripheral that stops answering
//! stops the main loop until reset. [`Bounded`] gives up after a fixed number
//! of polls.

use core::convert::Infallible;

use crate::error::WaitTimeout;

pub trait Wait {
    type Error;

    /// Poll `condition` until it returns `true`.
    fn until<F>(&mut self, condition: F) -> Result<(), Self::Error>
    where
        F: FnMut() -> bool;
}

impl<W: Wait + ?Sized> Wait for &mut W {
    type Error = W::Error;

    fn until<F>(&mut self, condition: F) -> Result<(), Self::Error>
    where
        F: FnMut() -> bool,
    {
        (**self).until(condition)
    }
}

/// Unbounded spin.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spin;

impl Wait for Spin {
    type Error = Infallible;

    fn until<F>(&mut self, mut condition: F) -> Result<(), Infallible>
    where
        F: FnMut() -> bool,
    {
        while !condition() {
            core::hint::spin_loop();
        }
        Ok(())
    }
}

/// Spin for at most `polls` evaluations of the condition.
#[derive(Debug, Clone, Copy)]
pub struct Bounded {
    polls: u32,
}

impl Bounded {
    pub const fn new(polls: u32) -> Self {
        Bounded { polls }
    }
}

impl Wait for Bounded {
    type Error = WaitTimeout;

    fn until<F>(&mut self, mut condition: F) -> Result<(), WaitTimeout>
    where
        F: FnMut() -> bool,
    {
        for _ in 0..self.polls {
            if condition() {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(WaitTimeout(self.polls))
    }
}
