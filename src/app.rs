//! The main loop: state machine dispatch, then sample forwarding.

use embedded_hal::digital::v2::InputPin;

use crate::{
    capture::{Capture, SampleRegister},
    error::DispatchError,
    feed::Feed,
    machine::{Controller, State},
    sink::Sink,
    target::Peripheral,
};

pub struct App<'a, T, F, P, R, S> {
    controller: Controller<T, F, P>,
    capture: Capture<'a, R, S>,
}

impl<'a, T, F, P, R, S> App<'a, T, F, P, R, S>
where
    T: Peripheral,
    F: Feed<T>,
    P: InputPin,
    R: SampleRegister,
    S: Sink,
{
    pub fn new(controller: Controller<T, F, P>, capture: Capture<'a, R, S>) -> Self {
        App {
            controller,
            capture,
        }
    }

    /// One main-loop iteration. The capture channel is serviced even when
    /// dispatch fails.
    pub fn tick(&mut self) -> Result<State, DispatchError<F::Error, P::Error>> {
        let state = self.controller.dispatch();
        self.capture.poll();
        state
    }

    /// Loop forever. Dispatch errors are logged and the loop carries on.
    pub fn run(mut self) -> !
    where
        F::Error: core::fmt::Debug,
        P::Error: core::fmt::Debug,
    {
        loop {
            if let Err(e) = self.tick() {
                log::warn!("dispatch failed: {:?}", e);
            }
        }
    }

    pub fn controller(&mut self) -> &mut Controller<T, F, P> {
        &mut self.controller
    }

    pub fn capture(&mut self) -> &mut Capture<'a, R, S> {
        &mut self.capture
    }
}
