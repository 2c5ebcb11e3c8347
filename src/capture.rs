//! Interrupt-driven sampling of a probe register, echoed to a sink.

use crate::{signal::Signal, sink::Sink};

/// Register read when the sample interrupt fires.
pub trait SampleRegister {
    fn read(&mut self) -> u8;
}

impl<F: FnMut() -> u8> SampleRegister for F {
    fn read(&mut self) -> u8 {
        self()
    }
}

/// Forwards one sample per interrupt. Runs on every main-loop iteration and
/// never waits, so it cannot hold up the state machine or be held up by it.
pub struct Capture<'a, R, S> {
    signal: &'a Signal,
    register: R,
    sink: S,
}

impl<'a, R, S> Capture<'a, R, S>
where
    R: SampleRegister,
    S: Sink,
{
    /// `signal` is the one whose [`IrqHandle`](crate::signal::IrqHandle) is
    /// given to the sample interrupt.
    pub fn new(signal: &'a Signal, register: R, mut sink: S) -> Self {
        sink.start();
        Capture {
            signal,
            register,
            sink,
        }
    }

    /// Forward a pending sample, if any. Returns whether one was forwarded.
    pub fn poll(&mut self) -> bool {
        if !self.signal.take() {
            return false;
        }
        let sample = self.register.read();
        log::trace!("sample {:#04x}", sample);
        self.sink.put_byte(sample);
        true
    }

    pub fn sink(&mut self) -> &mut S {
        &mut self.sink
    }
}
