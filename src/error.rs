use thiserror::Error;

/// Errors from setting up or arming the burst engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DmaError {
    #[error("no transfer descriptor left to allocate")]
    NoDescriptor,
    #[error("cannot describe a transfer of an empty buffer")]
    EmptyBuffer,
    #[error("transfer of {0} bytes does not fit in one descriptor")]
    TooLong(usize),
    #[error("channel is still moving the previous buffer")]
    Busy,
    #[error("no buffer has been configured")]
    NotConfigured,
}

/// A bounded wait gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("condition not met after {0} polls")]
pub struct WaitTimeout(pub u32);

/// Failure of a transfer session: either the feeder or the wait reported
/// an error. With the burst engine and [`Spin`](crate::wait::Spin) the only
/// possible failure is a misconfigured engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError<F, W> {
    #[error("feeding the peripheral failed: {0}")]
    Feed(F),
    #[error("waiting for the peripheral failed: {0}")]
    Wait(W),
}

/// Failure of one dispatcher iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError<F, P> {
    #[error("feeder failed: {0}")]
    Feed(F),
    #[error("reading the button failed: {0:?}")]
    Button(P),
}
