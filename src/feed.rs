use crate::target::Peripheral;

/// Something that moves a buffer into a peripheral's input register.
///
/// `start` begins one pass over the buffer; `poll` reports whether the pass
/// is over. Neither says anything about the peripheral having processed
/// the values, that is what [`Completion`](crate::completion::Completion)
/// is for.
pub trait Feed<T: Peripheral> {
    type Error;

    fn start(&mut self, target: &mut T) -> Result<(), Self::Error>;

    /// Returns `true` once every element has been handed to `target`.
    fn poll(&mut self, target: &mut T) -> Result<bool, Self::Error>;
}
