//! Handshake poller: CPU-driven feeding gated by `READY_TO_ACCEPT`.

use crate::{
    config::Pacing, feed::Feed, status::StatusBits, target::Peripheral, traits::DmaReadBuffer,
    wait::Wait,
};

/// Write every element of `buffer` to `target`, in order, waiting for the
/// handshake bit before each write.
///
/// Returns after the last write; the peripheral may still be busy.
pub fn feed<T, Wt>(target: &mut T, buffer: &[T::Word], wait: &mut Wt) -> Result<(), Wt::Error>
where
    T: Peripheral + ?Sized,
    Wt: Wait,
{
    for &value in buffer {
        wait.until(|| target.status().contains(StatusBits::READY_TO_ACCEPT))?;
        target.write_input(value);
    }
    Ok(())
}

/// The poller as a [`Feed`], keeping its position in the buffer between
/// dispatcher iterations.
pub struct PollFeed<B, Wt> {
    buffer: B,
    index: usize,
    pacing: Pacing,
    wait: Wt,
}

impl<B, Wt> PollFeed<B, Wt>
where
    B: DmaReadBuffer,
    Wt: Wait,
{
    pub fn new(buffer: B, pacing: Pacing, wait: Wt) -> Self {
        let index = buffer.as_words().len();
        PollFeed {
            buffer,
            index,
            pacing,
            wait,
        }
    }

    /// Index of the next element to write.
    pub fn index(&self) -> usize {
        self.index
    }

    fn exhausted(&self) -> bool {
        self.index >= self.buffer.as_words().len()
    }

    pub fn free(self) -> B {
        self.buffer
    }
}

impl<T, B, Wt> Feed<T> for PollFeed<B, Wt>
where
    T: Peripheral,
    B: DmaReadBuffer<Word = T::Word>,
    Wt: Wait,
{
    type Error = Wt::Error;

    fn start(&mut self, target: &mut T) -> Result<(), Wt::Error> {
        self.index = 0;
        if self.pacing == Pacing::Inline {
            let words = self.buffer.as_words();
            feed(target, words, &mut self.wait)?;
            self.index = words.len();
        }
        Ok(())
    }

    fn poll(&mut self, target: &mut T) -> Result<bool, Wt::Error> {
        if !self.exhausted() && target.status().contains(StatusBits::READY_TO_ACCEPT) {
            target.write_input(self.buffer.as_words()[self.index]);
            self.index += 1;
        }
        Ok(self.exhausted())
    }
}
