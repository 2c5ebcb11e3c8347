//! One clear / feed / wait / read cycle against an accumulating peripheral.

use crate::{
    completion::Completion, error::SessionError, feed::Feed, target::Accumulate, traits::Word,
    wait::Wait,
};

/// Runs transfer sessions against one target. Holding the target by value
/// (or by `&mut`) keeps sessions on it strictly one at a time.
pub struct Session<'a, T, Wt> {
    target: T,
    completion: Completion<'a>,
    wait: Wt,
}

impl<'a, T, Wt> Session<'a, T, Wt>
where
    T: Accumulate,
    Wt: Wait,
{
    pub fn new(target: T, completion: Completion<'a>, wait: Wt) -> Self {
        Session {
            target,
            completion,
            wait,
        }
    }

    /// Clear the accumulator, feed it with `feeder`, wait for the peripheral
    /// to finish and return the accumulated value.
    ///
    /// The result register is read exactly once, after completion.
    pub fn run<F>(&mut self, feeder: &mut F) -> Result<T::Word, SessionError<F::Error, Wt::Error>>
    where
        F: Feed<T>,
    {
        self.target.clear();
        self.completion.discard_stale();

        feeder.start(&mut self.target).map_err(SessionError::Feed)?;

        let target = &mut self.target;
        let mut failed = None;
        self.wait
            .until(|| match feeder.poll(target) {
                Ok(done) => done,
                Err(e) => {
                    failed = Some(e);
                    true
                }
            })
            .map_err(SessionError::Wait)?;
        if let Some(e) = failed {
            return Err(SessionError::Feed(e));
        }

        let completion = &self.completion;
        let target = &self.target;
        self.wait
            .until(|| completion.is_done(target))
            .map_err(SessionError::Wait)?;

        let result = self.target.read();
        log::debug!("session result: {}", result.into_u32());
        Ok(result)
    }

    pub fn target(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn free(self) -> T {
        self.target
    }
}
