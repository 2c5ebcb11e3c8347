//! Button-driven session sequencing: IDLE -> SENDING -> WAITING -> IDLE.
//!
//! The transition table is the pure function [`transition`]; [`Controller`]
//! gathers its inputs from hardware, applies it once per dispatch and carries
//! out the resulting [`Action`].

use embedded_hal::digital::v2::InputPin;

use crate::{config::Polarity, error::DispatchError, feed::Feed, target::Peripheral};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum State {
    Idle = 0,
    Sending = 1,
    Waiting = 2,
}

impl State {
    /// Decode a stored state word. Anything unrecognised is `None`.
    pub fn from_raw(raw: u32) -> Option<State> {
        match raw {
            0 => Some(State::Idle),
            1 => Some(State::Sending),
            2 => Some(State::Waiting),
            _ => None,
        }
    }
}

/// Inputs sampled for one dispatch. Only the ones the current state looks
/// at are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Inputs {
    pub pressed: bool,
    pub feeder_done: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    /// Start the feeder.
    Arm,
}

pub fn transition(state: Option<State>, inputs: Inputs) -> (State, Action) {
    match state {
        Some(State::Idle) if inputs.pressed => (State::Sending, Action::Arm),
        Some(State::Idle) => (State::Idle, Action::None),
        Some(State::Sending) if inputs.feeder_done => (State::Waiting, Action::None),
        Some(State::Sending) => (State::Sending, Action::None),
        Some(State::Waiting) if !inputs.pressed => (State::Idle, Action::None),
        Some(State::Waiting) => (State::Waiting, Action::None),
        None => (State::Idle, Action::None),
    }
}

/// A button on a digital input with a configured polarity. No debouncing.
pub struct Button<P> {
    pin: P,
    polarity: Polarity,
}

impl<P: InputPin> Button<P> {
    pub fn new(pin: P, polarity: Polarity) -> Self {
        Button { pin, polarity }
    }

    pub fn is_pressed(&self) -> Result<bool, P::Error> {
        Ok(self.polarity.is_pressed(self.pin.is_high()?))
    }
}

pub struct Controller<T, F, P> {
    /// Raw state word, decoded on every dispatch.
    state: u32,
    target: T,
    feeder: F,
    button: Button<P>,
}

impl<T, F, P> Controller<T, F, P>
where
    T: Peripheral,
    F: Feed<T>,
    P: InputPin,
{
    pub fn new(target: T, feeder: F, button: Button<P>) -> Self {
        Controller {
            state: State::Idle as u32,
            target,
            feeder,
            button,
        }
    }

    /// Run one iteration of the state machine.
    pub fn dispatch(&mut self) -> Result<State, DispatchError<F::Error, P::Error>> {
        let state = State::from_raw(self.state);
        let inputs = match state {
            Some(State::Idle) | Some(State::Waiting) => Inputs {
                pressed: self.button.is_pressed().map_err(DispatchError::Button)?,
                ..Inputs::default()
            },
            Some(State::Sending) => Inputs {
                feeder_done: self
                    .feeder
                    .poll(&mut self.target)
                    .map_err(DispatchError::Feed)?,
                ..Inputs::default()
            },
            None => Inputs::default(),
        };

        let (next, action) = transition(state, inputs);
        if action == Action::Arm {
            self.feeder
                .start(&mut self.target)
                .map_err(DispatchError::Feed)?;
        }
        if state != Some(next) {
            log::trace!("{:?} -> {:?}", state, next);
        }
        self.state = next as u32;
        Ok(next)
    }

    pub fn state(&self) -> Option<State> {
        State::from_raw(self.state)
    }

    /// Overwrite the stored state word.
    pub fn set_raw_state(&mut self, raw: u32) {
        self.state = raw;
    }

    pub fn feeder(&self) -> &F {
        &self.feeder
    }

    pub fn target(&mut self) -> &mut T {
        &mut self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESSED: Inputs = Inputs {
        pressed: true,
        feeder_done: false,
    };
    const RELEASED: Inputs = Inputs {
        pressed: false,
        feeder_done: false,
    };
    const DONE: Inputs = Inputs {
        pressed: false,
        feeder_done: true,
    };

    #[test]
    fn full_cycle() {
        let (s, a) = transition(Some(State::Idle), PRESSED);
        assert_eq!((s, a), (State::Sending, Action::Arm));
        let (s, _) = transition(Some(s), Inputs::default());
        assert_eq!(s, State::Sending);
        let (s, _) = transition(Some(s), DONE);
        assert_eq!(s, State::Waiting);
        let (s, _) = transition(Some(s), PRESSED);
        assert_eq!(s, State::Waiting);
        let (s, a) = transition(Some(s), RELEASED);
        assert_eq!((s, a), (State::Idle, Action::None));
    }

    #[test]
    fn idle_ignores_release_and_feeder() {
        assert_eq!(transition(Some(State::Idle), RELEASED).0, State::Idle);
        assert_eq!(transition(Some(State::Idle), DONE).0, State::Idle);
    }

    #[test]
    fn sending_ignores_button() {
        let both = Inputs {
            pressed: true,
            feeder_done: false,
        };
        assert_eq!(transition(Some(State::Sending), both).0, State::Sending);
        assert_eq!(transition(Some(State::Sending), RELEASED).0, State::Sending);
    }

    #[test]
    fn corrupted_state_heals_to_idle() {
        for raw in [3, 7, 0xdead_beef, u32::MAX] {
            assert_eq!(State::from_raw(raw), None);
            for inputs in [PRESSED, RELEASED, DONE] {
                assert_eq!(transition(State::from_raw(raw), inputs), (State::Idle, Action::None));
            }
        }
    }

    #[test]
    fn only_listed_transitions_occur() {
        let all = [
            Inputs::default(),
            PRESSED,
            DONE,
            Inputs {
                pressed: true,
                feeder_done: true,
            },
        ];
        for state in [State::Idle, State::Sending, State::Waiting] {
            for inputs in all {
                let (next, action) = transition(Some(state), inputs);
                let allowed = matches!(
                    (state, next),
                    (State::Idle, State::Idle)
                        | (State::Idle, State::Sending)
                        | (State::Sending, State::Sending)
                        | (State::Sending, State::Waiting)
                        | (State::Waiting, State::Waiting)
                        | (State::Waiting, State::Idle)
                );
                assert!(allowed, "{:?} -> {:?}", state, next);
                assert_eq!(action == Action::Arm, state == State::Idle && next == State::Sending);
            }
        }
    }
}
