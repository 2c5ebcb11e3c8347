//! Peripheral targets: the registers a buffer is fed into.

use core::{convert::Infallible, marker::PhantomData, ptr};

use embedded_hal::digital::v2::InputPin;

use crate::{
    status::{StatusBits, StatusLayout},
    traits::Word,
};

/// A peripheral with a write-only input register gated by a handshake bit.
pub trait Peripheral {
    type Word: Word;

    fn status(&self) -> StatusBits;

    fn write_input(&mut self, value: Self::Word);

    /// Bus address of the input register, used as a fixed DMA destination.
    fn input_address(&self) -> usize;
}

/// A peripheral that folds every input into a readable result register.
pub trait Accumulate: Peripheral {
    /// Write zero to the result register.
    fn clear(&mut self);

    fn read(&mut self) -> Self::Word;
}

impl<P: Peripheral + ?Sized> Peripheral for &mut P {
    type Word = P::Word;

    fn status(&self) -> StatusBits {
        (**self).status()
    }

    fn write_input(&mut self, value: Self::Word) {
        (**self).write_input(value)
    }

    fn input_address(&self) -> usize {
        (**self).input_address()
    }
}

impl<P: Accumulate + ?Sized> Accumulate for &mut P {
    fn clear(&mut self) {
        (**self).clear()
    }

    fn read(&mut self) -> Self::Word {
        (**self).read()
    }
}

/// Memory-mapped datapath: an input FIFO register, an accumulator register
/// and an 8-bit status register.
#[derive(Debug)]
pub struct Datapath<W> {
    input: *mut W,
    accumulator: *mut W,
    status: *const u8,
    layout: StatusLayout,
    _word: PhantomData<W>,
}

impl<W: Word> Datapath<W> {
    /// # Safety
    ///
    /// The addresses must be valid, suitably aligned registers of width `W`
    /// (`u8` for `status`) for as long as the returned value exists, and
    /// nothing else may access them in the meantime.
    pub unsafe fn new(
        input: usize,
        accumulator: usize,
        status: usize,
        layout: StatusLayout,
    ) -> Self {
        Datapath {
            input: input as *mut W,
            accumulator: accumulator as *mut W,
            status: status as *const u8,
            layout,
            _word: PhantomData,
        }
    }
}

impl<W: Word> Peripheral for Datapath<W> {
    type Word = W;

    fn status(&self) -> StatusBits {
        let raw = unsafe { ptr::read_volatile(self.status) };
        self.layout.decode(raw)
    }

    fn write_input(&mut self, value: W) {
        unsafe { ptr::write_volatile(self.input, value) }
    }

    fn input_address(&self) -> usize {
        self.input as usize
    }
}

impl<W: Word> Accumulate for Datapath<W> {
    fn clear(&mut self) {
        unsafe { ptr::write_volatile(self.accumulator, W::default()) }
    }

    fn read(&mut self) -> W {
        unsafe { ptr::read_volatile(self.accumulator) }
    }
}

/// A status register read as a single digital input: the `BUTTON_LEVEL` bit
/// of its layout.
#[derive(Debug)]
pub struct StatusLine {
    register: *const u8,
    layout: StatusLayout,
}

impl StatusLine {
    /// # Safety
    ///
    /// `register` must be a readable 8-bit register for as long as the
    /// returned value exists.
    pub unsafe fn new(register: usize, layout: StatusLayout) -> Self {
        StatusLine {
            register: register as *const u8,
            layout,
        }
    }

    fn bits(&self) -> StatusBits {
        self.layout.decode(unsafe { ptr::read_volatile(self.register) })
    }
}

impl InputPin for StatusLine {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        Ok(self.bits().contains(StatusBits::BUTTON_LEVEL))
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

/// Which of the two datapath accumulators of a [`PureRegister`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accumulator {
    A0,
    A1,
}

/// A datapath used as two plain 8-bit read/write registers.
#[derive(Debug)]
pub struct PureRegister {
    a0: *mut u8,
    a1: *mut u8,
}

impl PureRegister {
    /// # Safety
    ///
    /// Same contract as [`Datapath::new`], for two 8-bit registers.
    pub unsafe fn new(a0: usize, a1: usize) -> Self {
        PureRegister {
            a0: a0 as *mut u8,
            a1: a1 as *mut u8,
        }
    }

    fn register(&self, which: Accumulator) -> *mut u8 {
        match which {
            Accumulator::A0 => self.a0,
            Accumulator::A1 => self.a1,
        }
    }

    pub fn read(&self, which: Accumulator) -> u8 {
        unsafe { ptr::read_volatile(self.register(which)) }
    }

    pub fn write(&mut self, which: Accumulator, value: u8) {
        unsafe { ptr::write_volatile(self.register(which), value) }
    }
}
