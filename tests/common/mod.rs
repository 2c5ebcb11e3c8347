//! Simulated datapath bus for host tests.
//!
//! The bus has one accumulating peripheral with a 4-deep input FIFO and one
//! DMA channel. Nothing moves until [`Bus::step`] is called; [`Stepping`]
//! calls it between polls, standing in for hardware running alongside the
//! CPU.

#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, VecDeque},
    convert::Infallible,
    marker::PhantomData,
    ptr,
    rc::Rc,
};

use dp_feed::{
    dma::{DmaChannel, TdHandle, TransferDescriptor},
    error::WaitTimeout,
    signal::{IrqHandle, Signal},
    sink::Sink,
    status::StatusBits,
    target::{Accumulate, Peripheral},
    wait::Wait,
    ElementWidth, Word,
};
use embedded_hal::digital::v2::InputPin;

pub const INPUT_ADDRESS: usize = 0x4000_6400;
pub const FIFO_DEPTH: usize = 4;

struct Cursor {
    descriptor: TransferDescriptor,
    next: usize,
    remaining: usize,
}

#[derive(Default)]
struct Hw {
    fifo: VecDeque<u32>,
    accumulator: u32,
    mask: u32,
    stalled: bool,
    ready_irq: Option<IrqHandle<'static>>,
    consumed: Vec<u32>,
    clears: usize,
    reads: usize,
    descriptors: HashMap<usize, TransferDescriptor>,
    dma: Option<Cursor>,
}

#[derive(Clone)]
pub struct Bus(Rc<RefCell<Hw>>);

impl Bus {
    pub fn new(width: ElementWidth) -> Self {
        let mask = match width {
            ElementWidth::Bits8 => 0xff,
            ElementWidth::Bits16 => 0xffff,
            ElementWidth::Bits32 => 0xffff_ffff,
        };
        Bus(Rc::new(RefCell::new(Hw {
            mask,
            ..Hw::default()
        })))
    }

    pub fn target<W: Word>(&self) -> SimTarget<W> {
        SimTarget {
            bus: self.clone(),
            _word: PhantomData,
        }
    }

    pub fn channel(&self) -> SimChannel {
        SimChannel { bus: self.clone() }
    }

    pub fn stepping(&self, limit: u32) -> Stepping {
        Stepping {
            bus: self.clone(),
            limit,
        }
    }

    /// Like [`Bus::stepping`], but the hardware first runs `steps` clocks on
    /// every call, as if the CPU had been interrupted just before the wait.
    pub fn preempted(&self, steps: u32, limit: u32) -> Preempted {
        Preempted {
            steps,
            inner: self.stepping(limit),
        }
    }

    /// Route the peripheral's ready interrupt to `signal`.
    pub fn connect_ready(&self, signal: &'static Signal) {
        self.0.borrow_mut().ready_irq = Some(signal.irq_handle());
    }

    pub fn stall(&self, stalled: bool) {
        self.0.borrow_mut().stalled = stalled;
    }

    /// Put a value straight into the result register.
    pub fn poke_accumulator(&self, value: u32) {
        self.0.borrow_mut().accumulator = value;
    }

    /// One clock of simulated hardware: the datapath consumes one FIFO entry,
    /// then the DMA channel serves one request if the FIFO has room.
    pub fn step(&self) {
        let mut guard = self.0.borrow_mut();
        let hw = &mut *guard;
        if hw.stalled {
            return;
        }

        let was_busy = !hw.fifo.is_empty();
        if let Some(value) = hw.fifo.pop_front() {
            hw.accumulator = hw.accumulator.wrapping_add(value) & hw.mask;
            hw.consumed.push(value);
        }

        if hw.fifo.len() < FIFO_DEPTH {
            if let Some(cursor) = hw.dma.as_mut() {
                let d = &cursor.descriptor;
                assert_eq!(d.destination, INPUT_ADDRESS, "DMA aimed at the wrong register");
                assert!(!d.destination_increment);
                let value = unsafe {
                    match d.width {
                        ElementWidth::Bits8 => ptr::read_volatile(cursor.next as *const u8) as u32,
                        ElementWidth::Bits16 => {
                            ptr::read_volatile(cursor.next as *const u16) as u32
                        }
                        ElementWidth::Bits32 => ptr::read_volatile(cursor.next as *const u32),
                    }
                };
                if d.source_increment {
                    cursor.next += usize::from(d.bytes_per_burst);
                }
                cursor.remaining -= 1;
                if cursor.remaining == 0 {
                    hw.dma = None;
                }
                hw.fifo.push_back(value);
            }
        }

        if was_busy && hw.fifo.is_empty() && hw.dma.is_none() {
            if let Some(irq) = hw.ready_irq {
                irq.fire();
            }
        }
    }

    /// Values the datapath has taken out of its FIFO, in order.
    pub fn consumed(&self) -> Vec<u32> {
        self.0.borrow().consumed.clone()
    }

    pub fn consumed_bytes(&self) -> Vec<u8> {
        self.consumed().into_iter().map(|v| v as u8).collect()
    }

    pub fn clears(&self) -> usize {
        self.0.borrow().clears
    }

    pub fn reads(&self) -> usize {
        self.0.borrow().reads
    }

    pub fn dma_active(&self) -> bool {
        self.0.borrow().dma.is_some()
    }
}

pub struct SimTarget<W> {
    bus: Bus,
    _word: PhantomData<W>,
}

impl<W: Word> Peripheral for SimTarget<W> {
    type Word = W;

    fn status(&self) -> StatusBits {
        let hw = self.bus.0.borrow();
        let mut bits = StatusBits::empty();
        bits.set(
            StatusBits::READY_TO_ACCEPT,
            !hw.stalled && hw.fifo.len() < FIFO_DEPTH,
        );
        bits.set(StatusBits::BUSY, !hw.fifo.is_empty());
        bits
    }

    fn write_input(&mut self, value: W) {
        let mut hw = self.bus.0.borrow_mut();
        assert!(hw.fifo.len() < FIFO_DEPTH, "input FIFO overrun");
        hw.fifo.push_back(value.into_u32());
    }

    fn input_address(&self) -> usize {
        INPUT_ADDRESS
    }
}

impl<W: Word> Accumulate for SimTarget<W> {
    fn clear(&mut self) {
        let mut hw = self.bus.0.borrow_mut();
        hw.accumulator = 0;
        hw.clears += 1;
    }

    fn read(&mut self) -> W {
        let mut hw = self.bus.0.borrow_mut();
        hw.reads += 1;
        W::from_u32_truncating(hw.accumulator)
    }
}

pub struct SimChannel {
    bus: Bus,
}

impl DmaChannel for SimChannel {
    fn write_descriptor(&mut self, td: TdHandle, descriptor: &TransferDescriptor) {
        let mut hw = self.bus.0.borrow_mut();
        assert!(hw.dma.is_none(), "descriptor rewritten while active");
        hw.descriptors.insert(td.index(), *descriptor);
    }

    fn enable(&mut self, td: TdHandle) {
        let mut hw = self.bus.0.borrow_mut();
        let descriptor = hw.descriptors[&td.index()];
        hw.dma = Some(Cursor {
            descriptor,
            next: descriptor.source,
            remaining: descriptor.bursts(),
        });
    }

    fn disable(&mut self) {
        self.bus.0.borrow_mut().dma = None;
    }

    fn chain_active(&self) -> bool {
        self.bus.0.borrow().dma.is_some()
    }
}

/// Bounded wait that advances the bus between polls.
pub struct Stepping {
    bus: Bus,
    limit: u32,
}

impl Wait for Stepping {
    type Error = WaitTimeout;

    fn until<F>(&mut self, mut condition: F) -> Result<(), WaitTimeout>
    where
        F: FnMut() -> bool,
    {
        for _ in 0..self.limit {
            if condition() {
                return Ok(());
            }
            self.bus.step();
        }
        Err(WaitTimeout(self.limit))
    }
}

pub struct Preempted {
    steps: u32,
    inner: Stepping,
}

impl Wait for Preempted {
    type Error = WaitTimeout;

    fn until<F>(&mut self, condition: F) -> Result<(), WaitTimeout>
    where
        F: FnMut() -> bool,
    {
        for _ in 0..self.steps {
            self.inner.bus.step();
        }
        self.inner.until(condition)
    }
}

/// A button whose level the test sets directly.
#[derive(Clone, Default)]
pub struct SimButton(Rc<Cell<bool>>);

impl SimButton {
    pub fn set_high(&self, high: bool) {
        self.0.set(high);
    }
}

impl InputPin for SimButton {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

#[derive(Default)]
pub struct Recorder {
    pub started: bool,
    pub bytes: Vec<u8>,
}

impl Sink for Recorder {
    fn start(&mut self) {
        self.started = true;
    }

    fn put_byte(&mut self, byte: u8) {
        self.bytes.push(byte);
    }
}

pub fn leak_signal() -> &'static Signal {
    Box::leak(Box::new(Signal::new()))
}
