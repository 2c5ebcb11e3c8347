//! STM32F303 binding.
//!
//! USART1 transmit (PA9) is the datapath peripheral, fed through DMA1
//! channel 4. The user button is PA0, the sample tick is the TIM2 update
//! interrupt, the probe register is the low byte of GPIOB and samples are
//! echoed on USART2 (PA2). Log output goes through semihosting.

use core::{convert::Infallible, fmt::Write};

use cortex_m::peripheral::NVIC;
use cortex_m_semihosting::hio;
use embedded_hal::digital::v2::InputPin;
use stm32f3::stm32f303 as pac;

use crate::{
    capture::SampleRegister,
    dma::{DmaChannel, TdHandle, TransferDescriptor},
    signal::Signal,
    sink::Sink,
    status::StatusBits,
    target::Peripheral,
    wait::{Spin, Wait},
    ElementWidth,
};

/// HSI, the clock after reset.
pub const CLOCK_HZ: u32 = 8_000_000;
pub const BAUD_RATE: u32 = 115_200;
/// TIM2 update rate.
pub const SAMPLE_HZ: u32 = 10;

/// Latched by [`on_sample_tick`].
pub static SAMPLE: Signal = Signal::new();

/// Replace `width` bits at `shift` in `bits` with `value`.
fn field(bits: u32, shift: u32, width: u32, value: u32) -> u32 {
    let mask = ((1 << width) - 1) << shift;
    (bits & !mask) | ((value << shift) & mask)
}

pub struct Board {
    pub uart: Usart1,
    pub dma: Dma1Ch4,
    pub button: UserButton,
    pub probe: Probe,
    pub echo: Usart2,
}

impl Board {
    /// Take the device peripherals and bring up everything the demos use.
    /// `None` if the peripherals were already taken.
    pub fn take() -> Option<Self> {
        let dp = pac::Peripherals::take()?;

        dp.RCC.ahbenr.modify(|_, w| {
            w.dma1en().enabled();
            w.iopaen().set_bit();
            w.iopben().set_bit()
        });
        dp.RCC.apb2enr.modify(|_, w| w.usart1en().set_bit());
        dp.RCC.apb1enr.modify(|_, w| {
            w.usart2en().set_bit();
            w.tim2en().set_bit()
        });

        // PA2 and PA9 to AF7, PA0 input with pull-down.
        dp.GPIOA.moder.modify(|r, w| unsafe {
            let bits = field(r.bits(), 2 * 2, 2, 0b10);
            w.bits(field(bits, 9 * 2, 2, 0b10))
        });
        dp.GPIOA
            .afrl
            .modify(|r, w| unsafe { w.bits(field(r.bits(), 2 * 4, 4, 7)) });
        dp.GPIOA
            .afrh
            .modify(|r, w| unsafe { w.bits(field(r.bits(), (9 - 8) * 4, 4, 7)) });
        dp.GPIOA
            .pupdr
            .modify(|r, w| unsafe { w.bits(field(r.bits(), 0, 2, 0b10)) });

        dp.USART1.brr.write(|w| unsafe { w.bits(CLOCK_HZ / BAUD_RATE) });
        dp.USART1.cr3.write(|w| w.dmat().set_bit());
        dp.USART1.cr1.write(|w| {
            w.ue().set_bit();
            w.te().set_bit()
        });

        dp.USART2.brr.write(|w| unsafe { w.bits(CLOCK_HZ / BAUD_RATE) });

        dp.TIM2.psc.write(|w| unsafe { w.bits(CLOCK_HZ / 1_000 - 1) });
        dp.TIM2.arr.write(|w| unsafe { w.bits(1_000 / SAMPLE_HZ - 1) });
        dp.TIM2.egr.write(|w| w.ug().set_bit());
        dp.TIM2.sr.write(|w| unsafe { w.bits(0) });
        dp.TIM2.dier.write(|w| w.uie().set_bit());
        dp.TIM2.cr1.modify(|_, w| w.cen().set_bit());

        SAMPLE.take();
        unsafe { NVIC::unmask(pac::Interrupt::TIM2) };

        Some(Board {
            uart: Usart1(dp.USART1),
            dma: Dma1Ch4 {
                regs: dp.DMA1,
                descriptor: None,
            },
            button: UserButton(dp.GPIOA),
            probe: Probe(dp.GPIOB),
            echo: Usart2(dp.USART2),
        })
    }
}

/// Body of the TIM2 interrupt handler.
pub fn on_sample_tick() {
    // The update flag must be acknowledged here or the handler re-enters
    // immediately. Nothing else touches TIM2 after `Board::take`.
    let tim2 = unsafe { &*pac::TIM2::ptr() };
    tim2.sr.modify(|_, w| w.uif().clear_bit());
    SAMPLE.irq_handle().fire();
}

/// USART1 transmitter. TXE is the handshake, TC clear means busy.
pub struct Usart1(pac::USART1);

impl Peripheral for Usart1 {
    type Word = u8;

    fn status(&self) -> StatusBits {
        let isr = self.0.isr.read();
        let mut bits = StatusBits::empty();
        bits.set(StatusBits::READY_TO_ACCEPT, isr.txe().bit_is_set());
        bits.set(StatusBits::BUSY, isr.tc().bit_is_clear());
        bits
    }

    fn write_input(&mut self, value: u8) {
        self.0.tdr.write(|w| unsafe { w.bits(u32::from(value)) });
    }

    fn input_address(&self) -> usize {
        &self.0.tdr as *const _ as usize
    }
}

/// DMA1 channel 4, the USART1_TX request line. The channel registers are the
/// only descriptor slot, so the handle is ignored.
pub struct Dma1Ch4 {
    regs: pac::DMA1,
    descriptor: Option<TransferDescriptor>,
}

impl DmaChannel for Dma1Ch4 {
    fn write_descriptor(&mut self, _: TdHandle, descriptor: &TransferDescriptor) {
        let ch = &self.regs.ch4;
        ch.cr.write(|w| {
            w.dir().from_memory();
            w.minc().bit(descriptor.source_increment);
            w.pinc().bit(descriptor.destination_increment);
            match descriptor.width {
                ElementWidth::Bits8 => {
                    w.psize().bits8();
                    w.msize().bits8();
                }
                ElementWidth::Bits16 => {
                    w.psize().bits16();
                    w.msize().bits16();
                }
                ElementWidth::Bits32 => {
                    w.psize().bits32();
                    w.msize().bits32();
                }
            }
            w.circ().disabled();
            w.mem2mem().disabled()
        });
        ch.par.write(|w| w.pa().bits(descriptor.destination as u32));
        ch.mar.write(|w| w.ma().bits(descriptor.source as u32));
        self.descriptor = Some(*descriptor);
    }

    fn enable(&mut self, _: TdHandle) {
        let descriptor = match self.descriptor {
            Some(descriptor) => descriptor,
            None => return,
        };
        let ch = &self.regs.ch4;

        // NDTR counts down and is only writable while the channel is off.
        ch.cr.modify(|_, w| w.en().disabled());
        ch.ndtr.write(|w| w.ndt().bits(descriptor.bursts() as u16));

        // clear interrupt flags
        self.regs.ifcr.write(|w| w.cgif4().set_bit());

        ch.cr.modify(|_, w| w.en().enabled());
    }

    fn disable(&mut self) {
        self.regs.ch4.cr.modify(|_, w| w.en().disabled());
    }

    fn chain_active(&self) -> bool {
        let isr = self.regs.isr.read();
        if isr.teif4().bit_is_set() {
            log::error!("DMA1 channel 4 transfer error");
            return false;
        }
        self.regs.ch4.cr.read().en().bit_is_set() && isr.tcif4().bit_is_clear()
    }
}

/// The user button on PA0. High when pressed.
pub struct UserButton(pac::GPIOA);

impl InputPin for UserButton {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        Ok(self.0.idr.read().bits() & 1 != 0)
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

/// Low byte of GPIOB's input register.
pub struct Probe(pac::GPIOB);

impl SampleRegister for Probe {
    fn read(&mut self) -> u8 {
        self.0.idr.read().bits() as u8
    }
}

/// USART2 transmitter used as the sample echo.
pub struct Usart2(pac::USART2);

impl Sink for Usart2 {
    fn start(&mut self) {
        self.0.cr1.write(|w| {
            w.ue().set_bit();
            w.te().set_bit()
        });
    }

    fn put_byte(&mut self, byte: u8) {
        let usart = &self.0;
        let _ = Spin.until(|| usart.isr.read().txe().bit_is_set());
        usart.tdr.write(|w| unsafe { w.bits(u32::from(byte)) });
    }
}

/// Debugger console.
#[derive(Default)]
pub struct HostSink(Option<hio::HStdout>);

impl Sink for HostSink {
    fn start(&mut self) {
        self.0 = hio::hstdout().ok();
    }

    fn put_byte(&mut self, byte: u8) {
        self.put_str_bytes(&[byte]);
    }

    fn put_str(&mut self, text: &str) {
        self.put_str_bytes(text.as_bytes());
    }
}

impl HostSink {
    fn put_str_bytes(&mut self, bytes: &[u8]) {
        if let Some(out) = self.0.as_mut() {
            let _ = out.write_all(bytes);
        }
    }
}

struct SemihostingLogger;

impl log::Log for SemihostingLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut out) = hio::hstdout() {
            let _ = writeln!(out, "{:<5} {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: SemihostingLogger = SemihostingLogger;

/// Install the semihosting logger at `Info`.
pub fn init_logging() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}
