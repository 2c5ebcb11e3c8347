//! Feeding buffers into memory-mapped datapath peripherals.
//!
//! A buffer reaches a peripheral's input register either through the CPU
//! ([`poller`]), waiting on a handshake bit before each write, or through a
//! single-descriptor DMA channel ([`dma`]) paced by the peripheral's own
//! requests. A [`session::Session`] wraps one clear / feed / wait / read
//! cycle against an accumulator, and [`machine::Controller`] repeats
//! transmissions whenever a button is pressed. Interrupt handlers talk to the
//! main loop only through [`signal::Signal`]s.

#![no_std]

#[cfg(feature = "stm32f303")]
use panic_semihosting as _;

pub mod app;
pub mod capture;
pub mod completion;
pub mod config;
pub mod dma;
pub mod error;
pub mod feed;
pub mod machine;
pub mod packet;
pub mod poller;
pub mod session;
pub mod signal;
pub mod sink;
pub mod status;
pub mod target;
mod traits;
pub mod wait;

#[cfg(feature = "stm32f303")]
pub mod board;

pub use traits::{DmaReadBuffer, ElementWidth, Word};
