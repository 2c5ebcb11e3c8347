//! DMA burst engine.
//!
//! One channel, one transfer descriptor. The descriptor is allocated once from
//! the controller's [`DescriptorArena`] and rewritten for every session; it is
//! never linked to another descriptor, so a channel runs exactly one pass over
//! the buffer per `arm`, one element per peripheral request.

use core::sync::atomic::{self, Ordering};

use crate::{
    config::{DESCRIPTOR_COUNT, MAX_TRANSFER_BYTES, REQUESTS_PER_BURST},
    error::DmaError,
    feed::Feed,
    target::Peripheral,
    traits::{DmaReadBuffer, ElementWidth, Word},
};

/// What happens when a descriptor's transfer count runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    /// Stop the channel. No descriptor linking.
    SingleShot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferDescriptor {
    pub source: usize,
    pub destination: usize,
    pub width: ElementWidth,
    /// Bytes moved over the whole transfer.
    pub transfer_bytes: u16,
    pub bytes_per_burst: u8,
    pub requests_per_burst: u8,
    pub source_increment: bool,
    pub destination_increment: bool,
    pub chain: Chain,
}

impl TransferDescriptor {
    /// Describe moving all of `buffer` into the register at `destination`.
    pub fn for_buffer<B>(buffer: &B, destination: usize) -> Result<Self, DmaError>
    where
        B: DmaReadBuffer + ?Sized,
    {
        let (ptr, len) = buffer.dma_read_buffer();
        if len == 0 {
            return Err(DmaError::EmptyBuffer);
        }
        if len > MAX_TRANSFER_BYTES {
            return Err(DmaError::TooLong(len));
        }

        let width = <B::Word as Word>::WIDTH;
        Ok(TransferDescriptor {
            source: ptr as usize,
            destination,
            width,
            transfer_bytes: len as u16,
            bytes_per_burst: width.bytes() as u8,
            requests_per_burst: REQUESTS_PER_BURST,
            source_increment: true,
            destination_increment: false,
            chain: Chain::SingleShot,
        })
    }

    /// Number of bursts (elements) in the transfer.
    pub fn bursts(&self) -> usize {
        usize::from(self.transfer_bytes) / usize::from(self.bytes_per_burst)
    }
}

/// Index of a descriptor in the controller's descriptor memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TdHandle(u8);

impl TdHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Hands out descriptor slots. Slots are never returned.
#[derive(Debug)]
pub struct DescriptorArena<const N: usize = DESCRIPTOR_COUNT> {
    next: usize,
}

impl<const N: usize> DescriptorArena<N> {
    pub const fn new() -> Self {
        DescriptorArena { next: 0 }
    }

    pub fn allocate(&mut self) -> Result<TdHandle, DmaError> {
        if self.next >= N || self.next > u8::MAX as usize {
            return Err(DmaError::NoDescriptor);
        }
        let td = TdHandle(self.next as u8);
        self.next += 1;
        Ok(td)
    }

    pub fn remaining(&self) -> usize {
        N.saturating_sub(self.next)
    }
}

impl<const N: usize> Default for DescriptorArena<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Hardware side of one DMA channel.
pub trait DmaChannel {
    /// Store `descriptor` in the slot `td`. Only called while inactive.
    fn write_descriptor(&mut self, td: TdHandle, descriptor: &TransferDescriptor);

    /// Start at `td` and enable the channel, keeping the descriptor intact
    /// so the same transfer can be armed again.
    fn enable(&mut self, td: TdHandle);

    fn disable(&mut self);

    /// Chain-active status: set from `enable` until the last burst is done.
    fn chain_active(&self) -> bool;
}

pub struct BurstEngine<C: DmaChannel, B> {
    channel: C,
    td: TdHandle,
    buffer: Option<B>,
    descriptor: Option<TransferDescriptor>,
}

impl<C, B> BurstEngine<C, B>
where
    C: DmaChannel,
    B: DmaReadBuffer + 'static,
{
    /// Take one descriptor from `arena` for the lifetime of the engine.
    pub fn new<const N: usize>(
        channel: C,
        arena: &mut DescriptorArena<N>,
    ) -> Result<Self, DmaError> {
        let td = arena.allocate()?;
        Ok(BurstEngine {
            channel,
            td,
            buffer: None,
            descriptor: None,
        })
    }

    /// Point the descriptor at `buffer` and the register at `destination`.
    ///
    /// A previously configured buffer is dropped. On error the engine keeps
    /// its previous buffer and descriptor.
    pub fn configure(
        &mut self,
        buffer: B,
        destination: usize,
    ) -> Result<&TransferDescriptor, DmaError> {
        if self.is_active() {
            return Err(DmaError::Busy);
        }

        let descriptor = TransferDescriptor::for_buffer(&buffer, destination)?;
        self.buffer = Some(buffer);
        Ok(self.load(descriptor))
    }

    fn load(&mut self, descriptor: TransferDescriptor) -> &TransferDescriptor {
        self.channel.write_descriptor(self.td, &descriptor);
        log::debug!(
            "td {}: {} bytes from {:#x} to {:#x}",
            self.td.index(),
            descriptor.transfer_bytes,
            descriptor.source,
            descriptor.destination
        );
        self.descriptor.insert(descriptor)
    }

    pub fn arm(&mut self) -> Result<(), DmaError> {
        if self.descriptor.is_none() {
            return Err(DmaError::NotConfigured);
        }
        if self.is_active() {
            return Err(DmaError::Busy);
        }

        // Prevent preceding writes to the buffer from being moved past the
        // channel enable (i.e. after the transfer has started).
        atomic::compiler_fence(Ordering::Release);

        self.channel.enable(self.td);
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        let active = self.channel.chain_active();
        if !active {
            atomic::compiler_fence(Ordering::Acquire);
        }
        active
    }

    pub fn descriptor(&self) -> Option<&TransferDescriptor> {
        self.descriptor.as_ref()
    }

    /// Hand the buffer back once the channel is idle.
    pub fn release(&mut self) -> Result<B, DmaError> {
        if self.is_active() {
            return Err(DmaError::Busy);
        }
        self.descriptor = None;
        self.buffer.take().ok_or(DmaError::NotConfigured)
    }
}

impl<C: DmaChannel, B> Drop for BurstEngine<C, B> {
    fn drop(&mut self) {
        self.channel.disable();

        // Prevent subsequent accesses to the buffer from being moved ahead
        // of the channel disable.
        atomic::compiler_fence(Ordering::Acquire);
    }
}

impl<T, C, B> Feed<T> for BurstEngine<C, B>
where
    T: Peripheral,
    C: DmaChannel,
    B: DmaReadBuffer<Word = T::Word> + 'static,
{
    type Error = DmaError;

    /// Rewrite the descriptor for `target` and arm the channel.
    fn start(&mut self, target: &mut T) -> Result<(), DmaError> {
        if self.is_active() {
            return Err(DmaError::Busy);
        }

        let buffer = self.buffer.as_ref().ok_or(DmaError::NotConfigured)?;
        let descriptor = TransferDescriptor::for_buffer(buffer, target.input_address())?;
        self.load(descriptor);
        self.arm()
    }

    fn poll(&mut self, _: &mut T) -> Result<bool, DmaError> {
        Ok(!self.is_active())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static HALF_WORDS: [u16; 10] = [1010, 2009, 3008, 4007, 5006, 6005, 7004, 8003, 9002, 10001];

    #[test]
    fn descriptor_for_half_words() {
        let buffer: &'static [u16] = &HALF_WORDS;
        let td = TransferDescriptor::for_buffer(&buffer, 0x4000_6400).unwrap();

        assert_eq!(td.transfer_bytes, 20);
        assert_eq!(td.bytes_per_burst, 2);
        assert_eq!(td.requests_per_burst, 1);
        assert_eq!(td.bursts(), 10);
        assert_eq!(td.source, HALF_WORDS.as_ptr() as usize);
        assert_eq!(td.destination, 0x4000_6400);
        assert!(td.source_increment);
        assert!(!td.destination_increment);
        assert_eq!(td.chain, Chain::SingleShot);
    }

    #[test]
    fn descriptor_limits() {
        static EMPTY: [u8; 0] = [];
        static LARGE: [u32; 1024] = [0; 1024];

        let empty: &'static [u8] = &EMPTY;
        let large: &'static [u32] = &LARGE;
        assert_eq!(
            TransferDescriptor::for_buffer(&empty, 0),
            Err(DmaError::EmptyBuffer)
        );
        assert_eq!(
            TransferDescriptor::for_buffer(&large, 0),
            Err(DmaError::TooLong(4096))
        );
    }

    #[test]
    fn arena_runs_out() {
        let mut arena = DescriptorArena::<2>::new();
        assert_eq!(arena.allocate().map(TdHandle::index), Ok(0));
        assert_eq!(arena.allocate().map(TdHandle::index), Ok(1));
        assert_eq!(arena.remaining(), 0);
        assert_eq!(arena.allocate(), Err(DmaError::NoDescriptor));
    }
}
