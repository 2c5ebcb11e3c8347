//! `unsafe` traits for buffers the burst engine and the poller read from.
//!
//! A buffer handed to the DMA controller has to stay where it is, and must not
//! be written to, for as long as the channel is armed. The traits here make
//! sure the buffer is a pointer to stable memory made up of plain words. The
//! `'static` requirement is enforced by `BurstEngine::configure` instead, so
//! that the poller can still feed from stack buffers.

use as_slice::AsSlice;
use core::{mem, ops::Deref};
use stable_deref_trait::StableDeref;
use zerocopy::{AsBytes, FromBytes};

/// Width of one element, which is also the size of one DMA burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementWidth {
    Bits8,
    Bits16,
    Bits32,
}

impl ElementWidth {
    pub const fn bytes(self) -> usize {
        match self {
            ElementWidth::Bits8 => 1,
            ElementWidth::Bits16 => 2,
            ElementWidth::Bits32 => 4,
        }
    }
}

/// A fixed-width unsigned word that can be written to a peripheral input
/// register.
///
/// # Safety
///
/// `WIDTH` must match `mem::size_of::<Self>()`. The `AsBytes` bound makes sure
/// the DMA controller never reads padding.
pub unsafe trait Word: Copy + Default + PartialEq + AsBytes + FromBytes {
    const WIDTH: ElementWidth;

    fn into_u32(self) -> u32;

    /// Keeps the low `WIDTH` bits of `value`.
    fn from_u32_truncating(value: u32) -> Self;
}

macro_rules! word_impls {
    ( $( $ty:ty => $width:ident, )+ ) => {
        $(
            unsafe impl Word for $ty {
                const WIDTH: ElementWidth = ElementWidth::$width;

                fn into_u32(self) -> u32 {
                    self as u32
                }

                fn from_u32_truncating(value: u32) -> Self {
                    value as $ty
                }
            }
        )+
    };
}

word_impls!(
    u8 => Bits8,
    u16 => Bits16,
    u32 => Bits32,
);

/// Trait for buffers that can be fed to a peripheral, by the CPU or by DMA.
///
/// # Safety
///
/// The implementing type must be safe to use for DMA reads. This means:
///
/// - It must be a pointer that references the actual buffer.
/// - The requirements documented on `dma_read_buffer` must be fulfilled.
pub unsafe trait DmaReadBuffer {
    type Word: Word;

    /// Provide a buffer usable for DMA reads.
    ///
    /// The return value is:
    ///
    /// - pointer to the first element
    /// - buffer size in bytes
    ///
    /// # Safety
    ///
    /// - This function must always return the same values, if called multiple
    ///   times.
    /// - The memory specified by the returned pointer and size must be fully
    ///   readable by the DMA peripheral.
    fn dma_read_buffer(&self) -> (*const Self::Word, usize);

    /// The same memory as `dma_read_buffer`, as a slice for the CPU.
    fn as_words(&self) -> &[Self::Word];
}

// Bounding on `B::Target: AsRef<[E]>` instead would leave `E` unconstrained,
// which rustc rejects. `AsSlice` names the element type.

unsafe impl<B, E> DmaReadBuffer for B
where
    B: Deref + StableDeref,
    B::Target: AsSlice<Element = E>,
    E: Word,
{
    type Word = E;

    fn dma_read_buffer(&self) -> (*const E, usize) {
        let words = self.as_words();
        (words.as_ptr(), mem::size_of_val(words))
    }

    fn as_words(&self) -> &[E] {
        AsSlice::as_slice(&**self)
    }
}
