//! Fixed-size memory blocks backing OAM and palette RAM.
//!
//! With the `boxed-memblock` feature (or on wasm) the storage lives on the
//! heap so that several chip instances do not bloat the caller's stack.

use core::ops::{Deref, DerefMut};

#[cfg(any(feature = "boxed-memblock", target_arch = "wasm32"))]
type MemBlockStorage<T, const N: usize> = Box<[T; N]>;

#[cfg(not(any(feature = "boxed-memblock", target_arch = "wasm32")))]
type MemBlockStorage<T, const N: usize> = [T; N];

#[repr(transparent)]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemBlock<T, const N: usize>(MemBlockStorage<T, N>);

pub mod ppu {
    use crate::memory;

    /// Primary sprite memory (64 entries of y, tile, attribute, x).
    pub type OamRam = super::MemBlock<u8, { memory::OAM_RAM_SIZE }>;
    /// Raw palette bytes as stored by the chip (6 significant bits each).
    pub type PaletteRam = super::MemBlock<u8, { memory::PALETTE_RAM_SIZE }>;
}

impl<T: Copy + Default, const N: usize> MemBlock<T, N> {
    pub fn new() -> Self {
        Self::filled(T::default())
    }
}

impl<T: Copy, const N: usize> MemBlock<T, N> {
    /// Creates a block where every element is initialized to `value`.
    #[cfg(not(any(feature = "boxed-memblock", target_arch = "wasm32")))]
    #[inline]
    pub fn filled(value: T) -> Self {
        Self([value; N])
    }

    /// Creates a block where every element is initialized to `value`.
    #[cfg(any(feature = "boxed-memblock", target_arch = "wasm32"))]
    #[inline]
    pub fn filled(value: T) -> Self {
        Self(Box::new([value; N]))
    }
}

impl<T, const N: usize> MemBlock<T, N> {
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.0[..]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.0[..]
    }
}

impl<T: Copy + Default, const N: usize> Default for MemBlock<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Deref for MemBlock<T, N> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, const N: usize> DerefMut for MemBlock<T, N> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

#[cfg(not(any(feature = "boxed-memblock", target_arch = "wasm32")))]
impl<T: Copy, const N: usize> Copy for MemBlock<T, N> {}

// Blocks travel as plain sequences; decoding rejects any other length so a
// snapshot can never resize OAM or palette RAM.
#[cfg(feature = "savestate-serde")]
impl<T: serde::Serialize, const N: usize> serde::Serialize for MemBlock<T, N> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.as_slice())
    }
}

#[cfg(feature = "savestate-serde")]
impl<'de, T, const N: usize> serde::Deserialize<'de> for MemBlock<T, N>
where
    T: Copy + Default + serde::Deserialize<'de>,
{
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error as _;

        let items = Vec::<T>::deserialize(deserializer)?;
        if items.len() != N {
            return Err(D::Error::invalid_length(
                items.len(),
                &"a memory block of fixed length",
            ));
        }
        let mut block = Self::new();
        block.copy_from_slice(&items);
        Ok(block)
    }
}

#[cfg(all(test, feature = "savestate-postcard"))]
mod tests {
    use super::*;

    #[test]
    fn decoding_rejects_wrong_length() {
        let short = postcard::to_stdvec(&vec![1u8, 2, 3]).expect("encode");
        assert!(postcard::from_bytes::<MemBlock<u8, 4>>(&short).is_err());

        let exact = postcard::to_stdvec(&vec![1u8, 2, 3, 4]).expect("encode");
        let block: MemBlock<u8, 4> = postcard::from_bytes(&exact).expect("decode");
        assert_eq!(block.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(postcard::to_stdvec(&block).expect("encode"), exact);
    }
}
