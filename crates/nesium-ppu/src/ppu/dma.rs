//! Sprite DMA (`$4014` on the host side).

use super::Ppu;
use crate::bus::{CpuBus, OAM_DMA_CYCLES};

/// Bytes copied per transfer.
pub const OAM_DMA_LENGTH: u16 = 256;

impl Ppu {
    /// Copies CPU page `page` into OAM through the `$2004` write path, then
    /// charges the host CPU [`OAM_DMA_CYCLES`].
    ///
    /// Bytes are read in ascending address order so that memory-mapped side
    /// effects on the source page observe every access.
    pub fn oam_dma<C: CpuBus + ?Sized>(&mut self, page: u8, cpu: &mut C) {
        let base = u16::from(page) << 8;
        tracing::trace!(page, sprite_address = self.sprite_address(), "oam dma");
        for offset in 0..OAM_DMA_LENGTH {
            let value = cpu.read(base | offset);
            self.write_sprite_data(value);
        }
        cpu.debit_cycles(OAM_DMA_CYCLES);
    }
}
