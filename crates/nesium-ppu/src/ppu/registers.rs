//! CPU-visible register state and internal scroll latches.
//!
//! Bit layouts live in the submodules; the dispatch that ties them to the
//! renderer is in [`crate::ppu::Ppu::read`] / [`crate::ppu::Ppu::write`].

mod control;
mod mask;
mod status;
mod vram_addr;
mod vram_registers;

pub use control::Control;
pub use mask::Mask;
pub use status::Status;
pub use vram_addr::VramAddr;
pub(crate) use vram_registers::VramRegisters;

use crate::mem_block::ppu::OamRam;

/// Aggregates the register file and its latches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Registers {
    /// Control register 0 (`$2000`).
    pub(crate) control: Control,
    /// Control register 1 (`$2001`).
    pub(crate) mask: Mask,
    pub(crate) status: Status,
    /// OAM pointer driven by `$2003`/`$2004`.
    pub(crate) sprite_address: u8,
    /// Primary sprite memory. Survives [`Registers::reset`].
    pub(crate) oam: OamRam,
    pub(crate) vram: VramRegisters,
    /// Delayed `$2007` read buffer.
    pub(crate) buffered_data: u8,
    /// Last value driven on the register data bus.
    pub(crate) data_latch: u8,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub(crate) fn new() -> Self {
        Self {
            control: Control::default(),
            mask: Mask::default(),
            status: Status::default(),
            sprite_address: 0,
            oam: OamRam::new(),
            vram: VramRegisters::default(),
            buffered_data: 0,
            data_latch: 0,
        }
    }

    /// Zeroes every register and latch, keeping OAM contents.
    pub(crate) fn reset(&mut self) {
        let oam = self.oam.clone();
        *self = Registers::new();
        self.oam = oam;
    }

    /// Updates control 0, syncing the nametable bits into the refresh latch.
    pub(crate) fn write_control(&mut self, value: u8) {
        self.control = Control::from_bits_retain(value);
        self.vram
            .refresh_latch
            .set_nametable(self.control.nametable_index());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_keeps_oam() {
        let mut regs = Registers::new();
        regs.oam[7] = 0x42;
        regs.write_control(0x83);
        regs.data_latch = 9;
        regs.reset();
        assert_eq!(regs.oam[7], 0x42);
        assert_eq!(regs.control, Control::empty());
        assert_eq!(regs.data_latch, 0);
        assert_eq!(regs.vram.refresh_latch.raw(), 0);
    }

    #[test]
    fn control_write_sets_latch_nametable() {
        let mut regs = Registers::new();
        regs.vram.refresh_latch.set_raw(0x7FFF);
        regs.write_control(0x01);
        assert_eq!(regs.vram.refresh_latch.raw(), 0x77FF);
    }
}
