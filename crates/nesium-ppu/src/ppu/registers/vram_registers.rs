use super::VramAddr;
use crate::memory;

/// Internal scroll/address latches shared by `$2005`, `$2006` and `$2007`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct VramRegisters {
    /// Address assembled by `$2000`/`$2005`/`$2006` writes.
    pub(crate) refresh_latch: VramAddr,
    /// Running address used by the background renderer.
    pub(crate) refresh_data: VramAddr,
    /// `$2007` pointer; only the low 14 bits reach the bus.
    pub(crate) videomem_addr: u16,
    /// Fine X scroll (0..7).
    pub(crate) x_fine: u8,
    /// Shared write toggle: false => first write, true => second write.
    pub(crate) toggle: bool,
}

impl VramRegisters {
    /// `$2005` write.
    pub(crate) fn write_scroll(&mut self, value: u8) {
        if !self.toggle {
            self.refresh_latch.set_coarse_x(value >> 3);
            self.x_fine = value & 0b111;
        } else {
            self.refresh_latch.set_coarse_y(value >> 3);
            self.refresh_latch.set_fine_y(value & 0b111);
        }
        self.toggle = !self.toggle;
    }

    /// `$2006` write. The second write commits the latch to both the refresh
    /// counter and the `$2007` pointer.
    pub(crate) fn write_addr(&mut self, value: u8) {
        if !self.toggle {
            let hi = u16::from(value & 0b0011_1111) << 8;
            let lo = self.refresh_latch.raw() & 0x00FF;
            self.refresh_latch.set_raw(hi | lo);
        } else {
            let hi = self.refresh_latch.raw() & 0x7F00;
            self.refresh_latch.set_raw(hi | u16::from(value));
            self.refresh_data = self.refresh_latch;
            self.videomem_addr = self.refresh_latch.raw();
        }
        self.toggle = !self.toggle;
    }

    /// Current `$2007` target inside the 14-bit space.
    #[inline]
    pub(crate) fn bus_addr(&self) -> u16 {
        self.videomem_addr & memory::VRAM_MIRROR_MASK
    }

    #[inline]
    pub(crate) fn advance(&mut self, step: u16) {
        self.videomem_addr = self.videomem_addr.wrapping_add(step);
    }

    pub(crate) fn reset_toggle(&mut self) {
        self.toggle = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_pair_fills_latch() {
        let mut regs = VramRegisters::default();
        regs.write_scroll(0x7D);
        assert!(regs.toggle);
        assert_eq!(regs.refresh_latch.coarse_x(), 0x0F);
        assert_eq!(regs.x_fine, 5);
        regs.write_scroll(0x5E);
        assert!(!regs.toggle);
        assert_eq!(regs.refresh_latch.coarse_y(), 0x0B);
        assert_eq!(regs.refresh_latch.fine_y(), 6);
    }

    #[test]
    fn address_pair_commits_on_second_write() {
        let mut regs = VramRegisters::default();
        regs.write_addr(0xFF);
        assert_eq!(regs.refresh_latch.raw(), 0x3F00);
        assert_eq!(regs.videomem_addr, 0);
        regs.write_addr(0x12);
        assert_eq!(regs.videomem_addr, 0x3F12);
        assert_eq!(regs.refresh_data.raw(), 0x3F12);
    }
}
