use bitflags::bitflags;

use crate::memory;

bitflags! {
    /// Control register 0 (`$2000`).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// N M S B s I n n
    /// ```
    /// - `n n`: base nametable select
    /// - `I`: VRAM increment (0=+1, 1=+32)
    /// - `s`: sprite pattern table (8x8)
    /// - `B`: background pattern table
    /// - `S`: sprite size (0=8x8, 1=8x16)
    /// - `M`: master/slave select (ignored)
    /// - `N`: generate NMI at VBlank start
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Control: u8 {
        /// Base nametable select (bits 0 and 1).
        const NAMETABLE = 0b0000_0011;
        /// `$2007` accesses advance by 32 instead of 1 (bit 2).
        const INCREMENT_32 = 0b0000_0100;
        /// 8x8 sprites fetch from `$1000` (bit 3).
        const SPRITE_TABLE = 0b0000_1000;
        /// Background fetches from `$1000` (bit 4).
        const BACKGROUND_TABLE = 0b0001_0000;
        /// 8x16 sprites (bit 5).
        const SPRITE_SIZE_16 = 0b0010_0000;
        /// Master/slave select (bit 6).
        const MASTER_SLAVE = 0b0100_0000;
        /// Raise NMI when VBLANK starts (bit 7).
        const GENERATE_NMI = 0b1000_0000;
    }
}

impl Default for Control {
    fn default() -> Self {
        Self::empty()
    }
}

impl Control {
    /// Returns the nametable select bits (0..3).
    pub(crate) fn nametable_index(self) -> u8 {
        self.bits() & Control::NAMETABLE.bits()
    }

    /// Amount added to the `$2007` pointer after every access (1 or 32).
    pub(crate) fn vram_increment(self) -> u16 {
        if self.contains(Control::INCREMENT_32) {
            32
        } else {
            1
        }
    }

    /// Pattern table used by 8x8 sprites.
    pub(crate) fn sprite_page(self) -> u16 {
        if self.contains(Control::SPRITE_TABLE) {
            memory::PATTERN_TABLE_1
        } else {
            memory::PATTERN_TABLE_0
        }
    }

    /// Pattern table used by the background.
    pub(crate) fn tile_page(self) -> u16 {
        if self.contains(Control::BACKGROUND_TABLE) {
            memory::PATTERN_TABLE_1
        } else {
            memory::PATTERN_TABLE_0
        }
    }

    /// Sprite height in scanlines.
    pub(crate) fn sprite_height(self) -> u16 {
        if self.contains(Control::SPRITE_SIZE_16) {
            16
        } else {
            8
        }
    }

    pub(crate) fn nmi_enabled(self) -> bool {
        self.contains(Control::GENERATE_NMI)
    }
}
