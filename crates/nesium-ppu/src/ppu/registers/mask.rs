use bitflags::bitflags;

bitflags! {
    /// Control register 1 (`$2001`).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// B G R S B s b g
    /// ```
    /// - `g`: monochrome
    /// - `b`: show background in leftmost 8 pixels
    /// - `s`: show sprites in leftmost 8 pixels
    /// - `B`: background enable
    /// - `S`: sprite enable
    /// - `R/G/B`: colour emphasis bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mask: u8 {
        /// Monochrome output (bit 0).
        const GRAYSCALE = 0b0000_0001;
        /// Show background in the leftmost eight pixels (bit 1).
        const SHOW_BACKGROUND_LEFT = 0b0000_0010;
        /// Show sprites in the leftmost eight pixels (bit 2).
        const SHOW_SPRITES_LEFT = 0b0000_0100;
        /// Enables background rendering (bit 3).
        const SHOW_BACKGROUND = 0b0000_1000;
        /// Enables sprite rendering (bit 4).
        const SHOW_SPRITES = 0b0001_0000;
        const EMPHASIZE_RED = 0b0010_0000;
        const EMPHASIZE_GREEN = 0b0100_0000;
        const EMPHASIZE_BLUE = 0b1000_0000;

        const EMPHASIS = Self::EMPHASIZE_RED.bits()
            | Self::EMPHASIZE_GREEN.bits()
            | Self::EMPHASIZE_BLUE.bits();
    }
}

impl Default for Mask {
    fn default() -> Self {
        Self::empty()
    }
}

impl Mask {
    /// Returns `true` when either background or sprite rendering is enabled.
    pub(crate) fn rendering_enabled(self) -> bool {
        self.intersects(Mask::SHOW_BACKGROUND | Mask::SHOW_SPRITES)
    }

    /// Raw emphasis bits (`value & 0xE0`), as used by the colour tables.
    pub(crate) fn emphasis(self) -> u8 {
        self.bits() & Mask::EMPHASIS.bits()
    }

    pub(crate) fn monochrome(self) -> bool {
        self.contains(Mask::GRAYSCALE)
    }
}
