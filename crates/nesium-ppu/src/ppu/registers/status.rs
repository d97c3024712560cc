use bitflags::bitflags;

bitflags! {
    /// Status register (`$2002`).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V S O . . . . .
    /// ```
    /// - `V`: vertical blank
    /// - `S`: sprite-0 hit
    /// - `O`: 8-sprite overflow
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        /// More than eight sprites matched a scanline (bit 5).
        const SPRITE_OVERFLOW = 0b0010_0000;
        /// Opaque sprite 0 pixel over opaque background (bit 6).
        const SPRITE_ZERO_HIT = 0b0100_0000;
        /// Vertical blank flag (bit 7).
        const VERTICAL_BLANK = 0b1000_0000;
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::empty()
    }
}
