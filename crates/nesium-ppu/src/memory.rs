//! Shared definitions for the 2C0x register window and VRAM address space.

/// Number of CPU-visible registers exposed by the chip.
pub const REGISTER_COUNT: u16 = 8;
/// Mask for decoding a register offset (`offset & 0x0007`).
pub const REGISTER_SELECT_MASK: u16 = REGISTER_COUNT - 1;

/// Address mask applied to every VRAM access (16 KiB space).
pub const VRAM_MIRROR_MASK: u16 = 0x3FFF;

/// Base address of nametable 0.
pub const NAMETABLE_BASE: u16 = 0x2000;
/// Offset of the attribute table inside a nametable.
pub const ATTRIBUTE_OFFSET: u16 = 0x03C0;
/// Mask that folds the palette window back onto the nametable underneath.
pub const NAMETABLE_MIRROR_MASK: u16 = 0x2FFF;

/// Pattern table base address for table 0.
pub const PATTERN_TABLE_0: u16 = 0x0000;
/// Pattern table base address for table 1.
pub const PATTERN_TABLE_1: u16 = 0x1000;
/// Both pattern tables (`$0000-$1FFF`).
pub const PATTERN_SPACE_MASK: u16 = 0x1FFF;
/// Bytes per 8x8 tile (two bitplanes of eight rows).
pub const TILE_BYTES: u16 = 16;
/// Distance between the two bitplanes of a tile row.
pub const PLANE_STRIDE: u16 = 8;

/// Palette RAM base address (`$3F00`).
pub const PALETTE_BASE: u16 = 0x3F00;
/// Palette RAM byte count.
pub const PALETTE_RAM_SIZE: usize = 0x20;
/// Mask applied to palette offsets (32 bytes mirrored through `$3FFF`).
pub const PALETTE_INDEX_MASK: u16 = 0x1F;

/// Object Attribute Memory byte count (64 sprites × 4 bytes).
pub const OAM_RAM_SIZE: usize = 0x100;

/// CPU-visible register identifiers, by offset inside the window.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// `$2000` - control 0 (PPUCTRL)
    Control = 0,
    /// `$2001` - control 1 (PPUMASK)
    Mask = 1,
    /// `$2002` - status (PPUSTATUS)
    Status = 2,
    /// `$2003` - sprite address (OAMADDR)
    SpriteAddr = 3,
    /// `$2004` - sprite data (OAMDATA)
    SpriteData = 4,
    /// `$2005` - scroll (PPUSCROLL)
    Scroll = 5,
    /// `$2006` - VRAM address (PPUADDR)
    Addr = 6,
    /// `$2007` - VRAM data (PPUDATA)
    Data = 7,
}

impl Register {
    /// Offset of the register inside the eight-byte window.
    pub const fn offset(self) -> u16 {
        self as u16
    }

    /// Resolves the register for an offset; callers mask first.
    pub const fn from_offset(offset: u16) -> Self {
        match offset & REGISTER_SELECT_MASK {
            0 => Self::Control,
            1 => Self::Mask,
            2 => Self::Status,
            3 => Self::SpriteAddr,
            4 => Self::SpriteData,
            5 => Self::Scroll,
            6 => Self::Addr,
            _ => Self::Data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_offsets_round_trip() {
        for offset in 0..REGISTER_COUNT {
            assert_eq!(Register::from_offset(offset).offset(), offset);
        }
        assert_eq!(Register::from_offset(0x2007), Register::Data);
    }
}
