use core::convert::TryFrom;
use core::fmt;

#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Security value returned by the RC2C05-01 and RC2C05-04 status reads.
pub const RC2C05_01_SECURITY: u8 = 0x1B;
/// Security value returned by the RC2C05-02 status read.
pub const RC2C05_02_SECURITY: u8 = 0x3D;
/// Security value returned by the RC2C05-03 status read.
pub const RC2C05_03_SECURITY: u8 = 0x1C;
/// Security value returned by the RC2C05-04 status read.
pub const RC2C05_04_SECURITY: u8 = 0x1B;

/// Frame timing family of a revision.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VideoTiming {
    /// 262 scanlines; CPU = master / 12, PPU = master / 4.
    #[default]
    Ntsc,
    /// 312 scanlines; CPU = master / 16, PPU = master / 5.
    Pal,
}

impl VideoTiming {
    /// Total scanlines per frame, including the pre-render line.
    pub const fn scanlines_per_frame(self) -> u16 {
        match self {
            VideoTiming::Ntsc => 262,
            VideoTiming::Pal => 312,
        }
    }

    /// Master clock ticks per host CPU cycle.
    pub const fn cpu_divider(self) -> u64 {
        match self {
            VideoTiming::Ntsc => 12,
            VideoTiming::Pal => 16,
        }
    }

    /// Master clock ticks per PPU dot.
    pub const fn ppu_divider(self) -> u64 {
        match self {
            VideoTiming::Ntsc => 4,
            VideoTiming::Pal => 5,
        }
    }
}

/// 2C0x silicon revision.
///
/// Behaviour is implemented once in [`crate::Ppu`]; a revision only selects
/// the constants returned by the accessors below.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum ChipVariant {
    /// Plain NTSC console part.
    #[default]
    Rp2C02 = 0,
    /// RGB arcade part, "B" revision.
    Rp2C03B = 1,
    /// RGB arcade part with scrambled palette ("04").
    Rp2C04 = 2,
    /// Protected RGB part, -01.
    Rc2C05_01 = 3,
    /// Protected RGB part, -02.
    Rc2C05_02 = 4,
    /// Protected RGB part, -03.
    Rc2C05_03 = 5,
    /// Protected RGB part, -04.
    Rc2C05_04 = 6,
    /// PAL console part.
    Rp2C07 = 7,
}

impl ChipVariant {
    /// Every supported revision, in id order.
    pub const ALL: [ChipVariant; 8] = [
        ChipVariant::Rp2C02,
        ChipVariant::Rp2C03B,
        ChipVariant::Rp2C04,
        ChipVariant::Rc2C05_01,
        ChipVariant::Rc2C05_02,
        ChipVariant::Rc2C05_03,
        ChipVariant::Rc2C05_04,
        ChipVariant::Rp2C07,
    ];

    /// Human-readable name (useful for logs / debug UI).
    pub const fn as_str(self) -> &'static str {
        match self {
            ChipVariant::Rp2C02 => "Ricoh RP2C02",
            ChipVariant::Rp2C03B => "Ricoh RP2C03B",
            ChipVariant::Rp2C04 => "Ricoh RP2C04",
            ChipVariant::Rc2C05_01 => "Ricoh RC2C05-01",
            ChipVariant::Rc2C05_02 => "Ricoh RC2C05-02",
            ChipVariant::Rc2C05_03 => "Ricoh RC2C05-03",
            ChipVariant::Rc2C05_04 => "Ricoh RC2C05-04",
            ChipVariant::Rp2C07 => "Ricoh RP2C07",
        }
    }

    /// Value substituted into the low status bits, or 0 for open-bus parts.
    pub const fn security_value(self) -> u8 {
        match self {
            ChipVariant::Rc2C05_01 => RC2C05_01_SECURITY,
            ChipVariant::Rc2C05_02 => RC2C05_02_SECURITY,
            ChipVariant::Rc2C05_03 => RC2C05_03_SECURITY,
            ChipVariant::Rc2C05_04 => RC2C05_04_SECURITY,
            _ => 0,
        }
    }

    pub const fn timing(self) -> VideoTiming {
        match self {
            ChipVariant::Rp2C07 => VideoTiming::Pal,
            _ => VideoTiming::Ntsc,
        }
    }

    pub const fn scanlines_per_frame(self) -> u16 {
        self.timing().scanlines_per_frame()
    }

    /// Returns `true` for the RC2C05 family (swapped control registers).
    pub const fn is_protected(self) -> bool {
        self.security_value() != 0
    }
}

impl fmt::Display for ChipVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for ChipVariant {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ChipVariant::ALL
            .get(value as usize)
            .copied()
            .ok_or(Error::UnsupportedVariant(value))
    }
}

impl From<ChipVariant> for u8 {
    fn from(variant: ChipVariant) -> Self {
        variant as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_ids_round_trip() {
        for variant in ChipVariant::ALL {
            let raw = u8::from(variant);
            assert_eq!(ChipVariant::try_from(raw).unwrap(), variant);
        }
        assert!(matches!(
            ChipVariant::try_from(8),
            Err(Error::UnsupportedVariant(8))
        ));
    }

    #[test]
    fn only_rc2c05_parts_carry_security_values() {
        let protected: Vec<_> = ChipVariant::ALL
            .into_iter()
            .filter(|v| v.is_protected())
            .collect();
        assert_eq!(
            protected,
            [
                ChipVariant::Rc2C05_01,
                ChipVariant::Rc2C05_02,
                ChipVariant::Rc2C05_03,
                ChipVariant::Rc2C05_04
            ]
        );
        assert_eq!(ChipVariant::Rc2C05_02.security_value(), 0x3D);
    }

    #[test]
    fn pal_part_has_longer_frame() {
        assert_eq!(ChipVariant::Rp2C02.scanlines_per_frame(), 262);
        assert_eq!(ChipVariant::Rp2C07.scanlines_per_frame(), 312);
    }
}
