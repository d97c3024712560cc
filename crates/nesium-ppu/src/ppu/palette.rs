//! Palette RAM, the pen lookup tables derived from it and the master palette.
//!
//! Palette RAM holds 32 six-bit colour indices. Every write is immediately
//! folded into two lookup tables (colour and monochrome) so the renderers
//! only ever index an array to obtain a [`Pen`].

use core::f64::consts::PI;

#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use crate::{mem_block::ppu::PaletteRam, memory};

/// Index into the host's master palette.
pub type Pen = u16;

/// Colours per emphasis mode.
pub const COLORS_PER_EMPHASIS: usize = 64;
/// Entries in the full master palette (8 emphasis modes x 64 colours).
pub const MASTER_PALETTE_SIZE: usize = 8 * COLORS_PER_EMPHASIS;

const COLOR_MASK: u8 = 0x3F;
const MONO_MASK: u8 = 0x30;
/// Distance between slots that alias the shared background colour.
const ALIAS_STRIDE: usize = 4;

/// Live palette state: RAM, background colour and derived pen tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PaletteUnit {
    ram: PaletteRam,
    back_color: u8,
    /// Raw emphasis bits (`control1 & 0xE0`) the tables were built with.
    emphasis: u8,
    color_base: Pen,
    colortable: [Pen; memory::PALETTE_RAM_SIZE],
    colortable_mono: [Pen; memory::PALETTE_RAM_SIZE],
}

impl PaletteUnit {
    pub(crate) fn new(color_base: Pen) -> Self {
        let mut unit = Self {
            ram: PaletteRam::new(),
            back_color: 0,
            emphasis: 0,
            color_base,
            colortable: [0; memory::PALETTE_RAM_SIZE],
            colortable_mono: [0; memory::PALETTE_RAM_SIZE],
        };
        unit.reset();
        unit
    }

    /// Zeroes palette RAM and restores the default pen tables.
    pub(crate) fn reset(&mut self) {
        self.ram.fill(0);
        self.back_color = 0;
        self.emphasis = 0;
        for (i, (color, mono)) in self
            .colortable
            .iter_mut()
            .zip(self.colortable_mono.iter_mut())
            .enumerate()
        {
            let default = if i % ALIAS_STRIDE == 0 { 0 } else { i as Pen };
            *color = self.color_base + default;
            *mono = self.color_base + (i % ALIAS_STRIDE) as Pen;
        }
    }

    #[inline]
    fn color_pen(&self, value: u8) -> Pen {
        self.color_base + Pen::from(value) + Pen::from(self.emphasis) * 2
    }

    #[inline]
    fn mono_pen(&self, value: u8) -> Pen {
        self.color_pen(value & MONO_MASK)
    }

    fn store(&mut self, index: usize, value: u8) {
        self.ram[index] = value;
        self.colortable[index] = self.color_pen(value);
        self.colortable_mono[index] = self.mono_pen(value);
    }

    /// Stores a colour. Offsets that are a multiple of four update the shared
    /// background colour and all eight of its aliases.
    pub(crate) fn write(&mut self, offset: u16, value: u8) {
        let index = usize::from(offset & memory::PALETTE_INDEX_MASK);
        let value = value & COLOR_MASK;
        if index % ALIAS_STRIDE != 0 {
            self.store(index, value);
        } else {
            for alias in (0..memory::PALETTE_RAM_SIZE).step_by(ALIAS_STRIDE) {
                self.store(alias, value);
            }
            self.back_color = value;
        }
    }

    pub(crate) fn read(&self, offset: u16, mono: bool) -> u8 {
        let value = self.ram[usize::from(offset & memory::PALETTE_INDEX_MASK)];
        if mono {
            value & MONO_MASK
        } else {
            value & COLOR_MASK
        }
    }

    /// Rebuilds both tables when the emphasis bits change.
    pub(crate) fn set_emphasis(&mut self, emphasis: u8) {
        if emphasis == self.emphasis {
            return;
        }
        self.emphasis = emphasis;
        for index in 0..memory::PALETTE_RAM_SIZE {
            let value = self.ram[index];
            self.colortable[index] = self.color_pen(value);
            self.colortable_mono[index] = self.mono_pen(value);
        }
    }

    /// Pen table selected by the monochrome bit.
    #[inline]
    pub(crate) fn table(&self, mono: bool) -> &[Pen; memory::PALETTE_RAM_SIZE] {
        if mono {
            &self.colortable_mono
        } else {
            &self.colortable
        }
    }

    /// Pen used for transparent background pixels and blanked rows.
    #[inline]
    pub(crate) fn background_pen(&self, mono: bool) -> Pen {
        self.table(mono)[0]
    }

    pub(crate) fn back_color(&self) -> u8 {
        self.back_color
    }

    pub(crate) fn color_base(&self) -> Pen {
        self.color_base
    }

    pub(crate) fn ram(&self) -> &PaletteRam {
        &self.ram
    }

    /// Restores RAM contents from a snapshot and rebuilds the tables.
    pub(crate) fn restore(&mut self, ram: &[u8], back_color: u8, emphasis: u8) {
        self.ram.copy_from_slice(ram);
        self.back_color = back_color & COLOR_MASK;
        self.emphasis = emphasis;
        for index in 0..memory::PALETTE_RAM_SIZE {
            let value = self.ram[index];
            self.colortable[index] = self.color_pen(value);
            self.colortable_mono[index] = self.mono_pen(value);
        }
    }
}

/// 24-bit RGB colour.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packs the colour as little-endian RGBA8888 bytes with opaque alpha.
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 0xFF]
    }
}

/// Luma levels per brightness row, for the dark/normal/bright/pastel columns.
const BRIGHTNESS: [[f64; 4]; 3] = [
    [0.50, 0.75, 1.0, 1.0],
    [0.29, 0.45, 0.73, 0.9],
    [0.0, 0.24, 0.47, 0.77],
];

/// Per-channel attenuation for each of the eight emphasis combinations.
const EMPHASIS_FACTORS: [[f64; 3]; 8] = [
    [1.0, 1.0, 1.0],
    [1.239, 0.915, 0.743],
    [0.794, 1.086, 0.882],
    [0.905, 1.026, 1.277],
    [0.741, 0.987, 1.001],
    [1.023, 0.908, 0.979],
    [1.019, 0.98, 0.653],
    [0.75, 0.75, 0.75],
];

const TINT: f64 = 0.22;
const HUE: f64 = 287.0;
const KR: f64 = 0.2989;
const KB: f64 = 0.1145;
const KU: f64 = 2.029;
const KV: f64 = 1.140;

/// Full 512-entry RGB palette addressed by `emphasis * 64 + colour`.
///
/// Pens produced by the core are offset by the configured `color_base`;
/// subtract it before indexing (see [`MasterPalette::color`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterPalette {
    colors: Box<[Color; MASTER_PALETTE_SIZE]>,
}

impl Default for MasterPalette {
    fn default() -> Self {
        Self::generate()
    }
}

impl MasterPalette {
    /// Derives the palette from the composite hue wheel.
    pub fn generate() -> Self {
        let mut colors = Box::new([Color::BLACK; MASTER_PALETTE_SIZE]);
        for (emphasis, factors) in EMPHASIS_FACTORS.iter().enumerate() {
            for level in 0..4 {
                for hue_step in 0..16 {
                    let index = emphasis * COLORS_PER_EMPHASIS + level * 16 + hue_step;
                    colors[index] = compose(level, hue_step, factors);
                }
            }
        }
        Self { colors }
    }

    /// Looks up a raw palette index (`emphasis * 64 + colour`), wrapping.
    pub fn get(&self, index: usize) -> Color {
        self.colors[index % MASTER_PALETTE_SIZE]
    }

    /// Looks up the colour for a pen produced with `color_base`.
    pub fn color(&self, pen: Pen, color_base: Pen) -> Color {
        self.get(usize::from(pen.wrapping_sub(color_base)))
    }

    pub fn as_slice(&self) -> &[Color] {
        &self.colors[..]
    }
}

fn compose(level: usize, hue_step: usize, factors: &[f64; 3]) -> Color {
    let (y, saturation) = match hue_step {
        0 => (BRIGHTNESS[0][level], 0.0),
        13 => (BRIGHTNESS[2][level], 0.0),
        14 | 15 => return Color::BLACK,
        _ => (BRIGHTNESS[1][level], TINT),
    };

    let rad = PI * ((hue_step as f64) * 30.0 + HUE) / 180.0;
    let u = saturation * rad.cos();
    let v = saturation * rad.sin();

    let r = y + KV * v;
    let g = y - (KB * KU * u + KR * KV * v) / (1.0 - KB - KR);
    let b = y + KU * u;

    Color::new(
        channel(r, factors[0]),
        channel(g, factors[1]),
        channel(b, factors[2]),
    )
}

fn channel(value: f64, factor: f64) -> u8 {
    let scaled = (value * 255.0).clamp(0.0, 255.0);
    (scaled * factor).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reset_tables_alias_background_slots() {
        let unit = PaletteUnit::new(0x100);
        let color = unit.table(false);
        assert_eq!(color[0], 0x100);
        assert_eq!(color[4], 0x100);
        assert_eq!(color[5], 0x105);
        assert_eq!(color[31], 0x11F);
        let mono = unit.table(true);
        assert_eq!(mono[5], 0x101);
        assert_eq!(mono[31], 0x103);
    }

    #[test]
    fn background_write_updates_every_alias() {
        let mut unit = PaletteUnit::new(0);
        unit.write(0x14, 0x2A);
        for alias in (0..32).step_by(4) {
            assert_eq!(unit.read(alias, false), 0x2A);
            assert_eq!(unit.table(false)[alias as usize], 0x2A);
        }
        assert_eq!(unit.back_color(), 0x2A);
        assert_eq!(unit.background_pen(false), 0x2A);
    }

    #[test]
    fn emphasis_shifts_pens() {
        let mut unit = PaletteUnit::new(0);
        unit.write(1, 0x16);
        unit.set_emphasis(0x20);
        assert_eq!(unit.table(false)[1], 0x16 + 0x40);
        assert_eq!(unit.table(true)[1], 0x10 + 0x40);
        unit.set_emphasis(0xE0);
        assert_eq!(unit.table(false)[1], 0x16 + 0x1C0);
    }

    #[test]
    fn grey_column_has_no_chroma() {
        let palette = MasterPalette::generate();
        let white = palette.get(0x30);
        assert_eq!(white.r, white.g);
        assert_eq!(white.g, white.b);
        assert_eq!(palette.get(0x0E), Color::BLACK);
        assert_eq!(palette.get(0x1F), Color::BLACK);
        assert_eq!(palette.as_slice().len(), MASTER_PALETTE_SIZE);
    }

    #[test]
    fn full_emphasis_darkens() {
        let palette = MasterPalette::generate();
        let plain = palette.get(0x20);
        let dark = palette.get(7 * COLORS_PER_EMPHASIS + 0x20);
        assert!(dark.r < plain.r);
        assert_eq!(palette.color(0x105, 0x100), palette.get(5));
    }

    proptest! {
        #[test]
        fn write_then_read_masks_value(offset in 0u16..0x20, value in any::<u8>()) {
            let mut unit = PaletteUnit::new(0);
            unit.write(offset, value);
            prop_assert_eq!(unit.read(offset, false), value & 0x3F);
            prop_assert_eq!(unit.read(offset, true), value & 0x30);
            prop_assert_eq!(unit.read(offset | 0x20, false), value & 0x3F);
        }
    }
}
