//! Background layer, one scanline at a time.

use super::{
    frame::SCREEN_WIDTH,
    line_priority::{LinePriority, LinePriorityBuffer},
    palette::{PaletteUnit, Pen},
    registers::{Mask, VramAddr},
};
use crate::{bus::PpuBus, memory};

/// Tile fetches per line: 32 visible columns plus the partially scrolled
/// ones on either edge.
const TILE_FETCHES: usize = 34;
/// Left-edge column masked by the `SHOW_*_LEFT` bits.
pub(crate) const LEFT_COLUMN: usize = 8;

/// Inputs latched for one background line.
pub(crate) struct BackgroundLine<'a> {
    pub(crate) refresh: VramAddr,
    pub(crate) x_fine: u8,
    pub(crate) tile_page: u16,
    pub(crate) mask: Mask,
    pub(crate) palette: &'a PaletteUnit,
}

/// Attribute byte address covering the nametable entry at `index`.
#[inline]
fn attribute_addr(index: u16) -> u16 {
    (index & 0x3C00) | memory::ATTRIBUTE_OFFSET | ((index & 0x0380) >> 4) | ((index & 0x001F) >> 2)
}

/// Shift selecting the 2-bit group of the quadrant holding `index`.
#[inline]
fn attribute_shift(index: u16) -> u16 {
    ((index & 0x0040) >> 4) | (index & 0x0002)
}

/// Draws the background into `row` and records opaque pixels.
pub(crate) fn render<B: PpuBus + ?Sized>(
    line: &BackgroundLine<'_>,
    row: &mut [Pen],
    priority: &mut LinePriorityBuffer,
    bus: &mut B,
) {
    let mono = line.mask.monochrome();
    let table = line.palette.table(mono);
    let back_pen = line.palette.background_pen(mono);

    let fine_y = u16::from(line.refresh.fine_y());
    let mut column = u16::from(line.refresh.coarse_x());
    let mut row_base = (line.refresh.nametable_bits() | memory::NAMETABLE_BASE)
        + u16::from(line.refresh.coarse_y()) * 32;
    let mut start_x = i32::from(line.x_fine ^ 7) - 7;

    for _ in 0..TILE_FETCHES {
        let index = row_base + column;

        let attribute = bus.read(attribute_addr(index));
        let group = usize::from((attribute >> attribute_shift(index)) & 0x03);

        let tile = u16::from(bus.read(index));
        let pattern = line.tile_page + tile * memory::TILE_BYTES;
        bus.latch(pattern);
        let mut plane_lo = bus.read((pattern + fine_y) & memory::PATTERN_SPACE_MASK);
        let mut plane_hi =
            bus.read((pattern + fine_y + memory::PLANE_STRIDE) & memory::PATTERN_SPACE_MASK);

        if start_x < SCREEN_WIDTH as i32 {
            for _ in 0..8 {
                let pixel = ((plane_lo >> 7) & 1) | (((plane_hi >> 7) & 1) << 1);
                plane_lo <<= 1;
                plane_hi <<= 1;
                if (0..SCREEN_WIDTH as i32).contains(&start_x) {
                    let x = start_x as usize;
                    if pixel != 0 {
                        row[x] = table[group * 4 + usize::from(pixel)];
                        priority.mark(x, LinePriority::BACKGROUND);
                    } else {
                        row[x] = back_pen;
                    }
                }
                start_x += 1;
            }
        }

        column += 1;
        if column > 31 {
            column = 0;
            row_base ^= 0x0400;
        }
    }

    if !line.mask.contains(Mask::SHOW_BACKGROUND_LEFT) {
        for x in 0..LEFT_COLUMN {
            row[x] = back_pen;
            priority.unmark(x, LinePriority::BACKGROUND);
        }
    }
}
