//! Sprite evaluation and drawing, one scanline at a time.

use bitflags::bitflags;

use super::{
    background::LEFT_COLUMN,
    frame::SCREEN_WIDTH,
    line_priority::{LinePriority, LinePriorityBuffer},
    palette::{PaletteUnit, Pen},
    registers::{Control, Mask},
};
use crate::{bus::PpuBus, memory};

/// Sprites the hardware can show on one scanline.
pub const MAX_SPRITES_PER_LINE: usize = 8;
/// OAM entries.
pub const SPRITE_COUNT: usize = 64;
/// X position at which sprite 0 reports its hit one scanline early.
const EARLY_HIT_X: u8 = 254;
/// First colour-table group used by sprites.
const SPRITE_PALETTE_GROUP: usize = 4;

bitflags! {
    /// Attribute bits stored in sprite byte 2.
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V H P . . . p p
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct SpriteAttributes: u8 {
        /// Sprite palette select (0..=3).
        const PALETTE = 0b0000_0011;
        /// Drawn behind opaque background pixels.
        const PRIORITY_BEHIND_BACKGROUND = 0b0010_0000;
        const FLIP_HORIZONTAL = 0b0100_0000;
        const FLIP_VERTICAL = 0b1000_0000;
    }
}

impl SpriteAttributes {
    #[inline]
    fn palette(self) -> usize {
        usize::from(self.bits() & Self::PALETTE.bits())
    }
}

/// Read-only view over one four-byte OAM entry (y, tile, attributes, x).
#[derive(Clone, Copy)]
pub(crate) struct SpriteView<'a> {
    bytes: &'a [u8],
}

impl<'a> SpriteView<'a> {
    const BYTES_PER_SPRITE: usize = 4;

    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        debug_assert_eq!(bytes.len(), Self::BYTES_PER_SPRITE);
        Self { bytes }
    }

    pub(crate) fn y(&self) -> u8 {
        self.bytes[0]
    }

    pub(crate) fn tile(&self) -> u8 {
        self.bytes[1]
    }

    pub(crate) fn attributes(&self) -> SpriteAttributes {
        SpriteAttributes::from_bits_retain(self.bytes[2])
    }

    pub(crate) fn x(&self) -> u8 {
        self.bytes[3]
    }

    pub(crate) fn to_array(&self) -> [u8; 4] {
        [self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]]
    }

    /// Iterates over all sprites in the given OAM slice.
    pub(crate) fn iter(oam: &'a [u8]) -> impl Iterator<Item = SpriteView<'a>> {
        oam.chunks_exact(Self::BYTES_PER_SPRITE).map(SpriteView::new)
    }
}

/// Inputs latched for one sprite line.
pub(crate) struct SpriteLine<'a> {
    pub(crate) scanline: u16,
    pub(crate) control: Control,
    pub(crate) mask: Mask,
    pub(crate) palette: &'a PaletteUnit,
    pub(crate) oam: &'a [u8],
}

/// Status side effects produced while drawing a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct SpriteLineOutcome {
    /// A ninth sprite intersected the line.
    pub(crate) overflow: bool,
    /// X of the first sprite-0 hit on this line.
    pub(crate) sprite0_hit: Option<u8>,
    /// Sprites that passed evaluation (at most eight).
    pub(crate) drawn: usize,
}

impl SpriteLineOutcome {
    fn hit(&mut self, x: u8) {
        self.sprite0_hit.get_or_insert(x);
    }
}

/// Draws up to eight sprites into `row`, in OAM order.
pub(crate) fn render<B: PpuBus + ?Sized>(
    line: &SpriteLine<'_>,
    row: &mut [Pen],
    priority: &mut LinePriorityBuffer,
    bus: &mut B,
) -> SpriteLineOutcome {
    let mut outcome = SpriteLineOutcome::default();
    let height = line.control.sprite_height();
    let first_pixel = if line.mask.contains(Mask::SHOW_SPRITES_LEFT) {
        0
    } else {
        LEFT_COLUMN
    };
    let table = line.palette.table(line.mask.monochrome());
    let scanline = line.scanline;

    for (index, sprite) in SpriteView::iter(line.oam).enumerate() {
        let mut top = u16::from(sprite.y()) + 1;
        let sprite_x = sprite.x();
        let sprite_zero = index == 0;

        // Sprite 0 parked at x=254 reports its hit on the line above.
        if sprite_zero && sprite_x == EARLY_HIT_X {
            top -= 1;
            if (top..top + height).contains(&scanline)
                && priority.background_opaque(usize::from(EARLY_HIT_X))
            {
                outcome.hit(EARLY_HIT_X);
            }
        }

        if top > scanline || top + height <= scanline {
            continue;
        }

        let attributes = sprite.attributes();
        let mut row_in_sprite = scanline - top;
        if attributes.contains(SpriteAttributes::FLIP_VERTICAL) {
            row_in_sprite = height - 1 - row_in_sprite;
        }

        let mut tile = u16::from(sprite.tile());
        let page = if height == 16 {
            let page = if tile & 1 != 0 {
                memory::PATTERN_TABLE_1
            } else {
                memory::PATTERN_TABLE_0
            };
            tile &= 0xFE;
            page
        } else {
            line.control.sprite_page()
        };
        // The board sees the sprite's base tile, even for the lower half of
        // a tall sprite.
        bus.latch(page + tile * memory::TILE_BYTES);
        if row_in_sprite > 7 {
            tile += 1;
            row_in_sprite -= 8;
        }

        let pattern = page + tile * memory::TILE_BYTES;
        let mut plane_lo = bus.read((pattern + row_in_sprite) & memory::PATTERN_SPACE_MASK);
        let mut plane_hi = bus.read(
            (pattern + row_in_sprite + memory::PLANE_STRIDE) & memory::PATTERN_SPACE_MASK,
        );

        if outcome.drawn == MAX_SPRITES_PER_LINE {
            outcome.overflow = true;
            break;
        }
        outcome.drawn += 1;

        let group = (attributes.palette() + SPRITE_PALETTE_GROUP) * 4;
        let behind = attributes.contains(SpriteAttributes::PRIORITY_BEHIND_BACKGROUND);
        let flip_h = attributes.contains(SpriteAttributes::FLIP_HORIZONTAL);

        for offset in 0..8usize {
            let pixel = if flip_h {
                let p = (plane_lo & 1) | ((plane_hi & 1) << 1);
                plane_lo >>= 1;
                plane_hi >>= 1;
                p
            } else {
                let p = ((plane_lo >> 7) & 1) | (((plane_hi >> 7) & 1) << 1);
                plane_lo <<= 1;
                plane_hi <<= 1;
                p
            };

            let x = usize::from(sprite_x) + offset;
            if x < first_pixel || x >= SCREEN_WIDTH || pixel == 0 {
                continue;
            }

            let claimed = priority.get(x);
            if behind {
                if claimed.is_empty() {
                    row[x] = table[group + usize::from(pixel)];
                }
            } else if !claimed.contains(LinePriority::SPRITE) {
                row[x] = table[group + usize::from(pixel)];
            }
            priority.mark(x, LinePriority::SPRITE);

            if sprite_zero && x < SCREEN_WIDTH - 1 && claimed.contains(LinePriority::BACKGROUND) {
                outcome.hit(x as u8);
            }
        }
    }

    outcome
}
