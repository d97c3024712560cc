//! Output bitmap.
//!
//! The chip writes one row of pens per visible scanline; rows are never
//! cleared otherwise, so a blanked display keeps its last contents until the
//! corresponding lines are redrawn.

use super::palette::{MasterPalette, Pen};

pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 240;
pub const SCREEN_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

/// 256x240 pen bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Box<[Pen]>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: vec![0; SCREEN_SIZE].into_boxed_slice(),
        }
    }

    /// Pen at `(x, y)`. Coordinates outside the bitmap wrap.
    pub fn pixel(&self, x: usize, y: usize) -> Pen {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            tracing::warn!(x, y, "pixel outside the 256x240 frame, wrapping");
        }
        self.pixels[(y % SCREEN_HEIGHT) * SCREEN_WIDTH + (x % SCREEN_WIDTH)]
    }

    pub fn as_slice(&self) -> &[Pen] {
        &self.pixels
    }

    pub fn row(&self, y: usize) -> &[Pen] {
        let start = (y % SCREEN_HEIGHT) * SCREEN_WIDTH;
        &self.pixels[start..start + SCREEN_WIDTH]
    }

    pub(crate) fn row_mut(&mut self, y: usize) -> &mut [Pen] {
        let start = (y % SCREEN_HEIGHT) * SCREEN_WIDTH;
        &mut self.pixels[start..start + SCREEN_WIDTH]
    }

    pub(crate) fn restore(&mut self, pixels: &[Pen]) {
        let len = pixels.len().min(SCREEN_SIZE);
        self.pixels[..len].copy_from_slice(&pixels[..len]);
    }

    /// Copies the frame into a caller-owned bitmap of `dst_width` x
    /// `dst_height` pens, optionally mirrored, placed at `(offset_x,
    /// offset_y)`. Pixels falling outside the destination are clipped.
    #[allow(clippy::too_many_arguments)]
    pub fn render_into(
        &self,
        dst: &mut [Pen],
        dst_width: usize,
        dst_height: usize,
        flip_x: bool,
        flip_y: bool,
        offset_x: i32,
        offset_y: i32,
    ) {
        if dst.len() < dst_width.saturating_mul(dst_height) {
            tracing::warn!(
                len = dst.len(),
                dst_width,
                dst_height,
                "destination smaller than its dimensions, clipping"
            );
        }
        let rows = dst.len().checked_div(dst_width).unwrap_or(0).min(dst_height);

        for sy in 0..SCREEN_HEIGHT {
            let Some(dy) = clip(offset_y, sy, rows) else {
                continue;
            };
            let src_y = if flip_y { SCREEN_HEIGHT - 1 - sy } else { sy };
            let src_row = self.row(src_y);
            let dst_row = &mut dst[dy * dst_width..(dy + 1) * dst_width];
            for sx in 0..SCREEN_WIDTH {
                let Some(dx) = clip(offset_x, sx, dst_width) else {
                    continue;
                };
                let src_x = if flip_x { SCREEN_WIDTH - 1 - sx } else { sx };
                dst_row[dx] = src_row[src_x];
            }
        }
    }

    /// Converts the frame to packed RGBA8888 through `palette`.
    pub fn to_rgba(&self, palette: &MasterPalette, color_base: Pen) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|&pen| palette.color(pen, color_base).to_rgba())
            .collect()
    }
}

/// Destination coordinate of source index `src` shifted by `offset`, if it
/// lands inside `0..limit`.
#[inline]
fn clip(offset: i32, src: usize, limit: usize) -> Option<usize> {
    let pos = i64::from(offset) + src as i64;
    usize::try_from(pos).ok().filter(|&pos| pos < limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered() -> FrameBuffer {
        let mut frame = FrameBuffer::new();
        for y in 0..SCREEN_HEIGHT {
            for (x, pen) in frame.row_mut(y).iter_mut().enumerate() {
                *pen = (y * SCREEN_WIDTH + x) as Pen;
            }
        }
        frame
    }

    #[test]
    fn render_into_copies_with_offset_and_clip() {
        let frame = numbered();
        let mut dst = vec![0xFFFF; 16 * 8];
        frame.render_into(&mut dst, 16, 8, false, false, -250, -2);
        // Source (250, 2) lands at (0, 0); x >= 6 falls off the source.
        assert_eq!(dst[0], 2 * 256 + 250);
        assert_eq!(dst[5], 2 * 256 + 255);
        assert_eq!(dst[6], 0xFFFF);
        assert_eq!(dst[16], 3 * 256 + 250);
    }

    #[test]
    fn render_into_survives_extreme_offsets() {
        let frame = numbered();
        let mut dst = vec![0xFFFF; 16];
        for (ox, oy) in [
            (i32::MAX, 0),
            (0, i32::MAX),
            (i32::MIN, 0),
            (0, i32::MIN),
            (i32::MAX, i32::MIN),
        ] {
            frame.render_into(&mut dst, 4, 4, false, false, ox, oy);
            assert!(dst.iter().all(|&p| p == 0xFFFF), "offset ({ox}, {oy})");
        }
        // Dimensions whose product overflows only copy what fits.
        frame.render_into(&mut dst, usize::MAX, usize::MAX, false, false, 0, 0);
        assert!(dst.iter().all(|&p| p == 0xFFFF));
        frame.render_into(&mut dst, 4, usize::MAX, false, false, 0, 0);
        assert_eq!(dst[..4], [0, 1, 2, 3]);
        assert_eq!(dst[12], 3 * 256);
    }

    #[test]
    fn render_into_flips_both_axes() {
        let frame = numbered();
        let mut dst = vec![0; SCREEN_SIZE];
        frame.render_into(&mut dst, SCREEN_WIDTH, SCREEN_HEIGHT, true, true, 0, 0);
        assert_eq!(dst[0], frame.pixel(255, 239));
        assert_eq!(dst[SCREEN_SIZE - 1], frame.pixel(0, 0));
    }

    #[test]
    fn rgba_conversion_uses_color_base() {
        let mut frame = FrameBuffer::new();
        frame.row_mut(0)[0] = 0x130;
        let palette = MasterPalette::generate();
        let rgba = frame.to_rgba(&palette, 0x100);
        assert_eq!(rgba.len(), SCREEN_SIZE * 4);
        assert_eq!(&rgba[..4], &palette.get(0x30).to_rgba());
    }
}
