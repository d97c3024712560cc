use core::fmt;

#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use crate::{
    ppu::{Pen, timing::VBLANK_START},
    variant::{ChipVariant, VideoTiming},
};

/// Shortest frame that still has a vblank window before the pre-render line.
pub const MIN_SCANLINES_PER_FRAME: u16 = VBLANK_START + 2;

/// Construction-time configuration of one chip instance.
///
/// Defaults come from [`ChipVariant`]; the builder methods override single
/// values for boards that deviate from the stock part.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PpuConfig {
    pub variant: ChipVariant,
    /// Offset added to every pen written into the frame buffer.
    pub color_base: Pen,
    pub scanlines_per_frame: u16,
    /// Substituted into status reads; non-zero also swaps `$2000`/`$2001`.
    pub security_value: u8,
    pub timing: VideoTiming,
}

impl Default for PpuConfig {
    fn default() -> Self {
        Self::new(ChipVariant::default())
    }
}

impl PpuConfig {
    pub fn new(variant: ChipVariant) -> Self {
        Self {
            variant,
            color_base: 0,
            scanlines_per_frame: variant.scanlines_per_frame(),
            security_value: variant.security_value(),
            timing: variant.timing(),
        }
    }

    pub fn with_color_base(mut self, color_base: Pen) -> Self {
        self.color_base = color_base;
        self
    }

    /// Overrides the frame length. Values too short to hold a vblank window
    /// are raised to [`MIN_SCANLINES_PER_FRAME`].
    pub fn with_scanlines_per_frame(mut self, scanlines: u16) -> Self {
        self.scanlines_per_frame = clamp_scanlines(scanlines);
        self
    }

    pub fn with_security_value(mut self, security_value: u8) -> Self {
        self.security_value = security_value;
        self
    }

    pub fn with_timing(mut self, timing: VideoTiming) -> Self {
        self.timing = timing;
        self
    }

    #[inline]
    pub fn is_protected(&self) -> bool {
        self.security_value != 0
    }

    /// Brings fields set directly (bypassing the builder) back into range.
    pub(crate) fn sanitized(mut self) -> Self {
        self.scanlines_per_frame = clamp_scanlines(self.scanlines_per_frame);
        self
    }
}

fn clamp_scanlines(scanlines: u16) -> u16 {
    if scanlines < MIN_SCANLINES_PER_FRAME {
        tracing::warn!(
            scanlines,
            min = MIN_SCANLINES_PER_FRAME,
            "frame too short, clamping"
        );
    }
    scanlines.max(MIN_SCANLINES_PER_FRAME)
}

impl From<ChipVariant> for PpuConfig {
    fn from(variant: ChipVariant) -> Self {
        Self::new(variant)
    }
}

impl fmt::Display for PpuConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} lines, base={:#05X}, security={:#04X})",
            self.variant, self.scanlines_per_frame, self.color_base, self.security_value
        )
    }
}
