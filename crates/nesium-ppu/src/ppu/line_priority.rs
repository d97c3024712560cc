use bitflags::bitflags;

use super::frame::SCREEN_WIDTH;

bitflags! {
    /// Per-pixel ownership recorded while one scanline is composed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct LinePriority: u8 {
        /// A sprite already claimed this pixel (even if drawn behind).
        const SPRITE = 0b01;
        /// The background pixel is opaque.
        const BACKGROUND = 0b10;
    }
}

/// Transient 256-entry buffer, cleared at the start of every rendered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinePriorityBuffer([LinePriority; SCREEN_WIDTH]);

impl Default for LinePriorityBuffer {
    fn default() -> Self {
        Self([LinePriority::empty(); SCREEN_WIDTH])
    }
}

impl LinePriorityBuffer {
    pub(crate) fn clear(&mut self) {
        self.0.fill(LinePriority::empty());
    }

    #[inline]
    pub(crate) fn get(&self, x: usize) -> LinePriority {
        self.0[x]
    }

    #[inline]
    pub(crate) fn mark(&mut self, x: usize, flag: LinePriority) {
        self.0[x] |= flag;
    }

    #[inline]
    pub(crate) fn unmark(&mut self, x: usize, flag: LinePriority) {
        self.0[x].remove(flag);
    }

    #[inline]
    pub(crate) fn background_opaque(&self, x: usize) -> bool {
        self.0[x].contains(LinePriority::BACKGROUND)
    }
}
