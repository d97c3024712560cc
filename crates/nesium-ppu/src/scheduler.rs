//! Deadline queue for the three chip timers.
//!
//! Time is counted in master-clock ticks so CPU cycles and PPU dots can be
//! mixed without rounding. The queue is tiny and fixed: one optional
//! deadline per [`Event`].

#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

/// Timers owned by the chip. Declaration order breaks deadline ties.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// Scanline boundary: render, advance the counter, update vblank.
    Scanline,
    /// Horizontal blank inside the current scanline.
    Hblank,
    /// Delayed NMI assertion after vblank entry.
    Nmi,
}

impl Event {
    pub const ALL: [Event; 3] = [Event::Scanline, Event::Hblank, Event::Nmi];

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Scheduler {
    /// Current master-clock position.
    now: u64,
    deadlines: [Option<u64>; 3],
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Arms `event` at the absolute tick `at`, replacing any earlier deadline.
    pub fn schedule(&mut self, event: Event, at: u64) {
        self.deadlines[event.index()] = Some(at);
    }

    pub fn cancel_all(&mut self) {
        self.deadlines = [None; 3];
    }

    pub fn deadline(&self, event: Event) -> Option<u64> {
        self.deadlines[event.index()]
    }

    pub fn is_pending(&self, event: Event) -> bool {
        self.deadline(event).is_some()
    }

    /// Earliest armed deadline, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.deadlines.iter().flatten().copied().min()
    }

    /// Removes and returns the earliest event due at or before `limit`,
    /// moving the clock to its deadline.
    pub fn pop_due(&mut self, limit: u64) -> Option<(Event, u64)> {
        let (event, at) = Event::ALL
            .iter()
            .filter_map(|&event| self.deadline(event).map(|at| (event, at)))
            .filter(|&(_, at)| at <= limit)
            .min_by_key(|&(event, at)| (at, event.index()))?;
        self.deadlines[event.index()] = None;
        self.now = self.now.max(at);
        Some((event, at))
    }

    /// Moves the clock forward without firing anything.
    pub fn advance_to(&mut self, at: u64) {
        self.now = self.now.max(at);
    }
}
