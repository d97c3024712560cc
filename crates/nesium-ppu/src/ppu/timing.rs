//! Scanline timing engine.
//!
//! Three timers drive the chip: the scanline boundary (render the line that
//! just finished, advance the counter, enter/leave vblank), horizontal blank
//! (host notification only) and the delayed NMI raised after vblank entry.
//! All of them live in the [`Scheduler`](crate::scheduler::Scheduler) and are
//! fired from [`Ppu::tick`].

use super::{
    Ppu, background,
    frame::SCREEN_HEIGHT,
    registers::{Mask, Status},
    sprite,
};
use crate::{
    bus::{PpuBus, ScanlineEvent},
    memory,
    scheduler::Event,
};

/// First scanline of vertical blank.
pub const VBLANK_START: u16 = 241;
/// Scanlines that produce pixels.
pub const VISIBLE_SCANLINES: u16 = SCREEN_HEIGHT as u16;
/// PPU dots per scanline.
pub const DOTS_PER_SCANLINE: u64 = 341;
/// Dot at which horizontal blank starts.
pub const HBLANK_DOT: u64 = 260;
/// CPU cycles between vblank entry and NMI assertion.
pub const NMI_DELAY_CPU_CYCLES: u64 = 4;

impl Ppu {
    /// Master-clock ticks per scanline.
    #[inline]
    pub(crate) fn scanline_ticks(&self) -> u64 {
        DOTS_PER_SCANLINE * self.config.timing.ppu_divider()
    }

    #[inline]
    fn hblank_ticks(&self) -> u64 {
        HBLANK_DOT * self.config.timing.ppu_divider()
    }

    /// Arms the per-line timers relative to `at`.
    pub(crate) fn schedule_line_timers(&mut self, at: u64) {
        let hblank = at + self.hblank_ticks();
        let next = at + self.scanline_ticks();
        self.scheduler.schedule(Event::Hblank, hblank);
        self.scheduler.schedule(Event::Scanline, next);
    }

    /// Advances emulated time by `cpu_cycles` host CPU cycles, firing every
    /// timer that falls due in deadline order.
    pub fn tick<B: PpuBus + ?Sized>(&mut self, cpu_cycles: u32, bus: &mut B) {
        let target =
            self.scheduler.now() + u64::from(cpu_cycles) * self.config.timing.cpu_divider();
        while let Some((event, at)) = self.scheduler.pop_due(target) {
            self.fire(event, at, bus);
        }
        self.scheduler.advance_to(target);
    }

    /// Fires timers until the frame counter advances, i.e. up to and
    /// including the wrap back to scanline 0.
    pub fn run_frame<B: PpuBus + ?Sized>(&mut self, bus: &mut B) {
        let frame = self.frame_count;
        while self.frame_count == frame {
            let Some(at) = self.scheduler.next_deadline() else {
                tracing::warn!("no timer armed, frame cannot advance");
                return;
            };
            while let Some((event, at)) = self.scheduler.pop_due(at) {
                self.fire(event, at, bus);
            }
        }
    }

    fn fire<B: PpuBus + ?Sized>(&mut self, event: Event, at: u64, bus: &mut B) {
        match event {
            Event::Scanline => self.on_scanline(at, bus),
            Event::Hblank => bus.hblank(self.scanline_event()),
            Event::Nmi => {
                tracing::trace!(scanline = self.scanline, "nmi asserted");
                self.nmi_line = true;
                bus.set_nmi(true);
            }
        }
    }

    pub(crate) fn scanline_event(&self) -> ScanlineEvent {
        let last = self.config.scanlines_per_frame - 1;
        ScanlineEvent {
            scanline: self.scanline,
            vblank: (VBLANK_START - 1..last).contains(&self.scanline),
            blanked: !self.registers.mask.rendering_enabled(),
        }
    }

    fn on_scanline<B: PpuBus + ?Sized>(&mut self, at: u64, bus: &mut B) {
        bus.scanline(self.scanline_event());

        if self.scanline < VISIBLE_SCANLINES {
            self.update_scanline(bus);
        }

        self.scanline += 1;
        let frame_lines = self.config.scanlines_per_frame;

        if self.scanline == VBLANK_START {
            self.registers.status.insert(Status::VERTICAL_BLANK);
            tracing::debug!(frame = self.frame_count, "vblank start");
            if self.registers.control.nmi_enabled() {
                let delay = NMI_DELAY_CPU_CYCLES * self.config.timing.cpu_divider();
                self.scheduler.schedule(Event::Nmi, at + delay);
            }
        }

        if self.scanline == frame_lines - 1 {
            self.registers.status.remove(
                Status::VERTICAL_BLANK | Status::SPRITE_ZERO_HIT | Status::SPRITE_OVERFLOW,
            );
            self.sprite0_hit_debug = None;
            self.release_nmi(bus);
        }

        if self.scanline >= frame_lines {
            if self.registers.mask.rendering_enabled() {
                self.registers.vram.refresh_data = self.registers.vram.refresh_latch;
            }
            self.scanline = 0;
            self.frame_count += 1;
            tracing::debug!(frame = self.frame_count, "frame start");
        }

        self.schedule_line_timers(at);
    }

    /// Drops the NMI output if it is currently asserted.
    pub(crate) fn release_nmi<B: PpuBus + ?Sized>(&mut self, bus: &mut B) {
        if self.nmi_line {
            self.nmi_line = false;
            bus.set_nmi(false);
        }
    }

    /// Produces the current visible row and steps the refresh counter.
    fn update_scanline<B: PpuBus + ?Sized>(&mut self, bus: &mut B) {
        let y = usize::from(self.scanline);
        let mask = self.registers.mask;

        if mask.rendering_enabled() {
            let latch = self.registers.vram.refresh_latch;
            self.registers.vram.refresh_data.copy_horizontal(latch);
            self.render_scanline(y, bus);
        } else {
            let mono = mask.monochrome();
            let videomem = self.registers.vram.videomem_addr;
            let pen = if videomem & memory::PALETTE_BASE == memory::PALETTE_BASE {
                self.palette.table(mono)[usize::from(videomem & memory::PALETTE_INDEX_MASK)]
            } else {
                self.palette.background_pen(mono)
            };
            self.frame.row_mut(y).fill(pen);
        }

        self.registers.vram.refresh_data.increment_y();
    }

    fn render_scanline<B: PpuBus + ?Sized>(&mut self, y: usize, bus: &mut B) {
        let mask = self.registers.mask;
        self.line_priority.clear();
        let row = self.frame.row_mut(y);

        if mask.contains(Mask::SHOW_BACKGROUND) {
            let line = background::BackgroundLine {
                refresh: self.registers.vram.refresh_data,
                x_fine: self.registers.vram.x_fine,
                tile_page: self.registers.control.tile_page(),
                mask,
                palette: &self.palette,
            };
            background::render(&line, row, &mut self.line_priority, bus);
        } else {
            row.fill(self.palette.background_pen(mask.monochrome()));
        }

        if !mask.contains(Mask::SHOW_SPRITES) {
            return;
        }

        let line = sprite::SpriteLine {
            scanline: self.scanline,
            control: self.registers.control,
            mask,
            palette: &self.palette,
            oam: &self.registers.oam,
        };
        let outcome = sprite::render(&line, row, &mut self.line_priority, bus);

        if outcome.overflow {
            self.registers.status.insert(Status::SPRITE_OVERFLOW);
        }
        if let Some(x) = outcome.sprite0_hit {
            self.registers.status.insert(Status::SPRITE_ZERO_HIT);
            self.record_sprite0_hit(x);
        }
    }
}
