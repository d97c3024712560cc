//! Save-state snapshots.
//!
//! [`PpuState`] captures everything needed to resume emulation: registers,
//! latches, OAM, palette RAM, the timing engine and the frame buffer.
//! Host-side memory (pattern tables, nametables) is not included.

#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use super::{
    Ppu,
    palette::Pen,
    registers::{Control, Mask, Status, VramAddr},
};
use crate::{
    error::Error,
    mem_block::ppu::{OamRam, PaletteRam},
    scheduler::{Event, Scheduler},
    variant::ChipVariant,
};

/// Debug info captured on the first sprite-0 hit of a frame.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sprite0HitDebug {
    pub scanline: u16,
    pub x: u8,
    /// Sprite 0 OAM bytes (y, tile, attributes, x) at the time of the hit.
    pub oam: [u8; 4],
}

/// Serializable snapshot of one chip.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PpuState {
    pub variant: ChipVariant,
    pub control: u8,
    pub mask: u8,
    pub status: u8,
    pub sprite_address: u8,
    pub oam: OamRam,
    pub refresh_latch: u16,
    pub refresh_data: u16,
    pub videomem_addr: u16,
    pub x_fine: u8,
    pub toggle: bool,
    pub buffered_data: u8,
    pub data_latch: u8,
    pub palette_ram: PaletteRam,
    pub back_color: u8,
    pub scanline: u16,
    pub frame_count: u64,
    pub nmi_line: bool,
    pub scheduler: Scheduler,
    pub frame: Vec<Pen>,
    pub sprite0_hit_debug: Option<Sprite0HitDebug>,
}

#[cfg(feature = "savestate-postcard")]
impl PpuState {
    pub fn to_postcard_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(postcard::to_stdvec(self)?)
    }

    pub fn from_postcard_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Ok(postcard::from_bytes(bytes)?)
    }
}

impl Ppu {
    pub fn save_state(&self) -> PpuState {
        let regs = &self.registers;
        PpuState {
            variant: self.config.variant,
            control: regs.control.bits(),
            mask: regs.mask.bits(),
            status: regs.status.bits(),
            sprite_address: regs.sprite_address,
            oam: regs.oam.clone(),
            refresh_latch: regs.vram.refresh_latch.raw(),
            refresh_data: regs.vram.refresh_data.raw(),
            videomem_addr: regs.vram.videomem_addr,
            x_fine: regs.vram.x_fine,
            toggle: regs.vram.toggle,
            buffered_data: regs.buffered_data,
            data_latch: regs.data_latch,
            palette_ram: self.palette.ram().clone(),
            back_color: self.palette.back_color(),
            scanline: self.scanline,
            frame_count: self.frame_count,
            nmi_line: self.nmi_line,
            scheduler: self.scheduler,
            frame: self.frame.as_slice().to_vec(),
            sprite0_hit_debug: self.sprite0_hit_debug,
        }
    }

    /// Restores a snapshot taken with [`Ppu::save_state`].
    ///
    /// The snapshot must come from the same chip variant. The NMI level is
    /// restored internally; the host is expected to restore its own side.
    pub fn load_state(&mut self, state: &PpuState) -> Result<(), Error> {
        if state.variant != self.config.variant {
            return Err(Error::VariantMismatch {
                expected: self.config.variant,
                found: state.variant,
            });
        }
        if state.frame.len() != self.frame.as_slice().len() {
            return Err(Error::CorruptState("ppu frame size mismatch"));
        }
        if state.scanline >= self.config.scanlines_per_frame {
            return Err(Error::CorruptState("ppu scanline out of range"));
        }
        self.check_timers(&state.scheduler)?;

        let regs = &mut self.registers;
        regs.control = Control::from_bits_retain(state.control);
        regs.mask = Mask::from_bits_retain(state.mask);
        regs.status = Status::from_bits_retain(state.status);
        regs.sprite_address = state.sprite_address;
        regs.oam = state.oam.clone();
        regs.vram.refresh_latch = VramAddr::from(state.refresh_latch);
        regs.vram.refresh_data = VramAddr::from(state.refresh_data);
        regs.vram.videomem_addr = state.videomem_addr;
        regs.vram.x_fine = state.x_fine & 0x07;
        regs.vram.toggle = state.toggle;
        regs.buffered_data = state.buffered_data;
        regs.data_latch = state.data_latch;

        self.palette
            .restore(&state.palette_ram, state.back_color, regs.mask.emphasis());

        self.scanline = state.scanline;
        self.frame_count = state.frame_count;
        self.nmi_line = state.nmi_line;
        self.scheduler = state.scheduler;
        self.frame.restore(&state.frame);
        self.sprite0_hit_debug = state.sprite0_hit_debug;
        self.line_priority.clear();
        Ok(())
    }

    /// A restored chip only advances if its next scanline boundary is armed
    /// within one line of the snapshot clock; no timer may lie in the past.
    fn check_timers(&self, scheduler: &Scheduler) -> Result<(), Error> {
        let now = scheduler.now();
        match scheduler.deadline(Event::Scanline) {
            Some(at) if at >= now && at - now <= self.scanline_ticks() => {}
            _ => return Err(Error::CorruptState("ppu scanline timer not armed")),
        }
        let stale = Event::ALL
            .iter()
            .any(|&event| scheduler.deadline(event).is_some_and(|at| at < now));
        if stale {
            return Err(Error::CorruptState("ppu timer deadline in the past"));
        }
        Ok(())
    }
}
