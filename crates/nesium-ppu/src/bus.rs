//! Host-side interfaces the chip talks to.
//!
//! [`PpuBus`] is the video side: the 14-bit VRAM space plus the optional
//! hooks an arcade board wires up (bank-switch latch, NMI output, per-line
//! callbacks). [`CpuBus`] is the slice of the host CPU the OAM DMA helper
//! needs.

/// Snapshot passed to the per-scanline and hblank hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanlineEvent {
    /// Scanline counter at the time of the event.
    pub scanline: u16,
    /// `true` while the counter is inside the vertical blanking window.
    pub vblank: bool,
    /// `true` when neither background nor sprites are enabled.
    pub blanked: bool,
}

/// Video memory space and board hooks.
///
/// Only [`read`](PpuBus::read), [`write`](PpuBus::write) and
/// [`set_nmi`](PpuBus::set_nmi) are mandatory.
pub trait PpuBus {
    /// Reads one byte from the 14-bit VRAM space (`$0000-$3FFF`).
    fn read(&mut self, addr: u16) -> u8;

    /// Writes one byte into the 14-bit VRAM space.
    fn write(&mut self, addr: u16, value: u8);

    /// Called before a fetch so bank-switching boards can observe the
    /// address (tile pattern base or `$2007` target).
    fn latch(&mut self, addr: u16) {
        let _ = addr;
    }

    /// Lets the board rewrite a `$2007` value before it is stored.
    fn video_access(&mut self, addr: u16, value: u8) -> u8 {
        let _ = addr;
        value
    }

    /// Drives the NMI output line. Called with `true` when the interrupt is
    /// asserted and `false` when the line is released.
    fn set_nmi(&mut self, level: bool);

    /// Fires at every scanline boundary, before the line is rendered.
    fn scanline(&mut self, event: ScanlineEvent) {
        let _ = event;
    }

    /// Fires once per scanline at the start of horizontal blank.
    fn hblank(&mut self, event: ScanlineEvent) {
        let _ = event;
    }
}

// Allow `&mut dyn PpuBus` and `&mut T` to be passed wherever a bus is expected.
impl<T: PpuBus + ?Sized> PpuBus for &mut T {
    fn read(&mut self, addr: u16) -> u8 {
        (**self).read(addr)
    }

    fn write(&mut self, addr: u16, value: u8) {
        (**self).write(addr, value)
    }

    fn latch(&mut self, addr: u16) {
        (**self).latch(addr)
    }

    fn video_access(&mut self, addr: u16, value: u8) -> u8 {
        (**self).video_access(addr, value)
    }

    fn set_nmi(&mut self, level: bool) {
        (**self).set_nmi(level)
    }

    fn scanline(&mut self, event: ScanlineEvent) {
        (**self).scanline(event)
    }

    fn hblank(&mut self, event: ScanlineEvent) {
        (**self).hblank(event)
    }
}

/// CPU cycles stolen by a sprite DMA transfer.
pub const OAM_DMA_CYCLES: u32 = 513;

/// Host CPU access needed by [`crate::Ppu::oam_dma`].
pub trait CpuBus {
    /// Reads one byte from the CPU address space.
    fn read(&mut self, addr: u16) -> u8;

    /// Removes `cycles` from the CPU's remaining time slice.
    fn debit_cycles(&mut self, cycles: u32);
}

impl<T: CpuBus + ?Sized> CpuBus for &mut T {
    fn read(&mut self, addr: u16) -> u8 {
        (**self).read(addr)
    }

    fn debit_cycles(&mut self, cycles: u32) {
        (**self).debit_cycles(cycles)
    }
}
