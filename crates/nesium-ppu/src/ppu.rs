//! 2C0x picture processing unit.
//!
//! The chip is driven from two directions: the host CPU reads and writes the
//! eight registers (plus OAM DMA), and the host loop advances time through
//! [`Ppu::tick`]. Rendering happens one whole scanline at a time at each
//! scanline boundary, so register writes become visible to the renderer at
//! the next boundary.

pub mod background;
pub mod dma;
pub mod frame;
pub(crate) mod line_priority;
pub mod palette;
pub mod registers;
pub mod savestate;
pub mod sprite;
pub mod timing;

pub use frame::{FrameBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use palette::{Color, MasterPalette, Pen};
pub use registers::{Control, Mask, Status, VramAddr};
pub use savestate::{PpuState, Sprite0HitDebug};

use crate::{
    bus::PpuBus,
    config::PpuConfig,
    memory::{self, Register},
    scheduler::Scheduler,
    variant::ChipVariant,
};
use line_priority::LinePriorityBuffer;
use palette::PaletteUnit;
use registers::Registers;
use sprite::SpriteView;
use timing::VISIBLE_SCANLINES;

/// Bits of the status register that survive a vblank-clearing read.
const STATUS_KEEP_ON_READ: u8 = 0x60;
/// Low status bits that float with the last driven bus value.
const STATUS_OPEN_BUS: u8 = 0x1F;
/// Status bits reported by protected revisions next to the security value.
const STATUS_PROTECTED: u8 = 0xC0;

/// One emulated 2C0x chip.
#[derive(Debug, Clone)]
pub struct Ppu {
    config: PpuConfig,
    registers: Registers,
    palette: PaletteUnit,
    frame: FrameBuffer,
    line_priority: LinePriorityBuffer,
    scheduler: Scheduler,
    /// Scanline counter, `0..scanlines_per_frame`.
    scanline: u16,
    frame_count: u64,
    /// Level last driven on the NMI output.
    nmi_line: bool,
    sprite0_hit_debug: Option<Sprite0HitDebug>,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new(PpuConfig::default())
    }
}

impl Ppu {
    pub fn new(config: PpuConfig) -> Self {
        let config = config.sanitized();
        let mut ppu = Self {
            config,
            registers: Registers::new(),
            palette: PaletteUnit::new(config.color_base),
            frame: FrameBuffer::new(),
            line_priority: LinePriorityBuffer::default(),
            scheduler: Scheduler::new(),
            scanline: 0,
            frame_count: 0,
            nmi_line: false,
            sprite0_hit_debug: None,
        };
        ppu.reset();
        tracing::debug!(config = %ppu.config, "ppu created");
        ppu
    }

    /// Returns the chip to its power-on register state.
    ///
    /// Registers, latches and palette RAM are cleared, the colour tables are
    /// rebuilt, the counter restarts at scanline 0 and every pending timer
    /// (including a delayed NMI) is cancelled. OAM and the frame buffer are
    /// left untouched. The NMI output is considered released; the host is
    /// not notified.
    pub fn reset(&mut self) {
        self.registers.reset();
        self.palette.reset();
        self.scanline = 0;
        self.frame_count = 0;
        self.nmi_line = false;
        self.sprite0_hit_debug = None;
        self.line_priority.clear();
        self.scheduler.cancel_all();
        let now = self.scheduler.now();
        self.schedule_line_timers(now);
    }

    fn register(&self, offset: u16) -> Register {
        if offset >= memory::REGISTER_COUNT {
            tracing::warn!(offset, "register offset outside the window, masking");
        }
        Register::from_offset(offset & memory::REGISTER_SELECT_MASK)
    }

    /// CPU read from register `offset` (masked into `0..8`).
    pub fn read<B: PpuBus + ?Sized>(&mut self, offset: u16, bus: &mut B) -> u8 {
        match self.register(offset) {
            Register::Status => self.read_status(bus),
            Register::SpriteData => {
                self.registers.data_latch =
                    self.registers.oam[usize::from(self.registers.sprite_address)];
            }
            Register::Data => self.read_data(bus),
            reg => tracing::trace!(?reg, "read from write-only register"),
        }
        self.registers.data_latch
    }

    /// CPU write of `value` to register `offset` (masked into `0..8`).
    pub fn write<B: PpuBus + ?Sized>(&mut self, offset: u16, value: u8, bus: &mut B) {
        let mut offset = offset;
        if offset >= memory::REGISTER_COUNT {
            tracing::warn!(offset, "register offset outside the window, masking");
            offset &= memory::REGISTER_SELECT_MASK;
        }
        // Protected parts have $2000 and $2001 swapped.
        if self.config.is_protected() && offset & 0x06 == 0 {
            offset ^= 1;
        }
        let reg = Register::from_offset(offset);
        tracing::trace!(?reg, value, scanline = self.scanline, "register write");

        match reg {
            Register::Control => self.registers.write_control(value),
            Register::Mask => {
                let mask = Mask::from_bits_retain(value);
                self.palette.set_emphasis(mask.emphasis());
                self.registers.mask = mask;
            }
            Register::Status => {}
            Register::SpriteAddr => self.registers.sprite_address = value,
            Register::SpriteData => self.write_sprite_data(value),
            Register::Scroll => self.registers.vram.write_scroll(value),
            Register::Addr => self.registers.vram.write_addr(value),
            Register::Data => self.write_data(value, bus),
        }

        self.registers.data_latch = value;
    }

    fn read_status<B: PpuBus + ?Sized>(&mut self, bus: &mut B) {
        let status = self.registers.status.bits();
        let value = if self.config.is_protected() {
            (status & STATUS_PROTECTED) | self.config.security_value
        } else {
            status | (self.registers.data_latch & STATUS_OPEN_BUS)
        };
        self.registers.data_latch = value;
        self.registers.vram.reset_toggle();

        if value & Status::VERTICAL_BLANK.bits() != 0 {
            self.registers.status =
                Status::from_bits_retain(status & STATUS_KEEP_ON_READ);
            self.release_nmi(bus);
        }
    }

    fn read_data<B: PpuBus + ?Sized>(&mut self, bus: &mut B) {
        let addr = self.registers.vram.bus_addr();
        bus.latch(addr);

        let value = if addr >= memory::PALETTE_BASE {
            let value = self.palette.read(addr, self.registers.mask.monochrome());
            self.registers.buffered_data = bus.read(addr & memory::NAMETABLE_MIRROR_MASK);
            value
        } else {
            let value = self.registers.buffered_data;
            self.registers.buffered_data = bus.read(addr);
            value
        };

        self.registers.data_latch = value;
        self.registers
            .vram
            .advance(self.registers.control.vram_increment());
    }

    fn write_data<B: PpuBus + ?Sized>(&mut self, value: u8, bus: &mut B) {
        let addr = self.registers.vram.bus_addr();
        bus.latch(addr);
        let value = bus.video_access(addr, value);

        if addr >= memory::PALETTE_BASE {
            self.palette.write(addr, value);
        } else {
            bus.write(addr, value);
        }

        self.registers
            .vram
            .advance(self.registers.control.vram_increment());
    }

    /// `$2004` write path, shared with sprite DMA.
    pub(crate) fn write_sprite_data(&mut self, value: u8) {
        let value = if self.scanline < VISIBLE_SCANLINES {
            tracing::trace!(scanline = self.scanline, "OAM write during rendering");
            0xFF
        } else {
            value
        };
        let addr = self.registers.sprite_address;
        self.registers.oam[usize::from(addr)] = value;
        self.registers.sprite_address = addr.wrapping_add(1);
        self.registers.data_latch = value;
    }

    pub(crate) fn record_sprite0_hit(&mut self, x: u8) {
        if self.sprite0_hit_debug.is_some() {
            return;
        }
        let sprite = SpriteView::new(&self.registers.oam[..4]);
        self.sprite0_hit_debug = Some(Sprite0HitDebug {
            scanline: self.scanline,
            x,
            oam: sprite.to_array(),
        });
    }

    pub fn config(&self) -> &PpuConfig {
        &self.config
    }

    pub fn variant(&self) -> ChipVariant {
        self.config.variant
    }

    pub fn color_base(&self) -> Pen {
        self.palette.color_base()
    }

    /// Current scanline counter.
    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    /// Frames completed since construction or the last reset.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Master-clock position of the timing engine.
    pub fn master_clock(&self) -> u64 {
        self.scheduler.now()
    }

    /// Level currently driven on the NMI output.
    pub fn nmi_line(&self) -> bool {
        self.nmi_line
    }

    /// Status register without the side effects of a CPU read.
    pub fn peek_status(&self) -> Status {
        self.registers.status
    }

    pub fn control(&self) -> Control {
        self.registers.control
    }

    pub fn mask(&self) -> Mask {
        self.registers.mask
    }

    pub fn oam(&self) -> &[u8] {
        &self.registers.oam
    }

    /// Raw palette RAM (32 bytes, 6 significant bits each).
    pub fn palette_ram(&self) -> &[u8] {
        self.palette.ram()
    }

    /// Pen at `(x, y)` of the current frame.
    pub fn pixel(&self, x: usize, y: usize) -> Pen {
        self.frame.pixel(x, y)
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Copies the current frame into a caller-owned bitmap; see
    /// [`FrameBuffer::render_into`].
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
        self.frame
            .render_into(dst, dst_width, dst_height, flip_x, flip_y, offset_x, offset_y);
    }

    pub fn refresh_latch(&self) -> VramAddr {
        self.registers.vram.refresh_latch
    }

    pub fn refresh_data(&self) -> VramAddr {
        self.registers.vram.refresh_data
    }

    /// `$2007` pointer.
    pub fn vram_addr(&self) -> u16 {
        self.registers.vram.videomem_addr
    }

    pub fn fine_x(&self) -> u8 {
        self.registers.vram.x_fine
    }

    /// Shared `$2005`/`$2006` write toggle; `true` after an odd number of writes.
    pub fn write_toggle(&self) -> bool {
        self.registers.vram.toggle
    }

    pub fn sprite_address(&self) -> u8 {
        self.registers.sprite_address
    }

    /// First sprite-0 hit of the current frame, if any.
    pub fn sprite0_hit_debug(&self) -> Option<Sprite0HitDebug> {
        self.sprite0_hit_debug
    }
}
