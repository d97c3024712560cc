//! Scanline-accurate core for the 2C0x family of picture processing units
//! (RP2C02, RP2C03B, RP2C04, RC2C05-01..04, RP2C07).
//!
//! The crate owns the chip's registers, OAM, palette RAM and output bitmap.
//! Everything else is supplied by the host through [`PpuBus`] (video memory
//! space and board hooks) and [`CpuBus`] (sprite DMA source).
//!
//! ```no_run
//! use nesium_ppu::{ChipVariant, Ppu, PpuBus, PpuConfig};
//!
//! struct Board {
//!     vram: Vec<u8>,
//! }
//!
//! impl PpuBus for Board {
//!     fn read(&mut self, addr: u16) -> u8 {
//!         self.vram[usize::from(addr & 0x3FFF)]
//!     }
//!     fn write(&mut self, addr: u16, value: u8) {
//!         self.vram[usize::from(addr & 0x3FFF)] = value;
//!     }
//!     fn set_nmi(&mut self, _level: bool) {}
//! }
//!
//! let mut board = Board { vram: vec![0; 0x4000] };
//! let mut ppu = Ppu::new(PpuConfig::new(ChipVariant::Rc2C05_02));
//! // RC2C05 parts swap $2000/$2001: offset 0 reaches the mask register.
//! ppu.write(0, 0x1E, &mut board);
//! ppu.run_frame(&mut board);
//! let _pen = ppu.pixel(128, 120);
//! ```

pub mod bus;
pub mod config;
pub mod error;
pub mod mem_block;
pub mod memory;
pub mod ppu;
pub mod scheduler;
pub mod variant;

pub use bus::{CpuBus, OAM_DMA_CYCLES, PpuBus, ScanlineEvent};
pub use config::PpuConfig;
pub use error::Error;
pub use memory::Register;
pub use ppu::{
    Color, FrameBuffer, MasterPalette, Pen, Ppu, PpuState, SCREEN_HEIGHT, SCREEN_WIDTH,
    Sprite0HitDebug, Status, VramAddr,
};
pub use variant::{ChipVariant, VideoTiming};
