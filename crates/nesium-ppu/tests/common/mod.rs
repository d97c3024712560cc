#![allow(dead_code)]

use ctor::ctor;
use nesium_ppu::{CpuBus, Ppu, PpuBus, ScanlineEvent};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[ctor]
fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_file(true)
        .with_line_number(true)
        .with_max_level(Level::DEBUG)
        .pretty()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

pub const CTRL: u16 = 0;
pub const MASK: u16 = 1;
pub const STATUS: u16 = 2;
pub const OAM_ADDR: u16 = 3;
pub const OAM_DATA: u16 = 4;
pub const SCROLL: u16 = 5;
pub const ADDR: u16 = 6;
pub const DATA: u16 = 7;

/// Host notifications in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Scanline(ScanlineEvent),
    Hblank(ScanlineEvent),
    Nmi(bool),
}

/// Flat 16 KiB video space recording every hook call.
#[derive(Debug, Clone)]
pub struct TestBus {
    pub vram: Vec<u8>,
    pub nmi: bool,
    pub latches: Vec<u16>,
    pub events: Vec<HostEvent>,
    /// XOR applied by the video-access hook.
    pub access_xor: u8,
}

impl Default for TestBus {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBus {
    pub fn new() -> Self {
        Self {
            vram: vec![0; 0x4000],
            nmi: false,
            latches: Vec::new(),
            events: Vec::new(),
            access_xor: 0,
        }
    }

    /// Stores a tile's two bitplanes (8 rows each) at `table + tile * 16`.
    pub fn set_tile(&mut self, table: u16, tile: u8, low: [u8; 8], high: [u8; 8]) {
        let base = usize::from(table) + usize::from(tile) * 16;
        self.vram[base..base + 8].copy_from_slice(&low);
        self.vram[base + 8..base + 16].copy_from_slice(&high);
    }

    /// Fills the 960 tile entries of nametable `nt` with `tile`.
    pub fn fill_nametable(&mut self, nt: u16, tile: u8) {
        let base = 0x2000 + usize::from(nt) * 0x400;
        self.vram[base..base + 0x3C0].fill(tile);
    }

    pub fn scanline_events(&self) -> Vec<ScanlineEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HostEvent::Scanline(ev) => Some(*ev),
                _ => None,
            })
            .collect()
    }
}

impl PpuBus for TestBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.vram[usize::from(addr & 0x3FFF)]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.vram[usize::from(addr & 0x3FFF)] = value;
    }

    fn latch(&mut self, addr: u16) {
        self.latches.push(addr);
    }

    fn video_access(&mut self, _addr: u16, value: u8) -> u8 {
        value ^ self.access_xor
    }

    fn set_nmi(&mut self, level: bool) {
        self.nmi = level;
        self.events.push(HostEvent::Nmi(level));
    }

    fn scanline(&mut self, event: ScanlineEvent) {
        self.events.push(HostEvent::Scanline(event));
    }

    fn hblank(&mut self, event: ScanlineEvent) {
        self.events.push(HostEvent::Hblank(event));
    }
}

/// 64 KiB CPU space with a cycle-debit counter.
#[derive(Debug, Clone)]
pub struct TestCpu {
    pub memory: Vec<u8>,
    pub reads: Vec<u16>,
    pub debited: u32,
}

impl Default for TestCpu {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCpu {
    pub fn new() -> Self {
        Self {
            memory: vec![0; 0x10000],
            reads: Vec::new(),
            debited: 0,
        }
    }
}

impl CpuBus for TestCpu {
    fn read(&mut self, addr: u16) -> u8 {
        self.reads.push(addr);
        self.memory[usize::from(addr)]
    }

    fn debit_cycles(&mut self, cycles: u32) {
        self.debited += cycles;
    }
}

/// Ticks one CPU cycle at a time until the counter reads `scanline`.
pub fn run_to_scanline(ppu: &mut Ppu, bus: &mut TestBus, scanline: u16) {
    while ppu.scanline() != scanline {
        ppu.tick(1, bus);
    }
}

/// Advances into vblank (scanline 241) if the counter is on a rendered line.
pub fn enter_vblank(ppu: &mut Ppu, bus: &mut TestBus) {
    if ppu.scanline() < 241 {
        run_to_scanline(ppu, bus, 241);
    }
}

pub fn set_vram_addr(ppu: &mut Ppu, bus: &mut TestBus, addr: u16) {
    ppu.write(ADDR, (addr >> 8) as u8, bus);
    ppu.write(ADDR, addr as u8, bus);
}

/// Writes `bytes` through `$2007` starting at `addr` (increment 1).
pub fn write_vram(ppu: &mut Ppu, bus: &mut TestBus, addr: u16, bytes: &[u8]) {
    set_vram_addr(ppu, bus, addr);
    for &b in bytes {
        ppu.write(DATA, b, bus);
    }
}

/// Loads OAM through `$2003`/`$2004` during vblank; unused entries are
/// parked off-screen.
pub fn load_oam(ppu: &mut Ppu, bus: &mut TestBus, sprites: &[[u8; 4]]) {
    enter_vblank(ppu, bus);
    ppu.write(OAM_ADDR, 0, bus);
    for i in 0..64 {
        let sprite = sprites.get(i).copied().unwrap_or([0xFF, 0, 0, 0]);
        for b in sprite {
            ppu.write(OAM_DATA, b, bus);
        }
    }
}

/// Clears the scroll: `$2006 = 0`, `$2005 = 0, 0`.
pub fn reset_scroll(ppu: &mut Ppu, bus: &mut TestBus) {
    ppu.read(STATUS, bus);
    set_vram_addr(ppu, bus, 0x0000);
    ppu.write(SCROLL, 0, bus);
    ppu.write(SCROLL, 0, bus);
}
