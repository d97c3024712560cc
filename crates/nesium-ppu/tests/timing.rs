mod common;

use common::{CTRL, HostEvent, MASK, STATUS, TestBus, run_to_scanline};
use nesium_ppu::{ChipVariant, Ppu, PpuConfig, Status, config::MIN_SCANLINES_PER_FRAME};

#[test]
fn scanline_counter_visits_every_line_once_per_frame() {
    let mut ppu = Ppu::default();
    let mut bus = TestBus::new();
    ppu.run_frame(&mut bus);

    let lines: Vec<u16> = bus.scanline_events().iter().map(|e| e.scanline).collect();
    assert_eq!(lines, (0..262).collect::<Vec<_>>());
    assert_eq!(ppu.scanline(), 0);
    assert_eq!(ppu.frame_count(), 1);
    assert_eq!(ppu.master_clock(), 262 * 341 * 4);

    bus.events.clear();
    ppu.run_frame(&mut bus);
    let lines: Vec<u16> = bus.scanline_events().iter().map(|e| e.scanline).collect();
    assert_eq!(lines, (0..262).collect::<Vec<_>>());
}

#[test]
fn pal_frame_is_312_lines() {
    let mut ppu = Ppu::new(PpuConfig::new(ChipVariant::Rp2C07));
    let mut bus = TestBus::new();
    ppu.run_frame(&mut bus);
    assert_eq!(bus.scanline_events().len(), 312);
    assert_eq!(ppu.master_clock(), 312 * 341 * 5);
}

#[test]
fn custom_frame_length_is_honoured() {
    let mut ppu = Ppu::new(PpuConfig::default().with_scanlines_per_frame(270));
    let mut bus = TestBus::new();
    ppu.run_frame(&mut bus);
    assert_eq!(bus.scanline_events().len(), 270);
}

#[test]
fn zero_length_frame_from_struct_literal_is_clamped() {
    let config = PpuConfig {
        scanlines_per_frame: 0,
        ..PpuConfig::default()
    };
    let mut ppu = Ppu::new(config);
    let mut bus = TestBus::new();
    assert_eq!(ppu.config().scanlines_per_frame, MIN_SCANLINES_PER_FRAME);

    ppu.tick(200, &mut bus);
    ppu.run_frame(&mut bus);
    bus.events.clear();
    ppu.run_frame(&mut bus);
    assert_eq!(
        bus.scanline_events().len(),
        usize::from(MIN_SCANLINES_PER_FRAME)
    );
    assert_eq!(ppu.frame_count(), 2);
}

#[test]
fn vblank_flag_covers_its_window() {
    let mut ppu = Ppu::default();
    let mut bus = TestBus::new();
    let mut last = ppu.scanline();
    let mut seen = 0;
    while seen < 300 {
        ppu.tick(1, &mut bus);
        if ppu.scanline() != last {
            last = ppu.scanline();
            seen += 1;
            let vblank = ppu.peek_status().contains(Status::VERTICAL_BLANK);
            assert_eq!(vblank, (241..261).contains(&last), "scanline {last}");
        }
    }
}

#[test]
fn nmi_asserts_four_cpu_cycles_after_vblank_entry() {
    for variant in [ChipVariant::Rp2C02, ChipVariant::Rp2C07] {
        let mut ppu = Ppu::new(PpuConfig::new(variant));
        let mut bus = TestBus::new();
        ppu.write(CTRL, 0x80, &mut bus);

        while !ppu.peek_status().contains(Status::VERTICAL_BLANK) {
            ppu.tick(1, &mut bus);
        }
        assert_eq!(ppu.scanline(), 241);
        assert!(!bus.nmi, "{variant}: nmi must not fire at vblank entry");

        for _ in 0..3 {
            ppu.tick(1, &mut bus);
            assert!(!bus.nmi, "{variant}: nmi fired early");
        }
        ppu.tick(1, &mut bus);
        assert!(bus.nmi, "{variant}: nmi missing after 4 cycles");
        assert!(ppu.nmi_line());
    }
}

#[test]
fn nmi_disabled_stays_low() {
    let mut ppu = Ppu::default();
    let mut bus = TestBus::new();
    ppu.run_frame(&mut bus);
    assert!(!bus.events.iter().any(|e| matches!(e, HostEvent::Nmi(_))));
}

#[test]
fn status_read_in_vblank_clears_flag_and_releases_nmi() {
    let mut ppu = Ppu::default();
    let mut bus = TestBus::new();
    ppu.write(CTRL, 0x80, &mut bus);
    run_to_scanline(&mut ppu, &mut bus, 242);
    assert!(bus.nmi);

    let status = ppu.read(STATUS, &mut bus);
    assert_eq!(status & 0x80, 0x80);
    assert!(!bus.nmi);
    assert!(!ppu.nmi_line());
    assert!(!ppu.peek_status().contains(Status::VERTICAL_BLANK));
    assert_eq!(ppu.read(STATUS, &mut bus) & 0x80, 0);
}

#[test]
fn pre_render_line_clears_flags_and_nmi() {
    let mut ppu = Ppu::default();
    let mut bus = TestBus::new();
    ppu.write(CTRL, 0x80, &mut bus);
    run_to_scanline(&mut ppu, &mut bus, 260);
    assert!(bus.nmi);
    run_to_scanline(&mut ppu, &mut bus, 261);
    assert!(!bus.nmi);
    assert!(ppu.peek_status().is_empty());
}

#[test]
fn status_is_clean_after_reset() {
    let mut ppu = Ppu::default();
    let mut bus = TestBus::new();
    ppu.write(CTRL, 0x80, &mut bus);
    run_to_scanline(&mut ppu, &mut bus, 250);
    ppu.write(STATUS, 0xFF, &mut bus);

    ppu.reset();
    assert_eq!(ppu.read(STATUS, &mut bus), 0x00);
    assert_eq!(ppu.scanline(), 0);
}

#[test]
fn reset_cancels_delayed_nmi() {
    let mut ppu = Ppu::default();
    let mut bus = TestBus::new();
    ppu.write(CTRL, 0x80, &mut bus);
    while !ppu.peek_status().contains(Status::VERTICAL_BLANK) {
        ppu.tick(1, &mut bus);
    }
    ppu.reset();
    ppu.tick(200, &mut bus);
    assert!(!bus.nmi);
}

#[test]
fn hblank_fires_between_scanline_boundaries() {
    let mut ppu = Ppu::default();
    let mut bus = TestBus::new();
    ppu.run_frame(&mut bus);

    let timers: Vec<_> = bus
        .events
        .iter()
        .filter(|e| !matches!(e, HostEvent::Nmi(_)))
        .copied()
        .collect();
    for (line, pair) in timers.chunks_exact(2).enumerate() {
        let line = line as u16;
        match pair {
            [HostEvent::Hblank(h), HostEvent::Scanline(s)] => {
                assert_eq!(h.scanline, line);
                assert_eq!(s.scanline, line);
            }
            other => panic!("unexpected order at line {line}: {other:?}"),
        }
    }
}

#[test]
fn host_events_report_vblank_and_blanking() {
    let mut ppu = Ppu::default();
    let mut bus = TestBus::new();
    ppu.write(MASK, 0x08, &mut bus);
    ppu.run_frame(&mut bus);

    let events = bus.scanline_events();
    assert!(!events[239].vblank);
    assert!(events[240].vblank);
    assert!(events[260].vblank);
    assert!(!events[261].vblank);
    assert!(events.iter().all(|e| !e.blanked));

    bus.events.clear();
    ppu.write(MASK, 0x00, &mut bus);
    ppu.run_frame(&mut bus);
    assert!(bus.scanline_events().iter().all(|e| e.blanked));
}

#[test]
fn tick_in_large_steps_matches_single_steps() {
    let mut coarse = Ppu::default();
    let mut fine = Ppu::default();
    let mut bus_a = TestBus::new();
    let mut bus_b = TestBus::new();
    coarse.write(CTRL, 0x80, &mut bus_a);
    fine.write(CTRL, 0x80, &mut bus_b);

    coarse.tick(40_000, &mut bus_a);
    for _ in 0..40_000 {
        fine.tick(1, &mut bus_b);
    }
    assert_eq!(coarse.scanline(), fine.scanline());
    assert_eq!(coarse.master_clock(), fine.master_clock());
    assert_eq!(bus_a.events, bus_b.events);
}
