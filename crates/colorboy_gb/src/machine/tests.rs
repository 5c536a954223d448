use std::ops::ControlFlow;

use colorboy_common::key::Key;

use super::gpu::{Gpu, GpuEvents};
use super::keypad::Keypad;
use super::timer::Timer;
use super::*;
use crate::cpu::{Bus, BusFault, CpuError, Interrupt};
use crate::CYCLES_PER_FRAME;

/// Build a ROM image with a valid header. Every 16 KiB bank starts with its
/// own bank number (low byte) so bank switches are observable, and
/// `program` is placed at 0x0100.
fn rom_image(type_id: u8, rom_code: u8, ram_code: u8, program: &[u8]) -> Vec<u8> {
    let size = 0x8000usize << rom_code;
    let mut rom = vec![0u8; size];
    for (bank, chunk) in rom.chunks_mut(0x4000).enumerate() {
        chunk[0] = bank as u8;
        chunk[1] = (bank >> 8) as u8;
    }
    rom[0x100..0x100 + program.len()].copy_from_slice(program);
    rom[0x134..0x134 + 8].copy_from_slice(b"TESTCART");
    rom[0x147] = type_id;
    rom[0x148] = rom_code;
    rom[0x149] = ram_code;
    rom[0x14A] = 0x01;
    rom
}

fn cartridge(type_id: u8, rom_code: u8, ram_code: u8) -> Cartridge {
    match Cartridge::new("roms/test.gb", &rom_image(type_id, rom_code, ram_code, &[])) {
        Ok(cart) => cart,
        Err(err) => panic!("cartridge rejected: {err}"),
    }
}

fn machine(program: &[u8], options: MachineOptions) -> GameBoy {
    machine_with_rom(rom_image(0x00, 0, 0, program), options)
}

fn machine_with_rom(rom: Vec<u8>, options: MachineOptions) -> GameBoy {
    let cart = match Cartridge::new("roms/test.gb", &rom) {
        Ok(cart) => cart,
        Err(err) => panic!("cartridge rejected: {err}"),
    };
    match GameBoy::new(cart, options) {
        Ok(gb) => gb,
        Err(err) => panic!("machine rejected: {err}"),
    }
}

fn step_ok(gb: &mut GameBoy) -> u32 {
    match gb.step() {
        Ok(cycles) => cycles,
        Err(err) => panic!("unexpected CPU error: {err}"),
    }
}

fn skip_boot(color: bool) -> MachineOptions {
    MachineOptions::builder()
        .skip_boot(true)
        .color_mode(color)
        .build()
}

/// Enable RAM and fill every bank with `value`. The 0x6000 write puts MBC1
/// into RAM banking mode and is ignored by the other controllers.
fn fill_ram(cart: &mut Cartridge, banks: u8, value: u8) {
    cart.write(0x0000, 0x0A);
    cart.write(0x6000, 0x01);
    for bank in 0..banks {
        cart.write(0x4000, bank);
        for addr in 0xA000..=0xBFFFu16 {
            cart.write(addr, value);
        }
    }
}

// --- MMU -----------------------------------------------------------------

#[test]
fn shadow_ram_mirrors_working_ram() {
    let mut mmu = Mmu::new();
    mmu.write8(0xC123, 0x42);
    assert_eq!(mmu.read8(0xE123), 0x42);

    mmu.write8(0xFD00, 0x99);
    assert_eq!(mmu.read8(0xDD00), 0x99);
}

#[test]
fn boot_rom_overlays_until_ff50_is_written() {
    let mut mmu = Mmu::new();
    assert!(mmu.load_boot_rom(&[0xAA; 0x100]).is_ok());
    mmu.load_cartridge(cartridge(0x00, 0, 0));

    assert!(mmu.in_boot_mode());
    assert_eq!(mmu.read8(0x0000), 0xAA);
    assert_eq!(mmu.read8(0x00FF), 0xAA);
    // Header lives above the overlay.
    assert_eq!(mmu.read8(0x0134), b'T');

    mmu.write8(0xFF50, 0x00);
    assert!(mmu.in_boot_mode());
    assert!(!mmu.take_boot_completed());

    mmu.write8(0xFF50, 0x01);
    assert!(!mmu.in_boot_mode());
    assert!(mmu.take_boot_completed());
    assert!(!mmu.take_boot_completed());
    assert_eq!(mmu.read8(0x0000), 0x00);
}

#[test]
fn oversized_boot_rom_is_rejected() {
    let mut mmu = Mmu::new();
    assert_eq!(
        mmu.load_boot_rom(&[0; 0x101]),
        Err(MmuError::BootRomTooLarge(0x101))
    );
}

#[test]
fn routed_addresses_reach_the_peripheral() {
    let mut mmu = Mmu::new();

    // Unrouted VRAM has no owner.
    mmu.write8(0x8000, 0x12);
    assert_eq!(mmu.read8(0x8000), 0x00);

    mmu.connect_peripheral(Port::Gpu, 0x8000, 0x9FFF);
    mmu.write8(0x8000, 0x12);
    mmu.write8(0x9FFF, 0x34);
    assert_eq!(mmu.read8(0x8000), 0x12);
    assert_eq!(mmu.read8(0x9FFF), 0x34);

    mmu.connect_peripheral_on(Port::Timer, &[0xFF06]);
    mmu.write8(0xFF06, 0x77);
    assert_eq!(mmu.read8(0xFF06), 0x77);
}

#[test]
fn rom_write_without_cartridge_faults_after_boot() {
    let mut mmu = Mmu::new();
    mmu.write8(0x2000, 0x01);
    assert_eq!(mmu.take_fault(), None);

    mmu.set_in_boot_mode(false);
    mmu.write8(0x2000, 0x01);
    assert_eq!(
        mmu.take_fault(),
        Some(BusFault::RomWrite {
            addr: 0x2000,
            value: 0x01
        })
    );
    assert_eq!(mmu.take_fault(), None);
}

#[test]
fn unmapped_reads_return_zero() {
    let mut mmu = Mmu::new();
    mmu.set_in_boot_mode(false);
    assert_eq!(mmu.read8(0x0150), 0x00);
    assert_eq!(mmu.read8(0xA000), 0x00);
    assert_eq!(mmu.read8(0xFEA0), 0x00);
}

#[test]
fn interrupt_flag_is_masked() {
    let mut mmu = Mmu::new();
    mmu.write8(0xFF0F, 0x01);
    assert_eq!(mmu.read8(0xFF0F), 0xE1);
    mmu.write8(0xFF0F, 0xFF);
    assert_eq!(mmu.read8(0xFF0F), 0xFF);

    mmu.write8(0xFF0F, 0x00);
    mmu.request_interrupt(Interrupt::TIMER | Interrupt::JOYPAD);
    assert_eq!(mmu.read8(0xFF0F), 0xE0 | 0x14);
}

#[test]
fn key1_reads_zero_on_dmg_hardware() {
    let mut mmu = Mmu::new();
    mmu.write8(0xFF4D, 0x01);
    assert_eq!(mmu.read8(0xFF4D), 0x00);
    mmu.set_color(true);
    assert_eq!(mmu.read8(0xFF4D), 0x01);
}

#[test]
fn key1_speed_bit_is_read_only_to_the_bus() {
    let mut mmu = Mmu::new();
    mmu.set_color(true);
    mmu.set_double_speed(true);
    assert_eq!(mmu.read8(0xFF4D), 0x80);

    // Arming a switch back keeps the current-speed bit.
    mmu.write8(0xFF4D, 0x01);
    assert_eq!(mmu.read8(0xFF4D), 0x81);
    mmu.write8(0xFF4D, 0xFE);
    assert_eq!(mmu.read8(0xFF4D), 0x80);

    mmu.write8(0xFF4D, 0x01);
    mmu.set_double_speed(false);
    assert_eq!(mmu.read8(0xFF4D), 0x00);
}

#[test]
fn wram_banks_switch_on_color_hardware() {
    let mut mmu = Mmu::new();
    mmu.set_color(true);

    mmu.write8(0xFF70, 0x02);
    mmu.write8(0xD000, 0x11);
    mmu.write8(0xC000, 0x22);
    mmu.write8(0xFF70, 0x03);
    assert_eq!(mmu.read8(0xD000), 0x00);
    assert_eq!(mmu.read8(0xC000), 0x22);

    mmu.write8(0xFF70, 0x02);
    assert_eq!(mmu.read8(0xD000), 0x11);
    assert_eq!(mmu.read8(0xF000), 0x11);

    // Bank 0 selects bank 1.
    mmu.write8(0xFF70, 0x00);
    assert_eq!(mmu.read8(0xFF70), 0xF9);
}

#[test]
fn oam_dma_copies_a_page() {
    let mut mmu = Mmu::new();
    mmu.connect_peripheral(Port::Gpu, 0xFE00, 0xFE9F);
    for i in 0..0xA0u16 {
        mmu.write8(0xC100 + i, i as u8 ^ 0x5A);
    }
    mmu.write8(0xFF46, 0xC1);
    for i in 0..0xA0u16 {
        assert_eq!(mmu.read8(0xFE00 + i), i as u8 ^ 0x5A, "OAM byte {i}");
    }
    assert_eq!(mmu.read8(0xFF46), 0xC1);
}

fn hdma_mmu() -> Mmu {
    let mut mmu = Mmu::new();
    mmu.set_color(true);
    mmu.connect_peripheral(Port::Gpu, 0x8000, 0x9FFF);
    mmu.connect_peripheral(Port::Gpu, 0xFF40, 0xFF45);
    for i in 0..0x40u16 {
        mmu.write8(0xC000 + i, 0x80 | i as u8);
    }
    mmu.write8(0xFF51, 0xC0);
    mmu.write8(0xFF52, 0x00);
    mmu.write8(0xFF53, 0x01);
    mmu.write8(0xFF54, 0x00);
    mmu
}

#[test]
fn general_purpose_hdma_copies_immediately() {
    let mut mmu = hdma_mmu();
    mmu.write8(0xFF55, 0x01);
    for i in 0..0x20u16 {
        assert_eq!(mmu.read8(0x8100 + i), 0x80 | i as u8);
    }
    assert_eq!(mmu.read8(0x8120), 0x00);
    assert_eq!(mmu.read8(0xFF55), 0xFF);
}

#[test]
fn hblank_hdma_copies_one_block_per_line() {
    let mut mmu = hdma_mmu();
    mmu.write8(0xFF40, 0x80);
    mmu.write8(0xFF55, 0x81);
    assert_eq!(mmu.read8(0xFF55), 0x01);
    assert_eq!(mmu.read8(0x8100), 0x00);

    // OAM search plus pixel transfer reaches HBlank.
    mmu.step_peripherals(252, 1);
    assert_eq!(mmu.read8(0x8100), 0x80);
    assert_eq!(mmu.read8(0x8110), 0x00);
    assert_eq!(mmu.read8(0xFF55), 0x00);

    mmu.step_peripherals(456, 1);
    assert_eq!(mmu.read8(0x8110), 0x90);
    assert_eq!(mmu.read8(0xFF55), 0xFF);
}

#[test]
fn hblank_hdma_can_be_cancelled() {
    let mut mmu = hdma_mmu();
    mmu.write8(0xFF40, 0x80);
    mmu.write8(0xFF55, 0x83);
    mmu.step_peripherals(252, 1);
    mmu.write8(0xFF55, 0x00);
    assert_eq!(mmu.read8(0xFF55), 0x82);

    mmu.step_peripherals(456, 1);
    assert_eq!(mmu.read8(0x8110), 0x00);
}

// --- Cartridge -----------------------------------------------------------

#[test]
fn header_fields_are_decoded() {
    let mut rom = rom_image(0x1B, 2, 3, &[]);
    rom[0x143] = 0x80;
    rom[0x14A] = 0x00;
    let cart = match Cartridge::new("/games/Pocket Thing.gbc", &rom) {
        Ok(cart) => cart,
        Err(err) => panic!("cartridge rejected: {err}"),
    };

    assert_eq!(cart.title(), "TESTCART");
    assert_eq!(cart.kind(), CartridgeType::Mbc5);
    assert!(cart.has_battery());
    assert!(cart.has_ram());
    assert!(cart.is_color());
    assert_eq!(cart.header().rom_size, 128 * 1024);
    assert_eq!(cart.header().ram_size, 32 * 1024);
    assert!(cart.header().is_japanese);
    assert_eq!(cart.save_id(), "Pocket Thing.gbc.sav");
}

#[test]
fn bad_headers_are_rejected() {
    assert_eq!(
        Cartridge::new("x.gb", &[0; 0x4000]).err(),
        Some(CartridgeError::TooSmall { len: 0x4000 })
    );
    assert_eq!(
        Cartridge::new("x.gb", &rom_image(0x20, 0, 0, &[])).err(),
        Some(CartridgeError::UnknownType(0x20))
    );

    let mut rom = rom_image(0x00, 0, 0, &[]);
    rom[0x148] = 0x07;
    assert_eq!(
        Cartridge::new("x.gb", &rom).err(),
        Some(CartridgeError::UnsupportedRomSize(0x07))
    );
}

#[test]
fn mbc0_ignores_control_writes() {
    let mut cart = cartridge(0x00, 0, 0);
    assert_eq!(cart.read(0x4000), 1);
    cart.write(0x2000, 0x00);
    assert_eq!(cart.read(0x4000), 1);
    assert!(!cart.has_ram());
}

#[test]
fn mbc1_switches_rom_banks() {
    let mut cart = cartridge(0x01, 5, 0);
    assert_eq!(cart.read(0x0000), 0);
    assert_eq!(cart.read(0x4000), 1);

    cart.write(0x2000, 0x05);
    assert_eq!(cart.read(0x4000), 5);

    // Zero maps to one.
    cart.write(0x2000, 0x00);
    assert_eq!(cart.read(0x4000), 1);

    // Upper bits extend the bank in mode 0 ...
    cart.write(0x4000, 0x01);
    assert_eq!(cart.read(0x4000), 33);

    // ... and stop doing so in mode 1.
    cart.write(0x6000, 0x01);
    assert_eq!(cart.read(0x4000), 1);
}

#[test]
fn mbc1_rom_bank_wraps_to_rom_size() {
    let mut cart = cartridge(0x01, 1, 0);
    cart.write(0x2000, 0x06);
    assert_eq!(cart.read(0x4000), 2);
}

#[test]
fn mbc1_ram_banking_follows_mode() {
    let mut cart = cartridge(0x03, 1, 3);

    // Disabled RAM reads zero and drops writes.
    cart.write(0xA000, 0x55);
    assert_eq!(cart.read(0xA000), 0x00);

    cart.write(0x0000, 0x0A);
    cart.write(0xA000, 0x55);
    assert_eq!(cart.read(0xA000), 0x55);

    // Mode 0 keeps RAM on bank 0 regardless of the upper bits.
    cart.write(0x4000, 0x02);
    assert_eq!(cart.read(0xA000), 0x55);

    cart.write(0x6000, 0x01);
    assert_eq!(cart.read(0xA000), 0x00);
    cart.write(0xA000, 0x66);

    cart.write(0x4000, 0x00);
    assert_eq!(cart.read(0xA000), 0x55);
    cart.write(0x4000, 0x02);
    assert_eq!(cart.read(0xA000), 0x66);

    cart.write(0x0000, 0x00);
    assert_eq!(cart.read(0xA000), 0x00);
}

#[test]
fn mbc3_uses_seven_bit_rom_bank() {
    let mut cart = cartridge(0x13, 6, 3);
    cart.write(0x2000, 0x7F);
    assert_eq!(cart.read(0x4000), 0x7F);
    cart.write(0x2000, 0x80);
    assert_eq!(cart.read(0x4000), 1);

    cart.write(0x0000, 0x0A);
    cart.write(0x4000, 0x03);
    cart.write(0xBFFF, 0x33);
    cart.write(0x4000, 0x01);
    assert_eq!(cart.read(0xBFFF), 0x00);
    cart.write(0x4000, 0x03);
    assert_eq!(cart.read(0xBFFF), 0x33);
}

#[test]
fn mbc5_allows_bank_zero_and_nine_bits() {
    let mut cart = cartridge(0x1B, 6, 4);
    cart.write(0x2000, 0x00);
    assert_eq!(cart.read(0x4000), 0);

    cart.write(0x2000, 0x42);
    assert_eq!(cart.read(0x4000), 0x42);

    // Bit 8 selects past the 128 banks of a 2 MiB image and wraps.
    cart.write(0x3000, 0x01);
    assert_eq!(cart.read(0x4000), 0x42);
    cart.write(0x3000, 0x00);
    assert_eq!(cart.read(0x4000), 0x42);

    cart.write(0x0000, 0x0A);
    cart.write(0x4000, 0x0F);
    cart.write(0xA000, 0xF0);
    cart.write(0x4000, 0x00);
    assert_eq!(cart.read(0xA000), 0x00);
    cart.write(0x4000, 0x0F);
    assert_eq!(cart.read(0xA000), 0xF0);
}

// --- Saves ---------------------------------------------------------------

fn saved(cart: &Cartridge) -> Vec<u8> {
    let mut out = Vec::new();
    if let Err(err) = cart.save_ram(&mut out) {
        panic!("save failed: {err}");
    }
    out
}

fn read_all(cart: &mut Cartridge, banks: u8) -> Vec<u8> {
    cart.write(0x0000, 0x0A);
    cart.write(0x6000, 0x01);
    let mut out = Vec::new();
    for bank in 0..banks {
        cart.write(0x4000, bank);
        out.extend((0xA000..=0xBFFFu16).map(|addr| cart.read(addr)));
    }
    out
}

#[test]
fn save_round_trips_all_ones() {
    let mut source = cartridge(0x1B, 1, 3);
    fill_ram(&mut source, 16, 0xFF);
    let doc = saved(&source);

    let mut target = cartridge(0x1B, 1, 3);
    assert!(target.load_ram(doc.as_slice()).is_ok());
    assert!(read_all(&mut target, 16).iter().all(|&b| b == 0xFF));
}

#[test]
fn save_round_trips_zeros() {
    let source = cartridge(0x03, 1, 3);
    let doc = saved(&source);

    let mut target = cartridge(0x03, 1, 3);
    fill_ram(&mut target, 4, 0x12);
    assert!(target.load_ram(doc.as_slice()).is_ok());
    assert!(read_all(&mut target, 4).iter().all(|&b| b == 0x00));
}

#[test]
fn save_document_has_expected_shape() {
    let doc = saved(&cartridge(0x13, 1, 3));
    let json: serde_json::Value = match serde_json::from_slice(&doc) {
        Ok(json) => json,
        Err(err) => panic!("save is not JSON: {err}"),
    };
    assert_eq!(json["NoOfBanks"], 4);
    assert_eq!(json["Banks"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["BankHashes"].as_array().map(Vec::len), Some(4));
    assert!(json["LastSaved"].as_str().is_some_and(|s| s.parse::<u64>().is_ok()));
}

fn tampered(doc: &[u8], edit: impl FnOnce(&mut serde_json::Value)) -> Vec<u8> {
    let mut json: serde_json::Value = match serde_json::from_slice(doc) {
        Ok(json) => json,
        Err(err) => panic!("save is not JSON: {err}"),
    };
    edit(&mut json);
    json.to_string().into_bytes()
}

#[test]
fn corrupted_hash_is_an_error() {
    let mut cart = cartridge(0x03, 1, 3);
    fill_ram(&mut cart, 4, 0x21);
    let doc = tampered(&saved(&cart), |json| {
        let hash = json["BankHashes"][2].as_u64().unwrap_or(0);
        json["BankHashes"][2] = serde_json::json!(hash ^ 1);
    });

    let mut target = cartridge(0x03, 1, 3);
    fill_ram(&mut target, 4, 0x77);
    match target.load_ram(doc.as_slice()) {
        Err(SaveError::HashMismatch { bank: 2, .. }) => {}
        other => panic!("expected hash mismatch, got {other:?}"),
    }
    // RAM is untouched by a failed load.
    assert!(read_all(&mut target, 4).iter().all(|&b| b == 0x77));
}

#[test]
fn bank_count_disagreements_are_errors() {
    let doc = saved(&cartridge(0x03, 1, 3));

    let lying = tampered(&doc, |json| json["NoOfBanks"] = serde_json::json!(3));
    assert!(matches!(
        cartridge(0x03, 1, 3).load_ram(lying.as_slice()),
        Err(SaveError::BankCountMismatch {
            declared: 3,
            actual: 4
        })
    ));

    // An MBC1 save does not fit an MBC5 cartridge.
    assert!(matches!(
        cartridge(0x1B, 1, 3).load_ram(doc.as_slice()),
        Err(SaveError::UnexpectedBankCount {
            expected: 16,
            actual: 4
        })
    ));

    let short = tampered(&doc, |json| json["BankHashes"] = serde_json::json!([1, 2]));
    assert!(matches!(
        cartridge(0x03, 1, 3).load_ram(short.as_slice()),
        Err(SaveError::HashCountMismatch { banks: 4, hashes: 2 })
    ));
}

#[test]
fn malformed_saves_are_errors() {
    let mut cart = cartridge(0x03, 1, 3);
    assert!(matches!(
        cart.load_ram(&b"not json"[..]),
        Err(SaveError::Json(_))
    ));

    let doc = tampered(&saved(&cart), |json| {
        json["Banks"][0] = serde_json::json!("***");
    });
    assert!(matches!(
        cart.load_ram(doc.as_slice()),
        Err(SaveError::Base64 { bank: 0, .. })
    ));
}

#[test]
fn saves_need_battery_backed_ram() {
    assert!(matches!(
        cartridge(0x02, 1, 3).save_ram(Vec::new()),
        Err(SaveError::NoBatteryRam)
    ));
    assert!(matches!(
        cartridge(0x03, 1, 0).save_ram(Vec::new()),
        Err(SaveError::NoBatteryRam)
    ));
}

// --- Timer ---------------------------------------------------------------

#[test]
fn div_counts_up_and_resets_on_write() {
    let mut timer = Timer::new();
    timer.step(255);
    assert_eq!(timer.read(0xFF04), 0x00);
    timer.step(1);
    assert_eq!(timer.read(0xFF04), 0x01);
    timer.write(0xFF04, 0xAB);
    assert_eq!(timer.read(0xFF04), 0x00);
}

#[test]
fn tima_overflow_reloads_and_interrupts() {
    let mut timer = Timer::new();
    timer.write(0xFF06, 0xAB);
    timer.write(0xFF05, 0xFF);
    // Enabled, 262144 Hz: one tick every 16 T-states.
    timer.write(0xFF07, 0x05);

    assert_eq!(timer.step(15), Interrupt::empty());
    assert_eq!(timer.read(0xFF05), 0xFF);

    assert_eq!(timer.step(1), Interrupt::empty());
    assert_eq!(timer.read(0xFF05), 0x00);

    assert_eq!(timer.step(3), Interrupt::empty());
    assert_eq!(timer.step(1), Interrupt::TIMER);
    assert_eq!(timer.read(0xFF05), 0xAB);
}

#[test]
fn disabled_timer_does_not_count() {
    let mut timer = Timer::new();
    timer.write(0xFF07, 0x01);
    timer.step(1024);
    assert_eq!(timer.read(0xFF05), 0x00);
    assert_eq!(timer.read(0xFF07), 0xF9);
}

#[test]
fn tac_frequencies() {
    for (tac, period) in [(0x04u8, 1024u32), (0x05, 16), (0x06, 64), (0x07, 256)] {
        let mut timer = Timer::new();
        timer.write(0xFF07, tac);
        timer.step(period * 3);
        assert_eq!(timer.read(0xFF05), 3, "TAC {tac:02X}");
    }
}

// --- Keypad --------------------------------------------------------------

#[test]
fn keypad_rows_are_active_low() {
    let mut keypad = Keypad::new();
    let handle = keypad.handle();
    handle.press(Button::Start);
    handle.press(Button::Up);

    keypad.write(0xFF00, 0x10);
    assert_eq!(keypad.read(0xFF00), 0xC0 | 0x10 | 0x07);

    keypad.write(0xFF00, 0x20);
    assert_eq!(keypad.read(0xFF00), 0xC0 | 0x20 | 0x0B);

    keypad.write(0xFF00, 0x30);
    assert_eq!(keypad.read(0xFF00), 0xFF);

    handle.release(Button::Start);
    keypad.write(0xFF00, 0x10);
    assert_eq!(keypad.read(0xFF00), 0xDF);
}

#[test]
fn new_presses_request_joypad_interrupt() {
    let mut keypad = Keypad::new();
    let handle = keypad.handle();
    assert_eq!(keypad.poll(), Interrupt::empty());

    handle.set(Button::A, true);
    assert_eq!(keypad.poll(), Interrupt::JOYPAD);
    // Held, not new.
    assert_eq!(keypad.poll(), Interrupt::empty());

    // Shared across threads through the handle.
    let remote = handle.clone();
    let joined = std::thread::spawn(move || remote.press(Button::Down)).join();
    assert!(joined.is_ok());
    assert_eq!(keypad.poll(), Interrupt::JOYPAD);
    assert_eq!(handle.pressed(), Button::A.mask() | Button::Down.mask());
}

#[test]
fn keys_map_to_buttons() {
    assert_eq!(Button::from_key(Key::Z), Some(Button::A));
    assert_eq!(Button::from_key(Key::X), Some(Button::B));
    assert_eq!(Button::from_key(Key::Backspace), Some(Button::Select));
    assert_eq!(Button::from_key(Key::Return), Some(Button::Start));
    assert_eq!(Button::from_key(Key::Left), Some(Button::Left));
    assert_eq!(Button::from_key(Key::Escape), None);
}

// --- GPU -----------------------------------------------------------------

#[test]
fn vblank_starts_after_144_lines() {
    let mut gpu = Gpu::new();
    assert_eq!(gpu.step(1000), GpuEvents::default());

    gpu.write(0xFF40, 0x80);
    assert_eq!(gpu.mode(), Mode::OamSearch);

    let events = gpu.step(144 * 456 - 1);
    assert!(!events.interrupts.contains(Interrupt::VBLANK));
    assert_eq!(gpu.ly(), 143);

    let events = gpu.step(1);
    assert!(events.interrupts.contains(Interrupt::VBLANK));
    assert_eq!(gpu.ly(), 144);
    assert_eq!(gpu.mode(), Mode::VBlank);
    assert_eq!(gpu.read(0xFF41) & 0x03, 1);

    // Lines 144..=153, then back to 0.
    gpu.step(10 * 456);
    assert_eq!(gpu.ly(), 0);
    assert_eq!(gpu.mode(), Mode::OamSearch);
}

#[test]
fn lyc_coincidence_raises_stat_once() {
    let mut gpu = Gpu::new();
    gpu.write(0xFF45, 2);
    gpu.write(0xFF41, 0x40);
    gpu.write(0xFF40, 0x80);

    let events = gpu.step(2 * 456 - 1);
    assert!(!events.interrupts.contains(Interrupt::LCD_STAT));
    let events = gpu.step(1);
    assert!(events.interrupts.contains(Interrupt::LCD_STAT));
    assert_eq!(gpu.read(0xFF41) & 0x04, 0x04);

    let events = gpu.step(100);
    assert!(!events.interrupts.contains(Interrupt::LCD_STAT));
}

#[test]
fn lcd_off_parks_ly_at_zero() {
    let mut gpu = Gpu::new();
    gpu.write(0xFF40, 0x80);
    gpu.step(5 * 456);
    assert_eq!(gpu.ly(), 5);

    gpu.write(0xFF40, 0x00);
    assert_eq!(gpu.ly(), 0);
    assert_eq!(gpu.read(0xFF41) & 0x03, 0);
    gpu.step(10_000);
    assert_eq!(gpu.ly(), 0);
}

#[test]
fn writing_ly_restarts_the_line_counter() {
    let mut gpu = Gpu::new();
    gpu.write(0xFF40, 0x80);
    gpu.step(7 * 456 + 100);
    gpu.write(0xFF44, 0x99);
    assert_eq!(gpu.ly(), 0);
    gpu.step(455);
    assert_eq!(gpu.ly(), 0);
}

#[test]
fn dmg_background_uses_bgp_shades() {
    let mut gpu = Gpu::new();
    // Tile 0, row 0: colour 3 across the row.
    gpu.write(0x8000, 0xFF);
    gpu.write(0x8001, 0xFF);
    gpu.write(0xFF47, 0xE4);
    gpu.write(0xFF40, 0x91);
    gpu.step(456);

    let screen = gpu.screen();
    assert_eq!(screen.pixel(0, 0), colorboy_common::Color::grey(0x00));
    // Row 1 of tile 0 is still colour 0.
    gpu.step(456);
    assert_eq!(gpu.screen().pixel(0, 1), colorboy_common::Color::grey(0xFF));
}

#[test]
fn cgb_palette_ram_auto_increments() {
    let mut gpu = Gpu::new();
    gpu.write(0xFF68, 0x80);
    gpu.write(0xFF69, 0x1F);
    gpu.write(0xFF69, 0x00);
    assert_eq!(gpu.read(0xFF68), 0xC2);

    gpu.write(0xFF68, 0x00);
    assert_eq!(gpu.read(0xFF69), 0x1F);

    gpu.set_color(true);
    gpu.write(0xFF40, 0x91);
    gpu.step(456);
    // Colour 0 of palette 0 is now pure red.
    assert_eq!(
        gpu.screen().pixel(10, 0),
        colorboy_common::Color::new_rgb(0xFF, 0, 0)
    );
}

// --- Machine -------------------------------------------------------------

#[test]
fn skip_boot_applies_post_boot_state() {
    let gb = machine(&[], skip_boot(false));
    let frame = gb.cpu_frame();

    assert_eq!(frame.regs.pc, 0x0100);
    assert_eq!(frame.regs.sp, 0xFFFE);
    assert_eq!(frame.regs.a, 0x01);
    assert_eq!(frame.regs.f, 0xB0);
    assert_eq!(frame.regs.bc(), 0x0013);
    assert_eq!(frame.regs.de(), 0x00D8);
    assert_eq!(frame.regs.hl(), 0x014D);

    assert_eq!(gb.peek(0xFF40), 0x91);
    assert_eq!(gb.peek(0xFF47), 0xFC);
    assert_eq!(gb.peek(0xFF48), 0xFF);
    assert_eq!(gb.peek(0xFF24), 0x77);
    assert_eq!(gb.peek(0xFFFF), 0x00);
    assert!(!gb.mmu.in_boot_mode());
    // The overlay is gone: cartridge bank 0 is visible.
    assert_eq!(gb.peek(0x0000), 0x00);
}

#[test]
fn color_mode_is_reported_in_a() {
    let gb = machine(&[], skip_boot(true));
    assert_eq!(gb.cpu.regs.a, 0x11);
    assert!(gb.mmu.is_color());
    // DMG cartridge: rendering stays monochrome.
    assert!(!gb.mmu.gpu.is_color());
}

#[test]
fn builtin_boot_program_hands_over_at_0x100() {
    let mut gb = machine(&[], MachineOptions::default());
    assert!(gb.mmu.in_boot_mode());
    assert_eq!(gb.cpu.regs.pc, 0x0000);

    let mut steps = 0;
    while gb.mmu.in_boot_mode() {
        step_ok(&mut gb);
        steps += 1;
        assert!(steps < 100_000, "boot program did not finish");
    }

    assert_eq!(gb.cpu.regs.pc, 0x0100);
    assert_eq!(gb.cpu.regs.a, 0x11);
    assert_eq!(gb.cpu.regs.sp, 0xFFFE);
    assert_eq!(gb.peek(0xFF40), 0x91);
    assert_eq!(gb.peek(0xFF47), 0xFC);
    assert!(gb.mmu.is_color());
    assert_eq!(gb.peek(0x0000), 0x00);
}

#[test]
fn external_boot_rom_is_used() {
    // LD A,$01 ; LDH ($50),A
    let image = vec![0x3E, 0x01, 0xE0, 0x50];
    let options = MachineOptions::builder()
        .color_mode(false)
        .boot_rom(image)
        .build();
    let mut gb = machine(&[], options);
    step_ok(&mut gb);
    step_ok(&mut gb);
    assert!(!gb.mmu.in_boot_mode());
    assert_eq!(gb.cpu.regs.pc, 0x0100);
    assert_eq!(gb.cpu.regs.a, 0x01);
}

#[test]
fn oversized_boot_rom_fails_machine_construction() {
    let options = MachineOptions::builder().boot_rom(vec![0; 0x200]).build();
    let cart = cartridge(0x00, 0, 0);
    assert!(matches!(
        GameBoy::new(cart, options),
        Err(MmuError::BootRomTooLarge(0x200))
    ));
}

#[test]
fn stop_switches_to_double_speed() {
    // LD A,$01 ; LDH ($4D),A ; STOP
    let program = [0x3E, 0x01, 0xE0, 0x4D, 0x10, 0x00];
    let mut gb = machine(&program, skip_boot(true));
    for _ in 0..3 {
        step_ok(&mut gb);
    }
    assert_eq!(gb.cpu.speed(), 2);
    assert_eq!(gb.peek(0xFF4D), 0x80);
    assert_eq!(gb.cpu.regs.pc, 0x0106);
}

#[test]
fn stop_switches_back_to_normal_speed() {
    // LD A,$01 ; LDH ($4D),A ; STOP ; LDH ($4D),A ; STOP
    let program = [0x3E, 0x01, 0xE0, 0x4D, 0x10, 0x00, 0xE0, 0x4D, 0x10, 0x00];
    let mut gb = machine(&program, skip_boot(true));
    for _ in 0..4 {
        step_ok(&mut gb);
    }
    assert_eq!(gb.cpu.speed(), 2);
    assert_eq!(gb.peek(0xFF4D), 0x81);

    step_ok(&mut gb);
    assert_eq!(gb.cpu.speed(), 1);
    assert_eq!(gb.peek(0xFF4D), 0x00);
}

#[test]
fn double_speed_halves_timer_input() {
    // LD A,$01 ; LDH ($4D),A ; STOP ; JR -2
    let program = [0x3E, 0x01, 0xE0, 0x4D, 0x10, 0x00, 0x18, 0xFE];
    let mut gb = machine(&program, skip_boot(true));
    for _ in 0..3 {
        step_ok(&mut gb);
    }
    gb.mmu.write8(0xFF04, 0);
    // 64 JRs at 12 T-states each: 768 CPU T-states, 384 timer ticks.
    for _ in 0..64 {
        step_ok(&mut gb);
    }
    assert_eq!(gb.peek(0xFF04), 0x01);
}

#[test]
fn unknown_opcode_is_fatal() {
    let mut gb = machine(&[0xD3], skip_boot(false));
    assert_eq!(
        gb.step(),
        Err(CpuError::UnknownOpcode {
            opcode: 0xD3,
            prefixed: false,
            pc: 0x0100
        })
    );
}

#[test]
fn step_frame_runs_a_frame_and_carries_over() {
    // JR -2
    let mut gb = machine(&[0x18, 0xFE], skip_boot(false));
    assert!(gb.step_frame().is_ok());

    let t = gb.clock().t();
    assert!(t >= u64::from(CYCLES_PER_FRAME));
    assert!(t < u64::from(CYCLES_PER_FRAME) + 12);
    assert!(gb.peek(0xFF0F) & Interrupt::VBLANK.bits() != 0);

    assert!(gb.step_frame().is_ok());
    let t = gb.clock().t();
    assert!(t >= 2 * u64::from(CYCLES_PER_FRAME));
    assert!(t < 2 * u64::from(CYCLES_PER_FRAME) + 12);
}

#[test]
fn step_frame_hook_can_break() {
    let mut gb = machine(&[0x18, 0xFE], skip_boot(false));
    let mut calls = 0;
    let flow = gb.step_frame_with(|_| {
        calls += 1;
        if calls > 10 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    assert_eq!(flow, Ok(ControlFlow::Break(())));
    assert_eq!(gb.clock().t(), 10 * 12);
}

#[test]
fn vblank_interrupt_is_serviced() {
    // EI ; JR -2 at 0x0100, and JR -2 parked on the VBlank vector.
    let mut rom = rom_image(0x00, 0, 0, &[0xFB, 0x18, 0xFE]);
    rom[0x40] = 0x18;
    rom[0x41] = 0xFE;
    let mut gb = machine_with_rom(rom, skip_boot(false));
    gb.mmu.write8(0xFFFF, Interrupt::VBLANK.bits());
    assert!(gb.step_frame().is_ok());

    assert_eq!(gb.cpu.regs.pc, 0x0040);
    assert!(!gb.cpu.ime);
    assert_eq!(gb.peek(0xFF0F) & Interrupt::VBLANK.bits(), 0);
    // Return address of the interrupted JR.
    let sp = gb.cpu.regs.sp;
    assert_eq!(sp, 0xFFFC);
    assert_eq!(gb.peek(sp), 0x01);
    assert_eq!(gb.peek(sp + 1), 0x01);
}

#[test]
fn keypad_handle_reaches_p1() {
    let mut gb = machine(&[0x18, 0xFE], skip_boot(false));
    let handle = gb.keypad_handle();
    gb.mmu.write8(0xFF00, 0x10);
    assert_eq!(gb.peek(0xFF00) & 0x0F, 0x0F);

    handle.press(Button::A);
    step_ok(&mut gb);
    assert_eq!(gb.peek(0xFF00) & 0x0F, 0x0E);
    assert!(gb.peek(0xFF0F) & Interrupt::JOYPAD.bits() != 0);
}

#[test]
fn reset_boots_again() {
    let mut gb = machine(&[0x18, 0xFE], skip_boot(false));
    gb.mmu.write8(0xC000, 0x42);
    assert!(gb.step_frame().is_ok());

    gb.reset();
    assert_eq!(gb.cpu.regs.pc, 0x0100);
    assert_eq!(gb.clock().t(), 0);
    assert_eq!(gb.peek(0xC000), 0x00);
    assert_eq!(gb.peek(0xFF40), 0x91);
    assert!(gb.cartridge().is_some());
}

#[test]
fn machine_save_requires_battery() {
    let gb = machine(&[], skip_boot(false));
    assert!(matches!(
        gb.save_ram(Vec::new()),
        Err(SaveError::NoBatteryRam)
    ));
}
