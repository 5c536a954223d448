//! ROM images shared by the frontend tests.

use colorboy_gb::{Cartridge, GameBoy, MachineOptions};

/// 32 KiB ROM with a plain header and `program` at 0x0100.
pub fn rom_image(type_id: u8, ram_code: u8, program: &[u8]) -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    rom[0x100..0x100 + program.len()].copy_from_slice(program);
    rom[0x134..0x134 + 4].copy_from_slice(b"TEST");
    rom[0x147] = type_id;
    rom[0x149] = ram_code;
    rom
}

pub fn cartridge(type_id: u8, ram_code: u8, program: &[u8]) -> Cartridge {
    match Cartridge::new("roms/test.gb", &rom_image(type_id, ram_code, program)) {
        Ok(cart) => cart,
        Err(err) => panic!("cartridge rejected: {err}"),
    }
}

pub fn machine(cartridge: Cartridge) -> GameBoy {
    let options = MachineOptions::builder().skip_boot(true).build();
    match GameBoy::new(cartridge, options) {
        Ok(gb) => gb,
        Err(err) => panic!("machine rejected: {err}"),
    }
}

/// Skip-boot machine on a ROM of NOPs.
pub fn nop_machine() -> GameBoy {
    machine(cartridge(0x00, 0, &[]))
}
