//! Built-in boot program used when no boot ROM image is supplied.
//!
//! It does the minimum a cartridge relies on: set SP, clear VRAM, switch the
//! LCD on with the usual palette and unmap itself through FF50.

use super::mmu::BOOT_ROM_SIZE;

const PROGRAM: [u8; 24] = [
    0x31, 0xFE, 0xFF, // LD SP,$FFFE
    0xAF, //             XOR A
    0x21, 0xFF, 0x9F, // LD HL,$9FFF
    0x32, //             LD (HL-),A
    0xCB, 0x7C, //       BIT 7,H
    0x20, 0xFB, //       JR NZ,-5
    0x3E, 0x91, //       LD A,$91
    0xE0, 0x40, //       LDH ($40),A
    0x3E, 0xFC, //       LD A,$FC
    0xE0, 0x47, //       LDH ($47),A
    0x3E, 0x01, //       LD A,$01
    0xE0, 0x50, //       LDH ($50),A
];

/// The program padded to a full boot ROM image.
pub fn builtin_image() -> [u8; BOOT_ROM_SIZE] {
    let mut image = [0; BOOT_ROM_SIZE];
    image[..PROGRAM.len()].copy_from_slice(&PROGRAM);
    image
}
