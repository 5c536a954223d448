//! Sound registers (FF10–FF3F).
//!
//! No audio is produced; the unit only keeps register and wave RAM contents
//! so games that read them back see sensible values.

use super::mmu::Peripheral;

const BASE: u16 = 0xFF10;
const NR52: u16 = 0xFF26;
const WAVE_RAM: u16 = 0xFF30;
const REGS: usize = 0x30;

pub struct Apu {
    regs: [u8; REGS],
}

impl Apu {
    pub fn new() -> Self {
        let mut apu = Self { regs: [0; REGS] };
        apu.regs[(NR52 - BASE) as usize] = 0x80;
        apu
    }

    /// NR52 bit 7.
    pub fn powered(&self) -> bool {
        self.regs[(NR52 - BASE) as usize] & 0x80 != 0
    }

    fn write_nr52(&mut self, value: u8) {
        if self.powered() && value & 0x80 == 0 {
            // Powering off clears every channel register.
            self.regs[..(NR52 - BASE) as usize].fill(0);
        }
        self.regs[(NR52 - BASE) as usize] = value & 0x8F;
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}

impl Peripheral for Apu {
    fn name(&self) -> &'static str {
        "apu"
    }

    fn read(&self, addr: u16) -> u8 {
        match addr {
            BASE..=0xFF3F => self.regs[(addr - BASE) as usize],
            _ => 0x00,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            NR52 => self.write_nr52(value),
            // Wave RAM stays writable while powered off.
            WAVE_RAM..=0xFF3F => self.regs[(addr - BASE) as usize] = value,
            BASE..=0xFF25 if self.powered() => self.regs[(addr - BASE) as usize] = value,
            _ => {}
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
