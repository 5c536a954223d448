use super::{rom_banks, RamBanks, ROM_BANK_SIZE};

/// MBC3 without the real-time clock: a 7-bit ROM bank and up to four RAM
/// banks.
pub(super) struct Mbc3 {
    rom: Vec<Vec<u8>>,
    ram: RamBanks,
    rom_bank: usize,
}

impl Mbc3 {
    pub(super) fn new(rom: &[u8], ram: RamBanks) -> Self {
        Self {
            rom: rom_banks(rom),
            ram,
            rom_bank: 1,
        }
    }

    pub(super) fn ram(&self) -> &RamBanks {
        &self.ram
    }

    pub(super) fn ram_mut(&mut self) -> &mut RamBanks {
        &mut self.ram
    }

    pub(super) fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x3FFF => self.rom[0][addr as usize],
            0x4000..=0x7FFF => {
                self.rom[self.rom_bank % self.rom.len()][addr as usize % ROM_BANK_SIZE]
            }
            0xA000..=0xBFFF => self.ram.read(addr),
            _ => 0x00,
        }
    }

    pub(super) fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram.set_enable(value),
            0x2000..=0x3FFF => {
                self.rom_bank = match value & 0x7F {
                    0 => 1,
                    bank => usize::from(bank),
                };
                log::debug!("GB MBC3 ROM bank -> {}", self.rom_bank);
            }
            // 0x08..0x0C would map the RTC registers, which are not modelled.
            0x4000..=0x5FFF if value <= 0x03 => self.ram.select(usize::from(value)),
            0xA000..=0xBFFF => self.ram.write(addr, value),
            _ => {}
        }
    }
}
