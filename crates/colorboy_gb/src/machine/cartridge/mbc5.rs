use super::{rom_banks, RamBanks, ROM_BANK_SIZE};

/// MBC5: a 9-bit ROM bank split across two registers and 16 RAM banks.
///
/// Unlike MBC1/MBC3, writing 0 selects bank 0 in the switchable window.
pub(super) struct Mbc5 {
    rom: Vec<Vec<u8>>,
    ram: RamBanks,
    rom_bank: usize,
}

impl Mbc5 {
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
            0x2000..=0x2FFF => {
                self.rom_bank = (self.rom_bank & 0x100) | usize::from(value);
                log::debug!("GB MBC5 ROM bank -> {}", self.rom_bank);
            }
            0x3000..=0x3FFF => {
                self.rom_bank = (self.rom_bank & 0xFF) | (usize::from(value & 0x01) << 8);
                log::debug!("GB MBC5 ROM bank -> {}", self.rom_bank);
            }
            0x4000..=0x5FFF => self.ram.select(usize::from(value & 0x0F)),
            0xA000..=0xBFFF => self.ram.write(addr, value),
            _ => {}
        }
    }
}
