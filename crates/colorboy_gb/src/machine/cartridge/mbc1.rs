use super::{rom_banks, RamBanks, ROM_BANK_SIZE};

/// MBC1 banking state.
///
/// The 2-bit upper register is shared: in mode 0 it extends the ROM bank
/// (up to 2 MiB) and RAM stays on bank 0; in mode 1 it selects one of four
/// RAM banks and ROM is limited to the lower 512 KiB.
pub(super) struct Mbc1 {
    rom: Vec<Vec<u8>>,
    ram: RamBanks,
    low5: u8,
    upper2: u8,
    ram_mode: bool,
}

impl Mbc1 {
    pub(super) fn new(rom: &[u8], ram: RamBanks) -> Self {
        Self {
            rom: rom_banks(rom),
            ram,
            low5: 1,
            upper2: 0,
            ram_mode: false,
        }
    }

    pub(super) fn ram(&self) -> &RamBanks {
        &self.ram
    }

    pub(super) fn ram_mut(&mut self) -> &mut RamBanks {
        &mut self.ram
    }

    fn rom_bank(&self) -> usize {
        let mut bank = usize::from(self.low5);
        if !self.ram_mode {
            bank |= usize::from(self.upper2) << 5;
        }
        bank % self.rom.len()
    }

    pub(super) fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x3FFF => self.rom[0][addr as usize],
            0x4000..=0x7FFF => self.rom[self.rom_bank()][addr as usize % ROM_BANK_SIZE],
            0xA000..=0xBFFF => self.ram.read(addr),
            _ => 0x00,
        }
    }

    pub(super) fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram.set_enable(value),
            0x2000..=0x3FFF => {
                self.low5 = match value & 0x1F {
                    0 => 1,
                    bank => bank,
                };
                log::debug!("GB MBC1 ROM bank -> {}", self.rom_bank());
            }
            0x4000..=0x5FFF => {
                self.upper2 = value & 0x03;
                self.sync_ram_bank();
            }
            0x6000..=0x7FFF => {
                self.ram_mode = value & 0x01 != 0;
                self.sync_ram_bank();
            }
            0xA000..=0xBFFF => self.ram.write(addr, value),
            _ => {}
        }
    }

    fn sync_ram_bank(&mut self) {
        let bank = if self.ram_mode { self.upper2 } else { 0 };
        self.ram.select(usize::from(bank));
    }
}

