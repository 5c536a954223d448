use crate::cpu::{Bus, BusFault, IE_ADDR, IF_ADDR, KEY1};

use super::{Mmu, WRAM_BANK_SIZE};

const DMA: u16 = 0xFF46;
const BOOT_OFF: u16 = 0xFF50;
const HDMA_SRC_HI: u16 = 0xFF51;
const HDMA_DST_LO: u16 = 0xFF54;
const HDMA_CTRL: u16 = 0xFF55;
const SVBK: u16 = 0xFF70;

impl Bus for Mmu {
    fn read8(&mut self, addr: u16) -> u8 {
        self.read(addr)
    }

    fn write8(&mut self, addr: u16, value: u8) {
        if let Some(port) = self.routes[addr as usize] {
            self.peripheral_mut(port).write(addr, value);
            return;
        }

        match addr {
            0x0000..=0x7FFF => match self.cartridge.as_mut() {
                Some(cart) => cart.write(addr, value),
                None if self.in_boot_mode => {}
                None => {
                    log::error!("GB MMU: ROM write 0x{value:02X} -> 0x{addr:04X}");
                    self.fault = Some(BusFault::RomWrite { addr, value });
                }
            },
            0xA000..=0xBFFF => {
                if let Some(cart) = self.cartridge.as_mut() {
                    cart.write(addr, value);
                }
            }
            0xC000..=0xDFFF => *self.wram_byte(addr) = value,
            0xE000..=0xFDFF => *self.wram_byte(addr - 0x2000) = value,
            IF_ADDR => self.if_reg = value & 0x1F,
            KEY1 => self.key1 = (self.key1 & 0x80) | (value & 0x01),
            DMA => {
                self.io[(addr - 0xFF00) as usize] = value;
                self.oam_dma(value);
            }
            BOOT_OFF => {
                self.io[(addr - 0xFF00) as usize] = value;
                if self.in_boot_mode && value != 0 {
                    log::info!("GB boot ROM finished, unmapping overlay");
                    self.in_boot_mode = false;
                    self.boot_completed = true;
                }
            }
            HDMA_SRC_HI..=HDMA_DST_LO => self.io[(addr - 0xFF00) as usize] = value,
            HDMA_CTRL if self.color => self.hdma_control(value),
            SVBK if self.color => {
                self.wram_bank = usize::from(value & 0x07).max(1);
            }
            0xFF00..=0xFF7F => self.io[(addr - 0xFF00) as usize] = value,
            0xFF80..=0xFFFE => self.zero_page[(addr - 0xFF80) as usize] = value,
            IE_ADDR => self.ie_reg = value,
            // Unrouted VRAM, OAM and the unusable hole.
            _ => {}
        }
    }

    fn set_double_speed(&mut self, double: bool) {
        self.key1 = if double { 0x80 } else { 0x00 };
    }

    fn take_fault(&mut self) -> Option<BusFault> {
        self.fault.take()
    }
}

impl Mmu {
    /// Side-effect free read, shared by the CPU path and DMA.
    pub fn read(&self, addr: u16) -> u8 {
        if let Some(port) = self.routes[addr as usize] {
            return self.peripheral(port).read(addr);
        }

        match addr {
            0x0000..=0x00FF if self.in_boot_mode => self.boot_rom[addr as usize],
            0x0000..=0x7FFF | 0xA000..=0xBFFF => {
                self.cartridge.as_ref().map_or(0x00, |cart| cart.read(addr))
            }
            0xC000..=0xDFFF => self.wram_read(addr),
            0xE000..=0xFDFF => self.wram_read(addr - 0x2000),
            IF_ADDR => self.if_reg | 0xE0,
            KEY1 if self.color => self.key1,
            KEY1 => 0x00,
            HDMA_CTRL if self.color => self.hdma.status(),
            SVBK if self.color => 0xF8 | self.wram_bank as u8,
            0xFF00..=0xFF7F => self.io[(addr - 0xFF00) as usize],
            0xFF80..=0xFFFE => self.zero_page[(addr - 0xFF80) as usize],
            IE_ADDR => self.ie_reg,
            _ => 0x00,
        }
    }

    fn wram_read(&self, addr: u16) -> u8 {
        let (bank, offset) = self.wram_index(addr);
        self.wram[bank][offset]
    }

    fn wram_byte(&mut self, addr: u16) -> &mut u8 {
        let (bank, offset) = self.wram_index(addr);
        &mut self.wram[bank][offset]
    }

    /// Bank and offset for an address in C000–DFFF.
    #[inline]
    fn wram_index(&self, addr: u16) -> (usize, usize) {
        let offset = (addr as usize - 0xC000) % WRAM_BANK_SIZE;
        let bank = if addr < 0xD000 { 0 } else { self.wram_bank };
        (bank, offset)
    }
}
