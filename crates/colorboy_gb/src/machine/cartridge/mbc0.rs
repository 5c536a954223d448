/// Plain 32 KiB ROM with no controller and no RAM.
pub(super) struct Mbc0 {
    rom: Vec<u8>,
}

impl Mbc0 {
    pub(super) fn new(rom: &[u8]) -> Self {
        let mut rom = rom[..rom.len().min(0x8000)].to_vec();
        rom.resize(0x8000, 0xFF);
        Self { rom }
    }

    pub(super) fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => self.rom[addr as usize],
            _ => 0x00,
        }
    }
}
