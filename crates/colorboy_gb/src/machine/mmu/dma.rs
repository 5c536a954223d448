use crate::cpu::Bus;

use super::Mmu;

const OAM_START: u16 = 0xFE00;
const OAM_LEN: u16 = 0xA0;
const HDMA_BLOCK: u16 = 0x10;

/// CGB VRAM DMA state (FF51–FF55).
#[derive(Clone, Copy, Debug, Default)]
pub(super) struct Hdma {
    src: u16,
    dst: u16,
    /// 16-byte blocks still to copy.
    remaining: u8,
    /// An HBlank transfer is in progress.
    active: bool,
}

impl Hdma {
    /// FF55 as seen by the CPU: blocks left minus one, bit 7 clear while
    /// active; 0xFF once finished.
    pub(super) fn status(&self) -> u8 {
        match (self.active, self.remaining) {
            (true, n) => n.wrapping_sub(1) & 0x7F,
            (false, 0) => 0xFF,
            (false, n) => 0x80 | (n.wrapping_sub(1) & 0x7F),
        }
    }
}

impl Mmu {
    /// Copy 0xA0 bytes from `page << 8` into OAM.
    ///
    /// The transfer is instantaneous; bus conflicts during the 160 M-cycle
    /// window are not modelled.
    pub(super) fn oam_dma(&mut self, page: u8) {
        let base = u16::from(page) << 8;
        for i in 0..OAM_LEN {
            let byte = self.read(base.wrapping_add(i));
            self.write8(OAM_START + i, byte);
        }
    }

    pub(super) fn hdma_control(&mut self, value: u8) {
        if self.hdma.active && value & 0x80 == 0 {
            log::debug!("GB HDMA cancelled with {} blocks left", self.hdma.remaining);
            self.hdma.active = false;
            return;
        }

        let src = u16::from_be_bytes([self.io[0x51], self.io[0x52]]) & 0xFFF0;
        let dst = 0x8000 | (u16::from_be_bytes([self.io[0x53], self.io[0x54]]) & 0x1FF0);
        self.hdma = Hdma {
            src,
            dst,
            remaining: (value & 0x7F) + 1,
            active: false,
        };

        if value & 0x80 == 0 {
            log::debug!(
                "GB GDMA 0x{src:04X} -> 0x{dst:04X}, {} bytes",
                u16::from(self.hdma.remaining) * HDMA_BLOCK
            );
            while self.hdma.remaining > 0 {
                self.hdma_block();
            }
        } else {
            self.hdma.active = true;
        }
    }

    /// Called when the GPU enters HBlank.
    pub(super) fn hdma_hblank(&mut self) {
        if self.hdma.active {
            self.hdma_block();
            if self.hdma.remaining == 0 {
                self.hdma.active = false;
            }
        }
    }

    fn hdma_block(&mut self) {
        for _ in 0..HDMA_BLOCK {
            let byte = self.read(self.hdma.src);
            self.write8(self.hdma.dst, byte);
            self.hdma.src = self.hdma.src.wrapping_add(1);
            self.hdma.dst = 0x8000 | (self.hdma.dst.wrapping_add(1) & 0x1FFF);
        }
        self.hdma.remaining -= 1;
    }
}
