/// Size of one external RAM bank.
pub const RAM_BANK_SIZE: usize = 0x2000;

/// Banked external RAM with its enable latch and current bank.
///
/// Reads while disabled (or with no banks at all) return 0x00 and writes are
/// dropped.
pub(super) struct RamBanks {
    banks: Vec<Vec<u8>>,
    enabled: bool,
    bank: usize,
}

impl RamBanks {
    pub(super) fn new(count: usize) -> Self {
        Self {
            banks: vec![vec![0; RAM_BANK_SIZE]; count],
            enabled: false,
            bank: 0,
        }
    }

    pub(super) fn len(&self) -> usize {
        self.banks.len()
    }

    pub(super) fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }

    pub(super) fn banks(&self) -> &[Vec<u8>] {
        &self.banks
    }

    /// Swap in banks restored from a save. The caller has already checked
    /// the count and sizes.
    pub(super) fn replace(&mut self, banks: Vec<Vec<u8>>) {
        self.banks = banks;
    }

    /// Handle a write to 0000–1FFF.
    pub(super) fn set_enable(&mut self, value: u8) {
        let enabled = value & 0x0F == 0x0A;
        if enabled != self.enabled {
            log::debug!("GB cartridge RAM {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
    }

    pub(super) fn select(&mut self, bank: usize) {
        if !self.banks.is_empty() {
            self.bank = bank % self.banks.len();
        }
    }

    pub(super) fn read(&self, addr: u16) -> u8 {
        if !self.enabled {
            return 0x00;
        }
        self.banks
            .get(self.bank)
            .and_then(|bank| bank.get(Self::offset(addr)))
            .copied()
            .unwrap_or(0x00)
    }

    pub(super) fn write(&mut self, addr: u16, value: u8) {
        if !self.enabled {
            return;
        }
        let offset = Self::offset(addr);
        if let Some(byte) = self
            .banks
            .get_mut(self.bank)
            .and_then(|bank| bank.get_mut(offset))
        {
            *byte = value;
        }
    }

    #[inline]
    fn offset(addr: u16) -> usize {
        (addr.wrapping_sub(0xA000) as usize) & (RAM_BANK_SIZE - 1)
    }
}
