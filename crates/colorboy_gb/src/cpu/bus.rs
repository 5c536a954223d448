use thiserror::Error;

use super::KEY1;

/// A fatal condition raised by the memory system during an instruction.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BusFault {
    #[error("write of 0x{value:02X} to ROM address 0x{addr:04X} with no cartridge loaded")]
    RomWrite { addr: u16, value: u8 },
}

/// Abstraction over the Game Boy bus (memory and IO).
///
/// 16-bit accesses are little-endian: the low byte lives at `addr`.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);

    fn read16(&mut self, addr: u16) -> u16 {
        let lo = self.read8(addr);
        let hi = self.read8(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    fn write16(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write8(addr, lo);
        self.write8(addr.wrapping_add(1), hi);
    }

    /// Report the current CPU speed in KEY1 bit 7. Bus writes to KEY1 can
    /// only arm a switch, so the CPU sets the speed bit through here.
    fn set_double_speed(&mut self, double: bool) {
        self.write8(KEY1, if double { 0x80 } else { 0x00 });
    }

    /// Take the fault recorded since the last call, if any.
    ///
    /// The CPU checks this once per step and aborts with
    /// [`CpuError::Bus`](super::CpuError::Bus).
    fn take_fault(&mut self) -> Option<BusFault> {
        None
    }
}
