//! Divider and timer (FF04–FF07).
//!
//! A hidden 16-bit counter advances once per T-state and DIV exposes its
//! upper byte. TIMA counts falling edges of the counter bit selected by TAC,
//! ANDed with the enable bit, so DIV resets and TAC writes can also bump it.

use crate::cpu::Interrupt;

use super::mmu::Peripheral;

const DIV: u16 = 0xFF04;
const TIMA: u16 = 0xFF05;
const TMA: u16 = 0xFF06;
const TAC: u16 = 0xFF07;

/// T-states between TIMA overflowing and the TMA reload.
const RELOAD_DELAY: u8 = 4;

pub struct Timer {
    counter: u16,
    tima: u8,
    tma: u8,
    tac: u8,
    /// Countdown to the TMA reload after an overflow.
    reload_in: Option<u8>,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            counter: 0,
            tima: 0,
            tma: 0,
            tac: 0,
            reload_in: None,
        }
    }

    /// Counter bit watched for the current TAC frequency:
    /// 00 → 4096 Hz, 01 → 262144 Hz, 10 → 65536 Hz, 11 → 16384 Hz.
    #[inline]
    fn input_bit(&self) -> u16 {
        match self.tac & 0x03 {
            0x00 => 1 << 9,
            0x01 => 1 << 3,
            0x02 => 1 << 5,
            _ => 1 << 7,
        }
    }

    #[inline]
    fn signal(&self) -> bool {
        self.tac & 0x04 != 0 && self.counter & self.input_bit() != 0
    }

    fn increment_tima(&mut self) {
        let (next, overflow) = self.tima.overflowing_add(1);
        self.tima = next;
        if overflow {
            self.reload_in = Some(RELOAD_DELAY);
        }
    }

    /// Apply a register change and count a falling edge if it caused one.
    fn with_edge_check(&mut self, change: impl FnOnce(&mut Self)) {
        let before = self.signal();
        change(self);
        if before && !self.signal() {
            self.increment_tima();
        }
    }

    /// Advance by `cycles` T-states and return the interrupts raised.
    pub fn step(&mut self, cycles: u32) -> Interrupt {
        let mut irq = Interrupt::empty();
        for _ in 0..cycles {
            if let Some(delay) = self.reload_in {
                if delay <= 1 {
                    self.tima = self.tma;
                    self.reload_in = None;
                    irq |= Interrupt::TIMER;
                } else {
                    self.reload_in = Some(delay - 1);
                }
            }
            self.with_edge_check(|timer| timer.counter = timer.counter.wrapping_add(1));
        }
        irq
    }

    pub fn div(&self) -> u8 {
        (self.counter >> 8) as u8
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Peripheral for Timer {
    fn name(&self) -> &'static str {
        "timer"
    }

    fn read(&self, addr: u16) -> u8 {
        match addr {
            DIV => self.div(),
            TIMA => self.tima,
            TMA => self.tma,
            TAC => 0xF8 | self.tac,
            _ => 0x00,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            DIV => self.with_edge_check(|timer| timer.counter = 0),
            TIMA => {
                // Writing during the reload window cancels the reload.
                self.tima = value;
                self.reload_in = None;
            }
            TMA => self.tma = value,
            TAC => self.with_edge_check(|timer| timer.tac = value & 0x07),
            _ => {}
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
