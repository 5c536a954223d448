use crate::cpu::{Bus, Cpu, IF_ADDR, KEY1};

impl Cpu {
    pub(super) fn exec_halt<B: Bus>(&mut self, bus: &mut B) {
        self.halted = true;
        self.if_at_halt = bus.read8(IF_ADDR);
    }

    /// STOP doubles as the CGB speed switch when KEY1 bit 0 is armed.
    pub(super) fn exec_stop<B: Bus>(&mut self, bus: &mut B) {
        let key1 = bus.read8(KEY1);
        if key1 & 0x01 == 0 {
            return;
        }

        self.speed = if self.speed == 1 { 2 } else { 1 };
        bus.set_double_speed(self.speed == 2);
        log::info!(
            "CPU speed switch at 0x{:04X}: {}",
            self.regs.pc,
            if self.speed == 2 { "double" } else { "normal" }
        );
    }

    pub(super) fn exec_di(&mut self) {
        self.ime = false;
        self.ime_enable_pending = false;
        self.ime_enable_delay = false;
    }

    pub(super) fn exec_ei(&mut self) {
        self.ime_enable_pending = true;
    }
}
