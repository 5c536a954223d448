use crate::cpu::{Bus, Cpu, Reg16, Reg8};

impl Cpu {
    pub(super) fn exec_inc16(&mut self, rr: Reg16) {
        let value = self.read_reg16(rr).wrapping_add(1);
        self.write_reg16(rr, value);
    }

    pub(super) fn exec_dec16(&mut self, rr: Reg16) {
        let value = self.read_reg16(rr).wrapping_sub(1);
        self.write_reg16(rr, value);
    }

    pub(super) fn exec_inc8<B: Bus>(&mut self, bus: &mut B, r: Reg8) {
        let value = self.read_reg8(bus, r);
        let result = self.alu_inc8(value);
        self.write_reg8(bus, r, result);
    }

    pub(super) fn exec_dec8<B: Bus>(&mut self, bus: &mut B, r: Reg8) {
        let value = self.read_reg8(bus, r);
        let result = self.alu_dec8(value);
        self.write_reg8(bus, r, result);
    }
}
