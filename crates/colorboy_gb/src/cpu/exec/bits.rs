use crate::cpu::{Bus, Cpu, Reg8, RotOp};

impl Cpu {
    pub(super) fn exec_rot<B: Bus>(&mut self, bus: &mut B, op: RotOp, r: Reg8) {
        let value = self.read_reg8(bus, r);
        let result = self.alu_rotate(op, value);
        self.write_reg8(bus, r, result);
    }

    pub(super) fn exec_bit<B: Bus>(&mut self, bus: &mut B, bit: u8, r: Reg8) {
        let value = self.read_reg8(bus, r);
        self.alu_bit(bit, value);
    }

    pub(super) fn exec_res<B: Bus>(&mut self, bus: &mut B, bit: u8, r: Reg8) {
        let value = self.read_reg8(bus, r) & !(1 << bit);
        self.write_reg8(bus, r, value);
    }

    pub(super) fn exec_set<B: Bus>(&mut self, bus: &mut B, bit: u8, r: Reg8) {
        let value = self.read_reg8(bus, r) | (1 << bit);
        self.write_reg8(bus, r, value);
    }
}
