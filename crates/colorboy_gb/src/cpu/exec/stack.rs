use crate::cpu::{Bus, Cpu, StackReg};

impl Cpu {
    pub(super) fn exec_push<B: Bus>(&mut self, bus: &mut B, rr: StackReg) {
        let value = self.read_stack_reg(rr);
        self.push_u16(bus, value);
    }

    /// `POP AF` masks the low nibble of F through `set_af`.
    pub(super) fn exec_pop<B: Bus>(&mut self, bus: &mut B, rr: StackReg) {
        let value = self.pop_u16(bus);
        self.write_stack_reg(rr, value);
    }
}
