use crate::cpu::{Bus, Cond, Cpu};

impl Cpu {
    #[inline]
    fn cc_condition(&self, cc: Cond) -> bool {
        cc.holds(self.regs.f)
    }

    /// JR target: the displacement is relative to the byte after the operand.
    fn jr_target(&self) -> u16 {
        Self::offset_by(self.regs.pc.wrapping_add(2), self.imm8())
    }

    pub(super) fn exec_jr(&mut self) {
        let target = self.jr_target();
        self.jump_to(target);
    }

    pub(super) fn exec_jr_cc(&mut self, cc: Cond) -> bool {
        let taken = self.cc_condition(cc);
        if taken {
            self.exec_jr();
        }
        taken
    }

    pub(super) fn exec_jp(&mut self) {
        let addr = self.imm16();
        self.jump_to(addr);
    }

    pub(super) fn exec_jp_cc(&mut self, cc: Cond) -> bool {
        let taken = self.cc_condition(cc);
        if taken {
            self.exec_jp();
        }
        taken
    }

    pub(super) fn exec_jp_hl(&mut self) {
        let addr = self.regs.hl();
        self.jump_to(addr);
    }

    pub(super) fn exec_call<B: Bus>(&mut self, bus: &mut B) {
        let ret = self.next_pc();
        self.push_u16(bus, ret);
        let addr = self.imm16();
        self.jump_to(addr);
    }

    pub(super) fn exec_call_cc<B: Bus>(&mut self, bus: &mut B, cc: Cond) -> bool {
        let taken = self.cc_condition(cc);
        if taken {
            self.exec_call(bus);
        }
        taken
    }

    pub(super) fn exec_ret<B: Bus>(&mut self, bus: &mut B) {
        let addr = self.pop_u16(bus);
        self.jump_to(addr);
    }

    pub(super) fn exec_ret_cc<B: Bus>(&mut self, bus: &mut B, cc: Cond) -> bool {
        let taken = self.cc_condition(cc);
        if taken {
            self.exec_ret(bus);
        }
        taken
    }

    pub(super) fn exec_reti<B: Bus>(&mut self, bus: &mut B) {
        self.exec_ret(bus);
        self.ime = true;
    }

    pub(super) fn exec_rst<B: Bus>(&mut self, bus: &mut B, vector: u8) {
        let ret = self.next_pc();
        self.push_u16(bus, ret);
        self.jump_to(u16::from(vector));
    }
}
