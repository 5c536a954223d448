use crate::cpu::{Bus, Cpu, Indirect, Reg16, Reg8};

impl Cpu {
    /// Resolve `(BC)`, `(DE)`, `(HL+)` or `(HL-)`, applying the HL
    /// post-increment/decrement.
    fn indirect_addr(&mut self, ind: Indirect) -> u16 {
        match ind {
            Indirect::Bc => self.regs.bc(),
            Indirect::De => self.regs.de(),
            Indirect::HlInc => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_add(1));
                hl
            }
            Indirect::HlDec => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_sub(1));
                hl
            }
        }
    }

    pub(super) fn exec_ld_rr_nn(&mut self, rr: Reg16) {
        let value = self.imm16();
        self.write_reg16(rr, value);
    }

    pub(super) fn exec_ld_indirect_a<B: Bus>(&mut self, bus: &mut B, ind: Indirect) {
        let addr = self.indirect_addr(ind);
        bus.write8(addr, self.regs.a);
    }

    pub(super) fn exec_ld_a_indirect<B: Bus>(&mut self, bus: &mut B, ind: Indirect) {
        let addr = self.indirect_addr(ind);
        self.regs.a = bus.read8(addr);
    }

    pub(super) fn exec_ld_r_n<B: Bus>(&mut self, bus: &mut B, r: Reg8) {
        let value = self.imm8();
        self.write_reg8(bus, r, value);
    }

    pub(super) fn exec_ld_r_r<B: Bus>(&mut self, bus: &mut B, dst: Reg8, src: Reg8) {
        let value = self.read_reg8(bus, src);
        self.write_reg8(bus, dst, value);
    }

    pub(super) fn exec_ld_nn_sp<B: Bus>(&mut self, bus: &mut B) {
        let addr = self.imm16();
        bus.write16(addr, self.regs.sp);
    }

    pub(super) fn exec_ldh_n_a<B: Bus>(&mut self, bus: &mut B) {
        let addr = 0xFF00 | u16::from(self.imm8());
        bus.write8(addr, self.regs.a);
    }

    pub(super) fn exec_ldh_a_n<B: Bus>(&mut self, bus: &mut B) {
        let addr = 0xFF00 | u16::from(self.imm8());
        self.regs.a = bus.read8(addr);
    }

    pub(super) fn exec_ld_c_a<B: Bus>(&mut self, bus: &mut B) {
        let addr = 0xFF00 | u16::from(self.regs.c);
        bus.write8(addr, self.regs.a);
    }

    pub(super) fn exec_ld_a_c<B: Bus>(&mut self, bus: &mut B) {
        let addr = 0xFF00 | u16::from(self.regs.c);
        self.regs.a = bus.read8(addr);
    }

    pub(super) fn exec_ld_nn_a<B: Bus>(&mut self, bus: &mut B) {
        let addr = self.imm16();
        bus.write8(addr, self.regs.a);
    }

    pub(super) fn exec_ld_a_nn<B: Bus>(&mut self, bus: &mut B) {
        let addr = self.imm16();
        self.regs.a = bus.read8(addr);
    }

    pub(super) fn exec_ld_hl_sp_n(&mut self) {
        let value = self.alu_add_sp_signed(self.imm8());
        self.regs.set_hl(value);
    }

    pub(super) fn exec_ld_sp_hl(&mut self) {
        self.regs.sp = self.regs.hl();
    }
}
