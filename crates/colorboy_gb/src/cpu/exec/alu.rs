use crate::cpu::{AluOp, Bus, Cpu, Flag, Op, Reg16, Reg8, RotOp};

impl Cpu {
    pub(super) fn exec_alu_r<B: Bus>(&mut self, bus: &mut B, op: AluOp, r: Reg8) {
        let value = self.read_reg8(bus, r);
        self.alu(op, value);
    }

    pub(super) fn exec_alu_n(&mut self, op: AluOp) {
        self.alu(op, self.imm8());
    }

    pub(super) fn exec_add_hl(&mut self, rr: Reg16) {
        let value = self.read_reg16(rr);
        self.alu_add16_hl(value);
    }

    pub(super) fn exec_add_sp_n(&mut self) {
        self.regs.sp = self.alu_add_sp_signed(self.imm8());
    }

    /// RLCA/RRCA/RLA/RRA: like their CB forms but Z is always cleared.
    pub(super) fn exec_rotate_a(&mut self, op: Op) {
        let rot = match op {
            Op::Rlca => RotOp::Rlc,
            Op::Rrca => RotOp::Rrc,
            Op::Rla => RotOp::Rl,
            _ => RotOp::Rr,
        };
        self.regs.a = self.alu_rotate(rot, self.regs.a);
        self.set_flag(Flag::Z, false);
    }

    pub(super) fn exec_cpl(&mut self) {
        self.regs.a = !self.regs.a;
        self.set_flag(Flag::N, true);
        self.set_flag(Flag::H, true);
    }

    pub(super) fn exec_scf(&mut self) {
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::C, true);
    }

    pub(super) fn exec_ccf(&mut self) {
        let carry = self.get_flag(Flag::C);
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::C, !carry);
    }
}
