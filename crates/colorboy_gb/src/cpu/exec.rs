mod alu;
mod bits;
mod control;
mod incdec;
mod ld;
mod stack;
mod system;

use super::{Bus, Cpu, Op};

impl Cpu {
    /// Execute the decoded `self.current` instruction and return the
    /// effective cost in M-cycles.
    ///
    /// PC still points at the opcode (or at the byte after 0xCB) while the
    /// handler runs; operands were captured into `self.operands` up front.
    pub(super) fn execute<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let instr = self.current;
        let base = instr.cycles;
        let taken = |t: bool| if t { instr.cycles_taken() } else { base };

        match instr.op {
            Op::Nop => {}
            Op::LdRrNn(rr) => self.exec_ld_rr_nn(rr),
            Op::LdIndA(ind) => self.exec_ld_indirect_a(bus, ind),
            Op::LdAInd(ind) => self.exec_ld_a_indirect(bus, ind),
            Op::IncRr(rr) => self.exec_inc16(rr),
            Op::DecRr(rr) => self.exec_dec16(rr),
            Op::Inc(r) => self.exec_inc8(bus, r),
            Op::Dec(r) => self.exec_dec8(bus, r),
            Op::LdRN(r) => self.exec_ld_r_n(bus, r),
            Op::Rlca | Op::Rrca | Op::Rla | Op::Rra => self.exec_rotate_a(instr.op),
            Op::LdNnSp => self.exec_ld_nn_sp(bus),
            Op::AddHl(rr) => self.exec_add_hl(rr),
            Op::Stop => self.exec_stop(bus),
            Op::Jr => self.exec_jr(),
            Op::JrCc(cc) => return taken(self.exec_jr_cc(cc)),
            Op::Daa => self.alu_daa(),
            Op::Cpl => self.exec_cpl(),
            Op::Scf => self.exec_scf(),
            Op::Ccf => self.exec_ccf(),
            Op::LdRR(dst, src) => self.exec_ld_r_r(bus, dst, src),
            Op::Halt => self.exec_halt(bus),
            Op::Alu(op, r) => self.exec_alu_r(bus, op, r),
            Op::AluN(op) => self.exec_alu_n(op),
            Op::RetCc(cc) => return taken(self.exec_ret_cc(bus, cc)),
            Op::Ret => self.exec_ret(bus),
            Op::Reti => self.exec_reti(bus),
            Op::Pop(rr) => self.exec_pop(bus, rr),
            Op::Push(rr) => self.exec_push(bus, rr),
            Op::JpCc(cc) => return taken(self.exec_jp_cc(cc)),
            Op::Jp => self.exec_jp(),
            Op::JpHl => self.exec_jp_hl(),
            Op::CallCc(cc) => return taken(self.exec_call_cc(bus, cc)),
            Op::Call => self.exec_call(bus),
            Op::Rst(vector) => self.exec_rst(bus, vector),
            Op::LdhNA => self.exec_ldh_n_a(bus),
            Op::LdhAN => self.exec_ldh_a_n(bus),
            Op::LdCA => self.exec_ld_c_a(bus),
            Op::LdAC => self.exec_ld_a_c(bus),
            Op::AddSpN => self.exec_add_sp_n(),
            Op::LdHlSpN => self.exec_ld_hl_sp_n(),
            Op::LdSpHl => self.exec_ld_sp_hl(),
            Op::LdNnA => self.exec_ld_nn_a(bus),
            Op::LdANn => self.exec_ld_a_nn(bus),
            Op::Di => self.exec_di(),
            Op::Ei => self.exec_ei(),
            Op::Rot(op, r) => self.exec_rot(bus, op, r),
            Op::Bit(bit, r) => self.exec_bit(bus, bit, r),
            Op::Res(bit, r) => self.exec_res(bus, bit, r),
            Op::Set(bit, r) => self.exec_set(bus, bit, r),
        }

        base
    }
}
