use super::{Bus, Cpu, Reg16, Reg8, StackReg};

impl Cpu {
    /// Read an 8-bit register or (HL).
    #[inline]
    pub(super) fn read_reg8<B: Bus>(&mut self, bus: &mut B, reg: Reg8) -> u8 {
        match reg {
            Reg8::B => self.regs.b,
            Reg8::C => self.regs.c,
            Reg8::D => self.regs.d,
            Reg8::E => self.regs.e,
            Reg8::H => self.regs.h,
            Reg8::L => self.regs.l,
            Reg8::HlInd => bus.read8(self.regs.hl()),
            Reg8::A => self.regs.a,
        }
    }

    /// Write an 8-bit register or (HL).
    #[inline]
    pub(super) fn write_reg8<B: Bus>(&mut self, bus: &mut B, reg: Reg8, value: u8) {
        match reg {
            Reg8::B => self.regs.b = value,
            Reg8::C => self.regs.c = value,
            Reg8::D => self.regs.d = value,
            Reg8::E => self.regs.e = value,
            Reg8::H => self.regs.h = value,
            Reg8::L => self.regs.l = value,
            Reg8::HlInd => bus.write8(self.regs.hl(), value),
            Reg8::A => self.regs.a = value,
        }
    }

    #[inline]
    pub(super) fn read_reg16(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::Bc => self.regs.bc(),
            Reg16::De => self.regs.de(),
            Reg16::Hl => self.regs.hl(),
            Reg16::Sp => self.regs.sp,
        }
    }

    #[inline]
    pub(super) fn write_reg16(&mut self, reg: Reg16, value: u16) {
        match reg {
            Reg16::Bc => self.regs.set_bc(value),
            Reg16::De => self.regs.set_de(value),
            Reg16::Hl => self.regs.set_hl(value),
            Reg16::Sp => self.regs.sp = value,
        }
    }

    #[inline]
    pub(super) fn read_stack_reg(&self, reg: StackReg) -> u16 {
        match reg {
            StackReg::Bc => self.regs.bc(),
            StackReg::De => self.regs.de(),
            StackReg::Hl => self.regs.hl(),
            StackReg::Af => self.regs.af(),
        }
    }

    #[inline]
    pub(super) fn write_stack_reg(&mut self, reg: StackReg, value: u16) {
        match reg {
            StackReg::Bc => self.regs.set_bc(value),
            StackReg::De => self.regs.set_de(value),
            StackReg::Hl => self.regs.set_hl(value),
            StackReg::Af => self.regs.set_af(value),
        }
    }

    #[inline]
    pub(super) fn push_u16<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        // Stack grows downward. We want memory[SP] = low, memory[SP+1] = high.
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, lo);
    }

    #[inline]
    pub(super) fn pop_u16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = bus.read8(self.regs.sp);
        let hi = bus.read8(self.regs.sp.wrapping_add(1));
        self.regs.sp = self.regs.sp.wrapping_add(2);
        u16::from_le_bytes([lo, hi])
    }

    /// Redirect PC and suppress the post-execute advance.
    #[inline]
    pub(super) fn jump_to(&mut self, addr: u16) {
        self.regs.pc = addr;
        self.pc_jumped = true;
    }

    /// Address of the instruction after the current one.
    #[inline]
    pub(super) fn next_pc(&self) -> u16 {
        self.regs
            .pc
            .wrapping_add(1 + u16::from(self.current.operand_bytes))
    }

    #[inline]
    pub(super) fn imm8(&self) -> u8 {
        self.operands[0]
    }

    #[inline]
    pub(super) fn imm16(&self) -> u16 {
        u16::from_le_bytes(self.operands)
    }

    /// Apply a signed 8-bit displacement: values >= 0x80 subtract
    /// `256 - n` from `base`.
    #[inline]
    pub(super) fn offset_by(base: u16, n: u8) -> u16 {
        if n >= 0x80 {
            base.wrapping_sub(256 - u16::from(n))
        } else {
            base.wrapping_add(u16::from(n))
        }
    }
}
