use super::{AluOp, Cpu, Flag, RotOp};

/// Pack the four flags into an F value.
#[inline]
const fn flags(z: bool, n: bool, h: bool, c: bool) -> u8 {
    (z as u8) << 7 | (n as u8) << 6 | (h as u8) << 5 | (c as u8) << 4
}

impl Cpu {
    /// Eight-bit accumulator group: `A = A <op> value`, except CP which only
    /// sets flags.
    pub(super) fn alu(&mut self, op: AluOp, value: u8) {
        let a = self.regs.a;
        let carry = u8::from(self.get_flag(Flag::C));
        let (result, f) = match op {
            AluOp::Add => add8(a, value, 0),
            AluOp::Adc => add8(a, value, carry),
            AluOp::Sub | AluOp::Cp => sub8(a, value, 0),
            AluOp::Sbc => sub8(a, value, carry),
            AluOp::And => (a & value, flags(a & value == 0, false, true, false)),
            AluOp::Xor => (a ^ value, flags(a ^ value == 0, false, false, false)),
            AluOp::Or => (a | value, flags(a | value == 0, false, false, false)),
        };
        self.regs.f = f;
        if op != AluOp::Cp {
            self.regs.a = result;
        }
    }

    /// DAA. C can be set but is never cleared here, and N is kept.
    pub(super) fn alu_daa(&mut self) {
        let n = self.get_flag(Flag::N);
        let mut carry = self.get_flag(Flag::C);
        let mut adjust = 0u8;

        if self.get_flag(Flag::H) || (!n && self.regs.a & 0x0F > 0x09) {
            adjust |= 0x06;
        }
        if carry || (!n && self.regs.a > 0x99) {
            adjust |= 0x60;
            carry = true;
        }

        let a = if n {
            self.regs.a.wrapping_sub(adjust)
        } else {
            self.regs.a.wrapping_add(adjust)
        };
        self.regs.a = a;
        self.regs.f = flags(a == 0, n, false, carry);
    }

    /// INC r / INC (HL). C is left alone.
    #[inline]
    pub(super) fn alu_inc8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        let c = self.get_flag(Flag::C);
        self.regs.f = flags(result == 0, false, value & 0x0F == 0x0F, c);
        result
    }

    /// DEC r / DEC (HL). C is left alone.
    #[inline]
    pub(super) fn alu_dec8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        let c = self.get_flag(Flag::C);
        self.regs.f = flags(result == 0, true, value & 0x0F == 0, c);
        result
    }

    /// ADD HL,rr. Z is left alone and H is the carry out of bit 11.
    #[inline]
    pub(super) fn alu_add16_hl(&mut self, value: u16) {
        let hl = self.regs.hl();
        let (result, carry) = hl.overflowing_add(value);
        let half = (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF;
        let z = self.get_flag(Flag::Z);
        self.regs.f = flags(z, false, half, carry);
        self.regs.set_hl(result);
    }

    /// SP plus a signed byte, shared by ADD SP,n and LD HL,SP+n. H and C
    /// come from the unsigned add of the low byte.
    #[inline]
    pub(super) fn alu_add_sp_signed(&mut self, n: u8) -> u16 {
        let sp = self.regs.sp;
        let low = sp as u8;
        let half = (low & 0x0F) + (n & 0x0F) > 0x0F;
        let carry = low.checked_add(n).is_none();
        self.regs.f = flags(false, false, half, carry);
        Self::offset_by(sp, n)
    }

    /// CB rotate and shift group.
    pub(super) fn alu_rotate(&mut self, op: RotOp, value: u8) -> u8 {
        let carry_in = u8::from(self.get_flag(Flag::C));
        let high_out = value & 0x80 != 0;
        let low_out = value & 0x01 != 0;
        let (result, carry) = match op {
            RotOp::Rlc => (value.rotate_left(1), high_out),
            RotOp::Rrc => (value.rotate_right(1), low_out),
            RotOp::Rl => (value << 1 | carry_in, high_out),
            RotOp::Rr => (value >> 1 | carry_in << 7, low_out),
            RotOp::Sla => (value << 1, high_out),
            RotOp::Sra => ((value as i8 >> 1) as u8, low_out),
            RotOp::Swap => (value.rotate_left(4), false),
            RotOp::Srl => (value >> 1, low_out),
        };
        self.regs.f = flags(result == 0, false, false, carry);
        result
    }

    /// BIT b,r. Z is the inverted bit and C is preserved.
    pub(super) fn alu_bit(&mut self, bit: u8, value: u8) {
        let c = self.get_flag(Flag::C);
        self.regs.f = flags(value >> bit & 1 == 0, false, true, c);
    }
}

fn add8(a: u8, value: u8, carry: u8) -> (u8, u8) {
    let wide = u16::from(a) + u16::from(value) + u16::from(carry);
    let half = (a & 0x0F) + (value & 0x0F) + carry > 0x0F;
    let result = wide as u8;
    (result, flags(result == 0, false, half, wide > 0xFF))
}

fn sub8(a: u8, value: u8, carry: u8) -> (u8, u8) {
    let wide = i16::from(a) - i16::from(value) - i16::from(carry);
    let half = (a & 0x0F) < (value & 0x0F) + carry;
    let result = wide as u8;
    (result, flags(result == 0, true, half, wide < 0))
}
