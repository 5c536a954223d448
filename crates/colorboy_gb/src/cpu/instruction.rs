//! Static instruction tables.
//!
//! Both tables are built once and never mutated. Conditional instructions
//! store their not-taken cost; the handler adds [`Op::taken_extra_cycles`]
//! when the branch is taken.

use std::fmt;

use lazy_static::lazy_static;

/// 8-bit operand in opcode register order; `HlInd` is `(HL)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg8 {
    B,
    C,
    D,
    E,
    H,
    L,
    HlInd,
    A,
}

impl Reg8 {
    const ORDER: [Reg8; 8] = [
        Reg8::B,
        Reg8::C,
        Reg8::D,
        Reg8::E,
        Reg8::H,
        Reg8::L,
        Reg8::HlInd,
        Reg8::A,
    ];

    #[inline]
    pub fn from_index(index: u8) -> Reg8 {
        Self::ORDER[(index & 0x07) as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            Reg8::B => "B",
            Reg8::C => "C",
            Reg8::D => "D",
            Reg8::E => "E",
            Reg8::H => "H",
            Reg8::L => "L",
            Reg8::HlInd => "(HL)",
            Reg8::A => "A",
        }
    }
}

/// Register pairs addressed by LD rr,nn / INC rr / DEC rr / ADD HL,rr.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg16 {
    Bc,
    De,
    Hl,
    Sp,
}

impl Reg16 {
    fn from_index(index: u8) -> Reg16 {
        match index & 0x03 {
            0 => Reg16::Bc,
            1 => Reg16::De,
            2 => Reg16::Hl,
            _ => Reg16::Sp,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Reg16::Bc => "BC",
            Reg16::De => "DE",
            Reg16::Hl => "HL",
            Reg16::Sp => "SP",
        }
    }
}

/// Register pairs addressed by PUSH and POP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackReg {
    Bc,
    De,
    Hl,
    Af,
}

impl StackReg {
    fn from_index(index: u8) -> StackReg {
        match index & 0x03 {
            0 => StackReg::Bc,
            1 => StackReg::De,
            2 => StackReg::Hl,
            _ => StackReg::Af,
        }
    }

    fn name(self) -> &'static str {
        match self {
            StackReg::Bc => "BC",
            StackReg::De => "DE",
            StackReg::Hl => "HL",
            StackReg::Af => "AF",
        }
    }
}

/// Memory operands of `LD (rr),A` and `LD A,(rr)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indirect {
    Bc,
    De,
    HlInc,
    HlDec,
}

impl Indirect {
    fn from_index(index: u8) -> Indirect {
        match index & 0x03 {
            0 => Indirect::Bc,
            1 => Indirect::De,
            2 => Indirect::HlInc,
            _ => Indirect::HlDec,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Indirect::Bc => "(BC)",
            Indirect::De => "(DE)",
            Indirect::HlInc => "(HL+)",
            Indirect::HlDec => "(HL-)",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cond {
    Nz,
    Z,
    Nc,
    C,
}

impl Cond {
    fn from_index(index: u8) -> Cond {
        match index & 0x03 {
            0 => Cond::Nz,
            1 => Cond::Z,
            2 => Cond::Nc,
            _ => Cond::C,
        }
    }

    /// Evaluate the condition against an F register value.
    #[inline]
    pub fn holds(self, f: u8) -> bool {
        let z = f & 0x80 != 0;
        let c = f & 0x10 != 0;
        match self {
            Cond::Nz => !z,
            Cond::Z => z,
            Cond::Nc => !c,
            Cond::C => c,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Cond::Nz => "NZ",
            Cond::Z => "Z",
            Cond::Nc => "NC",
            Cond::C => "C",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    fn from_index(index: u8) -> AluOp {
        match index & 0x07 {
            0 => AluOp::Add,
            1 => AluOp::Adc,
            2 => AluOp::Sub,
            3 => AluOp::Sbc,
            4 => AluOp::And,
            5 => AluOp::Xor,
            6 => AluOp::Or,
            _ => AluOp::Cp,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            AluOp::Add => "ADD A,",
            AluOp::Adc => "ADC A,",
            AluOp::Sub => "SUB ",
            AluOp::Sbc => "SBC A,",
            AluOp::And => "AND ",
            AluOp::Xor => "XOR ",
            AluOp::Or => "OR ",
            AluOp::Cp => "CP ",
        }
    }
}

/// CB-prefixed rotate and shift group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

impl RotOp {
    fn from_index(index: u8) -> RotOp {
        match index & 0x07 {
            0 => RotOp::Rlc,
            1 => RotOp::Rrc,
            2 => RotOp::Rl,
            3 => RotOp::Rr,
            4 => RotOp::Sla,
            5 => RotOp::Sra,
            6 => RotOp::Swap,
            _ => RotOp::Srl,
        }
    }

    fn name(self) -> &'static str {
        match self {
            RotOp::Rlc => "RLC",
            RotOp::Rrc => "RRC",
            RotOp::Rl => "RL",
            RotOp::Rr => "RR",
            RotOp::Sla => "SLA",
            RotOp::Sra => "SRA",
            RotOp::Swap => "SWAP",
            RotOp::Srl => "SRL",
        }
    }
}

/// Decoded operation carried by every table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Nop,
    LdRrNn(Reg16),
    LdIndA(Indirect),
    LdAInd(Indirect),
    IncRr(Reg16),
    DecRr(Reg16),
    Inc(Reg8),
    Dec(Reg8),
    LdRN(Reg8),
    Rlca,
    Rrca,
    Rla,
    Rra,
    LdNnSp,
    AddHl(Reg16),
    Stop,
    Jr,
    JrCc(Cond),
    Daa,
    Cpl,
    Scf,
    Ccf,
    LdRR(Reg8, Reg8),
    Halt,
    Alu(AluOp, Reg8),
    AluN(AluOp),
    RetCc(Cond),
    Ret,
    Reti,
    Pop(StackReg),
    Push(StackReg),
    JpCc(Cond),
    Jp,
    JpHl,
    CallCc(Cond),
    Call,
    Rst(u8),
    LdhNA,
    LdhAN,
    LdCA,
    LdAC,
    AddSpN,
    LdHlSpN,
    LdSpHl,
    LdNnA,
    LdANn,
    Di,
    Ei,
    Rot(RotOp, Reg8),
    Bit(u8, Reg8),
    Res(u8, Reg8),
    Set(u8, Reg8),
}

impl Op {
    /// Condition guarding a conditional branch.
    #[cfg(test)]
    pub(crate) fn condition(&self) -> Option<Cond> {
        match *self {
            Op::JrCc(cc) | Op::RetCc(cc) | Op::JpCc(cc) | Op::CallCc(cc) => Some(cc),
            _ => None,
        }
    }

    /// M-cycles added to the base cost when a conditional branch is taken.
    pub fn taken_extra_cycles(&self) -> u8 {
        match self {
            Op::JrCc(_) | Op::JpCc(_) => 1,
            Op::RetCc(_) | Op::CallCc(_) => 3,
            _ => 0,
        }
    }

    /// Whether the operation may redirect PC.
    #[cfg(test)]
    pub(crate) fn is_jump(&self) -> bool {
        matches!(
            self,
            Op::Jr
                | Op::JrCc(_)
                | Op::Jp
                | Op::JpCc(_)
                | Op::JpHl
                | Op::Call
                | Op::CallCc(_)
                | Op::Ret
                | Op::RetCc(_)
                | Op::Reti
                | Op::Rst(_)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: u8,
    pub prefixed: bool,
    /// Assembly text; `n` and `nn` stand for the 8- and 16-bit operands.
    pub mnemonic: String,
    pub operand_bytes: u8,
    /// Base cost in M-cycles (not-taken cost for conditional branches).
    pub cycles: u8,
    pub op: Op,
}

impl Instruction {
    fn base(opcode: u8, mnemonic: String, operand_bytes: u8, cycles: u8, op: Op) -> Self {
        Self {
            opcode,
            prefixed: false,
            mnemonic,
            operand_bytes,
            cycles,
            op,
        }
    }

    /// Cost in M-cycles when a conditional branch is taken.
    pub fn cycles_taken(&self) -> u8 {
        self.cycles + self.op.taken_extra_cycles()
    }

    /// Render the mnemonic with concrete operand values.
    pub fn disassemble(&self, operands: [u8; 2]) -> String {
        match self.operand_bytes {
            2 => {
                let nn = u16::from_le_bytes(operands);
                self.mnemonic.replace("nn", &format!("${nn:04X}"))
            }
            1 => self.mnemonic.replace('n', &format!("${:02X}", operands[0])),
            _ => self.mnemonic.clone(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefixed {
            write!(f, "CB {:02X} {}", self.opcode, self.mnemonic)
        } else {
            write!(f, "{:02X} {}", self.opcode, self.mnemonic)
        }
    }
}

lazy_static! {
    static ref BASE_TABLE: Vec<Option<Instruction>> = (0..=255u8).map(decode_base).collect();
    static ref CB_TABLE: Vec<Instruction> = (0..=255u8).map(decode_cb).collect();
    static ref NOP: Instruction = Instruction::base(0x00, "NOP".to_string(), 0, 1, Op::Nop);
}

/// Look up an unprefixed opcode. Returns `None` for the unused slots
/// (D3, DB, DD, E3, E4, EB, EC, ED, F4, FC, FD) and for the 0xCB prefix.
pub fn lookup(opcode: u8) -> Option<&'static Instruction> {
    BASE_TABLE[opcode as usize].as_ref()
}

/// Look up the opcode following a 0xCB prefix. Every slot is defined.
pub fn lookup_cb(opcode: u8) -> &'static Instruction {
    &CB_TABLE[opcode as usize]
}

/// Decode using the usual x/y/z/p/q split of the opcode byte.
fn decode_base(opcode: u8) -> Option<Instruction> {
    let x = opcode >> 6;
    let y = (opcode >> 3) & 0x07;
    let z = opcode & 0x07;
    let p = y >> 1;
    let q = y & 0x01;

    let entry = |mnemonic: String, operand_bytes: u8, cycles: u8, op: Op| {
        Some(Instruction::base(opcode, mnemonic, operand_bytes, cycles, op))
    };
    let fixed = |mnemonic: &str, operand_bytes: u8, cycles: u8, op: Op| {
        entry(mnemonic.to_string(), operand_bytes, cycles, op)
    };

    match (x, z) {
        (0, 0) => match y {
            0 => fixed("NOP", 0, 1, Op::Nop),
            1 => fixed("LD (nn),SP", 2, 5, Op::LdNnSp),
            2 => fixed("STOP", 1, 1, Op::Stop),
            3 => fixed("JR n", 1, 3, Op::Jr),
            _ => {
                let cc = Cond::from_index(y - 4);
                entry(format!("JR {},n", cc.name()), 1, 2, Op::JrCc(cc))
            }
        },
        (0, 1) => {
            let rr = Reg16::from_index(p);
            if q == 0 {
                entry(format!("LD {},nn", rr.name()), 2, 3, Op::LdRrNn(rr))
            } else {
                entry(format!("ADD HL,{}", rr.name()), 0, 2, Op::AddHl(rr))
            }
        }
        (0, 2) => {
            let ind = Indirect::from_index(p);
            if q == 0 {
                entry(format!("LD {},A", ind.name()), 0, 2, Op::LdIndA(ind))
            } else {
                entry(format!("LD A,{}", ind.name()), 0, 2, Op::LdAInd(ind))
            }
        }
        (0, 3) => {
            let rr = Reg16::from_index(p);
            if q == 0 {
                entry(format!("INC {}", rr.name()), 0, 2, Op::IncRr(rr))
            } else {
                entry(format!("DEC {}", rr.name()), 0, 2, Op::DecRr(rr))
            }
        }
        (0, 4) | (0, 5) => {
            let r = Reg8::from_index(y);
            let cycles = if r == Reg8::HlInd { 3 } else { 1 };
            if z == 4 {
                entry(format!("INC {}", r.name()), 0, cycles, Op::Inc(r))
            } else {
                entry(format!("DEC {}", r.name()), 0, cycles, Op::Dec(r))
            }
        }
        (0, 6) => {
            let r = Reg8::from_index(y);
            let cycles = if r == Reg8::HlInd { 3 } else { 2 };
            entry(format!("LD {},n", r.name()), 1, cycles, Op::LdRN(r))
        }
        (0, _) => match y {
            0 => fixed("RLCA", 0, 1, Op::Rlca),
            1 => fixed("RRCA", 0, 1, Op::Rrca),
            2 => fixed("RLA", 0, 1, Op::Rla),
            3 => fixed("RRA", 0, 1, Op::Rra),
            4 => fixed("DAA", 0, 1, Op::Daa),
            5 => fixed("CPL", 0, 1, Op::Cpl),
            6 => fixed("SCF", 0, 1, Op::Scf),
            _ => fixed("CCF", 0, 1, Op::Ccf),
        },
        (1, _) => {
            if y == 6 && z == 6 {
                return fixed("HALT", 0, 1, Op::Halt);
            }
            let dst = Reg8::from_index(y);
            let src = Reg8::from_index(z);
            let cycles = if dst == Reg8::HlInd || src == Reg8::HlInd {
                2
            } else {
                1
            };
            entry(
                format!("LD {},{}", dst.name(), src.name()),
                0,
                cycles,
                Op::LdRR(dst, src),
            )
        }
        (2, _) => {
            let alu = AluOp::from_index(y);
            let r = Reg8::from_index(z);
            let cycles = if r == Reg8::HlInd { 2 } else { 1 };
            entry(
                format!("{}{}", alu.prefix(), r.name()),
                0,
                cycles,
                Op::Alu(alu, r),
            )
        }
        (_, 0) => match y {
            0..=3 => {
                let cc = Cond::from_index(y);
                entry(format!("RET {}", cc.name()), 0, 2, Op::RetCc(cc))
            }
            4 => fixed("LDH (n),A", 1, 3, Op::LdhNA),
            5 => fixed("ADD SP,n", 1, 4, Op::AddSpN),
            6 => fixed("LDH A,(n)", 1, 3, Op::LdhAN),
            _ => fixed("LD HL,SP+n", 1, 3, Op::LdHlSpN),
        },
        (_, 1) => {
            if q == 0 {
                let rr = StackReg::from_index(p);
                return entry(format!("POP {}", rr.name()), 0, 3, Op::Pop(rr));
            }
            match p {
                0 => fixed("RET", 0, 4, Op::Ret),
                1 => fixed("RETI", 0, 4, Op::Reti),
                2 => fixed("JP (HL)", 0, 1, Op::JpHl),
                _ => fixed("LD SP,HL", 0, 2, Op::LdSpHl),
            }
        }
        (_, 2) => match y {
            0..=3 => {
                let cc = Cond::from_index(y);
                entry(format!("JP {},nn", cc.name()), 2, 3, Op::JpCc(cc))
            }
            4 => fixed("LD (C),A", 0, 2, Op::LdCA),
            5 => fixed("LD (nn),A", 2, 4, Op::LdNnA),
            6 => fixed("LD A,(C)", 0, 2, Op::LdAC),
            _ => fixed("LD A,(nn)", 2, 4, Op::LdANn),
        },
        (_, 3) => match y {
            0 => fixed("JP nn", 2, 4, Op::Jp),
            6 => fixed("DI", 0, 1, Op::Di),
            7 => fixed("EI", 0, 1, Op::Ei),
            // 0xCB is the prefix; the rest are holes.
            _ => None,
        },
        (_, 4) => match y {
            0..=3 => {
                let cc = Cond::from_index(y);
                entry(format!("CALL {},nn", cc.name()), 2, 3, Op::CallCc(cc))
            }
            _ => None,
        },
        (_, 5) => {
            if q == 0 {
                let rr = StackReg::from_index(p);
                entry(format!("PUSH {}", rr.name()), 0, 4, Op::Push(rr))
            } else if p == 0 {
                fixed("CALL nn", 2, 6, Op::Call)
            } else {
                None
            }
        }
        (_, 6) => {
            let alu = AluOp::from_index(y);
            entry(format!("{}n", alu.prefix()), 1, 2, Op::AluN(alu))
        }
        _ => {
            let vector = y * 8;
            entry(format!("RST {vector:02X}H"), 0, 4, Op::Rst(vector))
        }
    }
}

fn decode_cb(opcode: u8) -> Instruction {
    let x = opcode >> 6;
    let y = (opcode >> 3) & 0x07;
    let r = Reg8::from_index(opcode & 0x07);
    let memory = r == Reg8::HlInd;

    let (mnemonic, cycles, op) = match x {
        0 => {
            let rot = RotOp::from_index(y);
            (format!("{} {}", rot.name(), r.name()), 2, Op::Rot(rot, r))
        }
        1 => (format!("BIT {},{}", y, r.name()), 2, Op::Bit(y, r)),
        2 => (format!("RES {},{}", y, r.name()), 2, Op::Res(y, r)),
        _ => (format!("SET {},{}", y, r.name()), 2, Op::Set(y, r)),
    };
    let cycles = match (memory, op) {
        (false, _) => cycles,
        (true, Op::Bit(..)) => 3,
        (true, _) => 4,
    };

    Instruction {
        opcode,
        prefixed: true,
        mnemonic,
        operand_bytes: 0,
        cycles,
        op,
    }
}

/// The instruction a freshly reset CPU reports as current.
pub(super) fn nop() -> &'static Instruction {
    &NOP
}
