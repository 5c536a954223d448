use std::fmt;

use super::{Clock, Cpu, Flag, Instruction, Registers};

/// Immutable snapshot of the CPU between two steps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub regs: Registers,
    pub ime: bool,
    pub halted: bool,
    pub if_at_halt: u8,
    pub speed: u32,
    pub instruction: &'static Instruction,
    pub operands: [u8; 2],
    pub last_clock: Clock,
    /// Whether the last instruction set PC itself.
    pub pc_jumped: bool,
}

impl Cpu {
    pub fn frame(&self) -> Frame {
        Frame {
            regs: self.regs,
            ime: self.ime,
            halted: self.halted,
            if_at_halt: self.if_at_halt,
            speed: self.speed,
            instruction: self.current,
            operands: self.operands,
            last_clock: self.clock,
            pc_jumped: self.last_jumped,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |flag: Flag, c: char| if self.regs.f & flag.mask() != 0 { c } else { '-' };
        writeln!(
            f,
            "last: {:<20} ({}, {} cycles{})",
            self.instruction.disassemble(self.operands),
            self.instruction,
            self.last_clock.t(),
            if self.pc_jumped { ", jumped" } else { "" },
        )?;
        writeln!(
            f,
            "AF={:04X} BC={:04X} DE={:04X} HL={:04X} SP={:04X} PC={:04X} [{}{}{}{}]",
            self.regs.af(),
            self.regs.bc(),
            self.regs.de(),
            self.regs.hl(),
            self.regs.sp,
            self.regs.pc,
            flag(Flag::Z, 'Z'),
            flag(Flag::N, 'N'),
            flag(Flag::H, 'H'),
            flag(Flag::C, 'C'),
        )?;
        write!(
            f,
            "IME={} HALT={} (IF@HALT={:02X}) speed={}x",
            u8::from(self.ime),
            u8::from(self.halted),
            self.if_at_halt,
            self.speed,
        )
    }
}
