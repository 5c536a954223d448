//! Sharp LR35902 core.
//!
//! The CPU decodes through two static tables (base and CB-prefixed), runs one
//! instruction per [`Cpu::step`] and reports the T-states it consumed so the
//! machine can clock the GPU and timer in lock-step.

mod alu;
mod bus;
mod clock;
mod exec;
mod frame;
mod helpers;
mod init;
mod instruction;
mod interrupts;
mod regs;
mod step;

pub use bus::{Bus, BusFault};
pub use clock::Clock;
pub use frame::Frame;
pub use instruction::{
    lookup, lookup_cb, AluOp, Cond, Indirect, Instruction, Op, Reg16, Reg8, RotOp, StackReg,
};
pub use interrupts::Interrupt;
pub use regs::{Flag, Registers};

use thiserror::Error;

/// Address of the CGB KEY1 speed-switch register.
pub const KEY1: u16 = 0xFF4D;
/// Interrupt flag register.
pub const IF_ADDR: u16 = 0xFF0F;
/// Interrupt enable register.
pub const IE_ADDR: u16 = 0xFFFF;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CpuError {
    #[error("unknown opcode 0x{opcode:02X} (CB prefixed: {prefixed}) at 0x{pc:04X}")]
    UnknownOpcode { opcode: u8, prefixed: bool, pc: u16 },
    #[error("unknown interrupt pending (IE & IF = 0x{pending:02X})")]
    UnknownInterrupt { pending: u8 },
    #[error(transparent)]
    Bus(#[from] BusFault),
}

#[derive(Clone, Debug)]
pub struct Cpu {
    pub regs: Registers,
    /// Interrupt master enable.
    pub ime: bool,
    pub halted: bool,
    /// EI takes effect after the following instruction: `pending` is armed by
    /// EI itself, `delay` one step later, and IME flips at the end of the
    /// step after that.
    ime_enable_pending: bool,
    ime_enable_delay: bool,
    /// IF as observed when HALT executed.
    if_at_halt: u8,
    /// Set by any handler that writes PC; suppresses the automatic advance.
    pc_jumped: bool,
    last_jumped: bool,
    /// 1 for normal speed, 2 after a CGB speed switch.
    speed: u32,
    clock: Clock,
    current: &'static Instruction,
    operands: [u8; 2],
}
