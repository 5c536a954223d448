use super::instruction::nop;
use super::{Clock, Cpu, Instruction, Registers};

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// A CPU with every register zeroed, as seen by a boot ROM at 0x0000.
    pub fn new() -> Self {
        Self {
            regs: Registers::default(),
            ime: false,
            halted: false,
            ime_enable_pending: false,
            ime_enable_delay: false,
            if_at_halt: 0,
            pc_jumped: false,
            last_jumped: false,
            speed: 1,
            clock: Clock::new(),
            current: nop(),
            operands: [0; 2],
        }
    }

    /// Zero all registers and return to normal speed.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Registers as the boot ROM leaves them when it hands control to the
    /// cartridge at 0x0100.
    ///
    /// A identifies the hardware: 0x11 on CGB, 0x01 on DMG.
    pub fn apply_post_boot_state(&mut self, color: bool) {
        self.regs.a = if color { 0x11 } else { 0x01 };
        self.regs.f = 0xB0;
        self.regs.set_bc(0x0013);
        self.regs.set_de(0x00D8);
        self.regs.set_hl(0x014D);
        self.regs.sp = 0xFFFE;
        self.regs.pc = 0x0100;
        self.ime = false;
    }

    /// Only A differs between DMG and CGB at hand-off.
    pub fn set_hardware_mode(&mut self, color: bool) {
        self.regs.a = if color { 0x11 } else { 0x01 };
    }

    /// 1 at normal speed, 2 in CGB double-speed mode.
    #[inline]
    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Cycles consumed by the last `step`.
    #[inline]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[inline]
    pub fn current_instruction(&self) -> &'static Instruction {
        self.current
    }
}
