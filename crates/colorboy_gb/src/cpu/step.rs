use super::instruction::{lookup, lookup_cb};
use super::{Bus, Cpu, CpuError, IF_ADDR};

const CB_PREFIX: u8 = 0xCB;

impl Cpu {
    /// Execute one instruction (plus any interrupt dispatch in front of it)
    /// and return the T-states consumed.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u32, CpuError> {
        self.clock.reset();

        if self.halted {
            // Leave HALT as soon as IF moves, whatever IME says.
            if bus.read8(IF_ADDR) == self.if_at_halt {
                self.clock.add_m(1);
                return Ok(self.clock_t());
            }
            self.halted = false;
        }

        if self.ime {
            let cycles = self.check_for_interrupts(bus)?;
            self.clock.add_m(cycles);
        }

        self.decode(bus)?;

        let cycles = self.execute(bus);
        self.last_jumped = self.pc_jumped;
        if !self.pc_jumped {
            self.regs.pc = self.next_pc();
        }
        self.pc_jumped = false;

        self.clock.add_m(u32::from(cycles));
        self.apply_ime_delay();

        if let Some(fault) = bus.take_fault() {
            log::error!("GB CPU bus fault at 0x{:04X}: {}", self.regs.pc, fault);
            return Err(fault.into());
        }

        Ok(self.clock_t())
    }

    /// Fetch and decode the instruction at PC into `self.current` and latch
    /// its operand bytes. PC is left on the opcode (past 0xCB for prefixed
    /// instructions).
    fn decode<B: Bus>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        let opcode = bus.read8(self.regs.pc);
        let instr = if opcode == CB_PREFIX {
            self.regs.pc = self.regs.pc.wrapping_add(1);
            lookup_cb(bus.read8(self.regs.pc))
        } else {
            match lookup(opcode) {
                Some(instr) => instr,
                None => {
                    log::error!(
                        "GB CPU invalid opcode 0x{:02X} at 0x{:04X}",
                        opcode,
                        self.regs.pc
                    );
                    return Err(CpuError::UnknownOpcode {
                        opcode,
                        prefixed: false,
                        pc: self.regs.pc,
                    });
                }
            }
        };

        self.current = instr;
        self.operands = [
            bus.read8(self.regs.pc.wrapping_add(1)),
            bus.read8(self.regs.pc.wrapping_add(2)),
        ];
        Ok(())
    }

    #[inline]
    fn clock_t(&self) -> u32 {
        self.clock.t() as u32
    }
}
