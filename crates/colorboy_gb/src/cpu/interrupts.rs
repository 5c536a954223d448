use bitflags::bitflags;

use super::{Bus, Cpu, CpuError, IE_ADDR, IF_ADDR};

bitflags! {
    /// Interrupt request lines as laid out in IE and IF.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Interrupt: u8 {
        const VBLANK = 0x01;
        const LCD_STAT = 0x02;
        const TIMER = 0x04;
        const SERIAL = 0x08;
        const JOYPAD = 0x10;
    }
}

/// Serviced sources in priority order with their vectors. Serial has no
/// handler here.
const DISPATCH_ORDER: [(Interrupt, u16); 4] = [
    (Interrupt::VBLANK, 0x0040),
    (Interrupt::LCD_STAT, 0x0048),
    (Interrupt::TIMER, 0x0050),
    (Interrupt::JOYPAD, 0x0060),
];

/// M-cycles spent entering an interrupt handler.
const DISPATCH_CYCLES: u32 = 5;

impl Cpu {
    /// Service the highest-priority pending interrupt, if any.
    ///
    /// Only called with IME set. Returns the M-cycles spent (0 when nothing
    /// was pending).
    pub(super) fn check_for_interrupts<B: Bus>(&mut self, bus: &mut B) -> Result<u32, CpuError> {
        let ie = bus.read8(IE_ADDR);
        let iflags = bus.read8(IF_ADDR);
        let pending = ie & iflags & 0x1F;
        if pending == 0 {
            return Ok(0);
        }

        let pending_lines = Interrupt::from_bits_truncate(pending);
        let Some(&(line, vector)) = DISPATCH_ORDER
            .iter()
            .find(|(line, _)| pending_lines.contains(*line))
        else {
            return Err(CpuError::UnknownInterrupt { pending });
        };

        let pc = self.regs.pc;
        log::debug!(
            "GB CPU interrupt: line={:?} vector=0x{:04X} pc=0x{:04X} sp=0x{:04X} IF=0x{:02X} IE=0x{:02X}",
            line,
            vector,
            pc,
            self.regs.sp,
            iflags & 0x1F,
            ie,
        );

        bus.write8(IF_ADDR, iflags & !line.bits());
        self.push_u16(bus, pc);
        self.regs.pc = vector;
        self.ime = false;

        Ok(DISPATCH_CYCLES)
    }

    /// Apply the delayed IME change requested by EI.
    #[inline]
    pub(super) fn apply_ime_delay(&mut self) {
        if self.ime_enable_delay {
            self.ime = true;
            self.ime_enable_delay = false;
        } else if self.ime_enable_pending {
            self.ime_enable_pending = false;
            self.ime_enable_delay = true;
        }
    }
}
