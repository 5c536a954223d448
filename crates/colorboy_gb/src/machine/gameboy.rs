use std::io::{Read, Write};
use std::ops::ControlFlow;

use typed_builder::TypedBuilder;

use crate::cpu::{Bus, Clock, Cpu, CpuError, Frame};
use crate::CYCLES_PER_FRAME;

use super::boot;
use super::cartridge::{Cartridge, SaveError};
use super::gpu::Screen;
use super::keypad::KeypadHandle;
use super::mmu::{Mmu, MmuError, Port};

/// I/O register values the boot ROM leaves behind, written in order when
/// booting is skipped.
const POST_BOOT_IO: [(u16, u8); 32] = [
    (0xFF05, 0x00),
    (0xFF06, 0x00),
    (0xFF07, 0x00),
    (0xFF10, 0x80),
    (0xFF11, 0xBF),
    (0xFF12, 0xF3),
    (0xFF14, 0xBF),
    (0xFF16, 0x3F),
    (0xFF17, 0x00),
    (0xFF19, 0xBF),
    (0xFF1A, 0x7F),
    (0xFF1B, 0xFF),
    (0xFF1C, 0x9F),
    (0xFF1E, 0xBF),
    (0xFF20, 0xFF),
    (0xFF21, 0x00),
    (0xFF22, 0x00),
    (0xFF23, 0xBF),
    (0xFF24, 0x77),
    (0xFF25, 0xF3),
    (0xFF26, 0xF1),
    (0xFF40, 0x91),
    (0xFF42, 0x00),
    (0xFF43, 0x00),
    (0xFF45, 0x00),
    (0xFF47, 0xFC),
    (0xFF48, 0xFF),
    (0xFF49, 0xFF),
    (0xFF4A, 0x00),
    (0xFF4B, 0x00),
    (0xFF50, 0x00),
    (0xFFFF, 0x00),
];

/// How a machine is brought up.
#[derive(Clone, Debug, TypedBuilder)]
pub struct MachineOptions {
    /// Start at 0x0100 with post-boot register state instead of running a
    /// boot program.
    #[builder(default = false)]
    pub skip_boot: bool,
    /// Present CGB hardware to the cartridge.
    #[builder(default = true)]
    pub color_mode: bool,
    /// Boot ROM image; the built-in program is used when absent.
    #[builder(default, setter(strip_option))]
    pub boot_rom: Option<Vec<u8>>,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// High-level Game Boy machine.
///
/// Owns the CPU and the MMU (which in turn owns the cartridge and the
/// peripherals) and drives them in lock-step.
pub struct GameBoy {
    pub cpu: Cpu,
    pub(crate) mmu: Mmu,
    options: MachineOptions,
    /// Total time since power-on or the last reset.
    clock: Clock,
    /// T-states run past the end of the previous frame.
    frame_carry: u32,
}

impl GameBoy {
    pub fn new(cartridge: Cartridge, options: MachineOptions) -> Result<Self, MmuError> {
        let mut mmu = Mmu::new();
        match &options.boot_rom {
            Some(image) => mmu.load_boot_rom(image)?,
            None => mmu.load_boot_rom(&boot::builtin_image())?,
        }
        mmu.load_cartridge(cartridge);
        connect_peripherals(&mut mmu);

        let mut gb = Self {
            cpu: Cpu::new(),
            mmu,
            options,
            clock: Clock::new(),
            frame_carry: 0,
        };
        gb.boot();
        Ok(gb)
    }

    fn boot(&mut self) {
        if self.options.skip_boot {
            log::info!("GB skipping boot sequence");
            self.mmu.set_in_boot_mode(false);
            self.cpu.apply_post_boot_state(self.options.color_mode);
            self.apply_hardware_mode();
            for (addr, value) in POST_BOOT_IO {
                self.mmu.write8(addr, value);
            }
        } else {
            log::info!("GB running boot ROM");
            self.mmu.set_in_boot_mode(true);
            self.mmu.write8(0xFF50, 0x00);
        }
    }

    /// Tell CPU, MMU and GPU which hardware they are on. The GPU only uses
    /// colour rendering for colour cartridges.
    fn apply_hardware_mode(&mut self) {
        let color = self.options.color_mode;
        let cart_color = self.mmu.cartridge().is_some_and(Cartridge::is_color);
        self.cpu.set_hardware_mode(color);
        self.mmu.set_color(color);
        self.mmu.gpu.set_color(color && cart_color);
        log::info!(
            "GB hardware mode: {} (colour rendering {})",
            if color { "CGB" } else { "DMG" },
            if color && cart_color { "on" } else { "off" }
        );
    }

    /// Run one instruction and clock the peripherals by the same amount.
    /// Returns the T-states taken.
    pub fn step(&mut self) -> Result<u32, CpuError> {
        let cycles = self.cpu.step(&mut self.mmu)?;
        self.mmu.step_peripherals(cycles, self.cpu.speed());
        self.clock += self.cpu.clock();

        if self.mmu.take_boot_completed() {
            self.cpu.regs.pc = 0x0100;
            self.apply_hardware_mode();
        }
        Ok(cycles)
    }

    /// Run one frame's worth of cycles.
    pub fn step_frame(&mut self) -> Result<(), CpuError> {
        self.step_frame_with(|_| ControlFlow::Continue(())).map(|_| ())
    }

    /// Run one frame's worth of cycles, calling `hook` before every
    /// instruction. A `Break` from the hook stops the frame early and is
    /// passed back; the cycles run so far count towards the next call.
    pub fn step_frame_with<F>(&mut self, mut hook: F) -> Result<ControlFlow<()>, CpuError>
    where
        F: FnMut(&mut GameBoy) -> ControlFlow<()>,
    {
        while self.frame_carry < CYCLES_PER_FRAME {
            if hook(self).is_break() {
                return Ok(ControlFlow::Break(()));
            }
            self.frame_carry += self.step()?;
        }
        self.frame_carry -= CYCLES_PER_FRAME;
        Ok(ControlFlow::Continue(()))
    }

    /// Power-cycle: zero the CPU, clear memory and peripherals, and boot
    /// again with the same cartridge and options.
    pub fn reset(&mut self) {
        log::info!("GB reset");
        self.cpu.reset();
        self.mmu.reset();
        self.clock.reset();
        self.frame_carry = 0;
        self.boot();
    }

    /// Copy of the last completed framebuffer.
    pub fn screen(&self) -> Screen {
        self.mmu.gpu.screen().clone()
    }

    pub fn keypad_handle(&self) -> KeypadHandle {
        self.mmu.keypad.handle()
    }

    pub fn cpu_frame(&self) -> Frame {
        self.cpu.frame()
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn options(&self) -> &MachineOptions {
        &self.options
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.mmu.cartridge()
    }

    /// Read a byte the way the CPU would see it, without side effects.
    pub fn peek(&self, addr: u16) -> u8 {
        self.mmu.read(addr)
    }

    pub fn save_ram<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        match self.mmu.cartridge() {
            Some(cart) => cart.save_ram(writer),
            None => Err(SaveError::NoBatteryRam),
        }
    }

    pub fn load_ram<R: Read>(&mut self, reader: R) -> Result<(), SaveError> {
        match self.mmu.cartridge_mut() {
            Some(cart) => cart.load_ram(reader),
            None => Err(SaveError::NoBatteryRam),
        }
    }
}

/// Address layout shared by every machine.
fn connect_peripherals(mmu: &mut Mmu) {
    mmu.connect_peripheral(Port::Apu, 0xFF10, 0xFF3F);
    mmu.connect_peripheral(Port::Gpu, 0x8000, 0x9FFF);
    mmu.connect_peripheral(Port::Gpu, 0xFE00, 0xFE9F);
    mmu.connect_peripheral(Port::Gpu, 0xFF57, 0xFF6F);
    mmu.connect_peripheral(Port::Gpu, 0xFF40, 0xFF45);
    mmu.connect_peripheral(Port::Gpu, 0xFF47, 0xFF4B);
    mmu.connect_peripheral_on(Port::Gpu, &[0xFF4F]);
    mmu.connect_peripheral_on(Port::Keypad, &[0xFF00]);
    mmu.connect_peripheral(Port::Timer, 0xFF04, 0xFF07);
}
