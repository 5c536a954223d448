//! Memory management unit.
//!
//! The MMU owns WRAM, zero page, the interrupt registers, the boot ROM and
//! the cartridge, and forwards everything else to peripherals through a
//! 64 KiB routing table built by `connect_peripheral`.

mod dispatch;
mod dma;
mod peripheral;

pub use peripheral::{Peripheral, Port};

use thiserror::Error;

use crate::cpu::{BusFault, Interrupt};

use super::apu::Apu;
use super::cartridge::Cartridge;
use super::gpu::Gpu;
use super::keypad::Keypad;
use super::timer::Timer;
use dma::Hdma;

/// Size of the DMG boot ROM overlay.
pub const BOOT_ROM_SIZE: usize = 0x100;

const WRAM_BANK_SIZE: usize = 0x1000;
const WRAM_BANKS: usize = 8;
const ZERO_PAGE_SIZE: usize = 0x7F;
const IO_SIZE: usize = 0x80;
const ADDRESS_SPACE: usize = 0x10000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MmuError {
    #[error("boot ROM is {0} bytes, at most {BOOT_ROM_SIZE} allowed")]
    BootRomTooLarge(usize),
}

pub struct Mmu {
    routes: Vec<Option<Port>>,
    boot_rom: [u8; BOOT_ROM_SIZE],
    in_boot_mode: bool,
    /// Latched by the FF50 write that leaves boot mode; consumed by the
    /// driver through `take_boot_completed`.
    boot_completed: bool,
    cartridge: Option<Cartridge>,
    wram: Box<[[u8; WRAM_BANK_SIZE]; WRAM_BANKS]>,
    /// Bank mapped at D000–DFFF (1–7).
    wram_bank: usize,
    zero_page: [u8; ZERO_PAGE_SIZE],
    /// Backing store for I/O addresses no peripheral claims.
    io: [u8; IO_SIZE],
    if_reg: u8,
    ie_reg: u8,
    key1: u8,
    /// Colour hardware: enables KEY1, WRAM banking and HDMA.
    color: bool,
    hdma: Hdma,
    fault: Option<BusFault>,
    pub(super) gpu: Gpu,
    pub(super) timer: Timer,
    pub(super) keypad: Keypad,
    pub(super) apu: Apu,
}

impl Default for Mmu {
    fn default() -> Self {
        Self::new()
    }
}

impl Mmu {
    /// An MMU in boot mode with no cartridge and nothing routed.
    pub fn new() -> Self {
        Self {
            routes: vec![None; ADDRESS_SPACE],
            boot_rom: [0; BOOT_ROM_SIZE],
            in_boot_mode: true,
            boot_completed: false,
            cartridge: None,
            wram: Box::new([[0; WRAM_BANK_SIZE]; WRAM_BANKS]),
            wram_bank: 1,
            zero_page: [0; ZERO_PAGE_SIZE],
            io: [0; IO_SIZE],
            if_reg: 0,
            ie_reg: 0,
            key1: 0,
            color: false,
            hdma: Hdma::default(),
            fault: None,
            gpu: Gpu::new(),
            timer: Timer::new(),
            keypad: Keypad::new(),
            apu: Apu::new(),
        }
    }

    /// Clear memory and peripherals and re-enter boot mode. The cartridge,
    /// boot ROM image and routes survive.
    pub fn reset(&mut self) {
        self.in_boot_mode = true;
        self.boot_completed = false;
        self.wram.iter_mut().for_each(|bank| bank.fill(0));
        self.wram_bank = 1;
        self.zero_page.fill(0);
        self.io.fill(0);
        self.if_reg = 0;
        self.ie_reg = 0;
        self.key1 = 0;
        self.hdma = Hdma::default();
        self.fault = None;
        for port in Port::ALL {
            self.peripheral_mut(port).reset();
        }
    }

    pub fn load_boot_rom(&mut self, image: &[u8]) -> Result<(), MmuError> {
        if image.len() > BOOT_ROM_SIZE {
            return Err(MmuError::BootRomTooLarge(image.len()));
        }
        self.boot_rom = [0; BOOT_ROM_SIZE];
        self.boot_rom[..image.len()].copy_from_slice(image);
        Ok(())
    }

    pub fn load_cartridge(&mut self, cartridge: Cartridge) {
        log::info!("GB cartridge loaded: {cartridge}");
        self.cartridge = Some(cartridge);
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn cartridge_mut(&mut self) -> Option<&mut Cartridge> {
        self.cartridge.as_mut()
    }

    pub fn in_boot_mode(&self) -> bool {
        self.in_boot_mode
    }

    pub fn set_in_boot_mode(&mut self, on: bool) {
        self.in_boot_mode = on;
    }

    /// Returns `true` once after the boot program has unmapped itself.
    pub fn take_boot_completed(&mut self) -> bool {
        std::mem::take(&mut self.boot_completed)
    }

    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    pub fn is_color(&self) -> bool {
        self.color
    }

    /// Route `start..=end` to `port`. Later connections win.
    pub fn connect_peripheral(&mut self, port: Port, start: u16, end: u16) {
        log::debug!(
            "GB MMU: {} owns 0x{:04X}-0x{:04X}",
            self.peripheral(port).name(),
            start,
            end
        );
        for addr in start..=end {
            self.routes[addr as usize] = Some(port);
        }
    }

    /// Route individual addresses to `port`.
    pub fn connect_peripheral_on(&mut self, port: Port, addrs: &[u16]) {
        for &addr in addrs {
            self.routes[addr as usize] = Some(port);
        }
    }

    pub fn request_interrupt(&mut self, irq: Interrupt) {
        self.if_reg |= irq.bits() & 0x1F;
    }

    /// Advance the peripherals by one CPU step's worth of T-states.
    ///
    /// The GPU sees the unscaled count, the timer `cycles / speed`.
    pub fn step_peripherals(&mut self, cycles: u32, speed: u32) {
        let events = self.gpu.step(cycles);
        if events.entered_hblank {
            self.hdma_hblank();
        }

        let mut irq = events.interrupts;
        irq |= self.timer.step(cycles / speed.max(1));
        irq |= self.keypad.poll();
        self.request_interrupt(irq);
    }

    fn peripheral(&self, port: Port) -> &dyn Peripheral {
        match port {
            Port::Apu => &self.apu,
            Port::Gpu => &self.gpu,
            Port::Keypad => &self.keypad,
            Port::Timer => &self.timer,
        }
    }

    fn peripheral_mut(&mut self, port: Port) -> &mut dyn Peripheral {
        match port {
            Port::Apu => &mut self.apu,
            Port::Gpu => &mut self.gpu,
            Port::Keypad => &mut self.keypad,
            Port::Timer => &mut self.timer,
        }
    }
}
