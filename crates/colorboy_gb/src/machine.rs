mod apu;
mod boot;
pub mod cartridge;
mod gameboy;
mod gpu;
mod keypad;
pub mod mmu;
mod timer;

pub use cartridge::{Cartridge, CartridgeError, CartridgeType, Header, SaveError};
pub use gameboy::{GameBoy, MachineOptions};
pub use gpu::{Mode, Screen};
pub use keypad::{Button, KeypadHandle};
pub use mmu::{Mmu, MmuError, Peripheral, Port};

#[cfg(test)]
mod tests;
