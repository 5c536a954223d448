pub mod cpu;
pub mod machine;

pub use cpu::{Bus, Clock, Cpu, CpuError, Frame};
pub use machine::{
    Button, Cartridge, CartridgeError, GameBoy, KeypadHandle, MachineOptions, MmuError, SaveError,
    Screen,
};

/// Logical screen width in pixels.
pub const SCREEN_WIDTH: usize = 160;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 144;
/// T-states in one LCD frame (154 lines of 456 cycles).
pub const CYCLES_PER_FRAME: u32 = 70_224;
