//! Joypad register (FF00) and the thread-safe button state behind it.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use colorboy_common::key::Key;

use crate::cpu::Interrupt;

use super::mmu::Peripheral;

const P1: u16 = 0xFF00;
const SELECT_DPAD: u8 = 0x10;
const SELECT_BUTTONS: u8 = 0x20;

/// A Game Boy button and its bit in the shared state.
///
/// The low nibble holds the action buttons and the high nibble the D-pad,
/// both in P1 bit order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Right,
    Left,
    Up,
    Down,
}

impl Button {
    #[inline]
    pub fn mask(self) -> u8 {
        match self {
            Button::A => 0x01,
            Button::B => 0x02,
            Button::Select => 0x04,
            Button::Start => 0x08,
            Button::Right => 0x10,
            Button::Left => 0x20,
            Button::Up => 0x40,
            Button::Down => 0x80,
        }
    }

    /// Default keyboard layout: Z/X for A/B, A or Backspace for Select,
    /// S or Return for Start, arrows for the D-pad.
    pub fn from_key(key: Key) -> Option<Button> {
        match key {
            Key::Z => Some(Button::A),
            Key::X => Some(Button::B),
            Key::A | Key::Backspace => Some(Button::Select),
            Key::S | Key::Return => Some(Button::Start),
            Key::Right => Some(Button::Right),
            Key::Left => Some(Button::Left),
            Key::Up => Some(Button::Up),
            Key::Down => Some(Button::Down),
            Key::Escape | Key::None => None,
        }
    }
}

/// Cloneable writer for the button state, handed to the I/O thread.
#[derive(Clone, Debug, Default)]
pub struct KeypadHandle {
    pressed: Arc<AtomicU8>,
}

impl KeypadHandle {
    pub fn press(&self, button: Button) {
        self.pressed.fetch_or(button.mask(), Ordering::Relaxed);
    }

    pub fn release(&self, button: Button) {
        self.pressed.fetch_and(!button.mask(), Ordering::Relaxed);
    }

    pub fn set(&self, button: Button, pressed: bool) {
        if pressed {
            self.press(button)
        } else {
            self.release(button)
        }
    }

    /// Bitmask of held buttons, bit set = pressed.
    pub fn pressed(&self) -> u8 {
        self.pressed.load(Ordering::Relaxed)
    }
}

pub struct Keypad {
    state: KeypadHandle,
    /// P1 bits 4–5 as last written; 0 selects a row.
    select: u8,
    /// Snapshot from the previous poll, for edge detection.
    last: u8,
}

impl Keypad {
    pub fn new() -> Self {
        Self {
            state: KeypadHandle::default(),
            select: SELECT_DPAD | SELECT_BUTTONS,
            last: 0,
        }
    }

    pub fn handle(&self) -> KeypadHandle {
        self.state.clone()
    }

    /// Sample the shared state; newly pressed buttons raise the joypad
    /// interrupt.
    pub fn poll(&mut self) -> Interrupt {
        let now = self.state.pressed();
        let newly = now & !self.last;
        self.last = now;
        if newly != 0 {
            Interrupt::JOYPAD
        } else {
            Interrupt::empty()
        }
    }
}

impl Default for Keypad {
    fn default() -> Self {
        Self::new()
    }
}

impl Peripheral for Keypad {
    fn name(&self) -> &'static str {
        "keypad"
    }

    fn read(&self, addr: u16) -> u8 {
        if addr != P1 {
            return 0x00;
        }
        let pressed = self.state.pressed();
        let mut low = 0x0F;
        if self.select & SELECT_BUTTONS == 0 {
            low &= !pressed & 0x0F;
        }
        if self.select & SELECT_DPAD == 0 {
            low &= !(pressed >> 4) & 0x0F;
        }
        0xC0 | self.select | low
    }

    fn write(&mut self, addr: u16, value: u8) {
        if addr == P1 {
            self.select = value & (SELECT_DPAD | SELECT_BUTTONS);
        }
    }

    /// Clears the row selection only; held buttons belong to the frontend.
    fn reset(&mut self) {
        self.select = SELECT_DPAD | SELECT_BUTTONS;
        self.last = self.state.pressed();
    }
}
