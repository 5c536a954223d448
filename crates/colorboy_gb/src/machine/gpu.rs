//! LCD controller: VRAM, OAM, LCD registers and CGB palette RAM.
//!
//! Timing is tracked per T-state as a dot position inside the current line.
//! Lines 0–143 cycle through OAM search (80 dots), pixel transfer (172) and
//! HBlank (204); lines 144–153 are VBlank. Each visible line is rendered in
//! one go at the end of pixel transfer.

mod render;

use std::fmt;

use colorboy_common::Color;

use crate::cpu::Interrupt;
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

use super::mmu::Peripheral;

const VRAM_BANK_SIZE: usize = 0x2000;
const OAM_SIZE: usize = 0xA0;

const LCDC: u16 = 0xFF40;
const STAT: u16 = 0xFF41;
const SCY: u16 = 0xFF42;
const SCX: u16 = 0xFF43;
const LY: u16 = 0xFF44;
const LYC: u16 = 0xFF45;
const BGP: u16 = 0xFF47;
const OBP0: u16 = 0xFF48;
const OBP1: u16 = 0xFF49;
const WY: u16 = 0xFF4A;
const WX: u16 = 0xFF4B;
const VBK: u16 = 0xFF4F;
const BCPS: u16 = 0xFF68;
const BCPD: u16 = 0xFF69;
const OCPS: u16 = 0xFF6A;
const OCPD: u16 = 0xFF6B;
const MISC_START: u16 = 0xFF57;
const MISC_END: u16 = 0xFF6F;

const OAM_DOTS: u32 = 80;
const TRANSFER_DOTS: u32 = 172;
const LINE_DOTS: u32 = 456;
const VBLANK_LINE: u8 = 144;
const LAST_LINE: u8 = 153;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    HBlank = 0,
    VBlank = 1,
    OamSearch = 2,
    Transfer = 3,
}

/// What one `Gpu::step` produced for the rest of the machine.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct GpuEvents {
    pub interrupts: Interrupt,
    /// A visible line entered HBlank (drives CGB HBlank DMA).
    pub entered_hblank: bool,
}

/// A finished 160×144 frame, three bytes (R, G, B) per pixel.
#[derive(Clone, PartialEq, Eq)]
pub struct Screen {
    pixels: Vec<u8>,
}

impl Screen {
    pub fn new() -> Self {
        Self {
            pixels: vec![0xFF; SCREEN_WIDTH * SCREEN_HEIGHT * 3],
        }
    }

    pub fn width(&self) -> usize {
        SCREEN_WIDTH
    }

    pub fn height(&self) -> usize {
        SCREEN_HEIGHT
    }

    /// Row-major RGB24 bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Color {
        let i = (y * SCREEN_WIDTH + x) * 3;
        Color::new_rgb(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2])
    }

    fn set(&mut self, x: usize, y: usize, color: Color) {
        let i = (y * SCREEN_WIDTH + x) * 3;
        let (r, g, b) = color.rgb();
        self.pixels[i..i + 3].copy_from_slice(&[r, g, b]);
    }

    fn clear(&mut self) {
        self.pixels.fill(0xFF);
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Screen({}x{})", SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

/// 64 bytes of CGB palette RAM behind an index register with auto-increment.
#[derive(Clone)]
struct PaletteRam {
    data: [u8; 64],
    index: u8,
    auto_increment: bool,
}

impl PaletteRam {
    fn new() -> Self {
        // Power-on contents are undefined. Start all white.
        Self {
            data: [0xFF; 64],
            index: 0,
            auto_increment: false,
        }
    }

    fn read_select(&self) -> u8 {
        0x40 | (u8::from(self.auto_increment) << 7) | self.index
    }

    fn write_select(&mut self, value: u8) {
        self.index = value & 0x3F;
        self.auto_increment = value & 0x80 != 0;
    }

    fn read_data(&self) -> u8 {
        self.data[self.index as usize]
    }

    fn write_data(&mut self, value: u8) {
        self.data[self.index as usize] = value;
        if self.auto_increment {
            self.index = (self.index + 1) & 0x3F;
        }
    }

    /// Colour `color` (0–3) of palette `palette` (0–7).
    fn color(&self, palette: u8, color: u8) -> Color {
        let i = (usize::from(palette & 0x07) * 4 + usize::from(color & 0x03)) * 2;
        Color::from_bgr555(u16::from_le_bytes([self.data[i], self.data[i + 1]]))
    }
}

pub struct Gpu {
    vram: Box<[[u8; VRAM_BANK_SIZE]; 2]>,
    vram_bank: usize,
    oam: [u8; OAM_SIZE],
    lcdc: u8,
    /// STAT interrupt-select bits (3–6) as written.
    stat: u8,
    scy: u8,
    scx: u8,
    ly: u8,
    lyc: u8,
    bgp: u8,
    obp0: u8,
    obp1: u8,
    wy: u8,
    wx: u8,
    /// FF57–FF6F storage for addresses without dedicated state.
    misc: [u8; (MISC_END - MISC_START + 1) as usize],
    bg_palettes: PaletteRam,
    obj_palettes: PaletteRam,
    mode: Mode,
    dot: u32,
    /// Internal line counter of the window, advanced only on lines that
    /// drew it.
    window_line: u8,
    /// ORed STAT sources after the last update; interrupts fire on its
    /// rising edge.
    stat_line: bool,
    /// Render with CGB palettes and tile attributes.
    color: bool,
    screen: Screen,
}

impl Gpu {
    pub fn new() -> Self {
        Self {
            vram: Box::new([[0; VRAM_BANK_SIZE]; 2]),
            vram_bank: 0,
            oam: [0; OAM_SIZE],
            lcdc: 0,
            stat: 0,
            scy: 0,
            scx: 0,
            ly: 0,
            lyc: 0,
            bgp: 0,
            obp0: 0,
            obp1: 0,
            wy: 0,
            wx: 0,
            misc: [0; (MISC_END - MISC_START + 1) as usize],
            bg_palettes: PaletteRam::new(),
            obj_palettes: PaletteRam::new(),
            mode: Mode::HBlank,
            dot: 0,
            window_line: 0,
            stat_line: false,
            color: false,
            screen: Screen::new(),
        }
    }

    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    pub fn is_color(&self) -> bool {
        self.color
    }

    pub fn lcd_enabled(&self) -> bool {
        self.lcdc & 0x80 != 0
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn ly(&self) -> u8 {
        self.ly
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Advance by `cycles` T-states.
    pub fn step(&mut self, cycles: u32) -> GpuEvents {
        let mut events = GpuEvents::default();
        if !self.lcd_enabled() {
            return events;
        }

        for _ in 0..cycles {
            self.dot += 1;
            match self.mode {
                Mode::OamSearch if self.dot >= OAM_DOTS => self.mode = Mode::Transfer,
                Mode::Transfer if self.dot >= OAM_DOTS + TRANSFER_DOTS => {
                    self.render_line();
                    self.mode = Mode::HBlank;
                    events.entered_hblank = true;
                }
                Mode::HBlank if self.dot >= LINE_DOTS => {
                    self.dot = 0;
                    self.ly += 1;
                    if self.ly == VBLANK_LINE {
                        self.mode = Mode::VBlank;
                        events.interrupts |= Interrupt::VBLANK;
                        log::debug!("GB GPU: VBlank edge (LY {})", self.ly);
                    } else {
                        self.mode = Mode::OamSearch;
                    }
                }
                Mode::VBlank if self.dot >= LINE_DOTS => {
                    self.dot = 0;
                    if self.ly == LAST_LINE {
                        self.ly = 0;
                        self.window_line = 0;
                        self.mode = Mode::OamSearch;
                    } else {
                        self.ly += 1;
                    }
                }
                _ => {}
            }

            if self.update_stat_line() {
                events.interrupts |= Interrupt::LCD_STAT;
            }
        }
        events
    }

    fn stat_sources(&self) -> bool {
        let mode_source = match self.mode {
            Mode::HBlank => self.stat & 0x08 != 0,
            Mode::VBlank => self.stat & 0x10 != 0,
            Mode::OamSearch => self.stat & 0x20 != 0,
            Mode::Transfer => false,
        };
        mode_source || (self.stat & 0x40 != 0 && self.ly == self.lyc)
    }

    /// Recompute the STAT line; `true` on a rising edge.
    fn update_stat_line(&mut self) -> bool {
        let line = self.lcd_enabled() && self.stat_sources();
        let rising = line && !self.stat_line;
        self.stat_line = line;
        rising
    }

    fn write_lcdc(&mut self, value: u8) {
        let was_on = self.lcd_enabled();
        self.lcdc = value;
        match (was_on, self.lcd_enabled()) {
            (true, false) => {
                log::debug!("GB GPU: LCD off");
                self.ly = 0;
                self.dot = 0;
                self.mode = Mode::HBlank;
                self.stat_line = false;
                self.screen.clear();
            }
            (false, true) => {
                log::debug!("GB GPU: LCD on");
                self.ly = 0;
                self.dot = 0;
                self.window_line = 0;
                self.mode = Mode::OamSearch;
            }
            _ => {}
        }
    }

    fn read_stat(&self) -> u8 {
        let coincidence = if self.ly == self.lyc { 0x04 } else { 0x00 };
        let mode = if self.lcd_enabled() { self.mode as u8 } else { 0 };
        0x80 | (self.stat & 0x78) | coincidence | mode
    }
}

impl Default for Gpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Peripheral for Gpu {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x8000..=0x9FFF => self.vram[self.vram_bank][(addr - 0x8000) as usize],
            0xFE00..=0xFE9F => self.oam[(addr - 0xFE00) as usize],
            LCDC => self.lcdc,
            STAT => self.read_stat(),
            SCY => self.scy,
            SCX => self.scx,
            LY => self.ly,
            LYC => self.lyc,
            BGP => self.bgp,
            OBP0 => self.obp0,
            OBP1 => self.obp1,
            WY => self.wy,
            WX => self.wx,
            VBK => 0xFE | self.vram_bank as u8,
            BCPS => self.bg_palettes.read_select(),
            BCPD => self.bg_palettes.read_data(),
            OCPS => self.obj_palettes.read_select(),
            OCPD => self.obj_palettes.read_data(),
            MISC_START..=MISC_END => self.misc[(addr - MISC_START) as usize],
            _ => 0x00,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x8000..=0x9FFF => self.vram[self.vram_bank][(addr - 0x8000) as usize] = value,
            0xFE00..=0xFE9F => self.oam[(addr - 0xFE00) as usize] = value,
            LCDC => self.write_lcdc(value),
            STAT => self.stat = value & 0x78,
            SCY => self.scy = value,
            SCX => self.scx = value,
            LY => {
                self.ly = 0;
                self.dot = 0;
                if self.lcd_enabled() {
                    self.mode = Mode::OamSearch;
                }
            }
            LYC => self.lyc = value,
            BGP => self.bgp = value,
            OBP0 => self.obp0 = value,
            OBP1 => self.obp1 = value,
            WY => self.wy = value,
            WX => self.wx = value,
            VBK => self.vram_bank = usize::from(value & 0x01),
            BCPS => self.bg_palettes.write_select(value),
            BCPD => self.bg_palettes.write_data(value),
            OCPS => self.obj_palettes.write_select(value),
            OCPD => self.obj_palettes.write_data(value),
            MISC_START..=MISC_END => self.misc[(addr - MISC_START) as usize] = value,
            _ => {}
        }
    }

    /// Colour mode survives a reset; it belongs to the machine setup.
    fn reset(&mut self) {
        let color = self.color;
        *self = Self::new();
        self.color = color;
    }
}
