use colorboy_common::Color;

use super::Gpu;
use crate::SCREEN_WIDTH;

/// DMG shades for palette values 0–3.
const SHADES: [u8; 4] = [0xFF, 0xAA, 0x55, 0x00];
const MAX_SPRITES_PER_LINE: usize = 10;

/// Background/window pixel kept for sprite priority decisions.
#[derive(Copy, Clone, Default)]
struct BgPixel {
    color: u8,
    /// CGB tile attribute bit 7.
    priority: bool,
}

/// CGB tile map attribute byte (VRAM bank 1).
#[derive(Copy, Clone, Default)]
struct TileAttrs(u8);

impl TileAttrs {
    fn palette(self) -> u8 {
        self.0 & 0x07
    }
    fn bank(self) -> usize {
        usize::from((self.0 >> 3) & 0x01)
    }
    fn flip_x(self) -> bool {
        self.0 & 0x20 != 0
    }
    fn flip_y(self) -> bool {
        self.0 & 0x40 != 0
    }
    fn priority(self) -> bool {
        self.0 & 0x80 != 0
    }
}

impl Gpu {
    pub(super) fn render_line(&mut self) {
        let y = usize::from(self.ly);
        let mut line = [BgPixel::default(); SCREEN_WIDTH];

        // On DMG, LCDC bit 0 blanks BG and window. On CGB it only strips
        // their priority over sprites.
        if self.color || self.lcdc & 0x01 != 0 {
            self.render_background(y, &mut line);
            self.render_window(y, &mut line);
        } else {
            for x in 0..SCREEN_WIDTH {
                self.screen.set(x, y, Color::grey(SHADES[0]));
            }
        }

        if self.lcdc & 0x02 != 0 {
            self.render_sprites(y, &line);
        }
    }

    fn render_background(&mut self, y: usize, line: &mut [BgPixel; SCREEN_WIDTH]) {
        let map = if self.lcdc & 0x08 != 0 { 0x1C00 } else { 0x1800 };
        let bg_y = self.ly.wrapping_add(self.scy);
        for (x, pixel) in line.iter_mut().enumerate() {
            let bg_x = (x as u8).wrapping_add(self.scx);
            *pixel = self.map_pixel(map, bg_x, bg_y);
            let color = self.bg_color(*pixel, self.map_attrs(map, bg_x, bg_y));
            self.screen.set(x, y, color);
        }
    }

    fn render_window(&mut self, y: usize, line: &mut [BgPixel; SCREEN_WIDTH]) {
        if self.lcdc & 0x20 == 0 || self.ly < self.wy || self.wx > 166 {
            return;
        }
        let map = if self.lcdc & 0x40 != 0 { 0x1C00 } else { 0x1800 };
        let start = usize::from(self.wx).saturating_sub(7);
        let win_y = self.window_line;
        for x in start..SCREEN_WIDTH {
            let win_x = (x + 7 - usize::from(self.wx)) as u8;
            line[x] = self.map_pixel(map, win_x, win_y);
            let color = self.bg_color(line[x], self.map_attrs(map, win_x, win_y));
            self.screen.set(x, y, color);
        }
        self.window_line = self.window_line.wrapping_add(1);
    }

    fn map_attrs(&self, map: usize, x: u8, y: u8) -> TileAttrs {
        if !self.color {
            return TileAttrs::default();
        }
        TileAttrs(self.vram[1][Self::map_offset(map, x, y)])
    }

    #[inline]
    fn map_offset(map: usize, x: u8, y: u8) -> usize {
        map + usize::from(y / 8) * 32 + usize::from(x / 8)
    }

    /// Colour index and priority of the BG/window pixel at map position
    /// (`x`, `y`).
    fn map_pixel(&self, map: usize, x: u8, y: u8) -> BgPixel {
        let tile = self.vram[0][Self::map_offset(map, x, y)];
        let attrs = self.map_attrs(map, x, y);

        let base = if self.lcdc & 0x10 != 0 {
            usize::from(tile) * 16
        } else {
            (0x1000 + i32::from(tile as i8) * 16) as usize
        };

        let mut row = usize::from(y & 7);
        if attrs.flip_y() {
            row = 7 - row;
        }
        let mut col = x & 7;
        if attrs.flip_x() {
            col = 7 - col;
        }

        BgPixel {
            color: self.tile_pixel(attrs.bank(), base + row * 2, col),
            priority: attrs.priority(),
        }
    }

    /// Colour index of column `col` in the tile row at `addr`.
    #[inline]
    fn tile_pixel(&self, bank: usize, addr: usize, col: u8) -> u8 {
        let lo = self.vram[bank][addr];
        let hi = self.vram[bank][addr + 1];
        let bit = 7 - col;
        ((hi >> bit) & 1) << 1 | ((lo >> bit) & 1)
    }

    fn bg_color(&self, pixel: BgPixel, attrs: TileAttrs) -> Color {
        if self.color {
            self.bg_palettes.color(attrs.palette(), pixel.color)
        } else {
            Self::dmg_shade(self.bgp, pixel.color)
        }
    }

    #[inline]
    fn dmg_shade(palette: u8, color: u8) -> Color {
        Color::grey(SHADES[usize::from((palette >> (color * 2)) & 0x03)])
    }

    fn render_sprites(&mut self, y: usize, line: &[BgPixel; SCREEN_WIDTH]) {
        let height: i32 = if self.lcdc & 0x04 != 0 { 16 } else { 8 };
        let ly = i32::from(self.ly);

        let mut visible: Vec<usize> = (0..40)
            .filter(|&i| {
                let top = i32::from(self.oam[i * 4]) - 16;
                ly >= top && ly < top + height
            })
            .take(MAX_SPRITES_PER_LINE)
            .collect();

        // DMG: lower X wins, ties by OAM order. CGB: OAM order only.
        if !self.color {
            visible.sort_by_key(|&i| self.oam[i * 4 + 1]);
        }

        // Draw lowest priority first so winners overwrite.
        for &i in visible.iter().rev() {
            let entry = [
                self.oam[i * 4],
                self.oam[i * 4 + 1],
                self.oam[i * 4 + 2],
                self.oam[i * 4 + 3],
            ];
            let top = i32::from(entry[0]) - 16;
            let left = i32::from(entry[1]) - 8;
            let attrs = entry[3];
            let mut tile = entry[2];
            if height == 16 {
                tile &= 0xFE;
            }

            let mut row = ly - top;
            if attrs & 0x40 != 0 {
                row = height - 1 - row;
            }
            let bank = if self.color { usize::from((attrs >> 3) & 0x01) } else { 0 };
            let addr = usize::from(tile) * 16 + row as usize * 2;

            for col in 0..8 {
                let x = left + col;
                if !(0..SCREEN_WIDTH as i32).contains(&x) {
                    continue;
                }
                let src_col = if attrs & 0x20 != 0 { 7 - col } else { col } as u8;
                let color = self.tile_pixel(bank, addr, src_col);
                if color == 0 {
                    continue;
                }

                let bg = line[x as usize];
                let behind = if self.color {
                    self.lcdc & 0x01 != 0 && (attrs & 0x80 != 0 || bg.priority)
                } else {
                    attrs & 0x80 != 0
                };
                if behind && bg.color != 0 {
                    continue;
                }

                let rgb = if self.color {
                    self.obj_palettes.color(attrs & 0x07, color)
                } else {
                    let palette = if attrs & 0x10 != 0 { self.obp1 } else { self.obp0 };
                    Self::dmg_shade(palette, color)
                };
                self.screen.set(x as usize, y, rgb);
            }
        }
    }
}
