pub mod app;
pub mod key;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new_rgb(0, 0, 0);
    pub const WHITE: Color = Color::new_rgb(255, 255, 255);

    #[inline]
    pub const fn new_rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    /// Grey level as used by the four DMG shades.
    #[inline]
    pub const fn grey(level: u8) -> Color {
        Color::new_rgb(level, level, level)
    }

    /// Expand a CGB 15-bit BGR555 palette entry to 24-bit RGB.
    #[inline]
    pub const fn from_bgr555(value: u16) -> Color {
        let r = (value & 0x1F) as u8;
        let g = ((value >> 5) & 0x1F) as u8;
        let b = ((value >> 10) & 0x1F) as u8;
        Color::new_rgb((r << 3) | (r >> 2), (g << 3) | (g >> 2), (b << 3) | (b >> 2))
    }

    #[inline]
    pub const fn rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}
