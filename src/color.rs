/// Linear-light RGB colour used by every render target
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Rgb { r, g, b }
    }

    /// Builds a linear colour from a packed `0xRRGGBB` sRGB value
    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xff) as u8;
        let g = ((hex >> 8) & 0xff) as u8;
        let b = (hex & 0xff) as u8;
        Self::from_srgb8(r, g, b)
    }

    pub fn from_srgb8(r: u8, g: u8, b: u8) -> Self {
        Rgb {
            r: srgb_to_linear(r),
            g: srgb_to_linear(g),
            b: srgb_to_linear(b),
        }
    }

    /// Converts back to 8-bit sRGB, clamping anything brighter than white
    pub fn to_srgb8(self) -> (u8, u8, u8) {
        (
            linear_to_srgb(self.r),
            linear_to_srgb(self.g),
            linear_to_srgb(self.b),
        )
    }

    /// Rec. 601 luma, as used by the bloom high pass
    pub fn luma(self) -> f32 {
        self.r * 0.299 + self.g * 0.587 + self.b * 0.114
    }

    pub fn scale(self, factor: f32) -> Self {
        Rgb::new(self.r * factor, self.g * factor, self.b * factor)
    }

    pub fn add(self, other: Rgb) -> Self {
        Rgb::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }

    /// Source-over blend of `self` on top of `dst`
    pub fn over(self, dst: Rgb, opacity: f32) -> Self {
        let a = opacity.clamp(0.0, 1.0);
        Rgb::new(
            self.r * a + dst.r * (1.0 - a),
            self.g * a + dst.g * (1.0 - a),
            self.b * a + dst.b * (1.0 - a),
        )
    }
}

fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(channel: f32) -> u8 {
    let c = channel.clamp(0.0, 1.0);
    let s = if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (s * 255.0).round() as u8
}

/// Violet used for the rotating vector and its tip marker
pub const PRIMARY: u32 = 0x6f00ff;
/// Cyan used for the unit circle and key-point labels
pub const ACCENT: u32 = 0x00ffff;
pub const GRID: u32 = 0x444444;
pub const BACKGROUND: u32 = 0x0b0a14;
pub const LABEL_RE: u32 = 0xf87171;
pub const LABEL_IM: u32 = 0x4ade80;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_round_trips_through_linear() {
        for value in [0u8, 1, 68, 111, 128, 200, 255] {
            let c = Rgb::from_srgb8(value, value, value);
            assert_eq!(c.to_srgb8(), (value, value, value));
        }
    }

    #[test]
    fn grid_stays_below_bloom_threshold_but_accent_does_not() {
        assert!(Rgb::from_hex(GRID).luma() < 0.1);
        assert!(Rgb::from_hex(ACCENT).luma() > 0.1);
        assert!(Rgb::from_hex(PRIMARY).luma() > 0.0);
    }

    #[test]
    fn over_blends_by_opacity() {
        let c = Rgb::WHITE.over(Rgb::BLACK, 0.5);
        assert!((c.r - 0.5).abs() < 1e-6);
        assert_eq!(Rgb::WHITE.over(Rgb::BLACK, 2.0), Rgb::WHITE);
    }
}
