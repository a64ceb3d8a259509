//! RGBA colors and the HSV mapping shared by every geometry builder.

use bytemuck::{Pod, Zeroable};

/// Linear RGBA color with components in `[0, 1]`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Opaque black, the placeholder color of plain meshes.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build an opaque color from hue (degrees), saturation and value.
    ///
    /// Hues outside `[0, 360)` wrap around.
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let chroma = value * saturation;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let m = value - chroma;

        let (r, g, b) = match h as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };

        Self::rgba(r + m, g + m, b + m, 1.0)
    }

    /// Hue of this color in degrees, in `[0, 360)`.
    ///
    /// Achromatic colors report a hue of 0.
    pub fn hue(&self) -> f32 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let delta = max - min;
        if delta <= f32::EPSILON {
            return 0.0;
        }

        let sector = if max == self.r {
            ((self.g - self.b) / delta).rem_euclid(6.0)
        } else if max == self.g {
            (self.b - self.r) / delta + 2.0
        } else {
            (self.r - self.g) / delta + 4.0
        };
        (sector * 60.0).rem_euclid(360.0)
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Color> for [f32; 4] {
    fn from(color: Color) -> Self {
        color.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "{a} != {b}");
    }

    #[test]
    fn primary_hues() {
        assert_eq!(Color::from_hsv(0.0, 1.0, 1.0), Color::rgba(1.0, 0.0, 0.0, 1.0));
        assert_eq!(Color::from_hsv(120.0, 1.0, 1.0), Color::rgba(0.0, 1.0, 0.0, 1.0));
        assert_eq!(Color::from_hsv(240.0, 1.0, 1.0), Color::rgba(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn hue_roundtrips_through_rgb() {
        for hue in [0.0, 15.0, 90.0, 165.0, 179.0, 200.0, 300.0, 330.0] {
            assert_close(Color::from_hsv(hue, 1.0, 1.0).hue(), hue);
        }
    }

    #[test]
    fn zero_saturation_is_gray() {
        let c = Color::from_hsv(200.0, 0.0, 0.5);
        assert_close(c.r, 0.5);
        assert_close(c.g, 0.5);
        assert_close(c.b, 0.5);
        assert_eq!(c.hue(), 0.0);
    }

    #[test]
    fn hue_wraps() {
        assert_eq!(Color::from_hsv(360.0, 1.0, 1.0), Color::from_hsv(0.0, 1.0, 1.0));
    }
}
