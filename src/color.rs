/// An RGBA color with floating-point components (0.0–255.0 range).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 255.0 }
    }
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Allows using hex values to build colors
    /// ```
    /// use ply_layout::color::Color;
    /// assert_eq!(Color::rgb(255.0, 255.0, 255.0), Color::u_rgb(0xFF, 0xFF, 0xFF));
    /// ```
    pub const fn u_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32, g as f32, b as f32)
    }

    pub const fn u_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(r as f32, g as f32, b as f32, a as f32)
    }

    /// Fully transparent colors produce no rectangle commands.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.a > 0.0
    }
}

impl From<(f32, f32, f32)> for Color {
    fn from(value: (f32, f32, f32)) -> Self {
        Self::rgb(value.0, value.1, value.2)
    }
}
impl From<(f32, f32, f32, f32)> for Color {
    fn from(value: (f32, f32, f32, f32)) -> Self {
        Self::rgba(value.0, value.1, value.2, value.3)
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from(value: (u8, u8, u8)) -> Self {
        Self::u_rgb(value.0, value.1, value.2)
    }
}

impl From<u32> for Color {
    /// `0xRRGGBB`, always opaque.
    fn from(hex: u32) -> Self {
        Self::u_rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

impl From<i32> for Color {
    /// Lets bare hex literals like `0x202020` convert.
    fn from(hex: i32) -> Self {
        Self::from(hex as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_literals_are_opaque_rgb() {
        let color: Color = 0x20A0FF.into();
        assert_eq!(color, Color::rgb(32.0, 160.0, 255.0));
        assert!(color.is_visible());
        assert!(!Color::TRANSPARENT.is_visible());
    }
}
