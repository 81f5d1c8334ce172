/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum AlignX {
    #[default]
    Left,
    CenterX,
    Right,
}

/// Vertical alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum AlignY {
    #[default]
    Top,
    CenterY,
    Bottom,
}

impl AlignX {
    /// Portion of `extra_space` that goes before the content.
    #[inline]
    pub(crate) fn lead(self, extra_space: f32) -> f32 {
        match self {
            AlignX::Left => 0.0,
            AlignX::CenterX => extra_space / 2.0,
            AlignX::Right => extra_space,
        }
    }
}

impl AlignY {
    #[inline]
    pub(crate) fn lead(self, extra_space: f32) -> f32 {
        match self {
            AlignY::Top => 0.0,
            AlignY::CenterY => extra_space / 2.0,
            AlignY::Bottom => extra_space,
        }
    }
}
