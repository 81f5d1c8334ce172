use crate::align::{AlignX, AlignY};

/// Defines different sizing behaviors for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SizingType {
    /// The element's size is determined by its content and constrained by min/max values.
    #[default]
    Fit,
    /// The element expands to fill available space within min/max constraints.
    Grow,
    /// The element's size is fixed to a percentage of its parent.
    Percent,
    /// The element's size is set to a fixed value.
    Fixed,
}

/// Represents different sizing strategies for layout elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sizing {
    /// Fits the element’s width/height within a min and max constraint.
    Fit(f32, f32),
    /// Expands the element to fill available space within min/max constraints.
    Grow(f32, f32),
    /// Sets a fixed width/height.
    Fixed(f32),
    /// Sets width/height as a percentage of its parent. Value should be between `0.0` and `1.0`.
    Percent(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizingMinMax {
    pub min: f32,
    pub max: f32,
}

/// Resolved sizing rule for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizingAxis {
    pub type_: SizingType,
    pub min_max: SizingMinMax,
    pub percent: f32,
}

impl From<Sizing> for SizingAxis {
    fn from(value: Sizing) -> Self {
        let (type_, min, max, percent) = match value {
            Sizing::Fit(min, max) => (SizingType::Fit, min, max, 0.0),
            Sizing::Grow(min, max) => (SizingType::Grow, min, max, 0.0),
            Sizing::Fixed(size) => (SizingType::Fixed, size, size, 0.0),
            Sizing::Percent(percent) => (SizingType::Percent, 0.0, 0.0, percent),
        };
        Self {
            type_,
            min_max: SizingMinMax { min, max },
            percent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizingConfig {
    pub width: SizingAxis,
    pub height: SizingAxis,
}

impl SizingConfig {
    #[inline]
    pub fn along(&self, x_axis: bool) -> &SizingAxis {
        if x_axis {
            &self.width
        } else {
            &self.height
        }
    }

    #[inline]
    pub fn along_mut(&mut self, x_axis: bool) -> &mut SizingAxis {
        if x_axis {
            &mut self.width
        } else {
            &mut self.height
        }
    }
}

/// Represents padding values for each side of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Padding {
    pub left: u16,
    pub right: u16,
    pub top: u16,
    pub bottom: u16,
}

impl Padding {
    /// Creates a new `Padding` with individual values for each side.
    pub const fn new(left: u16, right: u16, top: u16, bottom: u16) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Sets the same padding value for all sides.
    pub const fn all(value: u16) -> Self {
        Self::new(value, value, value, value)
    }

    /// Left and right set to `value`, top and bottom to `0`.
    pub const fn horizontal(value: u16) -> Self {
        Self::new(value, value, 0, 0)
    }

    /// Top and bottom set to `value`, left and right to `0`.
    pub const fn vertical(value: u16) -> Self {
        Self::new(0, 0, value, value)
    }

    /// Total padding along an axis (both sides).
    #[inline]
    pub fn along(&self, x_axis: bool) -> f32 {
        if x_axis {
            (self.left + self.right) as f32
        } else {
            (self.top + self.bottom) as f32
        }
    }

    /// Padding on the leading side of an axis.
    #[inline]
    pub fn leading(&self, x_axis: bool) -> f32 {
        if x_axis {
            self.left as f32
        } else {
            self.top as f32
        }
    }
}

impl From<u16> for Padding {
    fn from(value: u16) -> Self {
        Self::all(value)
    }
}

impl From<(u16, u16, u16, u16)> for Padding {
    /// CSS order: (top, right, bottom, left).
    fn from((top, right, bottom, left): (u16, u16, u16, u16)) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }
}

/// Defines the layout direction for arranging child elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum LayoutDirection {
    /// Arranges elements from left to right.
    #[default]
    LeftToRight,
    /// Arranges elements from top to bottom.
    TopToBottom,
}

impl LayoutDirection {
    /// True when `x_axis` is the direction children are laid out along.
    #[inline]
    pub fn is_along(self, x_axis: bool) -> bool {
        (self == LayoutDirection::LeftToRight) == x_axis
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChildAlignment {
    pub x: AlignX,
    pub y: AlignY,
}

impl ChildAlignment {
    /// Offset of the content inside `extra_space` along an axis.
    #[inline]
    pub fn lead(&self, x_axis: bool, extra_space: f32) -> f32 {
        if x_axis {
            self.x.lead(extra_space)
        } else {
            self.y.lead(extra_space)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutConfig {
    pub sizing: SizingConfig,
    pub padding: Padding,
    pub child_gap: u16,
    pub child_alignment: ChildAlignment,
    pub layout_direction: LayoutDirection,
}

/// Builder for configuring layout properties using a closure.
pub struct LayoutBuilder<'a> {
    pub(crate) config: &'a mut LayoutConfig,
}

impl LayoutBuilder<'_> {
    #[inline]
    pub fn width(&mut self, width: Sizing) -> &mut Self {
        self.config.sizing.width = width.into();
        self
    }

    #[inline]
    pub fn height(&mut self, height: Sizing) -> &mut Self {
        self.config.sizing.height = height.into();
        self
    }

    /// Sets the spacing between child elements.
    #[inline]
    pub fn gap(&mut self, gap: u16) -> &mut Self {
        self.config.child_gap = gap;
        self
    }

    /// Sets the alignment of child elements using separate X and Y values.
    #[inline]
    pub fn align(&mut self, x: AlignX, y: AlignY) -> &mut Self {
        self.config.child_alignment = ChildAlignment { x, y };
        self
    }

    #[inline]
    pub fn direction(&mut self, direction: LayoutDirection) -> &mut Self {
        self.config.layout_direction = direction;
        self
    }

    #[inline]
    pub fn padding(&mut self, padding: impl Into<Padding>) -> &mut Self {
        self.config.padding = padding.into();
        self
    }
}

/// Shorthand macro for [`Sizing::Fit`]. Defaults max to `f32::MAX` if omitted.
#[macro_export]
macro_rules! fit {
    ($min:expr, $max:expr) => {
        $crate::layout::Sizing::Fit($min, $max)
    };
    ($min:expr) => {
        $crate::fit!($min, f32::MAX)
    };
    () => {
        $crate::fit!(0.0)
    };
}

/// Shorthand macro for [`Sizing::Grow`]. Defaults max to `f32::MAX` if omitted.
#[macro_export]
macro_rules! grow {
    ($min:expr, $max:expr) => {
        $crate::layout::Sizing::Grow($min, $max)
    };
    ($min:expr) => {
        $crate::grow!($min, f32::MAX)
    };
    () => {
        $crate::grow!(0.0)
    };
}

/// Shorthand macro for [`Sizing::Fixed`].
#[macro_export]
macro_rules! fixed {
    ($val:expr) => {
        $crate::layout::Sizing::Fixed($val)
    };
}

/// Shorthand macro for [`Sizing::Percent`].
/// Literal values are checked at compile time to be in `0.0..=1.0`.
#[macro_export]
macro_rules! percent {
    ($percent:expr) => {{
        const _: () = assert!(
            $percent >= 0.0 && $percent <= 1.0,
            "Percent value must be between 0.0 and 1.0 inclusive!"
        );
        $crate::layout::Sizing::Percent($percent)
    }};
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fit_macro() {
        assert!(matches!(fit!(12.0, 34.0), Sizing::Fit(12.0, 34.0)));
        assert!(matches!(fit!(12.0), Sizing::Fit(12.0, f32::MAX)));
        assert!(matches!(fit!(), Sizing::Fit(0.0, f32::MAX)));
    }

    #[test]
    fn grow_macro() {
        assert!(matches!(grow!(5.0, 6.0), Sizing::Grow(5.0, 6.0)));
        assert!(matches!(grow!(), Sizing::Grow(0.0, f32::MAX)));
    }

    #[test]
    fn fixed_sizing_pins_min_and_max() {
        let axis: SizingAxis = fixed!(123.0).into();
        assert_eq!(axis.type_, SizingType::Fixed);
        assert_eq!(axis.min_max, SizingMinMax { min: 123.0, max: 123.0 });
    }

    #[test]
    fn percent_sizing_keeps_fraction() {
        let axis: SizingAxis = percent!(0.5).into();
        assert_eq!(axis.type_, SizingType::Percent);
        assert_eq!(axis.percent, 0.5);
    }

    #[test]
    fn padding_sums_per_axis() {
        let padding: Padding = (1, 2, 3, 4).into();
        assert_eq!(padding.along(true), 6.0);
        assert_eq!(padding.along(false), 4.0);
        assert_eq!(padding.leading(true), 4.0);
        assert_eq!(padding.leading(false), 1.0);
    }

    #[test]
    fn direction_axis() {
        assert!(LayoutDirection::LeftToRight.is_along(true));
        assert!(!LayoutDirection::LeftToRight.is_along(false));
        assert!(LayoutDirection::TopToBottom.is_along(false));
    }
}
