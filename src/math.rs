#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl From<(f32, f32)> for Vector2 {
    fn from(value: (f32, f32)) -> Self {
        Self::new(value.0, value.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the extent along the requested axis.
    #[inline]
    pub fn along(&self, x_axis: bool) -> f32 {
        if x_axis {
            self.width
        } else {
            self.height
        }
    }

    #[inline]
    pub fn along_mut(&mut self, x_axis: bool) -> &mut f32 {
        if x_axis {
            &mut self.width
        } else {
            &mut self.height
        }
    }
}

impl From<(f32, f32)> for Dimensions {
    fn from(value: (f32, f32)) -> Self {
        Self::new(value.0, value.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, point: Vector2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// True when no part of the box overlaps `(0, 0)..viewport`.
    pub fn is_outside(&self, viewport: Dimensions) -> bool {
        self.x > viewport.width
            || self.y > viewport.height
            || self.x + self.width < 0.0
            || self.y + self.height < 0.0
    }
}
