use crate::align::{AlignX, AlignY};
use crate::color::Color;
use crate::id::Id;
use crate::math::{Dimensions, Vector2};
use crate::text::TextConfig;

/// Specifies how pointer capture should behave for floating elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PointerCaptureMode {
    /// Captures all pointer input.
    #[default]
    Capture,
    /// Allows pointer input to pass through.
    Passthrough,
}

/// Defines how a floating element is attached to other elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FloatingAttachToElement {
    /// Not floating: the element takes part in normal flow.
    #[default]
    None,
    /// The floating element is attached to its parent element.
    Parent,
    /// The floating element is attached to a specific element identified by an ID.
    ElementWithId,
    /// The floating element is attached to the root of the layout.
    Root,
}

/// Defines how a floating element is clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FloatingClipToElement {
    /// The floating element is not clipped.
    #[default]
    None,
    /// The floating element is clipped to the attached parent.
    AttachedParent,
}

/// Which point of the element meets which point of the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloatingAttachPoints {
    pub element_x: AlignX,
    pub element_y: AlignY,
    pub parent_x: AlignX,
    pub parent_y: AlignY,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloatingConfig {
    pub offset: Vector2,
    /// Grows the drawn box by this much on each side without affecting layout.
    pub expand: Dimensions,
    pub parent_id: u32,
    pub z_index: i16,
    pub attach_points: FloatingAttachPoints,
    pub pointer_capture_mode: PointerCaptureMode,
    pub attach_to: FloatingAttachToElement,
    pub clip_to: FloatingClipToElement,
}

/// Builder for configuring floating element properties using a closure.
pub struct FloatingBuilder<'a> {
    pub(crate) config: &'a mut FloatingConfig,
}

impl FloatingBuilder<'_> {
    #[inline]
    pub fn offset(&mut self, x: f32, y: f32) -> &mut Self {
        self.config.offset = Vector2::new(x, y);
        self
    }

    #[inline]
    pub fn expand(&mut self, width: f32, height: f32) -> &mut Self {
        self.config.expand = Dimensions::new(width, height);
        self
    }

    #[inline]
    pub fn z_index(&mut self, z_index: i16) -> &mut Self {
        self.config.z_index = z_index;
        self
    }

    /// Sets the attachment points of the floating element and its parent.
    ///
    /// Each tuple is `(AlignX, AlignY)`: the first for the element, the second for the parent.
    /// ```ignore
    /// .floating(|f| f.anchor((CenterX, Bottom), (CenterX, Top)))
    /// ```
    #[inline]
    pub fn anchor(&mut self, element: (AlignX, AlignY), parent: (AlignX, AlignY)) -> &mut Self {
        self.config.attach_points = FloatingAttachPoints {
            element_x: element.0,
            element_y: element.1,
            parent_x: parent.0,
            parent_y: parent.1,
        };
        self
    }

    #[inline]
    pub fn attach_parent(&mut self) -> &mut Self {
        self.config.attach_to = FloatingAttachToElement::Parent;
        self
    }

    #[inline]
    pub fn attach_root(&mut self) -> &mut Self {
        self.config.attach_to = FloatingAttachToElement::Root;
        self
    }

    #[inline]
    pub fn attach_id(&mut self, id: impl Into<Id>) -> &mut Self {
        self.config.attach_to = FloatingAttachToElement::ElementWithId;
        self.config.parent_id = id.into().id;
        self
    }

    /// Clips this floating element to its attached parent's bounds.
    #[inline]
    pub fn clip_by_parent(&mut self) -> &mut Self {
        self.config.clip_to = FloatingClipToElement::AttachedParent;
        self
    }

    #[inline]
    pub fn passthrough(&mut self) -> &mut Self {
        self.config.pointer_capture_mode = PointerCaptureMode::Passthrough;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClipConfig {
    pub horizontal: bool,
    pub vertical: bool,
    pub child_offset: Vector2,
}

impl ClipConfig {
    #[inline]
    pub fn along(&self, x_axis: bool) -> bool {
        if x_axis {
            self.horizontal
        } else {
            self.vertical
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CornerRadius {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_left: f32,
    pub bottom_right: f32,
}

impl CornerRadius {
    pub fn is_zero(&self) -> bool {
        self.top_left == 0.0
            && self.top_right == 0.0
            && self.bottom_left == 0.0
            && self.bottom_right == 0.0
    }
}

impl From<f32> for CornerRadius {
    fn from(value: f32) -> Self {
        Self {
            top_left: value,
            top_right: value,
            bottom_left: value,
            bottom_right: value,
        }
    }
}

impl From<(f32, f32, f32, f32)> for CornerRadius {
    /// CSS order: (top-left, top-right, bottom-right, bottom-left).
    fn from((tl, tr, br, bl): (f32, f32, f32, f32)) -> Self {
        Self {
            top_left: tl,
            top_right: tr,
            bottom_left: bl,
            bottom_right: br,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BorderWidth {
    pub left: u16,
    pub right: u16,
    pub top: u16,
    pub bottom: u16,
    pub between_children: u16,
}

impl BorderWidth {
    pub fn is_zero(&self) -> bool {
        self.left == 0
            && self.right == 0
            && self.top == 0
            && self.bottom == 0
            && self.between_children == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BorderConfig {
    pub color: Color,
    pub width: BorderWidth,
}

/// Builder for configuring border properties using a closure.
pub struct BorderBuilder<'a> {
    pub(crate) config: &'a mut BorderConfig,
}

impl BorderBuilder<'_> {
    #[inline]
    pub fn color(&mut self, color: impl Into<Color>) -> &mut Self {
        self.config.color = color.into();
        self
    }

    /// Set the same border width for all four sides.
    #[inline]
    pub fn all(&mut self, width: u16) -> &mut Self {
        let w = &mut self.config.width;
        w.left = width;
        w.right = width;
        w.top = width;
        w.bottom = width;
        self
    }

    #[inline]
    pub fn left(&mut self, width: u16) -> &mut Self {
        self.config.width.left = width;
        self
    }

    #[inline]
    pub fn right(&mut self, width: u16) -> &mut Self {
        self.config.width.right = width;
        self
    }

    #[inline]
    pub fn top(&mut self, width: u16) -> &mut Self {
        self.config.width.top = width;
        self
    }

    #[inline]
    pub fn bottom(&mut self, width: u16) -> &mut Self {
        self.config.width.bottom = width;
        self
    }

    /// Width of the separator drawn in the gap between adjacent children.
    #[inline]
    pub fn between_children(&mut self, width: u16) -> &mut Self {
        self.config.width.between_children = width;
        self
    }
}

/// Visual properties shared by rectangle, image and custom commands.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SharedConfig {
    pub background_color: Color,
    pub corner_radius: CornerRadius,
    pub user_data: usize,
}

/// An image the host knows by handle. The engine never looks inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageConfig {
    pub image: usize,
}

/// One attached config of an element. An element carries at most one of each kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementConfig<C> {
    Shared(SharedConfig),
    Text(TextConfig),
    Image(ImageConfig),
    Floating(FloatingConfig),
    Custom(C),
    Clip(ClipConfig),
    Border(BorderConfig),
    Aspect(f32),
}

impl<C> Default for ElementConfig<C> {
    fn default() -> Self {
        ElementConfig::Shared(SharedConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementConfigKind {
    Shared,
    Text,
    Image,
    Floating,
    Custom,
    Clip,
    Border,
    Aspect,
}

impl<C> ElementConfig<C> {
    pub fn kind(&self) -> ElementConfigKind {
        match self {
            ElementConfig::Shared(_) => ElementConfigKind::Shared,
            ElementConfig::Text(_) => ElementConfigKind::Text,
            ElementConfig::Image(_) => ElementConfigKind::Image,
            ElementConfig::Floating(_) => ElementConfigKind::Floating,
            ElementConfig::Custom(_) => ElementConfigKind::Custom,
            ElementConfig::Clip(_) => ElementConfigKind::Clip,
            ElementConfig::Border(_) => ElementConfigKind::Border,
            ElementConfig::Aspect(_) => ElementConfigKind::Aspect,
        }
    }
}

/// Typed lookups over an element's config list.
pub(crate) trait ConfigSliceExt<C> {
    fn has(&self, kind: ElementConfigKind) -> bool;
    fn shared(&self) -> Option<&SharedConfig>;
    fn text(&self) -> Option<&TextConfig>;
    fn image(&self) -> Option<&ImageConfig>;
    fn floating(&self) -> Option<&FloatingConfig>;
    fn custom(&self) -> Option<&C>;
    fn clip(&self) -> Option<&ClipConfig>;
    fn border(&self) -> Option<&BorderConfig>;
    fn aspect(&self) -> Option<f32>;
}

impl<C> ConfigSliceExt<C> for [ElementConfig<C>] {
    fn has(&self, kind: ElementConfigKind) -> bool {
        self.iter().any(|c| c.kind() == kind)
    }

    fn shared(&self) -> Option<&SharedConfig> {
        self.iter().find_map(|c| match c {
            ElementConfig::Shared(s) => Some(s),
            _ => None,
        })
    }

    fn text(&self) -> Option<&TextConfig> {
        self.iter().find_map(|c| match c {
            ElementConfig::Text(t) => Some(t),
            _ => None,
        })
    }

    fn image(&self) -> Option<&ImageConfig> {
        self.iter().find_map(|c| match c {
            ElementConfig::Image(i) => Some(i),
            _ => None,
        })
    }

    fn floating(&self) -> Option<&FloatingConfig> {
        self.iter().find_map(|c| match c {
            ElementConfig::Floating(f) => Some(f),
            _ => None,
        })
    }

    fn custom(&self) -> Option<&C> {
        self.iter().find_map(|c| match c {
            ElementConfig::Custom(c) => Some(c),
            _ => None,
        })
    }

    fn clip(&self) -> Option<&ClipConfig> {
        self.iter().find_map(|c| match c {
            ElementConfig::Clip(c) => Some(c),
            _ => None,
        })
    }

    fn border(&self) -> Option<&BorderConfig> {
        self.iter().find_map(|c| match c {
            ElementConfig::Border(b) => Some(b),
            _ => None,
        })
    }

    fn aspect(&self) -> Option<f32> {
        self.iter().find_map(|c| match c {
            ElementConfig::Aspect(a) => Some(*a),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_lookup_by_kind() {
        let configs: Vec<ElementConfig<()>> = vec![
            ElementConfig::Clip(ClipConfig {
                vertical: true,
                ..Default::default()
            }),
            ElementConfig::Aspect(1.5),
        ];
        assert!(configs.has(ElementConfigKind::Clip));
        assert!(!configs.has(ElementConfigKind::Floating));
        assert_eq!(configs.aspect(), Some(1.5));
        assert!(configs.clip().is_some_and(|c| c.along(false)));
        assert!(configs.floating().is_none());
    }

    #[test]
    fn floating_builder_sets_anchor_and_target() {
        let mut config = FloatingConfig::default();
        FloatingBuilder {
            config: &mut config,
        }
        .anchor((AlignX::CenterX, AlignY::Bottom), (AlignX::CenterX, AlignY::Top))
        .attach_id("Tooltip")
        .z_index(3);
        assert_eq!(config.attach_to, FloatingAttachToElement::ElementWithId);
        assert_eq!(config.parent_id, Id::new("Tooltip").id);
        assert_eq!(config.attach_points.element_y, AlignY::Bottom);
        assert_eq!(config.z_index, 3);
    }

    #[test]
    fn border_builder_all_skips_between_children() {
        let mut config = BorderConfig::default();
        BorderBuilder {
            config: &mut config,
        }
        .all(2)
        .color(0xFF0000);
        assert_eq!(config.width.left, 2);
        assert_eq!(config.width.between_children, 0);
        assert_eq!(config.color, Color::rgb(255.0, 0.0, 0.0));
    }
}
