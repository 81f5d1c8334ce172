//! An immediate-mode UI layout engine.
//!
//! Every frame the host declares its element tree from scratch, and the
//! engine sizes and positions it and hands back a flat list of draw commands.
//! All storage is sized once, when the [`LayoutContext`] is created.
//!
//! ```
//! use ply_layout::prelude::*;
//!
//! let mut context = LayoutContext::<()>::new(Dimensions::new(640.0, 480.0));
//! context.set_measure_text_function(|text, config| {
//!     Dimensions::new(text.len() as f32 * config.font_size as f32 * 0.5, config.font_size as f32)
//! });
//!
//! let mut ui = context.begin();
//! ui.with(&Declaration::new()
//!     .id("Sidebar")
//!     .width(grow!())
//!     .height(fixed!(480.0))
//!     .background_color(0x202020), |ui|
//! {
//!     ui.text("Hello", TextConfig::new().font_size(16).end());
//! });
//! let commands = ui.end();
//! assert_eq!(commands.len(), 2);
//! ```

pub mod align;
pub mod arena;
pub mod array;
pub mod color;
pub mod config;
pub mod elements;
pub mod engine;
pub mod errors;
pub mod id;
pub mod layout;
pub mod math;
pub mod prelude;
pub mod render_commands;
pub mod text;

mod element_map;

use std::fmt::Debug;
use std::ops::{Deref, DerefMut};

pub use color::Color;
pub use config::LayoutSettings;
pub use engine::{
    ElementDeclaration, LayoutContext, PointerData, PointerDataInteractionState,
    ScrollContainerData,
};
pub use errors::{ErrorData, ErrorType};
pub use id::Id;
pub use math::{BoundingBox, Dimensions, Vector2};
pub use render_commands::{RenderCommand, RenderCommandConfig, RenderCommands};

use align::{AlignX, AlignY};
use elements::{BorderBuilder, CornerRadius, FloatingAttachToElement, FloatingBuilder, ImageConfig};
use layout::{ChildAlignment, LayoutBuilder, LayoutDirection, Padding, Sizing};
use text::TextConfig;

/// Builder for one element's declaration.
///
/// Setters chain on `&mut Self`, so a declaration can be built inline where
/// it is passed to [`LayoutScope::with`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Declaration<C = ()> {
    id: Option<Id>,
    inner: ElementDeclaration<C>,
}

impl<C: Clone + Default + Debug> Declaration<C> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Without an id the element gets one derived from its parent and position.
    #[inline]
    pub fn id(&mut self, id: impl Into<Id>) -> &mut Self {
        self.id = Some(id.into());
        self
    }

    #[inline]
    pub fn width(&mut self, width: Sizing) -> &mut Self {
        self.inner.layout.sizing.width = width.into();
        self
    }

    #[inline]
    pub fn height(&mut self, height: Sizing) -> &mut Self {
        self.inner.layout.sizing.height = height.into();
        self
    }

    #[inline]
    pub fn padding(&mut self, padding: impl Into<Padding>) -> &mut Self {
        self.inner.layout.padding = padding.into();
        self
    }

    #[inline]
    pub fn gap(&mut self, gap: u16) -> &mut Self {
        self.inner.layout.child_gap = gap;
        self
    }

    #[inline]
    pub fn direction(&mut self, direction: LayoutDirection) -> &mut Self {
        self.inner.layout.layout_direction = direction;
        self
    }

    #[inline]
    pub fn align(&mut self, x: AlignX, y: AlignY) -> &mut Self {
        self.inner.layout.child_alignment = ChildAlignment { x, y };
        self
    }

    /// Configures layout properties in one closure.
    /// ```ignore
    /// .layout(|l| l.width(grow!()).padding(8).gap(4))
    /// ```
    #[inline]
    pub fn layout(
        &mut self,
        f: impl for<'b, 'c> FnOnce(&'b mut LayoutBuilder<'c>) -> &'b mut LayoutBuilder<'c>,
    ) -> &mut Self {
        f(&mut LayoutBuilder {
            config: &mut self.inner.layout,
        });
        self
    }

    #[inline]
    pub fn background_color(&mut self, color: impl Into<Color>) -> &mut Self {
        self.inner.background_color = color.into();
        self
    }

    #[inline]
    pub fn corner_radius(&mut self, radius: impl Into<CornerRadius>) -> &mut Self {
        self.inner.corner_radius = radius.into();
        self
    }

    /// Draws the host's image `handle` instead of a background rectangle.
    #[inline]
    pub fn image(&mut self, handle: usize) -> &mut Self {
        self.inner.image = Some(ImageConfig { image: handle });
        self
    }

    /// Width over height; the missing axis is derived from the other one.
    #[inline]
    pub fn aspect_ratio(&mut self, aspect_ratio: f32) -> &mut Self {
        self.inner.aspect_ratio = aspect_ratio;
        self
    }

    /// Takes the element out of flow. Attaches to the parent unless the
    /// closure picks another target.
    #[inline]
    pub fn floating(
        &mut self,
        f: impl for<'b, 'c> FnOnce(&'b mut FloatingBuilder<'c>) -> &'b mut FloatingBuilder<'c>,
    ) -> &mut Self {
        let floating = &mut self.inner.floating;
        if floating.attach_to == FloatingAttachToElement::None {
            floating.attach_to = FloatingAttachToElement::Parent;
        }
        f(&mut FloatingBuilder { config: floating });
        self
    }

    /// Clips children to this element on the given axes and makes it scrollable.
    #[inline]
    pub fn clip(&mut self, horizontal: bool, vertical: bool) -> &mut Self {
        self.inner.clip.horizontal = horizontal;
        self.inner.clip.vertical = vertical;
        self
    }

    /// Overrides the stored scroll position for this frame.
    #[inline]
    pub fn child_offset(&mut self, offset: impl Into<Vector2>) -> &mut Self {
        self.inner.clip.child_offset = offset.into();
        self
    }

    #[inline]
    pub fn border(
        &mut self,
        f: impl for<'b, 'c> FnOnce(&'b mut BorderBuilder<'c>) -> &'b mut BorderBuilder<'c>,
    ) -> &mut Self {
        f(&mut BorderBuilder {
            config: &mut self.inner.border,
        });
        self
    }

    /// Emits a custom command carrying `data` instead of a rectangle.
    #[inline]
    pub fn custom(&mut self, data: C) -> &mut Self {
        self.inner.custom = Some(data);
        self
    }

    #[inline]
    pub fn user_data(&mut self, user_data: usize) -> &mut Self {
        self.inner.user_data = user_data;
        self
    }
}

/// One frame of declarations against a [`LayoutContext`].
///
/// Created by [`LayoutContext::begin`]; [`end`](Self::end) finishes the
/// frame. Dereferences to the context for queries such as
/// [`hovered`](LayoutContext::hovered).
pub struct LayoutScope<'a, C: Clone + Default + Debug = ()> {
    context: &'a mut LayoutContext<C>,
}

impl<'a, C: Clone + Default + Debug> LayoutScope<'a, C> {
    /// Declares an element, runs `children` to declare its contents, then closes it.
    pub fn with(&mut self, declaration: &Declaration<C>, children: impl FnOnce(&mut Self)) {
        match declaration.id {
            Some(id) => self.context.open_element_with_id(id),
            None => self.context.open_element(),
        }
        self.context.configure_open_element(&declaration.inner);
        children(self);
        self.context.close_element();
    }

    /// Declares a text leaf inside the open element.
    pub fn text(&mut self, text: &str, config: TextConfig) {
        self.context.open_text_element(text, &config);
    }

    /// An id for `label` that is unique among the open element's children.
    pub fn id_local(&self, label: &str) -> Id {
        self.id_index_local(label, 0)
    }

    pub fn id_index_local(&self, label: &str, index: u32) -> Id {
        Id::new_index_local(label, index, self.context.open_element_id())
    }

    /// Finishes the frame.
    pub fn end(self) -> RenderCommands<'a, C> {
        let context = self.context;
        context.end_layout()
    }
}

impl<C: Clone + Default + Debug> Deref for LayoutScope<'_, C> {
    type Target = LayoutContext<C>;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl<C: Clone + Default + Debug> DerefMut for LayoutScope<'_, C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl<C: Clone + Default + Debug> LayoutContext<C> {
    /// Starts a frame and returns the scope to declare it in.
    pub fn begin(&mut self) -> LayoutScope<'_, C> {
        self.begin_layout();
        LayoutScope { context: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixed, grow, percent};
    use align::{AlignX::*, AlignY::*};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn six_per_char(text: &str, _: &TextConfig) -> Dimensions {
        Dimensions::new(text.len() as f32 * 6.0, 10.0)
    }

    #[rustfmt::skip]
    #[test]
    fn test_begin() {
        let mut ctx = LayoutContext::<()>::new(Dimensions::new(800.0, 600.0));

        ctx.set_measure_text_function(|_, _| {
            Dimensions::new(100.0, 24.0)
        });

        let mut ui = ctx.begin();

        ui.with(&Declaration::new()
            .width(fixed!(100.0))
            .height(fixed!(100.0))
            .background_color(Color::rgb(255., 255., 255.)), |ui|
        {
            ui.with(&Declaration::new()
                .width(fixed!(100.0))
                .height(fixed!(100.0))
                .background_color(Color::rgb(255., 255., 255.)), |ui|
            {
                ui.text("test", TextConfig::new()
                    .color(Color::rgb(255., 255., 255.))
                    .font_size(24)
                    .end());
            });
        });

        ui.with(&Declaration::new()
            .border(|b| b.color(Color::rgb(255., 255., 0.)).all(2))
            .corner_radius(10.0), |ui|
        {
            ui.with(&Declaration::new()
                .width(fixed!(50.0))
                .height(fixed!(50.0))
                .background_color(Color::rgb(0., 255., 255.)), |_ui| {},
            );
        });

        let items = ui.end();

        for item in items.iter() {
            println!(
                "id: {}\nbbox: {:?}\nconfig: {:?}",
                item.id, item.bounding_box, item.config,
            );
        }

        assert_eq!(items.len(), 5);

        assert_eq!(items[0].bounding_box, BoundingBox::new(0.0, 0.0, 100.0, 100.0));
        match &items[0].config {
            RenderCommandConfig::Rectangle(rect) => {
                assert_eq!(rect.color, Color::rgb(255., 255., 255.));
            }
            _ => panic!("Expected Rectangle config for item 0"),
        }

        assert_eq!(items[1].bounding_box, BoundingBox::new(0.0, 0.0, 100.0, 100.0));
        match &items[1].config {
            RenderCommandConfig::Rectangle(_) => {}
            _ => panic!("Expected Rectangle config for item 1"),
        }

        assert_eq!(items[2].bounding_box, BoundingBox::new(0.0, 0.0, 100.0, 24.0));
        match &items[2].config {
            RenderCommandConfig::Text(text) => {
                assert_eq!(items.text(text), "test");
                assert_eq!(text.color.a, 255.0);
                assert_eq!(text.font_size, 24);
            }
            _ => panic!("Expected Text config for item 2"),
        }

        // the bordered box is transparent, so only its child and border draw
        assert_eq!(items[3].bounding_box, BoundingBox::new(100.0, 0.0, 50.0, 50.0));
        match &items[3].config {
            RenderCommandConfig::Rectangle(rect) => {
                assert_eq!(rect.color, Color::rgb(0., 255., 255.));
            }
            _ => panic!("Expected Rectangle config for item 3"),
        }

        assert_eq!(items[4].bounding_box, BoundingBox::new(100.0, 0.0, 50.0, 50.0));
        match &items[4].config {
            RenderCommandConfig::Border(border) => {
                assert_eq!(border.color, Color::rgb(255., 255., 0.));
                assert_eq!(border.corner_radius.top_left, 10.0);
                assert_eq!(border.corner_radius.bottom_right, 10.0);
                assert_eq!(border.width.left, 2);
                assert_eq!(border.width.right, 2);
                assert_eq!(border.width.top, 2);
                assert_eq!(border.width.bottom, 2);
            }
            _ => panic!("Expected Border config for item 4"),
        }
    }

    #[rustfmt::skip]
    #[test]
    fn test_fixed_row() {
        let mut ctx = LayoutContext::<()>::new(Dimensions::new(800.0, 600.0));
        let mut ui = ctx.begin();

        ui.with(&Declaration::new()
            .width(fixed!(300.0))
            .padding(Padding::horizontal(10))
            .gap(10), |ui|
        {
            for _ in 0..2 {
                ui.with(&Declaration::new()
                    .width(fixed!(100.0))
                    .height(fixed!(20.0))
                    .background_color(0xEEEEEE), |_| {});
            }
        });

        let items = ui.end();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].bounding_box, BoundingBox::new(10.0, 0.0, 100.0, 20.0));
        assert_eq!(items[1].bounding_box, BoundingBox::new(120.0, 0.0, 100.0, 20.0));
    }

    #[rustfmt::skip]
    #[test]
    fn test_grow_shares_remaining_space() {
        let mut ctx = LayoutContext::<()>::new(Dimensions::new(300.0, 100.0));
        let mut ui = ctx.begin();

        ui.with(&Declaration::new()
            .layout(|l| l
                .width(grow!())
                .height(fixed!(40.0))
                .padding(10)
                .gap(10))
            .background_color(0x101010), |ui|
        {
            ui.with(&Declaration::new()
                .width(fixed!(50.0))
                .height(fixed!(20.0))
                .background_color(0xFF0000), |_| {});
            ui.with(&Declaration::new()
                .width(grow!())
                .height(fixed!(20.0))
                .background_color(0x00FF00), |_| {});
            ui.with(&Declaration::new()
                .width(grow!())
                .height(fixed!(20.0))
                .background_color(0x0000FF), |_| {});
        });

        let items = ui.end();

        for item in items.iter() {
            println!("id: {}\nbbox: {:?}\nconfig: {:?}", item.id, item.bounding_box, item.config);
        }

        assert_eq!(items.len(), 4);
        assert_eq!(items[0].bounding_box, BoundingBox::new(0.0, 0.0, 300.0, 40.0));
        assert_eq!(items[1].bounding_box, BoundingBox::new(10.0, 10.0, 50.0, 20.0));
        assert_eq!(items[2].bounding_box, BoundingBox::new(70.0, 10.0, 105.0, 20.0));
        assert_eq!(items[3].bounding_box, BoundingBox::new(185.0, 10.0, 105.0, 20.0));
        match &items[3].config {
            RenderCommandConfig::Rectangle(rect) => assert_eq!(rect.color, Color::u_rgb(0, 0, 0xFF)),
            _ => panic!("Expected Rectangle config for item 3"),
        }
    }

    #[rustfmt::skip]
    #[test]
    fn test_percent_of_parent() {
        let mut ctx = LayoutContext::<()>::new(Dimensions::new(400.0, 200.0));
        let mut ui = ctx.begin();

        ui.with(&Declaration::new()
            .width(percent!(0.25))
            .height(fixed!(10.0))
            .background_color(0xFFFFFF), |_| {});
        ui.with(&Declaration::new()
            .width(percent!(0.5))
            .height(fixed!(10.0))
            .background_color(0xFFFFFF), |_| {});

        let items = ui.end();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].bounding_box, BoundingBox::new(0.0, 0.0, 100.0, 10.0));
        assert_eq!(items[1].bounding_box, BoundingBox::new(100.0, 0.0, 200.0, 10.0));
    }

    #[rustfmt::skip]
    #[test]
    fn test_text_wraps_to_column() {
        let mut ctx = LayoutContext::<()>::new(Dimensions::new(800.0, 600.0));
        ctx.set_measure_text_function(six_per_char);
        let mut ui = ctx.begin();

        ui.with(&Declaration::new()
            .width(fixed!(70.0))
            .direction(LayoutDirection::TopToBottom)
            .background_color(0x333333), |ui|
        {
            ui.text("hello wide world", TextConfig::new().font_size(10).end());
        });

        let items = ui.end();

        for item in items.iter() {
            println!("id: {}\nbbox: {:?}\nconfig: {:?}", item.id, item.bounding_box, item.config);
        }

        assert_eq!(items.len(), 3);
        // column height follows the wrapped text
        assert_eq!(items[0].bounding_box, BoundingBox::new(0.0, 0.0, 70.0, 20.0));

        assert_eq!(items[1].bounding_box, BoundingBox::new(0.0, 0.0, 60.0, 10.0));
        match &items[1].config {
            RenderCommandConfig::Text(text) => assert_eq!(items.text(text), "hello wide"),
            _ => panic!("Expected Text config for item 1"),
        }

        assert_eq!(items[2].bounding_box, BoundingBox::new(0.0, 10.0, 30.0, 10.0));
        match &items[2].config {
            RenderCommandConfig::Text(text) => assert_eq!(items.text(text), "world"),
            _ => panic!("Expected Text config for item 2"),
        }
    }

    #[rustfmt::skip]
    #[test]
    fn test_floating() {
        let mut ctx = LayoutContext::<()>::new(Dimensions::new(1000.0, 1000.0));
        ctx.set_measure_text_function(|_, _| {
            Dimensions::new(100.0, 24.0)
        });

        let mut ui = ctx.begin();

        ui.with(&Declaration::new()
            .width(fixed!(20.0))
            .height(fixed!(20.0))
            .align(CenterX, CenterY)
            .floating(|f| f
                .attach_root()
                .anchor((CenterX, CenterY), (Left, Top))
                .offset(100.0, 150.0)
                .passthrough()
                .z_index(110))
            .corner_radius(10.0)
            .background_color(Color::u_rgb(0x44, 0x88, 0xDD)), |ui|
        {
            ui.text("Re", TextConfig::new()
                .font_size(6)
                .color(Color::u_rgb(0xFF, 0xFF, 0xFF))
                .end());
        });

        let items = ui.end();

        for item in items.iter() {
            println!("id: {}\nbbox: {:?}\nconfig: {:?}", item.id, item.bounding_box, item.config);
        }

        assert_eq!(items.len(), 2);

        assert_eq!(items[0].bounding_box, BoundingBox::new(90.0, 140.0, 20.0, 20.0));
        assert_eq!(items[0].z_index, 110);
        match &items[0].config {
            RenderCommandConfig::Rectangle(rect) => {
                assert_eq!(rect.color, Color::rgb(68.0, 136.0, 221.0));
                assert_eq!(rect.corner_radius.top_left, 10.0);
                assert_eq!(rect.corner_radius.bottom_right, 10.0);
            }
            _ => panic!("Expected Rectangle config for item 0"),
        }

        // wider than its box, so centring pushes it out on both sides
        assert_eq!(items[1].bounding_box, BoundingBox::new(50.0, 138.0, 100.0, 24.0));
        match &items[1].config {
            RenderCommandConfig::Text(text) => {
                assert_eq!(items.text(text), "Re");
                assert_eq!(text.font_size, 6);
            }
            _ => panic!("Expected Text config for item 1"),
        }
    }

    #[rustfmt::skip]
    #[test]
    fn test_floating_roots_draw_in_z_order() {
        let mut ctx = LayoutContext::<()>::new(Dimensions::new(200.0, 200.0));
        let mut ui = ctx.begin();

        ui.with(&Declaration::new()
            .id("Base")
            .width(fixed!(50.0))
            .height(fixed!(50.0))
            .background_color(0xFFFFFF), |ui|
        {
            ui.with(&Declaration::new()
                .id("Above")
                .width(fixed!(10.0))
                .height(fixed!(10.0))
                .floating(|f| f.z_index(5))
                .background_color(0xFF0000), |_| {});
            ui.with(&Declaration::new()
                .id("Below")
                .width(fixed!(10.0))
                .height(fixed!(10.0))
                .floating(|f| f.z_index(-1))
                .background_color(0x0000FF), |_| {});
        });

        let items = ui.end();

        let order: Vec<(u32, i16)> = items.iter().map(|c| (c.id, c.z_index)).collect();
        assert_eq!(order, vec![
            (Id::new("Below").id, -1),
            (Id::new("Base").id, 0),
            (Id::new("Above").id, 5),
        ]);
    }

    #[rustfmt::skip]
    #[test]
    fn test_clip_offsets_children_inside_scissor() {
        let mut ctx = LayoutContext::<()>::new(Dimensions::new(200.0, 200.0));
        let mut ui = ctx.begin();

        ui.with(&Declaration::new()
            .id("Viewport")
            .width(fixed!(100.0))
            .height(fixed!(50.0))
            .clip(false, true)
            .child_offset((0.0, -20.0)), |ui|
        {
            ui.with(&Declaration::new()
                .width(fixed!(100.0))
                .height(fixed!(200.0))
                .background_color(0xABCDEF), |_| {});
        });

        let items = ui.end();

        assert_eq!(items.len(), 3);
        match &items[0].config {
            RenderCommandConfig::ScissorStart() => {
                assert_eq!(items[0].bounding_box, BoundingBox::new(0.0, 0.0, 100.0, 50.0));
            }
            _ => panic!("Expected ScissorStart config for item 0"),
        }
        assert_eq!(items[1].bounding_box, BoundingBox::new(0.0, -20.0, 100.0, 200.0));
        match &items[2].config {
            RenderCommandConfig::ScissorEnd() => {}
            _ => panic!("Expected ScissorEnd config for item 2"),
        }
    }

    #[rustfmt::skip]
    #[test]
    fn test_image_keeps_aspect_ratio() {
        let mut ctx = LayoutContext::<()>::new(Dimensions::new(400.0, 400.0));
        let mut ui = ctx.begin();

        ui.with(&Declaration::new()
            .width(fixed!(100.0))
            .aspect_ratio(2.0)
            .image(7), |_| {});

        let items = ui.end();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].bounding_box, BoundingBox::new(0.0, 0.0, 100.0, 50.0));
        match &items[0].config {
            RenderCommandConfig::Image(image) => assert_eq!(image.image, 7),
            _ => panic!("Expected Image config for item 0"),
        }
    }

    #[test]
    fn test_duplicate_id_is_reported_and_first_box_kept() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut ctx = LayoutContext::<()>::new(Dimensions::new(200.0, 200.0));
        ctx.set_error_handler(move |error| sink.borrow_mut().push(error.error_type));

        let mut ui = ctx.begin();
        for size in [30.0, 40.0] {
            ui.with(
                &Declaration::new()
                    .id("Card")
                    .width(fixed!(size))
                    .height(fixed!(size)),
                |_| {},
            );
        }
        ui.end();

        assert_eq!(*seen.borrow(), vec![ErrorType::DuplicateId]);
        assert_eq!(
            ctx.element_data(Id::new("Card")),
            Some(BoundingBox::new(0.0, 0.0, 30.0, 30.0))
        );
    }

    #[test]
    fn test_unclosed_elements_are_closed_at_end() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut ctx = LayoutContext::<()>::new(Dimensions::new(200.0, 200.0));
        ctx.set_error_handler(move |error| sink.borrow_mut().push(error.error_type));

        ctx.begin_layout();
        ctx.open_element();
        let mut panel = ElementDeclaration::<()>::default();
        panel.layout.sizing.width = fixed!(40.0).into();
        panel.layout.sizing.height = fixed!(40.0).into();
        panel.background_color = Color::rgb(1.0, 2.0, 3.0);
        ctx.configure_open_element(&panel);
        let items = ctx.end_layout();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].bounding_box, BoundingBox::new(0.0, 0.0, 40.0, 40.0));
        drop(items);
        assert_eq!(*seen.borrow(), vec![ErrorType::UnbalancedOpenClose]);
    }

    #[test]
    fn test_local_ids_are_seeded_by_parent() {
        let mut ctx = LayoutContext::<()>::new(Dimensions::new(200.0, 200.0));
        let mut ui = ctx.begin();
        let mut seen = Vec::new();
        for parent in ["Left", "Right"] {
            ui.with(&Declaration::new().id(parent), |ui| {
                seen.push(ui.id_local("Item"));
                assert_eq!(ui.id_local("Item"), Id::new_index_local("Item", 0, Id::new(parent).id));
            });
        }
        ui.end();
        assert_ne!(seen[0], seen[1]);
    }

    #[test]
    fn test_scroll_round_trip_through_scope() {
        let mut ctx = LayoutContext::<()>::new(Dimensions::new(200.0, 200.0));

        let frame = |ctx: &mut LayoutContext<()>| {
            let mut ui = ctx.begin();
            ui.with(
                &Declaration::new()
                    .id("Feed")
                    .width(fixed!(100.0))
                    .height(fixed!(100.0))
                    .direction(LayoutDirection::TopToBottom)
                    .clip(false, true),
                |ui| {
                    for i in 0..5u32 {
                        ui.with(
                            &Declaration::new()
                                .id(("Post", i))
                                .width(grow!())
                                .height(fixed!(60.0)),
                            |_| {},
                        );
                    }
                },
            );
            ui.end().len()
        };

        frame(&mut ctx);
        ctx.set_pointer_state(Vector2::new(50.0, 50.0), false);
        ctx.update_scroll_containers(false, Vector2::new(0.0, -500.0), 0.016);
        frame(&mut ctx);

        let data = ctx.scroll_container_data(Id::new("Feed")).unwrap();
        assert_eq!(data.content_dimensions, Dimensions::new(100.0, 300.0));
        assert_eq!(data.scroll_position, Vector2::new(0.0, -200.0));
        assert_eq!(
            ctx.element_data(Id::new_index("Post", 4)),
            Some(BoundingBox::new(0.0, 40.0, 100.0, 60.0))
        );
    }
}
