use std::fmt::Debug;

use super::{
    LayoutContext, LayoutElement, ScrollContainerDataInternal, TextElementData, TreeRoot, MAXFLOAT,
    ROOT_LABEL,
};
use crate::arena::ArenaStr;
use crate::array::ArrayView;
use crate::color::Color;
use crate::elements::{
    BorderConfig, ClipConfig, ConfigSliceExt, CornerRadius, ElementConfig,
    FloatingAttachToElement, FloatingClipToElement, FloatingConfig, ImageConfig, SharedConfig,
};
use crate::errors::ErrorType;
use crate::id::{hash_number, hash_string, Id};
use crate::layout::{LayoutConfig, LayoutDirection, SizingType};
use crate::math::Dimensions;
use crate::text::TextConfig;

/// Everything one element can be configured with, as handed to
/// [`LayoutContext::configure_open_element`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementDeclaration<C> {
    pub layout: LayoutConfig,
    pub background_color: Color,
    pub corner_radius: CornerRadius,
    /// Width over height. Zero leaves the element unconstrained.
    pub aspect_ratio: f32,
    pub image: Option<ImageConfig>,
    pub floating: FloatingConfig,
    pub custom: Option<C>,
    pub clip: ClipConfig,
    pub border: BorderConfig,
    pub user_data: usize,
}

impl<C: Clone + Default + Debug> LayoutContext<C> {
    /// Opens an element whose id is derived from its parent and its position
    /// among the parent's children.
    pub fn open_element(&mut self) {
        self.open_element_inner(None);
    }

    pub fn open_element_with_id(&mut self, id: Id) {
        self.open_element_inner(Some(id));
    }

    fn open_element_inner(&mut self, id: Option<Id>) {
        if self.warnings.max_elements_exceeded {
            self.dropped_depth += 1;
            return;
        }
        let Some(index) = self.layout_elements.add(LayoutElement::default()) else {
            self.report_elements_exceeded();
            self.dropped_depth += 1;
            return;
        };

        let id = id.unwrap_or_else(|| self.next_child_id());
        self.layout_elements[index].id = id.id;
        self.clip_element_ids[index] = self.open_clip_stack.last().copied().unwrap_or(0);
        self.open_element_stack.add(index);
        self.register_id(id, index);
    }

    /// Id for the next anonymous child of the open element.
    fn next_child_id(&self) -> Id {
        match self.open_element_stack.last() {
            Some(&parent_index) => {
                let parent = &self.layout_elements[parent_index];
                let offset = parent.children.length as u32 + parent.floating_children_count as u32;
                hash_number(offset, parent.id)
            }
            None => hash_number(0, 0),
        }
    }

    fn register_id(&mut self, id: Id, element_index: usize) {
        match self.element_map.insert(id, element_index, self.generation) {
            Ok(_) => {}
            Err(ErrorType::DuplicateId) => {
                let text = format!(
                    "an element with id {} was declared more than once this frame",
                    id.id
                );
                self.report(ErrorType::DuplicateId, &text);
            }
            Err(error_type) => self.report(error_type, "the element id table is full"),
        }
    }

    /// Returns false when the config table is full and nothing was attached.
    fn attach_config(&mut self, element_index: usize, config: ElementConfig<C>) -> bool {
        if self.element_configs.add(config).is_some() {
            self.layout_elements[element_index].configs.length += 1;
            true
        } else {
            self.report_elements_exceeded();
            false
        }
    }

    /// Applies `declaration` to the element opened last. Call it once,
    /// right after opening and before any children.
    pub fn configure_open_element(&mut self, declaration: &ElementDeclaration<C>) {
        if self.dropped_depth > 0 {
            return;
        }
        let Some(&open_index) = self.open_element_stack.last() else {
            return;
        };
        let element_id = self.layout_elements[open_index].id;

        let mut layout = declaration.layout;
        for x_axis in [true, false] {
            let sizing = layout.sizing.along_mut(x_axis);
            if sizing.type_ == SizingType::Percent && !(0.0..=1.0).contains(&sizing.percent) {
                let percent = sizing.percent;
                sizing.percent = percent.clamp(0.0, 1.0);
                self.report(
                    ErrorType::PercentageOver1,
                    &format!("percent sizing of {percent} is outside 0..=1 and was clamped"),
                );
            }
        }
        let element = &mut self.layout_elements[open_index];
        element.layout = layout;
        element.configs = ArrayView {
            start: self.element_configs.len(),
            length: 0,
        };

        if declaration.background_color.is_visible()
            || !declaration.corner_radius.is_zero()
            || declaration.user_data != 0
        {
            let shared = SharedConfig {
                background_color: declaration.background_color,
                corner_radius: declaration.corner_radius,
                user_data: declaration.user_data,
            };
            self.attach_config(open_index, ElementConfig::Shared(shared));
        }

        if let Some(image) = declaration.image {
            self.attach_config(open_index, ElementConfig::Image(image));
        }

        if declaration.aspect_ratio > 0.0 {
            self.attach_config(open_index, ElementConfig::Aspect(declaration.aspect_ratio));
            self.aspect_ratio_elements.add(open_index);
        }

        if declaration.floating.attach_to != FloatingAttachToElement::None {
            self.configure_floating(open_index, declaration.floating);
        }

        if let Some(custom) = &declaration.custom {
            self.attach_config(open_index, ElementConfig::Custom(custom.clone()));
        }

        if declaration.clip.horizontal || declaration.clip.vertical {
            self.configure_clip(open_index, element_id, declaration.clip);
        }

        if !declaration.border.width.is_zero() {
            self.attach_config(open_index, ElementConfig::Border(declaration.border));
        }
    }

    fn configure_floating(&mut self, open_index: usize, mut floating: FloatingConfig) {
        let depth = self.open_element_stack.len();
        if depth < 2 {
            // the root cannot float
            return;
        }
        let hierarchical_parent = self.open_element_stack[depth - 2];
        let mut clip_element_id = 0;

        match floating.attach_to {
            FloatingAttachToElement::Parent => {
                floating.parent_id = self.layout_elements[hierarchical_parent].id;
                clip_element_id = self.open_clip_stack.last().copied().unwrap_or(0);
            }
            FloatingAttachToElement::ElementWithId => {
                let target = self
                    .element_map
                    .get(floating.parent_id, self.generation)
                    .map(|item| item.element_index);
                match target {
                    Some(index) => clip_element_id = self.clip_element_ids[index],
                    None => {
                        let text = format!(
                            "floating element attached to id {} which was not declared before it",
                            floating.parent_id
                        );
                        self.report(ErrorType::FloatingParentNotFound, &text);
                    }
                }
            }
            FloatingAttachToElement::Root => {
                floating.parent_id = hash_string(ROOT_LABEL, 0).id;
            }
            FloatingAttachToElement::None => return,
        }
        if floating.clip_to == FloatingClipToElement::None {
            clip_element_id = 0;
        }

        // closing pops the clip stack only for elements carrying the config
        if !self.attach_config(open_index, ElementConfig::Floating(floating)) {
            return;
        }
        self.clip_element_ids[open_index] = clip_element_id;
        self.open_clip_stack.add(clip_element_id);
        self.tree_roots.add(TreeRoot {
            element_index: open_index,
            parent_id: floating.parent_id,
            clip_element_id,
            z_index: floating.z_index,
        });
    }

    fn configure_clip(&mut self, open_index: usize, element_id: u32, mut clip: ClipConfig) {
        let existing = (0..self.scroll_containers.len())
            .find(|&i| self.scroll_containers[i].element_id == element_id);

        if self.settings.external_scroll_handling_enabled {
            if let Some(query) = &self.query_scroll_offset_fn {
                clip.child_offset = query(element_id);
            }
        } else if clip.child_offset.is_zero() {
            if let Some(i) = existing {
                clip.child_offset = self.scroll_containers[i].scroll_position;
            }
        }

        match existing {
            Some(i) => {
                let container = &mut self.scroll_containers[i];
                container.element_index = open_index;
                container.declared_generation = self.generation;
                container.open_this_frame = true;
                container.horizontal = clip.horizontal;
                container.vertical = clip.vertical;
            }
            None => {
                let added = self.scroll_containers.add(ScrollContainerDataInternal {
                    element_id,
                    element_index: open_index,
                    declared_generation: self.generation,
                    scroll_origin: crate::math::Vector2::new(-1.0, -1.0),
                    open_this_frame: true,
                    horizontal: clip.horizontal,
                    vertical: clip.vertical,
                    ..Default::default()
                });
                if added.is_none() {
                    tracing::trace!(element_id, "scroll container table full");
                }
            }
        }

        if self.attach_config(open_index, ElementConfig::Clip(clip)) {
            self.open_clip_stack.add(element_id);
        }
    }

    /// Closes the element opened last.
    ///
    /// # Panics
    ///
    /// Panics when there is no open element besides the implicit root.
    pub fn close_element(&mut self) {
        if self.dropped_depth > 0 {
            self.dropped_depth -= 1;
            return;
        }
        assert!(
            self.open_element_stack.len() > 1,
            "close_element called more times than open_element"
        );
        self.close_open_element();
    }

    /// Pops the open element, sizes it to fit its children and hands it to its parent.
    pub(super) fn close_open_element(&mut self) {
        let Some(&open_index) = self.open_element_stack.last() else {
            return;
        };
        let mut element = self.layout_elements[open_index];
        let configs = self.element_configs.slice(element.configs);
        let clip = configs.clip().copied().unwrap_or_default();
        let floating = configs.floating().is_some();

        let pops = floating as usize + (clip.horizontal || clip.vertical) as usize;
        for _ in 0..pops {
            self.open_clip_stack.pop();
        }

        let layout = element.layout;
        let x_along = layout.layout_direction == LayoutDirection::LeftToRight;
        let child_count = element.children.length;
        let buffer_start = self.children_buffer.len().saturating_sub(child_count);
        let children_start = self.layout_element_children.len();

        let mut dimensions = Dimensions::new(layout.padding.along(true), layout.padding.along(false));
        let mut min_dimensions = dimensions;
        let cross_padding = layout.padding.along(!x_along);

        for i in 0..child_count {
            let child_index = self.children_buffer[buffer_start + i];
            let child = &self.layout_elements[child_index];

            *dimensions.along_mut(x_along) += child.dimensions.along(x_along);
            if !clip.along(x_along) {
                *min_dimensions.along_mut(x_along) += child.min_dimensions.along(x_along);
            }

            let cross = dimensions.along_mut(!x_along);
            *cross = cross.max(child.dimensions.along(!x_along) + cross_padding);
            if !clip.along(!x_along) {
                let min_cross = min_dimensions.along_mut(!x_along);
                *min_cross = min_cross.max(child.min_dimensions.along(!x_along) + cross_padding);
            }

            self.layout_element_children.add(child_index);
        }

        let gaps = child_count.saturating_sub(1) as f32 * layout.child_gap as f32;
        *dimensions.along_mut(x_along) += gaps;
        if !clip.along(x_along) {
            *min_dimensions.along_mut(x_along) += gaps;
        }

        element.children = ArrayView {
            start: children_start,
            length: child_count,
        };
        self.children_buffer.truncate(buffer_start);

        for x_axis in [true, false] {
            let sizing = element.layout.sizing.along_mut(x_axis);
            let size = dimensions.along_mut(x_axis);
            if sizing.type_ == SizingType::Percent {
                *size = 0.0;
                continue;
            }
            if sizing.min_max.max <= 0.0 {
                sizing.min_max.max = MAXFLOAT;
            }
            let (min, max) = (sizing.min_max.min, sizing.min_max.max);
            *size = size.max(min).min(max);
            let min_size = min_dimensions.along_mut(x_axis);
            *min_size = min_size.max(min).min(max);
        }

        element.dimensions = dimensions;
        element.min_dimensions = min_dimensions;
        self.layout_elements[open_index] = element;
        self.update_aspect_ratio_box(open_index);

        self.open_element_stack.pop();
        if let Some(&parent_index) = self.open_element_stack.last() {
            let parent = &mut self.layout_elements[parent_index];
            if floating {
                parent.floating_children_count += 1;
            } else {
                parent.children.length += 1;
                self.children_buffer.add(open_index);
            }
        }
    }

    /// Fills in a missing dimension from the other one and the aspect ratio.
    pub(super) fn update_aspect_ratio_box(&mut self, element_index: usize) {
        let element = self.layout_elements[element_index];
        let Some(ratio) = self.element_configs.slice(element.configs).aspect() else {
            return;
        };
        let dimensions = &mut self.layout_elements[element_index].dimensions;
        if dimensions.width == 0.0 && dimensions.height != 0.0 {
            dimensions.width = dimensions.height * ratio;
        } else if dimensions.width != 0.0 && dimensions.height == 0.0 {
            dimensions.height = dimensions.width / ratio;
        }
    }

    /// Adds a text leaf to the open element. The string is copied.
    pub fn open_text_element(&mut self, text: &str, config: &TextConfig) {
        if self.warnings.max_elements_exceeded || self.dropped_depth > 0 {
            return;
        }
        let Some(&parent_index) = self.open_element_stack.last() else {
            return;
        };
        let Some(index) = self.layout_elements.add(LayoutElement::default()) else {
            self.report_elements_exceeded();
            return;
        };

        let id = self.next_child_id();
        self.layout_elements[index].id = id.id;
        self.clip_element_ids[index] = self.open_clip_stack.last().copied().unwrap_or(0);
        self.register_id(id, index);

        let handle = match self.arena.alloc_str(text) {
            Ok(handle) => handle,
            Err(err) => {
                self.report(ErrorType::ArenaCapacityExceeded, &err.to_string());
                ArenaStr::default()
            }
        };
        let measured = self.measure_text_cached(text, config);
        let line_height = if config.line_height > 0 {
            config.line_height as f32
        } else {
            measured.unwrapped_dimensions.height
        };

        let text_data = self.text_element_data.add(TextElementData {
            text: handle,
            preferred_dimensions: measured.unwrapped_dimensions,
            measured,
            element_index: index,
            wrapped_lines: ArrayView::default(),
        });
        if text_data.is_none() {
            self.report_elements_exceeded();
        }

        let element = &mut self.layout_elements[index];
        element.text_data = text_data;
        element.dimensions = Dimensions::new(measured.unwrapped_dimensions.width, line_height);
        element.min_dimensions = Dimensions::new(measured.min_width, line_height);
        element.layout = LayoutConfig::default();
        element.layout.sizing.width.min_max.max = MAXFLOAT;
        element.layout.sizing.height.min_max.max = MAXFLOAT;
        element.configs = ArrayView {
            start: self.element_configs.len(),
            length: 0,
        };
        self.attach_config(index, ElementConfig::Text(*config));

        self.children_buffer.add(index);
        self.layout_elements[parent_index].children.length += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutSettings;
    use crate::layout::Sizing;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn context() -> (LayoutContext<()>, Rc<RefCell<Vec<ErrorType>>>) {
        let settings = LayoutSettings::default()
            .max_element_count(32)
            .max_measure_text_cache_word_count(64);
        let mut context = LayoutContext::with_settings(Dimensions::new(200.0, 100.0), settings);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        context.set_error_handler(move |error| sink.borrow_mut().push(error.error_type));
        context.set_measure_text_function(|text, _| Dimensions::new(text.len() as f32 * 10.0, 10.0));
        (context, seen)
    }

    fn fixed(width: f32, height: f32) -> ElementDeclaration<()> {
        let mut declaration = ElementDeclaration::default();
        declaration.layout.sizing.width = Sizing::Fixed(width).into();
        declaration.layout.sizing.height = Sizing::Fixed(height).into();
        declaration
    }

    #[test]
    fn close_sums_children_along_layout_axis() {
        let (mut context, _) = context();
        context.begin_layout();
        context.open_element();
        let mut row = ElementDeclaration::default();
        row.layout.padding = crate::layout::Padding::all(5);
        row.layout.child_gap = 10;
        context.configure_open_element(&row);
        for _ in 0..3 {
            context.open_element();
            context.configure_open_element(&fixed(20.0, 30.0));
            context.close_element();
        }
        let row_index = *context.open_element_stack.last().unwrap();
        context.close_element();

        let row = context.layout_elements[row_index];
        assert_eq!(row.dimensions, Dimensions::new(5.0 + 60.0 + 20.0 + 5.0, 40.0));
        assert_eq!(row.children.length, 3);
        context.end_layout();
    }

    #[test]
    fn clipped_axis_does_not_raise_minimum() {
        let (mut context, _) = context();
        context.begin_layout();
        context.open_element();
        let mut scroller = ElementDeclaration::default();
        scroller.clip.horizontal = true;
        context.configure_open_element(&scroller);
        context.open_element();
        context.configure_open_element(&fixed(500.0, 20.0));
        context.close_element();
        let index = *context.open_element_stack.last().unwrap();
        context.close_element();

        let element = context.layout_elements[index];
        assert_eq!(element.dimensions.width, 500.0);
        assert_eq!(element.min_dimensions.width, 0.0);
        assert_eq!(element.min_dimensions.height, 20.0);
        context.end_layout();
    }

    #[test]
    fn anonymous_siblings_get_distinct_ids() {
        let (mut context, seen) = context();
        context.begin_layout();
        let mut ids = Vec::new();
        for _ in 0..3 {
            context.open_element();
            ids.push(context.open_element_id());
            context.close_element();
        }
        context.end_layout();
        ids.dedup();
        assert_eq!(ids.len(), 3);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn percent_out_of_range_is_clamped_and_reported() {
        let (mut context, seen) = context();
        context.begin_layout();
        context.open_element();
        let mut declaration = ElementDeclaration::default();
        declaration.layout.sizing.width = Sizing::Percent(1.5).into();
        context.configure_open_element(&declaration);
        let index = *context.open_element_stack.last().unwrap();
        context.close_element();
        assert_eq!(context.layout_elements[index].layout.sizing.width.percent, 1.0);
        context.end_layout();
        assert_eq!(*seen.borrow(), vec![ErrorType::PercentageOver1]);
    }

    #[test]
    fn floating_to_unknown_id_is_reported() {
        let (mut context, seen) = context();
        context.begin_layout();
        context.open_element();
        let mut declaration = ElementDeclaration::default();
        declaration.floating.attach_to = FloatingAttachToElement::ElementWithId;
        declaration.floating.parent_id = Id::new("Nowhere").id;
        context.configure_open_element(&declaration);
        context.close_element();
        context.end_layout();
        assert_eq!(*seen.borrow(), vec![ErrorType::FloatingParentNotFound]);
        assert_eq!(context.tree_roots.len(), 2);
    }

    #[test]
    fn floating_child_is_not_counted_as_flow_child() {
        let (mut context, _) = context();
        context.begin_layout();
        context.open_element();
        context.configure_open_element(&fixed(50.0, 50.0));
        context.open_element();
        let mut overlay = fixed(10.0, 10.0);
        overlay.floating.attach_to = FloatingAttachToElement::Parent;
        context.configure_open_element(&overlay);
        context.close_element();
        let index = *context.open_element_stack.last().unwrap();
        context.close_element();

        let parent = context.layout_elements[index];
        assert_eq!(parent.children.length, 0);
        assert_eq!(parent.floating_children_count, 1);
        context.end_layout();
    }

    #[test]
    fn floating_without_config_room_leaves_clip_stack_alone() {
        let (mut context, seen) = context();
        context.begin_layout();
        context.open_element();
        context.configure_open_element(&fixed(50.0, 50.0));
        let free = context.element_configs.capacity() - context.element_configs.len();
        assert!(context.element_configs.extend_default(free));

        context.open_element();
        let mut overlay = fixed(10.0, 10.0);
        overlay.floating.attach_to = FloatingAttachToElement::Parent;
        context.configure_open_element(&overlay);
        context.close_element();

        assert!(context.open_clip_stack.is_empty());
        assert_eq!(context.tree_roots.len(), 1);
        context.close_element();
        context.end_layout();
        assert_eq!(*seen.borrow(), vec![ErrorType::ElementsCapacityExceeded]);
    }

    #[test]
    fn text_leaf_is_measured_and_attached() {
        let (mut context, _) = context();
        context.begin_layout();
        context.open_text_element("hello", &TextConfig::default());
        let root = context.layout_elements[0];
        assert_eq!(root.children.length, 1);
        let text = context.layout_elements[1];
        assert_eq!(text.dimensions, Dimensions::new(50.0, 10.0));
        assert_eq!(text.min_dimensions.width, 50.0);
        assert!(context
            .element_configs
            .slice(text.configs)
            .text()
            .is_some());
        context.end_layout();
    }

    #[test]
    fn overflowing_elements_are_dropped_with_balanced_closes() {
        let (mut context, seen) = context();
        context.begin_layout();
        for _ in 0..40 {
            context.open_element();
            context.configure_open_element(&fixed(1.0, 1.0));
            context.open_element();
            context.close_element();
            context.close_element();
        }
        assert_eq!(context.open_element_stack.len(), 1);
        context.end_layout();
        assert_eq!(*seen.borrow(), vec![ErrorType::ElementsCapacityExceeded]);
        assert_eq!(context.layout_elements.len(), 32);
    }

    #[test]
    #[should_panic(expected = "close_element called more times than open_element")]
    fn closing_the_root_panics() {
        let (mut context, _) = context();
        context.begin_layout();
        context.close_element();
    }
}
