//! The layout context: everything that lives between `begin_layout` and
//! `end_layout`, plus the state that has to outlive a frame.
//!
//! A frame goes through four stages. Declarations build an element tree
//! ([`tree`]), the two axis passes size it ([`sizing`]), a depth-first walk
//! turns it into render commands ([`render`]), and between frames the host
//! feeds pointer and scroll input back in ([`pointer`]).

mod pointer;
mod render;
mod sizing;
mod tree;

use std::fmt::Debug;

use crate::arena::{Arena, ArenaStr};
use crate::array::{ArrayView, BoundedArray};
use crate::config::LayoutSettings;
use crate::element_map::ElementMap;
use crate::elements::ElementConfig;
use crate::errors::{ArenaError, ErrorData, ErrorHandler, ErrorType};
use crate::id::{hash_string, Id};
use crate::layout::{LayoutConfig, Sizing};
use crate::math::{BoundingBox, Dimensions, Vector2};
use crate::render_commands::{RenderCommand, RenderCommands};
use crate::text::{MeasureTextCacheItem, TextConfig, TextMeasureCache};

pub use pointer::{PointerData, PointerDataInteractionState, ScrollContainerData};
pub(crate) use pointer::ScrollContainerDataInternal;
pub use tree::ElementDeclaration;

pub(crate) const MAXFLOAT: f32 = f32::MAX;
pub(crate) const EPSILON: f32 = 0.01;

/// Upper bound on configs one element can carry: one of each kind.
const CONFIGS_PER_ELEMENT: usize = 8;
/// String storage reserved per element when the arena is sized automatically.
const TEXT_BYTES_PER_ELEMENT: usize = 64;

const ROOT_LABEL: &str = "Ply__RootContainer";

pub type QueryScrollOffsetFn = Box<dyn Fn(u32) -> Vector2>;

#[inline]
pub(crate) fn float_equal(left: f32, right: f32) -> bool {
    (left - right).abs() < EPSILON
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LayoutElement {
    /// Window into `layout_element_children`. While the element is still open
    /// only `length` is meaningful and counts children closed so far.
    pub children: ArrayView,
    pub floating_children_count: u16,
    pub text_data: Option<usize>,
    pub dimensions: Dimensions,
    pub min_dimensions: Dimensions,
    pub layout: LayoutConfig,
    pub configs: ArrayView,
    pub id: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TextElementData {
    pub text: ArenaStr,
    pub preferred_dimensions: Dimensions,
    pub measured: MeasureTextCacheItem,
    pub element_index: usize,
    pub wrapped_lines: ArrayView,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct WrappedTextLine {
    pub dimensions: Dimensions,
    pub line: ArenaStr,
}

/// A subtree laid out and drawn on its own: the page root or a floating element.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TreeRoot {
    pub element_index: usize,
    pub parent_id: u32,
    pub clip_element_id: u32,
    pub z_index: i16,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TreeNode {
    pub element_index: usize,
    pub position: Vector2,
    pub bounding_box: BoundingBox,
    /// A scissor was opened for this node and must be closed on the way out.
    pub clipping: bool,
}

/// One-shot flags so each capacity problem is reported once per frame.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Warnings {
    pub max_elements_exceeded: bool,
    pub max_render_commands_exceeded: bool,
    pub max_text_lines_exceeded: bool,
    pub max_text_measure_cache_exceeded: bool,
    pub text_measurement_fn_not_set: bool,
}

/// A layout engine instance.
///
/// All memory is sized when the context is created; nothing grows while a
/// frame is being declared. Custom element payloads are of type `C`.
pub struct LayoutContext<C: Clone + Default + Debug = ()> {
    settings: LayoutSettings,
    generation: u32,
    warnings: Warnings,
    /// Open calls swallowed after the element capacity ran out; their closes
    /// are swallowed too so the open stack stays balanced.
    dropped_depth: usize,
    /// Render command slots held for the ends of scissors already emitted.
    scissor_ends_reserved: usize,
    layout_dimensions: Dimensions,
    pointer_info: PointerData,

    measure_text_fn: Option<crate::text::MeasureTextFn>,
    query_scroll_offset_fn: Option<QueryScrollOffsetFn>,
    error_handler: ErrorHandler,

    arena: Arena,

    // Persistent across frames.
    element_map: ElementMap,
    text_cache: TextMeasureCache,
    scroll_containers: BoundedArray<ScrollContainerDataInternal>,
    pointer_over_ids: BoundedArray<Id>,

    // Rebuilt every frame.
    layout_elements: BoundedArray<LayoutElement>,
    element_configs: BoundedArray<ElementConfig<C>>,
    open_element_stack: BoundedArray<usize>,
    layout_element_children: BoundedArray<usize>,
    children_buffer: BoundedArray<usize>,
    clip_element_ids: BoundedArray<u32>,
    open_clip_stack: BoundedArray<u32>,
    text_element_data: BoundedArray<TextElementData>,
    wrapped_text_lines: BoundedArray<WrappedTextLine>,
    aspect_ratio_elements: BoundedArray<usize>,
    tree_roots: BoundedArray<TreeRoot>,
    render_commands: BoundedArray<RenderCommand<C>>,
    tree_nodes: BoundedArray<TreeNode>,
    tree_node_visited: BoundedArray<bool>,
    element_index_buffer: BoundedArray<usize>,
    resizable_buffer: BoundedArray<usize>,
}

impl<C: Clone + Default + Debug> LayoutContext<C> {
    /// Creates a context with the process-wide default capacities.
    pub fn new(dimensions: Dimensions) -> Self {
        Self::with_settings(dimensions, LayoutSettings::default())
    }

    /// Creates a context sized by `settings`.
    ///
    /// The arena is a byte budget covering every collection of the context
    /// plus per-frame strings. Collections keep their typed storage, allocated
    /// here once, and only reserve their footprint in the arena; the arena
    /// itself stores just the string bytes. An `arena_capacity` smaller than
    /// the collections' footprint is raised to it, so only string storage can
    /// run out.
    pub fn with_settings(dimensions: Dimensions, settings: LayoutSettings) -> Self {
        let n = settings.max_element_count.max(1);
        let words = settings.max_measure_text_cache_word_count;
        let (persistent, ephemeral) = Self::footprints(&settings);
        let capacity = settings
            .arena_capacity
            .unwrap_or_else(|| Self::required_memory_size(&settings))
            .max(persistent + ephemeral);

        let mut context = Self {
            settings,
            generation: 0,
            warnings: Warnings::default(),
            dropped_depth: 0,
            scissor_ends_reserved: 0,
            layout_dimensions: dimensions,
            pointer_info: PointerData::default(),
            measure_text_fn: None,
            query_scroll_offset_fn: None,
            error_handler: Box::new(|_| {}),
            arena: Arena::new(capacity, capacity - persistent - ephemeral),
            element_map: ElementMap::new(n),
            text_cache: TextMeasureCache::new(words),
            scroll_containers: BoundedArray::new(n),
            pointer_over_ids: BoundedArray::new(n),
            layout_elements: BoundedArray::new(n),
            element_configs: BoundedArray::new(n * CONFIGS_PER_ELEMENT),
            open_element_stack: BoundedArray::new(n),
            layout_element_children: BoundedArray::new(n),
            children_buffer: BoundedArray::new(n),
            clip_element_ids: BoundedArray::new(n),
            open_clip_stack: BoundedArray::new(n),
            text_element_data: BoundedArray::new(n),
            wrapped_text_lines: BoundedArray::new(n),
            aspect_ratio_elements: BoundedArray::new(n),
            tree_roots: BoundedArray::new(n),
            render_commands: BoundedArray::new(n),
            tree_nodes: BoundedArray::new(n),
            tree_node_visited: BoundedArray::new(n),
            element_index_buffer: BoundedArray::new(n),
            resizable_buffer: BoundedArray::new(n),
        };

        let charged = context
            .charge_persistent()
            .and_then(|_| context.arena.mark_persistent_boundary());
        if let Err(err) = charged {
            tracing::warn!(%err, "persistent layout memory could not be charged");
        }
        tracing::debug!(
            arena_bytes = capacity,
            max_elements = n,
            max_words = words,
            "layout context created"
        );
        context
    }

    /// Arena budget a context with these settings gets when sized automatically:
    /// the collections' footprint plus string storage.
    pub fn required_memory_size(settings: &LayoutSettings) -> usize {
        let (persistent, ephemeral) = Self::footprints(settings);
        persistent + ephemeral + settings.max_element_count.max(1) * TEXT_BYTES_PER_ELEMENT
    }

    fn footprints(settings: &LayoutSettings) -> (usize, usize) {
        let n = settings.max_element_count.max(1);
        let words = settings.max_measure_text_cache_word_count;

        let persistent = ElementMap::footprint(n)
            + TextMeasureCache::footprint(words)
            + BoundedArray::<ScrollContainerDataInternal>::footprint(n)
            + BoundedArray::<Id>::footprint(n);

        let ephemeral = BoundedArray::<LayoutElement>::footprint(n)
            + BoundedArray::<ElementConfig<C>>::footprint(n * CONFIGS_PER_ELEMENT)
            + 6 * BoundedArray::<usize>::footprint(n)
            + 2 * BoundedArray::<u32>::footprint(n)
            + BoundedArray::<TextElementData>::footprint(n)
            + BoundedArray::<WrappedTextLine>::footprint(n)
            + BoundedArray::<TreeRoot>::footprint(n)
            + BoundedArray::<RenderCommand<C>>::footprint(n)
            + BoundedArray::<TreeNode>::footprint(n)
            + BoundedArray::<bool>::footprint(n);

        (persistent, ephemeral)
    }

    fn charge_persistent(&mut self) -> Result<(), ArenaError> {
        self.element_map.recharge(&mut self.arena)?;
        self.text_cache.recharge(&mut self.arena)?;
        self.scroll_containers.recharge(&mut self.arena)?;
        self.pointer_over_ids.recharge(&mut self.arena)?;
        Ok(())
    }

    fn charge_ephemeral(&mut self) -> Result<(), ArenaError> {
        let arena = &mut self.arena;
        self.layout_elements.recharge(arena)?;
        self.element_configs.recharge(arena)?;
        self.open_element_stack.recharge(arena)?;
        self.layout_element_children.recharge(arena)?;
        self.children_buffer.recharge(arena)?;
        self.aspect_ratio_elements.recharge(arena)?;
        self.element_index_buffer.recharge(arena)?;
        self.resizable_buffer.recharge(arena)?;
        self.clip_element_ids.recharge(arena)?;
        self.open_clip_stack.recharge(arena)?;
        self.text_element_data.recharge(arena)?;
        self.wrapped_text_lines.recharge(arena)?;
        self.tree_roots.recharge(arena)?;
        self.render_commands.recharge(arena)?;
        self.tree_nodes.recharge(arena)?;
        self.tree_node_visited.recharge(arena)?;
        Ok(())
    }

    fn reset_ephemeral_collections(&mut self) {
        self.layout_elements.reset();
        self.element_configs.reset();
        self.open_element_stack.reset();
        self.layout_element_children.reset();
        self.children_buffer.reset();
        self.aspect_ratio_elements.reset();
        self.element_index_buffer.reset();
        self.resizable_buffer.reset();
        self.clip_element_ids.reset();
        self.open_clip_stack.reset();
        self.text_element_data.reset();
        self.wrapped_text_lines.reset();
        self.tree_roots.reset();
        self.render_commands.reset();
        self.tree_nodes.reset();
        self.tree_node_visited.reset();
    }

    /// Starts a new frame. Everything declared until [`end_layout`](Self::end_layout)
    /// becomes a child of an implicit root sized to the layout dimensions.
    pub fn begin_layout(&mut self) {
        let pruned = self.element_map.retain_declared_in(self.generation);
        let stale_scrollers = self.retain_declared_scroll_containers();

        self.arena.reset_ephemeral();
        if let Err(err) = self.charge_ephemeral() {
            self.report(ErrorType::ArenaCapacityExceeded, &err.to_string());
        }
        self.reset_ephemeral_collections();

        self.generation += 1;
        let evicted = self.text_cache.evict_stale(self.generation);
        self.warnings = Warnings::default();
        self.dropped_depth = 0;
        tracing::trace!(
            generation = self.generation,
            pruned,
            stale_scrollers,
            evicted,
            "begin layout"
        );

        self.open_element_with_id(hash_string(ROOT_LABEL, 0));
        let mut root = ElementDeclaration::<C>::default();
        root.layout.sizing.width = Sizing::Fixed(self.layout_dimensions.width).into();
        root.layout.sizing.height = Sizing::Fixed(self.layout_dimensions.height).into();
        self.configure_open_element(&root);
        if let Some(&root_index) = self.open_element_stack.last() {
            self.tree_roots.add(TreeRoot {
                element_index: root_index,
                ..Default::default()
            });
        }
    }

    /// Finishes the frame: closes anything left open, sizes and positions the
    /// tree, and returns the ordered render commands.
    pub fn end_layout(&mut self) -> RenderCommands<'_, C> {
        if self.open_element_stack.is_empty() {
            self.report(
                ErrorType::InternalError,
                "end_layout was called without a matching begin_layout",
            );
            self.render_commands.reset();
            return self.render_commands_view();
        }

        self.dropped_depth = 0;
        if self.open_element_stack.len() > 1 {
            let unclosed = self.open_element_stack.len() - 1;
            self.report(
                ErrorType::UnbalancedOpenClose,
                &format!("{unclosed} element(s) were still open at the end of the layout"),
            );
            while self.open_element_stack.len() > 1 {
                self.close_open_element();
            }
        }
        // the root
        self.close_open_element();

        self.calculate_final_layout();
        tracing::debug!(
            generation = self.generation,
            elements = self.layout_elements.len(),
            commands = self.render_commands.len(),
            "end layout"
        );
        self.render_commands_view()
    }

    fn render_commands_view(&self) -> RenderCommands<'_, C> {
        RenderCommands {
            commands: self.render_commands.as_slice(),
            arena: &self.arena,
        }
    }

    pub(crate) fn report(&mut self, error_type: ErrorType, text: &str) {
        tracing::warn!(error = ?error_type, "{text}");
        (self.error_handler)(ErrorData { error_type, text });
    }

    fn report_elements_exceeded(&mut self) {
        if self.warnings.max_elements_exceeded {
            return;
        }
        self.warnings.max_elements_exceeded = true;
        let text = format!(
            "more than {} elements were declared; try raising max_element_count",
            self.settings.max_element_count
        );
        self.report(ErrorType::ElementsCapacityExceeded, &text);
    }

    /// Measures `text` through the word cache, falling back to zero size
    /// when measurement is unavailable.
    fn measure_text_cached(&mut self, text: &str, config: &TextConfig) -> MeasureTextCacheItem {
        let Some(measure) = self.measure_text_fn.as_deref() else {
            if !self.warnings.text_measurement_fn_not_set {
                self.warnings.text_measurement_fn_not_set = true;
                self.report(
                    ErrorType::TextMeasurementFunctionMissing,
                    "text was declared before a text measurement function was set",
                );
            }
            return MeasureTextCacheItem::default();
        };

        let measured = self
            .text_cache
            .measure(text, config, self.generation, measure);
        match measured {
            Ok(item) => item,
            Err(err) => {
                if !self.warnings.max_text_measure_cache_exceeded {
                    self.warnings.max_text_measure_cache_exceeded = true;
                    self.report(
                        ErrorType::TextMeasurementCapacityExceeded,
                        &format!("{err}; try raising max_measure_text_cache_word_count"),
                    );
                }
                MeasureTextCacheItem::default()
            }
        }
    }

    /// Sets the function used to measure text. Results are cached per
    /// string and config, so it should be deterministic.
    pub fn set_measure_text_function(
        &mut self,
        measure: impl Fn(&str, &TextConfig) -> Dimensions + 'static,
    ) {
        self.measure_text_fn = Some(Box::new(measure));
    }

    /// Sets the callback that supplies scroll offsets when external scroll
    /// handling is enabled.
    pub fn set_query_scroll_offset_function(&mut self, query: impl Fn(u32) -> Vector2 + 'static) {
        self.query_scroll_offset_fn = Some(Box::new(query));
    }

    pub fn set_error_handler(&mut self, handler: impl FnMut(ErrorData<'_>) + 'static) {
        self.error_handler = Box::new(handler);
    }

    pub fn set_layout_dimensions(&mut self, dimensions: Dimensions) {
        self.layout_dimensions = dimensions;
    }

    pub fn layout_dimensions(&self) -> Dimensions {
        self.layout_dimensions
    }

    /// Skips drawing commands for elements entirely outside the layout area.
    pub fn set_culling_enabled(&mut self, enabled: bool) {
        self.settings.culling_enabled = enabled;
    }

    pub fn set_external_scroll_handling_enabled(&mut self, enabled: bool) {
        self.settings.external_scroll_handling_enabled = enabled;
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Number of frames begun so far.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn max_element_count(&self) -> usize {
        self.settings.max_element_count
    }

    pub fn max_measure_text_cache_word_count(&self) -> usize {
        self.settings.max_measure_text_cache_word_count
    }

    /// The arena backing this context.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Id of the innermost element currently open, 0 outside a frame.
    pub fn open_element_id(&self) -> u32 {
        self.open_element_stack
            .last()
            .map_or(0, |&index| self.layout_elements[index].id)
    }
}

impl<C: Clone + Default + Debug> Default for LayoutContext<C> {
    fn default() -> Self {
        Self::new(Dimensions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn small() -> LayoutSettings {
        LayoutSettings::default()
            .max_element_count(64)
            .max_measure_text_cache_word_count(128)
    }

    #[test]
    fn arena_is_sized_for_every_collection() {
        let settings = small();
        let context = LayoutContext::<()>::with_settings(Dimensions::new(100.0, 100.0), settings);
        let required = LayoutContext::<()>::required_memory_size(&settings);
        assert_eq!(context.arena().capacity(), required);
        assert!(context.arena().persistent_boundary() > 0);
        assert!(context.arena().persistent_boundary() < required);
    }

    #[test]
    fn tiny_arena_request_still_fits_collections() {
        let settings = small().arena_capacity(16);
        let context = LayoutContext::<()>::with_settings(Dimensions::new(1.0, 1.0), settings);
        let (persistent, ephemeral) = LayoutContext::<()>::footprints(&settings);
        assert_eq!(context.arena().capacity(), persistent + ephemeral);
    }

    #[test]
    fn arena_stores_only_strings() {
        let mut context = LayoutContext::<()>::with_settings(Dimensions::new(100.0, 100.0), small());
        context.set_measure_text_function(|text, _| Dimensions::new(text.len() as f32, 1.0));
        assert_eq!(context.arena().stored(), 0);

        context.begin_layout();
        let reserved = context.arena().next_offset();
        assert!(reserved > context.arena().persistent_boundary());
        context.open_text_element("label", &TextConfig::default());
        context.end_layout();
        // collections are reserved in the budget, their items are not copied in
        assert_eq!(context.arena().stored(), "label".len());
        assert!(context.arena().next_offset() >= reserved + "label".len());
    }

    #[test]
    fn empty_frame_has_no_commands_and_root_id() {
        let mut context = LayoutContext::<()>::with_settings(Dimensions::new(50.0, 40.0), small());
        context.begin_layout();
        assert_eq!(context.open_element_id(), hash_string(ROOT_LABEL, 0).id);
        assert!(context.end_layout().is_empty());
        assert_eq!(context.generation(), 1);
    }

    #[test]
    fn end_without_begin_reports_internal_error() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut context = LayoutContext::<()>::with_settings(Dimensions::new(10.0, 10.0), small());
        context.set_error_handler(move |error| sink.borrow_mut().push(error.error_type));
        assert!(context.end_layout().is_empty());
        assert_eq!(*seen.borrow(), vec![ErrorType::InternalError]);
    }

    #[test]
    fn missing_measure_function_is_reported_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut context = LayoutContext::<()>::with_settings(Dimensions::new(10.0, 10.0), small());
        context.set_error_handler(move |error| sink.borrow_mut().push(error.error_type));
        context.begin_layout();
        context.open_text_element("one", &TextConfig::default());
        context.open_text_element("two", &TextConfig::default());
        context.end_layout();
        assert_eq!(*seen.borrow(), vec![ErrorType::TextMeasurementFunctionMissing]);
    }
}
