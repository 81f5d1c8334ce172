use std::sync::atomic::{AtomicUsize, Ordering};

pub const DEFAULT_MAX_ELEMENT_COUNT: usize = 8192;
pub const DEFAULT_MAX_MEASURE_TEXT_WORD_CACHE_COUNT: usize = 16384;

static MAX_ELEMENT_COUNT: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_ELEMENT_COUNT);
static MAX_MEASURE_TEXT_WORD_CACHE_COUNT: AtomicUsize =
    AtomicUsize::new(DEFAULT_MAX_MEASURE_TEXT_WORD_CACHE_COUNT);

/// Sets the element capacity used by contexts created after this call.
pub fn set_default_max_element_count(count: usize) {
    MAX_ELEMENT_COUNT.store(count, Ordering::Relaxed);
}

/// Sets the measured-word capacity used by contexts created after this call.
pub fn set_default_max_measure_text_cache_word_count(count: usize) {
    MAX_MEASURE_TEXT_WORD_CACHE_COUNT.store(count, Ordering::Relaxed);
}

pub fn default_max_element_count() -> usize {
    MAX_ELEMENT_COUNT.load(Ordering::Relaxed)
}

pub fn default_max_measure_text_cache_word_count() -> usize {
    MAX_MEASURE_TEXT_WORD_CACHE_COUNT.load(Ordering::Relaxed)
}

/// Capacities and switches fixed when a layout context is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutSettings {
    pub max_element_count: usize,
    pub max_measure_text_cache_word_count: usize,
    /// Arena size in bytes. `None` sizes it to fit the capacities above.
    pub arena_capacity: Option<usize>,
    pub culling_enabled: bool,
    /// Scroll offsets come from the host's scroll query instead of the engine.
    pub external_scroll_handling_enabled: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            max_element_count: default_max_element_count(),
            max_measure_text_cache_word_count: default_max_measure_text_cache_word_count(),
            arena_capacity: None,
            culling_enabled: true,
            external_scroll_handling_enabled: false,
        }
    }
}

impl LayoutSettings {
    pub fn max_element_count(mut self, count: usize) -> Self {
        self.max_element_count = count;
        self
    }

    pub fn max_measure_text_cache_word_count(mut self, count: usize) -> Self {
        self.max_measure_text_cache_word_count = count;
        self
    }

    pub fn arena_capacity(mut self, bytes: usize) -> Self {
        self.arena_capacity = Some(bytes);
        self
    }

    pub fn culling(mut self, enabled: bool) -> Self {
        self.culling_enabled = enabled;
        self
    }

    pub fn external_scroll_handling(mut self, enabled: bool) -> Self {
        self.external_scroll_handling_enabled = enabled;
        self
    }
}
