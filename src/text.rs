use rustc_hash::FxHashMap;

use crate::align::AlignX;
use crate::arena::Arena;
use crate::array::BoundedArray;
use crate::color::Color;
use crate::errors::{ArenaError, ArrayError};
use crate::id::hash_text_with_config;
use crate::math::Dimensions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum WrapMode {
    /// Wraps on whitespaces not breaking words
    #[default]
    Words,
    /// Only wraps on new line characters
    Newline,
    /// Never wraps, can overflow of parent layout
    None,
}

/// Configuration settings for rendering text elements.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextConfig {
    /// Opaque value handed back on the text render command.
    pub user_data: usize,
    pub color: Color,
    /// The engine does not manage fonts. It is up to the host to assign a unique ID to each font.
    pub font_id: u16,
    pub font_size: u16,
    pub letter_spacing: u16,
    /// Height of each wrapped line. `0` uses the measured height.
    pub line_height: u16,
    pub wrap_mode: WrapMode,
    /// Horizontal alignment of each line inside the text element.
    pub alignment: AlignX,
}

impl TextConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn color(&mut self, color: impl Into<Color>) -> &mut Self {
        self.color = color.into();
        self
    }

    #[inline]
    pub fn font_id(&mut self, id: u16) -> &mut Self {
        self.font_id = id;
        self
    }

    #[inline]
    pub fn font_size(&mut self, size: u16) -> &mut Self {
        self.font_size = size;
        self
    }

    #[inline]
    pub fn letter_spacing(&mut self, spacing: u16) -> &mut Self {
        self.letter_spacing = spacing;
        self
    }

    #[inline]
    pub fn line_height(&mut self, height: u16) -> &mut Self {
        self.line_height = height;
        self
    }

    #[inline]
    pub fn wrap_mode(&mut self, mode: WrapMode) -> &mut Self {
        self.wrap_mode = mode;
        self
    }

    #[inline]
    pub fn alignment(&mut self, alignment: AlignX) -> &mut Self {
        self.alignment = alignment;
        self
    }

    #[inline]
    pub fn user_data(&mut self, user_data: usize) -> &mut Self {
        self.user_data = user_data;
        self
    }

    /// Copies the configured value out of the builder chain.
    #[inline]
    pub fn end(&self) -> Self {
        *self
    }
}

/// Host-supplied measurement function. Must be pure: results are cached.
pub type MeasureTextFn = Box<dyn Fn(&str, &TextConfig) -> Dimensions>;

/// One word of a measured text run. A zero-length word marks a forced line break.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct MeasuredWord {
    pub start: u32,
    pub length: u32,
    pub width: f32,
    pub next: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct MeasureTextCacheItem {
    pub unwrapped_dimensions: Dimensions,
    pub first_word: Option<u32>,
    pub min_width: f32,
    pub contains_newlines: bool,
    pub id: u32,
    pub generation: u32,
}

/// Measured-word cache keyed by content and font settings.
///
/// Words are stored as linked lists in a bounded array; evicted lists go
/// back to a free list so the array never needs compacting.
pub(crate) struct TextMeasureCache {
    items: FxHashMap<u32, MeasureTextCacheItem>,
    words: BoundedArray<MeasuredWord>,
    free_words: BoundedArray<u32>,
}

impl TextMeasureCache {
    pub fn new(max_words: usize) -> Self {
        let mut items = FxHashMap::default();
        items.reserve(max_words.min(4096));
        Self {
            items,
            words: BoundedArray::new(max_words),
            free_words: BoundedArray::new(max_words),
        }
    }

    pub fn footprint(max_words: usize) -> usize {
        BoundedArray::<MeasuredWord>::footprint(max_words) + BoundedArray::<u32>::footprint(max_words)
    }

    pub fn recharge(&self, arena: &mut Arena) -> Result<(), ArenaError> {
        self.words.recharge(arena)?;
        self.free_words.recharge(arena)?;
        Ok(())
    }

    pub fn word(&self, index: u32) -> MeasuredWord {
        self.words.get_value(index as usize)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Drops entries unused for more than two generations. Returns how many went.
    pub fn evict_stale(&mut self, generation: u32) -> usize {
        let before = self.items.len();
        let words = &self.words;
        let free_words = &mut self.free_words;
        self.items.retain(|_, item| {
            if generation.wrapping_sub(item.generation) <= 2 {
                return true;
            }
            release_words(words, free_words, item.first_word);
            false
        });
        before - self.items.len()
    }

    /// Returns the cached measurement of `text`, measuring it word by word on a miss.
    pub fn measure(
        &mut self,
        text: &str,
        config: &TextConfig,
        generation: u32,
        measure: &dyn Fn(&str, &TextConfig) -> Dimensions,
    ) -> Result<MeasureTextCacheItem, ArrayError> {
        let id = hash_text_with_config(text, config);
        if let Some(item) = self.items.get_mut(&id) {
            item.generation = generation;
            return Ok(*item);
        }

        let mut first_word = None;
        let result = self.measure_words(text, config, measure, &mut first_word);
        match result {
            Ok((unwrapped_dimensions, min_width, contains_newlines)) => {
                let item = MeasureTextCacheItem {
                    unwrapped_dimensions,
                    first_word,
                    min_width,
                    contains_newlines,
                    id,
                    generation,
                };
                self.items.insert(id, item);
                Ok(item)
            }
            Err(err) => {
                release_words(&self.words, &mut self.free_words, first_word);
                Err(err)
            }
        }
    }

    fn measure_words(
        &mut self,
        text: &str,
        config: &TextConfig,
        measure: &dyn Fn(&str, &TextConfig) -> Dimensions,
        first_word: &mut Option<u32>,
    ) -> Result<(Dimensions, f32, bool), ArrayError> {
        let bytes = text.as_bytes();
        let space_width = measure(" ", config).width;

        let mut start = 0usize;
        let mut line_width = 0.0f32;
        let mut measured_width = 0.0f32;
        let mut measured_height = 0.0f32;
        let mut min_width = 0.0f32;
        let mut contains_newlines = false;
        let mut previous = None;

        let mut push = |cache: &mut Self, word: MeasuredWord, previous: &mut Option<u32>| {
            let index = cache.add_word(word, *previous)?;
            if first_word.is_none() {
                *first_word = Some(index);
            }
            *previous = Some(index);
            Ok::<(), ArrayError>(())
        };

        for (end, &current) in bytes.iter().enumerate() {
            if current != b' ' && current != b'\n' {
                continue;
            }
            let length = end - start;
            let mut dimensions = Dimensions::default();
            if length > 0 {
                dimensions = measure(&text[start..end], config);
            }
            min_width = min_width.max(dimensions.width);
            measured_height = measured_height.max(dimensions.height);

            if current == b' ' {
                dimensions.width += space_width;
                let word = MeasuredWord {
                    start: start as u32,
                    length: length as u32 + 1,
                    width: dimensions.width,
                    next: None,
                };
                push(self, word, &mut previous)?;
                line_width += dimensions.width;
            } else {
                if length > 0 {
                    let word = MeasuredWord {
                        start: start as u32,
                        length: length as u32,
                        width: dimensions.width,
                        next: None,
                    };
                    push(self, word, &mut previous)?;
                }
                let line_break = MeasuredWord {
                    start: end as u32 + 1,
                    length: 0,
                    width: 0.0,
                    next: None,
                };
                push(self, line_break, &mut previous)?;
                line_width += dimensions.width;
                measured_width = measured_width.max(line_width);
                contains_newlines = true;
                line_width = 0.0;
            }
            start = end + 1;
        }

        if bytes.len() > start {
            let dimensions = measure(&text[start..], config);
            let word = MeasuredWord {
                start: start as u32,
                length: (bytes.len() - start) as u32,
                width: dimensions.width,
                next: None,
            };
            push(self, word, &mut previous)?;
            line_width += dimensions.width;
            measured_height = measured_height.max(dimensions.height);
            min_width = min_width.max(dimensions.width);
        }

        let width = (measured_width.max(line_width) - config.letter_spacing as f32).max(0.0);
        Ok((
            Dimensions::new(width, measured_height),
            min_width,
            contains_newlines,
        ))
    }

    fn add_word(&mut self, word: MeasuredWord, previous: Option<u32>) -> Result<u32, ArrayError> {
        let index = match self.free_words.pop() {
            Some(free) => {
                self.words.set(free as usize, word)?;
                free
            }
            None => self.words.try_add(word)? as u32,
        };
        if let Some(previous) = previous {
            self.words[previous as usize].next = Some(index);
        }
        Ok(index)
    }
}

fn release_words(
    words: &BoundedArray<MeasuredWord>,
    free_words: &mut BoundedArray<u32>,
    first: Option<u32>,
) {
    let mut index = first;
    while let Some(i) = index {
        if free_words.add(i).is_none() {
            break;
        }
        index = words.get_value(i as usize).next;
    }
}

/// One output line as a byte range of the element's text.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct WrappedLine {
    pub start: usize,
    pub length: usize,
    pub width: f32,
}

/// Breaks a measured word list into lines no wider than `container_width`.
///
/// A word wider than the container gets a line of its own. `Newline` mode
/// only breaks at forced line breaks.
pub(crate) fn wrap_words(
    cache: &TextMeasureCache,
    first_word: Option<u32>,
    text: &str,
    container_width: f32,
    config: &TextConfig,
    space_width: f32,
    mut emit: impl FnMut(WrappedLine),
) {
    let bytes = text.as_bytes();
    let letter_spacing = config.letter_spacing as f32;
    let fits = |line_width: f32, word_width: f32| {
        config.wrap_mode != WrapMode::Words || line_width + word_width <= container_width
    };
    // Closes a line, dropping one trailing space.
    let close = |start: usize, length: usize, width: f32| {
        let ends_with_space = length > 0 && bytes.get(start + length - 1) == Some(&b' ');
        if ends_with_space {
            WrappedLine {
                start,
                length: length - 1,
                width: width - space_width,
            }
        } else {
            WrappedLine {
                start,
                length,
                width,
            }
        }
    };

    let mut index = first_word;
    let mut line_width = 0.0f32;
    let mut line_length = 0usize;
    let mut line_start = 0usize;

    while let Some(i) = index {
        let word = cache.word(i);
        let (word_start, word_length) = (word.start as usize, word.length as usize);

        if line_length == 0 && word_length > 0 && !fits(line_width, word.width) {
            emit(close(word_start, word_length, word.width));
            index = word.next;
            line_start = word_start + word_length;
        } else if word_length == 0 || !fits(line_width, word.width) {
            let width = if line_length > 0 {
                line_width - letter_spacing
            } else {
                0.0
            };
            emit(close(line_start, line_length, width));
            if line_length == 0 || word_length == 0 {
                index = word.next;
            }
            line_width = 0.0;
            line_length = 0;
            line_start = word_start;
        } else {
            line_width += word.width + letter_spacing;
            line_length += word_length;
            index = word.next;
        }
    }

    if line_length > 0 {
        emit(close(line_start, line_length, line_width - letter_spacing));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn six_per_char(text: &str, _: &TextConfig) -> Dimensions {
        Dimensions::new(6.0 * text.chars().count() as f32, 10.0)
    }

    fn lines(text: &str, width: f32, config: &TextConfig) -> Vec<(String, f32)> {
        let mut cache = TextMeasureCache::new(64);
        let item = cache.measure(text, config, 1, &six_per_char).unwrap();
        let mut out = Vec::new();
        wrap_words(&cache, item.first_word, text, width, config, 6.0, |line| {
            out.push((text[line.start..line.start + line.length].to_string(), line.width));
        });
        out
    }

    #[test]
    fn measures_unwrapped_size_and_min_width() {
        let mut cache = TextMeasureCache::new(16);
        let config = TextConfig::default();
        let item = cache.measure("hello big world", &config, 1, &six_per_char).unwrap();
        assert_eq!(item.unwrapped_dimensions, Dimensions::new(90.0, 10.0));
        assert_eq!(item.min_width, 30.0);
        assert!(!item.contains_newlines);
    }

    #[test]
    fn repeated_measurement_hits_cache() {
        use std::cell::Cell;
        let calls = Cell::new(0);
        let counting = |text: &str, config: &TextConfig| {
            calls.set(calls.get() + 1);
            six_per_char(text, config)
        };
        let mut cache = TextMeasureCache::new(16);
        let config = TextConfig::default();
        cache.measure("a b", &config, 1, &counting).unwrap();
        let after_first = calls.get();
        cache.measure("a b", &config, 2, &counting).unwrap();
        assert_eq!(calls.get(), after_first);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn wraps_two_words_into_two_lines() {
        let out = lines("hello world", 30.0, &TextConfig::default());
        assert_eq!(
            out,
            vec![("hello".to_string(), 30.0), ("world".to_string(), 30.0)]
        );
    }

    #[test]
    fn packs_words_while_they_fit() {
        let out = lines("a b c dd", 30.0, &TextConfig::default());
        let texts: Vec<_> = out.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["a b", "c dd"]);
        assert_eq!(out[0].1, 18.0);
    }

    #[test]
    fn forced_newlines_make_lines() {
        let config = *TextConfig::new().wrap_mode(WrapMode::Newline);
        let out = lines("one two\nthree", 10.0, &config);
        let texts: Vec<_> = out.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["one two", "three"]);
    }

    #[test]
    fn word_capacity_overflow_releases_words() {
        let mut cache = TextMeasureCache::new(2);
        let config = TextConfig::default();
        let err = cache.measure("a b c d", &config, 1, &six_per_char);
        assert_eq!(err, Err(ArrayError::Full(2)));
        assert_eq!(cache.len(), 0);
        // the released slots are reusable
        assert!(cache.measure("ab", &config, 1, &six_per_char).is_ok());
    }

    #[test]
    fn stale_entries_are_evicted() {
        let mut cache = TextMeasureCache::new(16);
        let config = TextConfig::default();
        cache.measure("old", &config, 1, &six_per_char).unwrap();
        cache.measure("new", &config, 4, &six_per_char).unwrap();
        assert_eq!(cache.evict_stale(4), 1);
        assert_eq!(cache.len(), 1);
    }
}
