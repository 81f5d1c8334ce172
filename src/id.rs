//! Element identities and the hashes that produce them.
//!
//! All ids are 32-bit avalanche hashes seeded by a parent id, so anonymous
//! elements get ids that depend only on declaration order and parent.

use crate::text::TextConfig;

/// A resolved element id.
///
/// `base_id` is the hash of the label alone, `offset` the index mixed into it;
/// for anonymous elements `base_id` is the parent's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Id {
    pub id: u32,
    pub offset: u32,
    pub base_id: u32,
}

impl Id {
    /// Creates an id from `label`.
    #[inline]
    pub fn new(label: &str) -> Id {
        Self::new_index(label, 0)
    }

    /// Creates an id from `label` and `index`, for elements declared in a loop.
    #[inline]
    pub fn new_index(label: &str, index: u32) -> Id {
        hash_string_with_offset(label, index, 0)
    }

    /// Like [`Id::new_index`], seeded by `parent_id` so the same label can be
    /// reused under different parents.
    #[inline]
    pub fn new_index_local(label: &str, index: u32, parent_id: u32) -> Id {
        hash_string_with_offset(label, index, parent_id)
    }
}

impl From<&str> for Id {
    fn from(label: &str) -> Self {
        Id::new(label)
    }
}

impl From<(&str, u32)> for Id {
    fn from((label, index): (&str, u32)) -> Self {
        Id::new_index(label, index)
    }
}

#[inline]
fn mix(hash: u32, value: u32) -> u32 {
    let mut hash = hash.wrapping_add(value);
    hash = hash.wrapping_add(hash << 10);
    hash ^ (hash >> 6)
}

#[inline]
fn finish(mut hash: u32) -> u32 {
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash.wrapping_add(hash << 15)
}

pub fn hash_string(key: &str, seed: u32) -> Id {
    let hash = finish(key.bytes().fold(seed, |h, b| mix(h, b as u32)));
    Id {
        id: hash.wrapping_add(1),
        offset: 0,
        base_id: hash.wrapping_add(1),
    }
}

pub fn hash_string_with_offset(key: &str, offset: u32, seed: u32) -> Id {
    let base = key.bytes().fold(seed, |h, b| mix(h, b as u32));
    let hash = finish(mix(base, offset));
    Id {
        id: hash.wrapping_add(1),
        offset,
        base_id: finish(base).wrapping_add(1),
    }
}

/// Id for an anonymous element: the `offset`th child of the element `seed`.
pub fn hash_number(offset: u32, seed: u32) -> Id {
    let hash = finish(mix(seed, offset.wrapping_add(48)));
    Id {
        id: hash.wrapping_add(1),
        offset,
        base_id: seed,
    }
}

/// Cache key for a text run: content plus everything that changes its measurement.
pub(crate) fn hash_text_with_config(text: &str, config: &TextConfig) -> u32 {
    let mut content: u64 = 0;
    for b in text.bytes() {
        content = content.wrapping_add(b as u64);
        content = content.wrapping_add(content << 10);
        content ^= content >> 6;
    }
    let mut hash = (content % u32::MAX as u64) as u32;
    hash = mix(hash, config.font_id as u32);
    hash = mix(hash, config.font_size as u32);
    hash = mix(hash, config.letter_spacing as u32);
    hash = mix(hash, config.line_height as u32);
    hash = mix(hash, config.wrap_mode as u32);
    finish(hash).wrapping_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_deterministic_and_nonzero() {
        assert_eq!(Id::new("Sidebar"), Id::new("Sidebar"));
        assert_ne!(Id::new("Sidebar").id, Id::new("Header").id);
        assert_ne!(Id::new("").id, 0);
    }

    #[test]
    fn index_changes_id_but_not_base() {
        let a = Id::new_index("Item", 1);
        let b = Id::new_index("Item", 2);
        assert_ne!(a.id, b.id);
        assert_eq!(a.base_id, b.base_id);
        assert_eq!(b.offset, 2);
    }

    #[test]
    fn local_ids_depend_on_parent() {
        let a = Id::new_index_local("Button", 0, 11);
        let b = Id::new_index_local("Button", 0, 12);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn anonymous_ids_follow_declaration_order() {
        let parent = Id::new("Parent").id;
        let first = hash_number(0, parent);
        let second = hash_number(1, parent);
        assert_ne!(first.id, second.id);
        assert_eq!(first.base_id, parent);
        assert_eq!(hash_number(0, parent), first);
    }

    #[test]
    fn text_hash_includes_config() {
        let base = TextConfig::default();
        let bigger = TextConfig {
            font_size: base.font_size + 4,
            ..base
        };
        assert_ne!(
            hash_text_with_config("abc", &base),
            hash_text_with_config("abc", &bigger)
        );
        assert_eq!(
            hash_text_with_config("abc", &base),
            hash_text_with_config("abc", &base)
        );
    }
}
