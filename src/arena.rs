//! Bump-pointer memory budget backing one layout context.
//!
//! The budget is split in two zones. Everything allocated before
//! [`Arena::mark_persistent_boundary`] lives for the whole context; everything
//! after it is ephemeral and discarded by [`Arena::reset_ephemeral`], which only
//! moves the bump pointer back to the boundary.
//!
//! Two kinds of allocation share the one bump pointer. [`Arena::allocate`]
//! hands out bytes the arena stores itself (per-frame strings, raw scratch).
//! [`Arena::reserve`] only accounts for a typed collection that keeps its own
//! storage, so every structure of a context is held to the same budget while
//! no byte is backed twice.
//!
//! Allocations hand out [`ArenaRegion`] offsets rather than references, so
//! other structures hold plain indices into the arena and never borrow it.

use crate::errors::ArenaError;

/// Alignment used for collection reservations (one cache line).
pub const CACHE_LINE: usize = 64;

/// An allocated span of the budget, as an offset/length pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaRegion {
    pub offset: usize,
    pub length: usize,
    /// Start of the bytes in arena storage; `None` for reservations.
    pub(crate) data: Option<usize>,
}

impl ArenaRegion {
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    #[inline]
    pub fn is_backed(&self) -> bool {
        self.data.is_some()
    }
}

/// A UTF-8 string copied into the arena. Cheap to copy; resolve it with [`Arena::str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArenaStr {
    pub(crate) offset: u32,
    pub(crate) length: u32,
}

impl ArenaStr {
    pub fn len(&self) -> usize {
        self.length as usize
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Sub-slice in bytes. Callers only split at ASCII separators, which are
    /// always char boundaries.
    pub(crate) fn slice(&self, start: usize, length: usize) -> ArenaStr {
        let start = start.min(self.len());
        let length = length.min(self.len() - start);
        ArenaStr {
            offset: self.offset + start as u32,
            length: length as u32,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Arena {
    capacity: usize,
    next_offset: usize,
    persistent_boundary: usize,
    boundary_marked: bool,
    /// Bytes handed out by `allocate`, in allocation order.
    storage: Vec<u8>,
    storage_boundary: usize,
}

impl Arena {
    /// Creates an arena with a budget of `capacity` bytes, all of which may be
    /// backed storage.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(capacity, capacity)
    }

    /// Creates an arena with a budget of `capacity` bytes of which at most
    /// `backed` are expected to be stored (the rest being reservations).
    pub fn new(capacity: usize, backed: usize) -> Self {
        Self {
            capacity,
            next_offset: 0,
            persistent_boundary: 0,
            boundary_marked: false,
            storage: Vec::with_capacity(backed.min(capacity)),
            storage_boundary: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn next_offset(&self) -> usize {
        self.next_offset
    }

    #[inline]
    pub fn persistent_boundary(&self) -> usize {
        self.persistent_boundary
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.next_offset
    }

    /// Bytes currently held in arena storage.
    #[inline]
    pub fn stored(&self) -> usize {
        self.storage.len()
    }

    fn bump(&mut self, size: usize, align: usize) -> Result<usize, ArenaError> {
        let align = align.max(1).next_power_of_two();
        let aligned = (self.next_offset + (align - 1)) & !(align - 1);
        match aligned.checked_add(size) {
            Some(end) if end <= self.capacity => {
                self.next_offset = end;
                Ok(aligned)
            }
            _ => Err(ArenaError::CapacityExceeded {
                requested: size,
                offset: self.next_offset,
                capacity: self.capacity,
            }),
        }
    }

    /// Allocates `size` zeroed bytes aligned to `align` (a power of two).
    ///
    /// Never partially allocates: on failure the bump pointer is untouched.
    pub fn allocate(&mut self, size: usize, align: usize) -> Result<ArenaRegion, ArenaError> {
        let offset = self.bump(size, align)?;
        let data = self.storage.len();
        self.storage.resize(data + size, 0);
        Ok(ArenaRegion {
            offset,
            length: size,
            data: Some(data),
        })
    }

    /// Charges `size` bytes to the budget without storing anything, for a
    /// collection that owns typed storage of that size.
    pub fn reserve(&mut self, size: usize, align: usize) -> Result<ArenaRegion, ArenaError> {
        let offset = self.bump(size, align)?;
        Ok(ArenaRegion {
            offset,
            length: size,
            data: None,
        })
    }

    /// Copies `text` into the arena.
    pub fn alloc_str(&mut self, text: &str) -> Result<ArenaStr, ArenaError> {
        self.bump(text.len(), 1)?;
        let start = self.storage.len();
        self.storage.extend_from_slice(text.as_bytes());
        Ok(ArenaStr {
            offset: start as u32,
            length: text.len() as u32,
        })
    }

    /// Resolves a string previously copied with [`Arena::alloc_str`].
    pub fn str(&self, handle: ArenaStr) -> &str {
        let start = handle.offset as usize;
        let end = (start + handle.length as usize).min(self.storage.len());
        std::str::from_utf8(&self.storage[start.min(end)..end]).unwrap_or_default()
    }

    pub fn bytes(&self, region: ArenaRegion) -> Result<&[u8], ArenaError> {
        let start = self.check(region)?;
        Ok(&self.storage[start..start + region.length])
    }

    pub fn bytes_mut(&mut self, region: ArenaRegion) -> Result<&mut [u8], ArenaError> {
        let start = self.check(region)?;
        Ok(&mut self.storage[start..start + region.length])
    }

    fn check(&self, region: ArenaRegion) -> Result<usize, ArenaError> {
        match region.data {
            Some(start)
                if region.end() <= self.next_offset
                    && start + region.length <= self.storage.len() =>
            {
                Ok(start)
            }
            _ => Err(ArenaError::InvalidRegion {
                offset: region.offset,
                length: region.length,
            }),
        }
    }

    /// Freezes everything allocated so far as persistent. Called exactly once.
    pub fn mark_persistent_boundary(&mut self) -> Result<(), ArenaError> {
        if self.boundary_marked {
            return Err(ArenaError::BoundaryAlreadyMarked(self.persistent_boundary));
        }
        self.persistent_boundary = self.next_offset;
        self.storage_boundary = self.storage.len();
        self.boundary_marked = true;
        Ok(())
    }

    /// Discards all ephemeral allocations in O(1). Stored bytes are not cleared,
    /// only forgotten.
    #[inline]
    pub fn reset_ephemeral(&mut self) {
        self.next_offset = self.persistent_boundary;
        self.storage.truncate(self.storage_boundary);
    }
}
