//! Identity hash table mapping element ids to their per-frame layout records.
//!
//! The table lives in persistent memory and survives frames. Each entry
//! carries the generation it was last declared in, plus one: a declaration
//! that finds an entry at or below the current generation is the same
//! element coming back in a new frame, while one that finds an entry above
//! it is a second element claiming an id already taken this frame.

use crate::arena::Arena;
use crate::array::BoundedArray;
use crate::errors::{ArenaError, ErrorType};
use crate::id::Id;
use crate::math::BoundingBox;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct ElementMapItem {
    pub bounding_box: BoundingBox,
    pub element_id: Id,
    pub element_index: usize,
    pub generation: u32,
    pub collision: bool,
    pub next: Option<u32>,
}

pub(crate) struct ElementMap {
    buckets: BoundedArray<Option<u32>>,
    items: BoundedArray<ElementMapItem>,
}

impl ElementMap {
    /// Sized for `capacity` elements per frame. Entries from the previous
    /// frame stay until the next prune, so there is room for twice that.
    pub fn new(capacity: usize) -> Self {
        let bucket_count = capacity.max(1);
        let mut buckets = BoundedArray::new(bucket_count);
        buckets.extend_default(bucket_count);
        Self {
            buckets,
            items: BoundedArray::new(capacity * 2),
        }
    }

    pub fn footprint(capacity: usize) -> usize {
        BoundedArray::<Option<u32>>::footprint(capacity.max(1))
            + BoundedArray::<ElementMapItem>::footprint(capacity * 2)
    }

    pub fn recharge(&self, arena: &mut Arena) -> Result<(), ArenaError> {
        self.buckets.recharge(arena)?;
        self.items.recharge(arena)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    fn bucket_of(&self, id: u32) -> usize {
        id as usize % self.buckets.capacity()
    }

    fn find(&self, id: u32) -> Option<u32> {
        let mut cursor = self.buckets.get_value(self.bucket_of(id));
        while let Some(index) = cursor {
            let item = &self.items[index as usize];
            if item.element_id.id == id {
                return Some(index);
            }
            cursor = item.next;
        }
        None
    }

    /// Registers `element_id` for `element_index` in the frame `generation`.
    ///
    /// Fails with [`ErrorType::DuplicateId`] when another element already
    /// claimed the id this frame (the entry is flagged as colliding), and with
    /// [`ErrorType::ElementsCapacityExceeded`] when the table is full.
    pub fn insert(
        &mut self,
        element_id: Id,
        element_index: usize,
        generation: u32,
    ) -> Result<u32, ErrorType> {
        if let Some(index) = self.find(element_id.id) {
            let item = &mut self.items[index as usize];
            if item.generation <= generation {
                item.element_id = element_id;
                item.element_index = element_index;
                item.generation = generation + 1;
                item.collision = false;
                return Ok(index);
            }
            item.collision = true;
            return Err(ErrorType::DuplicateId);
        }

        let bucket = self.bucket_of(element_id.id);
        let head = self.buckets.get_value(bucket);
        let index = self
            .items
            .add(ElementMapItem {
                element_id,
                element_index,
                generation: generation + 1,
                next: head,
                ..Default::default()
            })
            .ok_or(ErrorType::ElementsCapacityExceeded)? as u32;
        self.buckets[bucket] = Some(index);
        Ok(index)
    }

    /// Entry for `id` if it was declared in frame `generation`.
    pub fn get(&self, id: u32, generation: u32) -> Option<&ElementMapItem> {
        let index = self.find(id)?;
        let item = &self.items[index as usize];
        (item.generation == generation + 1).then_some(item)
    }

    pub fn get_mut(&mut self, id: u32, generation: u32) -> Option<&mut ElementMapItem> {
        let index = self.find(id)?;
        let item = &mut self.items[index as usize];
        (item.generation == generation + 1).then_some(item)
    }

    /// Rebuilds the table keeping only entries declared in frame `generation`,
    /// so ids that stopped appearing do not fill it up over time.
    pub fn retain_declared_in(&mut self, generation: u32) -> usize {
        let before = self.items.len();
        let mut kept = 0;
        for i in 0..before {
            let item = self.items[i];
            if item.generation == generation + 1 {
                self.items[kept] = item;
                kept += 1;
            }
        }
        self.items.truncate(kept);

        self.buckets.reset_zeroed();
        self.buckets.extend_default(self.buckets.capacity());
        for i in 0..kept {
            let bucket = self.bucket_of(self.items[i].element_id.id);
            self.items[i].next = self.buckets[bucket];
            self.buckets[bucket] = Some(i as u32);
        }
        before - kept
    }
}
