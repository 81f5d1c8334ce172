//! Fixed-capacity collections used for every piece of per-frame layout state.
//!
//! A [`BoundedArray`] never grows past the capacity it was created with.
//! Storage for the whole capacity exists up front, so reads between the live
//! length and the capacity are defined and return whatever the slot holds
//! (the default value until something was written there).

use std::ops::{Index, IndexMut};

use crate::arena::{Arena, ArenaRegion, CACHE_LINE};
use crate::errors::{ArenaError, ArrayError};

/// A non-owning `(start, length)` window into a [`BoundedArray`].
///
/// Views are resolved through their owner with [`BoundedArray::slice`], so a
/// write through the owner is visible through every view and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArrayView {
    pub start: usize,
    pub length: usize,
}

impl ArrayView {
    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Index into the owner for the `i`th item of this view.
    #[inline]
    pub fn at(&self, i: usize) -> usize {
        self.start + i
    }
}

#[derive(Debug, Clone)]
pub struct BoundedArray<T> {
    items: Vec<T>,
    length: usize,
}

impl<T: Clone + Default> BoundedArray<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: vec![T::default(); capacity],
            length: 0,
        }
    }

    /// Creates the array and reserves its full footprint in `arena`'s budget.
    /// The items themselves live in the array.
    pub fn reserve_in(arena: &mut Arena, capacity: usize) -> Result<Self, ArenaError> {
        Self::charge(arena, capacity)?;
        Ok(Self::new(capacity))
    }

    /// Bytes a collection of `capacity` items occupies in the arena, padding included.
    pub fn footprint(capacity: usize) -> usize {
        capacity * std::mem::size_of::<T>() + CACHE_LINE
    }

    /// Reserves an existing array's footprint again after an ephemeral reset.
    pub fn recharge(&self, arena: &mut Arena) -> Result<ArenaRegion, ArenaError> {
        Self::charge(arena, self.capacity())
    }

    fn charge(arena: &mut Arena, capacity: usize) -> Result<ArenaRegion, ArenaError> {
        arena.reserve(capacity * std::mem::size_of::<T>(), CACHE_LINE)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.length == self.items.len()
    }

    /// Appends `item` and returns its index, or `None` when the array is full.
    #[inline]
    pub fn add(&mut self, item: T) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let index = self.length;
        self.items[index] = item;
        self.length += 1;
        Some(index)
    }

    /// Like [`BoundedArray::add`], for callers that want a typed error.
    pub fn try_add(&mut self, item: T) -> Result<usize, ArrayError> {
        self.add(item).ok_or(ArrayError::Full(self.capacity()))
    }

    pub fn get(&self, index: usize) -> Result<&T, ArrayError> {
        self.items.get(index).ok_or(ArrayError::OutOfRange {
            index,
            limit: self.capacity(),
        })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, ArrayError> {
        let limit = self.capacity();
        self.items
            .get_mut(index)
            .ok_or(ArrayError::OutOfRange { index, limit })
    }

    /// Copy of the slot at `index`, or the default value outside capacity.
    pub fn get_value(&self, index: usize) -> T {
        self.items.get(index).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, index: usize, value: T) -> Result<(), ArrayError> {
        *self.get_mut(index)? = value;
        Ok(())
    }

    /// Removes the item at `index` by moving the last live item into its slot.
    ///
    /// Iteration order changes: a caller walking forward must revisit `index`.
    pub fn swap_remove(&mut self, index: usize) -> Result<T, ArrayError> {
        if index >= self.length {
            return Err(ArrayError::OutOfRange {
                index,
                limit: self.length,
            });
        }
        self.length -= 1;
        let removed = self.items[index].clone();
        self.items[index] = self.items[self.length].clone();
        Ok(removed)
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.length == 0 {
            return None;
        }
        self.length -= 1;
        Some(self.items[self.length].clone())
    }

    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.as_slice().last()
    }

    #[inline]
    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Forgets every item in O(1). Slot contents are left as they were.
    #[inline]
    pub fn reset(&mut self) {
        self.length = 0;
    }

    /// Sets every slot back to the default value, for arrays where a stale
    /// slot could be mistaken for a live one (hash buckets).
    pub fn reset_zeroed(&mut self) {
        self.items.fill(T::default());
        self.length = 0;
    }

    pub fn truncate(&mut self, length: usize) {
        self.length = self.length.min(length);
    }

    /// Marks `count` more slots as live without writing them. Returns false
    /// (and changes nothing) if that would pass the capacity.
    pub fn extend_default(&mut self, count: usize) -> bool {
        if self.length + count > self.capacity() {
            return false;
        }
        self.length += count;
        true
    }

    /// A view of `length` live items starting at `start`.
    pub fn view(&self, start: usize, length: usize) -> Result<ArrayView, ArrayError> {
        if start + length > self.length {
            return Err(ArrayError::OutOfRange {
                index: start + length,
                limit: self.length,
            });
        }
        Ok(ArrayView { start, length })
    }

    /// Items covered by `view`, clamped to the capacity.
    pub fn slice(&self, view: ArrayView) -> &[T] {
        let start = view.start.min(self.capacity());
        let end = (view.start + view.length).min(self.capacity());
        &self.items[start..end]
    }

    pub fn slice_mut(&mut self, view: ArrayView) -> &mut [T] {
        let start = view.start.min(self.capacity());
        let end = (view.start + view.length).min(self.capacity());
        &mut self.items[start..end]
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items[..self.length]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items[..self.length]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T> Index<usize> for BoundedArray<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> IndexMut<usize> for BoundedArray<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.items[index]
    }
}

impl<'a, T: Clone + Default> IntoIterator for &'a BoundedArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_until_full() {
        let mut array = BoundedArray::<u32>::new(2);
        assert_eq!(array.add(7), Some(0));
        assert_eq!(array.add(8), Some(1));
        assert_eq!(array.add(9), None);
        assert_eq!(array.try_add(9), Err(ArrayError::Full(2)));
        assert_eq!(array.as_slice(), &[7, 8]);
    }

    #[test]
    fn get_between_length_and_capacity_is_defined() {
        let mut array = BoundedArray::<i32>::new(4);
        array.add(5);
        assert_eq!(array.get(0), Ok(&5));
        assert_eq!(array.get(3), Ok(&0));
        assert_eq!(
            array.get(4),
            Err(ArrayError::OutOfRange { index: 4, limit: 4 })
        );
        assert_eq!(array.get_value(99), 0);
        assert!(array.set(3, 11).is_ok());
        assert!(array.set(4, 11).is_err());
    }

    #[test]
    fn swap_remove_moves_last_item() {
        let mut array = BoundedArray::<char>::new(8);
        for c in ['a', 'b', 'c', 'd'] {
            array.add(c);
        }
        assert_eq!(array.swap_remove(1), Ok('b'));
        assert_eq!(array.as_slice(), &['a', 'd', 'c']);
        assert!(array.swap_remove(3).is_err());

        // removing while iterating requires revisiting the cursor
        let mut i = 0;
        while i < array.len() {
            if array[i] != 'c' {
                array.swap_remove(i).unwrap();
                continue;
            }
            i += 1;
        }
        assert_eq!(array.as_slice(), &['c']);
    }

    #[test]
    fn reset_keeps_contents_unless_zeroed() {
        let mut array = BoundedArray::<Option<u32>>::new(3);
        array.add(Some(1));
        array.reset();
        assert!(array.is_empty());
        assert_eq!(array.get_value(0), Some(1));
        array.reset_zeroed();
        assert_eq!(array.get_value(0), None);
    }

    #[test]
    fn views_alias_owner_storage() {
        let mut array = BoundedArray::<u16>::new(6);
        for n in 0..5 {
            array.add(n);
        }
        let view = array.view(1, 3).unwrap();
        array.slice_mut(view)[0] = 100;
        assert_eq!(array[1], 100);
        array[3] = 300;
        assert_eq!(array.slice(view), &[100, 2, 300]);
        assert!(array.view(4, 2).is_err());
    }

    #[test]
    fn reservations_are_charged_to_the_arena() {
        let mut arena = Arena::with_capacity(4096);
        let array = BoundedArray::<u64>::reserve_in(&mut arena, 100).unwrap();
        assert_eq!(arena.next_offset(), 800);
        array.recharge(&mut arena).unwrap();
        assert_eq!(arena.next_offset(), 832 + 800);
        assert!(BoundedArray::<u64>::reserve_in(&mut arena, 1000).is_err());
        // the items live in the array, not in arena storage
        assert_eq!(arena.stored(), 0);
    }
}
