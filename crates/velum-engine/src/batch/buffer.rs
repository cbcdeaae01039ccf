use std::ops::Range;

use super::{BatchItem, BufferFull};

/// Fixed-capacity slot array for one item kind.
///
/// Invariants:
/// - The slot array is allocated once and reused; `clear` never reallocates.
/// - Occupied slots form a prefix in insertion order. `len()` is its length.
/// - A slot is free exactly when it holds the empty sentinel.
#[derive(Debug)]
pub struct BatchBuffer<T: BatchItem> {
    slots: Box<[T]>,
    len: usize,
}

impl<T: BatchItem> BatchBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            log::warn!("batch buffer capacity 0 is not usable; using 1");
            1
        } else {
            capacity
        };

        Self {
            slots: vec![T::default(); capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Stores `item` in the next free slot and returns its index.
    ///
    /// Empty items are ignored and report the index they would have taken.
    /// Fails with [`BufferFull`] when no slot is left; the caller flushes and
    /// retries.
    pub fn add(&mut self, item: T) -> Result<usize, BufferFull> {
        if self.len == self.slots.len() {
            return Err(BufferFull { capacity: self.slots.len() });
        }

        let index = self.len;
        if item.is_empty() {
            return Ok(index);
        }

        self.slots[index] = item;
        self.len += 1;
        Ok(index)
    }

    /// Resets every slot to the empty sentinel.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.empty();
        }
        self.len = 0;
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// True when there is anything to flush.
    #[inline]
    pub fn has_work(&self) -> bool {
        self.len > 0
    }

    /// Occupied items in insertion order.
    #[inline]
    pub fn items(&self) -> &[T] {
        &self.slots[..self.len]
    }

    /// Every slot, including free ones.
    #[inline]
    pub fn slots(&self) -> &[T] {
        &self.slots
    }

    /// Consecutive runs of items sharing a texture id, as instance ranges.
    pub fn texture_runs(&self) -> TextureRuns<'_, T> {
        TextureRuns { items: self.items(), start: 0 }
    }

    /// GPU instances of the occupied items, in order.
    pub fn instances(&self) -> Vec<T::Instance> {
        self.items().iter().map(BatchItem::to_instance).collect()
    }
}

/// Iterator returned by [`BatchBuffer::texture_runs`].
#[derive(Debug, Clone)]
pub struct TextureRuns<'a, T> {
    items: &'a [T],
    start: usize,
}

impl<T: BatchItem> Iterator for TextureRuns<'_, T> {
    type Item = (u32, Range<u32>);

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.items.get(self.start)?;
        let id = first.texture_id();

        let run_len = self.items[self.start..]
            .iter()
            .take_while(|item| item.texture_id() == id)
            .count();

        let range = self.start as u32..(self.start + run_len) as u32;
        self.start += run_len;
        Some((id, range))
    }
}
