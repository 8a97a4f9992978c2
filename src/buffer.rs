//! Fixed-capacity circular buffer used as the prefetch queue.

use crate::error::Error;

/// A bounded ring of pending items.
///
/// `read_index` and `write_index` only ever grow; occupancy is their
/// difference and storage is addressed modulo the capacity.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    read_index: u64,
    write_index: u64,
}

impl<T> RingBuffer<T> {
    /// Construct an empty buffer holding at most `capacity` items.
    ///
    /// # Errors
    /// Returns [`Error::EmptyQueue`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::EmptyQueue);
        }
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Ok(Self {
            slots,
            read_index: 0,
            write_index: 0,
        })
    }

    /// Construct a full buffer from a list, sized to the list.
    ///
    /// # Errors
    /// Returns [`Error::EmptyQueue`] if `items` is empty.
    pub fn from_vec(items: Vec<T>) -> Result<Self, Error> {
        let mut buf = Self::new(items.len())?;
        for item in items {
            buf.write(item);
        }
        Ok(buf)
    }

    /// Append `item`. Returns `false` and leaves the buffer untouched when full.
    pub fn write(&mut self, item: T) -> bool {
        if self.is_full() {
            return false;
        }
        let slot = self.slot(self.write_index);
        self.slots[slot] = Some(item);
        self.write_index = self.write_index.wrapping_add(1);
        true
    }

    /// Take the oldest item, or `None` when empty.
    pub fn read(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let slot = self.slot(self.read_index);
        self.read_index = self.read_index.wrapping_add(1);
        self.slots[slot].take()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of items waiting to be read.
    #[must_use]
    pub fn len(&self) -> usize {
        self.write_index.wrapping_sub(self.read_index) as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Pending items, oldest first, without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len() as u64)
            .map(move |offset| self.slot(self.read_index.wrapping_add(offset)))
            .filter_map(move |slot| self.slots[slot].as_ref())
    }

    fn slot(&self, index: u64) -> usize {
        (index % self.slots.len() as u64) as usize
    }
}
