use std::collections::VecDeque;

/// Handle-indexed arena.
///
/// Handles are issued in increasing order starting at 1 and never reused.
/// Slots live in a dense ring indexed by `handle - first`; released slots at
/// the front are reclaimed, so storage follows the window between the oldest
/// live handle and the newest one. Insert, lookup and release are O(1)
/// (amortized for release).
#[derive(Debug)]
pub struct ResourceTable<T> {
    /// Handle stored in `slots[0]`.
    first: u64,
    slots: VecDeque<Option<T>>,
    live: usize,
}

impl<T> Default for ResourceTable<T> {
    fn default() -> Self {
        Self {
            first: 1,
            slots: VecDeque::new(),
            live: 0,
        }
    }
}

impl<T> ResourceTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under a fresh handle.
    pub fn insert(&mut self, value: T) -> u64 {
        let handle = self.next_handle();
        self.slots.push_back(Some(value));
        self.live += 1;
        handle
    }

    /// The handle the next [`insert`](Self::insert) will return.
    #[inline]
    pub fn next_handle(&self) -> u64 {
        self.first + self.slots.len() as u64
    }

    pub fn get(&self, handle: u64) -> Option<&T> {
        let idx = self.index(handle)?;
        self.slots.get(idx)?.as_ref()
    }

    pub fn contains(&self, handle: u64) -> bool {
        self.get(handle).is_some()
    }

    /// Removes and returns the entry. Unknown or already released handles
    /// return `None`.
    pub fn remove(&mut self, handle: u64) -> Option<T> {
        let idx = self.index(handle)?;
        let value = self.slots.get_mut(idx)?.take()?;
        self.live -= 1;

        while matches!(self.slots.front(), Some(None)) {
            self.slots.pop_front();
            self.first += 1;
        }
        Some(value)
    }

    /// Removes every entry in handle order. Later inserts keep counting up.
    pub fn drain(&mut self) -> Vec<(u64, T)> {
        let first = self.first;
        self.first = self.next_handle();
        self.live = 0;
        std::mem::take(&mut self.slots)
            .into_iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|v| (first + i as u64, v)))
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn index(&self, handle: u64) -> Option<usize> {
        handle.checked_sub(self.first).map(|i| i as usize)
    }
}
