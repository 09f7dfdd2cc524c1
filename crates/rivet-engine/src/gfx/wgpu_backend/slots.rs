/// Index-addressed storage with slot reuse.
///
/// Backend handles are indices into one of these. Recorded draws hold clones
/// of the wgpu objects they use, so a slot may be reused as soon as it is
/// freed without invalidating work already submitted this frame.
#[derive(Debug)]
pub(super) struct Slots<T> {
    entries: Vec<Option<T>>,
    free: Vec<u32>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self { entries: Vec::new(), free: Vec::new() }
    }
}

impl<T> Slots<T> {
    pub fn insert(&mut self, value: T) -> u32 {
        if let Some(idx) = self.free.pop() {
            self.entries[idx as usize] = Some(value);
            return idx;
        }
        self.entries.push(Some(value));
        (self.entries.len() - 1) as u32
    }

    pub fn get(&self, idx: u32) -> Option<&T> {
        self.entries.get(idx as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, idx: u32) -> Option<&mut T> {
        self.entries.get_mut(idx as usize).and_then(Option::as_mut)
    }

    pub fn remove(&mut self, idx: u32) -> Option<T> {
        let value = self.entries.get_mut(idx as usize)?.take();
        if value.is_some() {
            self.free.push(idx);
        }
        value
    }

    pub fn len(&self) -> usize {
        self.entries.len() - self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freed_slot_is_reused() {
        let mut s = Slots::default();
        let a = s.insert("a");
        let b = s.insert("b");
        assert_eq!(s.remove(a), Some("a"));
        assert_eq!(s.insert("c"), a);
        assert_eq!(s.get(b), Some(&"b"));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn double_remove_does_not_corrupt_free_list() {
        let mut s = Slots::default();
        let a = s.insert(1);
        assert_eq!(s.remove(a), Some(1));
        assert_eq!(s.remove(a), None);
        let b = s.insert(2);
        let c = s.insert(3);
        assert_ne!(b, c);
    }
}
