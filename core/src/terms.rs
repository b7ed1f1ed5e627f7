//! Canonical term storage.
//!
//! Each distinct term string lives exactly once in a [`TermStore`] slot. The
//! inverted index and the per-document frequency tables refer to terms by
//! [`TermId`] only. Released slots go on a free list and are handed out again by
//! the next [`TermStore::intern`].

use std::collections::HashMap;
use std::sync::Arc;

pub type TermId = u32;

#[derive(Debug, Default)]
pub struct TermStore {
    slots: Vec<Option<Arc<str>>>,
    dictionary: HashMap<Arc<str>, TermId>,
    free: Vec<TermId>,
}

impl TermStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `term`, inserting an owned copy if it is new.
    pub fn intern(&mut self, term: &str) -> TermId {
        if let Some(&id) = self.dictionary.get(term) {
            return id;
        }
        let owned: Arc<str> = Arc::from(term);
        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id as usize] = Some(owned.clone());
                id
            }
            None => {
                self.slots.push(Some(owned.clone()));
                (self.slots.len() - 1) as TermId
            }
        };
        self.dictionary.insert(owned, id);
        id
    }

    pub fn get(&self, term: &str) -> Option<TermId> {
        self.dictionary.get(term).copied()
    }

    pub fn resolve(&self, id: TermId) -> Option<&str> {
        self.slots.get(id as usize).and_then(|s| s.as_deref())
    }

    /// Drop the owned string behind `id`. The caller guarantees nothing refers to it.
    pub fn release(&mut self, id: TermId) {
        if let Some(slot) = self.slots.get_mut(id as usize) {
            if let Some(term) = slot.take() {
                self.dictionary.remove(&term);
                self.free.push(id);
            }
        }
    }

    /// Number of live terms.
    pub fn len(&self) -> usize {
        self.dictionary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dictionary.is_empty()
    }

    /// Upper bound on term ids handed out so far.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_reuses_existing_copy() {
        let mut store = TermStore::new();
        let a = store.intern("cat");
        let b = store.intern("dog");
        assert_ne!(a, b);
        assert_eq!(store.intern("cat"), a);
        assert_eq!(store.len(), 2);
        assert_eq!(store.resolve(b), Some("dog"));
    }

    #[test]
    fn released_slot_is_recycled() {
        let mut store = TermStore::new();
        let a = store.intern("cat");
        store.intern("dog");
        store.release(a);
        assert_eq!(store.get("cat"), None);
        assert_eq!(store.resolve(a), None);
        assert_eq!(store.len(), 1);

        let c = store.intern("rat");
        assert_eq!(c, a);
        assert_eq!(store.capacity(), 2);
    }

    #[test]
    fn release_twice_is_harmless() {
        let mut store = TermStore::new();
        let a = store.intern("cat");
        store.release(a);
        store.release(a);
        assert!(store.is_empty());
        let b = store.intern("x");
        let c = store.intern("y");
        assert_ne!(b, c);
    }
}
