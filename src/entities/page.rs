use serde::{Deserialize, Serialize};

use super::Resource;

/// One page of a server-ordered collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub skip: u64,
    pub limit: u64,
    pub total: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skip: 0,
            limit: 0,
            total: 0,
        }
    }
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, skip: u64, limit: u64, total: u64) -> Self {
        Self {
            items,
            skip,
            limit,
            total,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<R: Resource> Page<R> {
    pub fn get(&self, id: &str) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut R> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    /// Overwrites the entry sharing `item`'s id. Returns false when absent.
    pub fn replace(&mut self, item: &R) -> bool {
        match self.get_mut(item.id()) {
            Some(slot) => {
                *slot = item.clone();
                true
            }
            None => false,
        }
    }

    pub fn prepend(&mut self, item: R) {
        self.items.insert(0, item);
        self.total += 1;
    }

    pub fn remove(&mut self, id: &str) -> Option<R> {
        let pos = self.items.iter().position(|item| item.id() == id)?;
        self.total = self.total.saturating_sub(1);
        Some(self.items.remove(pos))
    }
}
