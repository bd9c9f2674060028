use std::collections::{HashMap, VecDeque};

/// Recency order of cached query strings
#[derive(Debug, Default)]
pub struct LruList {
    /// Least recently used at front
    order: VecDeque<String>,
    /// Position of each key in `order`
    positions: HashMap<String, usize>,
}

impl LruList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as most recently used, inserting it if absent
    pub fn touch(&mut self, key: &str) {
        if let Some(idx) = self.positions.remove(key) {
            self.order.remove(idx);
            self.update_indices(idx);
        }
        self.order.push_back(key.to_string());
        self.positions.insert(key.to_string(), self.order.len() - 1);
    }

    /// Remove and return the least recently used key
    pub fn evict(&mut self) -> Option<String> {
        let key = self.order.pop_front()?;
        self.positions.remove(&key);
        self.update_indices(0);
        Some(key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        match self.positions.remove(key) {
            Some(idx) => {
                self.order.remove(idx);
                self.update_indices(idx);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.positions.clear();
    }

    fn update_indices(&mut self, from: usize) {
        for (idx, key) in self.order.iter().enumerate().skip(from) {
            if let Some(position) = self.positions.get_mut(key) {
                *position = idx;
            }
        }
    }
}
