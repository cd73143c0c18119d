use std::collections::VecDeque;

use shared::domain::Suggestion;

pub const DEFAULT_CACHE_CAPACITY: usize = 10;

/// Key for a cached lookup: the trimmed query, namespaced by the
/// auxiliary country filter when one is set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(query: &str, country: Option<&str>) -> Self {
        match country {
            Some(country) => Self(format!("{}:{}", country.to_ascii_uppercase(), query)),
            None => Self(query.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Last successful results per key, owned by one type-ahead field.
///
/// Eviction is by insertion order: once more than `capacity` distinct
/// keys are stored the oldest insert goes, and reads never reorder.
#[derive(Debug, Clone)]
pub struct RecentResults {
    capacity: usize,
    entries: VecDeque<(CacheKey, Vec<Suggestion>)>,
}

impl Default for RecentResults {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl RecentResults {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::with_capacity(capacity.max(1) + 1),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<&[Suggestion]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, items)| items.as_slice())
    }

    /// Stores `items` under `key`. An existing key is overwritten in
    /// place and keeps its original position.
    pub fn insert(&mut self, key: CacheKey, items: Vec<Suggestion>) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = items;
            return;
        }
        self.entries.push_back((key, items));
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
