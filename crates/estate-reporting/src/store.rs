//! Bounded, insertion-ordered record store

use estate_core::ErrorRecord;
use indexmap::IndexMap;

/// Id → record map that evicts its oldest entry once `capacity` is exceeded.
///
/// Re-inserting an existing id replaces the record and moves it to the
/// newest position.
#[derive(Debug)]
pub struct RecordStore {
    records: IndexMap<String, ErrorRecord>,
    capacity: usize,
}

impl RecordStore {
    /// Create a store holding at most `capacity` records (minimum one).
    pub fn new(capacity: usize) -> Self {
        Self {
            records: IndexMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Insert `record`, returning any record evicted to make room.
    pub fn insert(&mut self, record: ErrorRecord) -> Option<ErrorRecord> {
        self.records.shift_remove(&record.id);
        self.records.insert(record.id.clone(), record);
        if self.records.len() > self.capacity {
            self.records.shift_remove_index(0).map(|(_, evicted)| evicted)
        } else {
            None
        }
    }

    /// Look up a record by id.
    pub fn get(&self, id: &str) -> Option<&ErrorRecord> {
        self.records.get(id)
    }

    /// Up to `limit` records, newest first.
    pub fn recent(&self, limit: usize) -> Vec<ErrorRecord> {
        self.records.values().rev().take(limit).cloned().collect()
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_core::ErrorCategory;
    use estate_testkit::record;

    #[test]
    fn test_evicts_oldest() {
        let mut store = RecordStore::new(2);
        assert!(store.insert(record("a", ErrorCategory::Ui)).is_none());
        assert!(store.insert(record("b", ErrorCategory::Ui)).is_none());
        let evicted = store.insert(record("c", ErrorCategory::Ui)).unwrap();
        assert_eq!(evicted.id, "a");
        assert!(store.get("a").is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_reinsert_refreshes_position() {
        let mut store = RecordStore::new(2);
        store.insert(record("a", ErrorCategory::Ui));
        store.insert(record("b", ErrorCategory::Ui));
        store.insert(record("a", ErrorCategory::Ui));
        let evicted = store.insert(record("c", ErrorCategory::Ui)).unwrap();
        assert_eq!(evicted.id, "b");
    }

    #[test]
    fn test_recent_is_newest_first() {
        let mut store = RecordStore::new(10);
        for id in ["a", "b", "c"] {
            store.insert(record(id, ErrorCategory::Network));
        }
        let ids: Vec<_> = store.recent(2).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut store = RecordStore::new(0);
        store.insert(record("a", ErrorCategory::Ui));
        assert_eq!(store.len(), 1);
    }
}
