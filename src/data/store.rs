//! Immutable record snapshot.

use super::models::{Field, Record, RecordKey, RecordKind};

/// The full set of records loaded at start. Never mutated after load.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordStore {
    kind: RecordKind,
    records: Vec<Record>,
}

impl RecordStore {
    /// Build a store. Record keys must equal their positions.
    pub fn new(kind: RecordKind, records: Vec<Record>) -> Self {
        debug_assert!(records.iter().enumerate().all(|(i, r)| r.key == RecordKey(i)));
        Self { kind, records }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn get(&self, key: RecordKey) -> Option<&Record> {
        self.records.get(key.0)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every key, in snapshot order.
    pub fn keys(&self) -> Vec<RecordKey> {
        (0..self.records.len()).map(RecordKey).collect()
    }

    /// Resolve keys to records, skipping unknown keys.
    pub fn resolve<'a>(&'a self, keys: &'a [RecordKey]) -> impl Iterator<Item = &'a Record> + 'a {
        keys.iter().filter_map(move |key| self.get(*key))
    }

    /// Largest value of a numeric field (malformed as 0).
    pub fn max_number(&self, field: Field) -> f64 {
        self.records
            .iter()
            .map(|r| r.number_or_zero(field))
            .fold(0.0, f64::max)
    }
}
