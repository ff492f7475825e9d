//! Chart slots with dispose-before-replace semantics.

use std::collections::BTreeMap;

use tracing::debug;

use super::aggregate::{ChartData, ChartId, ChartScope};
use crate::data::{Record, RecordKey, RecordKind, RecordStore};

/// A live chart instance occupying one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartHandle {
    pub id: ChartId,
    /// Increases every time any slot is (re)filled.
    pub generation: u64,
    pub data: ChartData,
}

/// Chart instances keyed by slot. At most one handle per slot.
#[derive(Debug, Clone, Default)]
pub struct ChartBoard {
    slots: BTreeMap<ChartId, ChartHandle>,
    next_generation: u64,
    disposed: u64,
}

impl ChartBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the chart in `id`'s slot, disposing the previous instance.
    pub fn install(&mut self, id: ChartId, data: ChartData) -> &ChartHandle {
        if let Some(old) = self.slots.remove(&id) {
            self.disposed += 1;
            debug!(
                "Disposed chart {:?} (generation {}, {} disposed so far)",
                old.id, old.generation, self.disposed
            );
        }

        self.next_generation += 1;
        let handle = ChartHandle {
            id,
            generation: self.next_generation,
            data,
        };
        self.slots.entry(id).or_insert(handle)
    }

    /// Recompute every chart of `kind` whose scope is `scope` from `keys`.
    ///
    /// Empty data is still installed so a stale chart never outlives a
    /// filter that leaves nothing to show.
    pub fn refresh(&mut self, kind: RecordKind, scope: ChartScope, store: &RecordStore, keys: &[RecordKey]) {
        let specs: Vec<_> = kind.charts().iter().filter(|c| c.scope == scope).collect();
        if specs.is_empty() {
            return;
        }

        let records: Vec<&Record> = store.resolve(keys).collect();
        for spec in specs {
            self.install(spec.id, spec.id.compute(&records));
        }
    }

    pub fn get(&self, id: ChartId) -> Option<&ChartHandle> {
        self.slots.get(&id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Instances disposed so far.
    #[cfg(test)]
    pub fn disposed_count(&self) -> u64 {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::synthetic_tracks;

    #[test]
    fn test_install_replaces_existing() {
        let mut board = ChartBoard::new();
        board.install(ChartId::TopGenres, ChartData::Ranking(vec![]));
        let second = board.install(ChartId::TopGenres, ChartData::Ranking(vec![])).generation;

        assert_eq!(board.len(), 1);
        assert_eq!(board.disposed_count(), 1);
        assert_eq!(board.get(ChartId::TopGenres).map(|h| h.generation), Some(second));
    }

    #[test]
    fn test_refresh_filtered_scope() {
        let store = synthetic_tracks(20);
        let mut board = ChartBoard::new();

        board.refresh(RecordKind::Tracks, ChartScope::Snapshot, &store, &store.keys());
        assert_eq!(board.len(), 0);

        board.refresh(RecordKind::Tracks, ChartScope::Filtered, &store, &store.keys());
        assert_eq!(board.len(), 4);

        board.refresh(RecordKind::Tracks, ChartScope::Filtered, &store, &[]);
        assert_eq!(board.len(), 4);
        assert_eq!(board.disposed_count(), 4);
        assert!(board
            .get(ChartId::EnergyValence)
            .is_some_and(|h| h.data.is_empty()));
    }
}
