//! View controller: owns the view state and recomputes
//! filter -> sort -> paginate on every state change.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::aggregate::ChartScope;
use super::charts::ChartBoard;
use super::filter::{self, FilterCriteria};
use super::paginate::{self, PageLink, PageSize};
use super::sort::{self, SortSpec};
use crate::data::{DetailPayload, DetailRegistry, Field, RecordKey, RecordKind, RecordStore, Snapshot};

/// Everything that determines the rendered view, besides the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub criteria: FilterCriteria,
    pub sort: SortSpec,
    pub page_size: PageSize,
    pub page_number: usize,
}

impl ViewState {
    pub fn new(kind: RecordKind, page_size: PageSize) -> Self {
        Self {
            criteria: FilterCriteria::default(),
            sort: SortSpec::default_for(kind),
            page_size,
            page_number: 1,
        }
    }
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Position on the current page, from 0. Identifies the row's detail slot.
    pub slot: usize,
    /// Display number, counted from the page start.
    pub number: usize,
    pub key: RecordKey,
    pub cells: Vec<String>,
    /// Copied verbatim from the detail registry.
    pub detail: Option<DetailPayload>,
}

/// The current page, fully replaced on every recompute.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableView {
    pub rows: Vec<TableRow>,
    pub status: String,
    pub page_number: usize,
    pub total_pages: usize,
    /// `None` when the pagination control is omitted.
    pub links: Option<Vec<PageLink>>,
    pub filtered_count: usize,
    pub total_count: usize,
}

pub struct ViewController {
    store: RecordStore,
    details: DetailRegistry,
    state: ViewState,
    filtered: Vec<RecordKey>,
    ordered: Vec<RecordKey>,
    view: TableView,
    expanded: BTreeSet<usize>,
    raw_expanded: BTreeSet<usize>,
    charts: ChartBoard,
}

impl ViewController {
    pub fn new(snapshot: Snapshot, page_size: PageSize) -> Self {
        let Snapshot { store, details, .. } = snapshot;
        let kind = store.kind();

        let mut controller = Self {
            state: ViewState::new(kind, page_size),
            store,
            details,
            filtered: Vec::new(),
            ordered: Vec::new(),
            view: TableView::default(),
            expanded: BTreeSet::new(),
            raw_expanded: BTreeSet::new(),
            charts: ChartBoard::new(),
        };

        // Snapshot-wide charts never change after load
        let all = controller.store.keys();
        controller
            .charts
            .refresh(kind, ChartScope::Snapshot, &controller.store, &all);

        controller.recompute_all();
        controller
    }

    pub fn kind(&self) -> RecordKind {
        self.store.kind()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn view(&self) -> &TableView {
        &self.view
    }

    pub fn charts(&self) -> &ChartBoard {
        &self.charts
    }

    /// Filtered keys, in snapshot order.
    pub fn filtered_keys(&self) -> &[RecordKey] {
        &self.filtered
    }

    /// Filtered keys in sort order.
    pub fn ordered_keys(&self) -> &[RecordKey] {
        &self.ordered
    }

    pub fn on_filter_changed(&mut self, criteria: FilterCriteria) {
        self.state.criteria = criteria;
        self.state.page_number = 1;
        self.recompute_all();
    }

    pub fn on_sort_requested(&mut self, column: Field) {
        self.state.sort = self.state.sort.toggle(column);
        debug!(
            "Sorting {} by {:?} {:?}",
            self.kind().noun(),
            self.state.sort.column,
            self.state.sort.direction
        );
        self.resort();
        self.render();
    }

    pub fn on_page_size_changed(&mut self, size: PageSize) {
        self.state.page_size = size;
        self.state.page_number = 1;
        self.render();
    }

    pub fn on_page_requested(&mut self, page: usize) {
        let total = paginate::total_pages(self.ordered.len(), self.state.page_size);
        self.state.page_number = paginate::clamp_page(page, total);
        self.render();
    }

    pub fn next_page(&mut self) {
        self.on_page_requested(self.state.page_number + 1);
    }

    pub fn previous_page(&mut self) {
        self.on_page_requested(self.state.page_number.saturating_sub(1));
    }

    pub fn first_page(&mut self) {
        self.on_page_requested(1);
    }

    pub fn last_page(&mut self) {
        self.on_page_requested(usize::MAX);
    }

    /// Navigate through the `index`th pagination link. Returns false for
    /// disabled links, the active page and ellipses.
    pub fn follow_link(&mut self, index: usize) -> bool {
        let target = self
            .view
            .links
            .as_ref()
            .and_then(|links| links.get(index))
            .and_then(|link| link.target(self.state.page_number));

        match target {
            Some(page) => {
                self.on_page_requested(page);
                true
            }
            None => false,
        }
    }

    /// Replace the filters with `baseline` (what the cleared controls
    /// describe) and restore the default sort.
    pub fn on_reset(&mut self, baseline: FilterCriteria) {
        self.state.criteria = baseline;
        self.state.sort = SortSpec::default_for(self.kind());
        self.state.page_number = 1;
        self.recompute_all();
    }

    /// Expand or collapse the detail panel of a row on the current page.
    /// Returns the new state; rows without a payload never expand.
    pub fn toggle_detail(&mut self, slot: usize) -> bool {
        let has_detail = self.view.rows.get(slot).is_some_and(|r| r.detail.is_some());
        if !has_detail {
            return false;
        }
        if self.expanded.remove(&slot) {
            self.raw_expanded.remove(&slot);
            false
        } else {
            self.expanded.insert(slot)
        }
    }

    /// Toggle the nested raw-data section of an expanded detail panel.
    pub fn toggle_raw(&mut self, slot: usize) -> bool {
        let has_raw = self
            .view
            .rows
            .get(slot)
            .and_then(|r| r.detail.as_ref())
            .is_some_and(|d| d.raw.is_some());
        if !has_raw || !self.expanded.contains(&slot) {
            return false;
        }
        if self.raw_expanded.remove(&slot) {
            false
        } else {
            self.raw_expanded.insert(slot)
        }
    }

    pub fn is_expanded(&self, slot: usize) -> bool {
        self.expanded.contains(&slot)
    }

    pub fn is_raw_expanded(&self, slot: usize) -> bool {
        self.raw_expanded.contains(&slot)
    }

    fn recompute_all(&mut self) {
        self.filtered = filter::apply(&self.store, &self.state.criteria);
        debug!(
            "Filter matched {} of {} {}",
            self.filtered.len(),
            self.store.len(),
            self.kind().noun()
        );
        self.resort();
        let kind = self.kind();
        self.charts
            .refresh(kind, ChartScope::Filtered, &self.store, &self.filtered);
        self.render();
    }

    fn resort(&mut self) {
        self.ordered = sort::sort(&self.store, &self.filtered, self.state.sort);
    }

    fn render(&mut self) {
        let page = paginate::paginate(&self.ordered, self.state.page_size, self.state.page_number);
        self.state.page_number = page.page_number;

        let columns = self.kind().columns();
        let rows: Vec<TableRow> = page
            .keys
            .iter()
            .enumerate()
            .filter_map(|(slot, key)| {
                let record = self.store.get(*key)?;
                Some(TableRow {
                    slot,
                    number: page.start + slot + 1,
                    key: *key,
                    cells: columns.iter().map(|c| c.format_cell(record)).collect(),
                    detail: self.details.get(*key).cloned(),
                })
            })
            .collect();

        let status = if self.store.is_empty() {
            format!(
                "No {} found. Please sync your {} data first.",
                self.kind().noun(),
                self.kind().sync_noun()
            )
        } else {
            format!(
                "Showing {} of {} {}",
                rows.len(),
                self.filtered.len(),
                self.kind().noun()
            )
        };

        self.view = TableView {
            links: paginate::page_links(page.page_number, page.total_pages, self.state.page_size),
            rows,
            status,
            page_number: page.page_number,
            total_pages: page.total_pages,
            filtered_count: self.filtered.len(),
            total_count: self.store.len(),
        };

        // Slots are per page; a new page starts collapsed
        self.expanded.clear();
        self.raw_expanded.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::detail::{DetailEntry, DetailSection};
    use crate::data::fixtures::{num, store, synthetic_tracks, text};
    use crate::view::aggregate::{ChartData, ChartId};
    use crate::view::sort::SortDirection;

    fn controller(count: usize) -> ViewController {
        let snapshot = Snapshot {
            store: synthetic_tracks(count),
            ..Snapshot::default()
        };
        ViewController::new(snapshot, PageSize::Rows(50))
    }

    fn row_keys(view: &TableView) -> Vec<RecordKey> {
        view.rows.iter().map(|r| r.key).collect()
    }

    #[test]
    fn test_first_page_and_show_all() {
        let mut vc = controller(120);
        let view = vc.view();
        assert_eq!(view.rows.len(), 50);
        assert_eq!(row_keys(view), (0..50).map(RecordKey).collect::<Vec<_>>());
        assert_eq!(view.total_pages, 3);
        assert!(view.links.is_some());

        vc.on_page_size_changed(PageSize::All);
        let view = vc.view();
        assert_eq!(view.rows.len(), 120);
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.links, None);
    }

    #[test]
    fn test_minimum_popularity_status() {
        let mut vc = controller(120);
        vc.on_filter_changed(FilterCriteria::new().with_minimum(Field::Popularity, 88.0));

        assert_eq!(vc.filtered_keys().len(), 12);
        assert_eq!(vc.view().status, "Showing 12 of 12 tracks");
        assert_eq!(vc.view().links, None);
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut vc = controller(120);
        vc.on_page_requested(3);
        assert_eq!(vc.state().page_number, 3);
        assert_eq!(vc.view().rows.len(), 20);

        vc.on_filter_changed(FilterCriteria::new().with_text("track"));
        assert_eq!(vc.state().page_number, 1);
    }

    #[test]
    fn test_page_navigation_clamps() {
        let mut vc = controller(120);
        vc.on_page_requested(42);
        assert_eq!(vc.state().page_number, 3);

        vc.next_page();
        assert_eq!(vc.state().page_number, 3);

        vc.first_page();
        vc.previous_page();
        assert_eq!(vc.state().page_number, 1);

        vc.last_page();
        assert_eq!(vc.view().rows[0].number, 101);
    }

    #[test]
    fn test_sort_keeps_filter_and_reset_restores_defaults() {
        let mut vc = controller(120);
        vc.on_filter_changed(FilterCriteria::new().with_equal(Field::Artist, "Artist 2"));
        let filtered = vc.filtered_keys().to_vec();

        vc.on_sort_requested(Field::Tempo);
        vc.on_sort_requested(Field::Tempo);
        assert_eq!(vc.filtered_keys(), filtered.as_slice());
        assert_eq!(vc.state().sort.direction, SortDirection::Descending);

        let tempos: Vec<f64> = vc
            .ordered_keys()
            .iter()
            .filter_map(|k| vc.store().get(*k))
            .map(|r| r.number_or_zero(Field::Tempo))
            .collect();
        assert!(tempos.windows(2).all(|w| w[0] >= w[1]));

        vc.on_reset(FilterCriteria::default());
        assert_eq!(vc.state(), &ViewState::new(RecordKind::Tracks, PageSize::Rows(50)));
        assert_eq!(vc.filtered_keys().len(), 120);
    }

    #[test]
    fn test_rows_carry_slots_and_details() {
        let mut details = DetailRegistry::new();
        details.insert(
            RecordKey(52),
            DetailPayload {
                sections: vec![DetailSection {
                    title: "Track".into(),
                    entries: vec![DetailEntry {
                        label: "Id".into(),
                        value: "t52".into(),
                    }],
                }],
                raw: Some(serde_json::json!({ "id": "t52" })),
            },
        );
        let snapshot = Snapshot {
            store: synthetic_tracks(120),
            details,
            source: None,
        };
        let mut vc = ViewController::new(snapshot, PageSize::Rows(50));
        vc.on_page_requested(2);

        let row = &vc.view().rows[2];
        assert_eq!(row.slot, 2);
        assert_eq!(row.number, 53);
        assert_eq!(row.key, RecordKey(52));
        assert_eq!(row.detail.as_ref().map(|d| d.sections.len()), Some(1));

        assert!(!vc.toggle_raw(2));
        assert!(vc.toggle_detail(2));
        assert!(vc.toggle_raw(2));
        assert!(!vc.toggle_detail(3));

        // Re-rendering collapses every slot
        vc.on_sort_requested(Field::Name);
        assert!(!vc.is_expanded(2));
        assert!(!vc.is_raw_expanded(2));
    }

    #[test]
    fn test_non_numeric_energy() {
        let store = store(
            RecordKind::Tracks,
            vec![
                vec![
                    (Field::Name, text("Loud")),
                    (Field::Energy, text("very")),
                    (Field::Valence, num(0.4)),
                ],
                vec![
                    (Field::Name, text("Calm")),
                    (Field::Energy, num(0.2)),
                    (Field::Valence, num(0.6)),
                ],
            ],
        );
        let snapshot = Snapshot {
            store,
            ..Snapshot::default()
        };
        let mut vc = ViewController::new(snapshot, PageSize::Rows(50));

        let Some(ChartData::Scatter(series)) = vc.charts().get(ChartId::EnergyValence).map(|h| &h.data) else {
            panic!("expected an energy/valence scatter");
        };
        assert_eq!(series.points.len(), 1);
        assert_eq!(series.points[0].name, "Calm");

        vc.on_filter_changed(FilterCriteria::new().with_minimum(Field::Energy, 0.0));
        assert_eq!(vc.filtered_keys().len(), 2);

        vc.on_filter_changed(FilterCriteria::new().with_minimum(Field::Energy, 0.1));
        assert_eq!(vc.filtered_keys(), &[RecordKey(1)]);
    }

    #[test]
    fn test_empty_snapshot_status() {
        let snapshot = Snapshot {
            store: store(RecordKind::Artists, vec![]),
            ..Snapshot::default()
        };
        let vc = ViewController::new(snapshot, PageSize::Rows(25));
        assert_eq!(
            vc.view().status,
            "No artists found. Please sync your artist data first."
        );
        assert!(vc.view().rows.is_empty());
        assert_eq!(vc.view().links, None);
    }

    #[test]
    fn test_filtered_charts_follow_the_filter() {
        let mut vc = controller(120);
        let before = vc.charts().get(ChartId::FeatureProfile).map(|h| h.generation);

        vc.on_filter_changed(FilterCriteria::new().with_minimum(Field::Popularity, 88.0));
        assert_eq!(vc.filtered_keys().len(), 12);

        let handle = vc.charts().get(ChartId::FeatureProfile).unwrap();
        assert!(Some(handle.generation) > before);
        let ChartData::Profile(averages) = &handle.data else {
            panic!("expected a feature profile");
        };
        // Fields the synthetic tracks carry are sampled from the filtered set only
        for average in averages.iter().take(3) {
            assert_eq!(average.samples, vc.filtered_keys().len());
        }
    }

    #[test]
    fn test_snapshot_charts_ignore_the_filter() {
        let artists = Snapshot {
            store: store(
                RecordKind::Artists,
                (0..30)
                    .map(|i| {
                        vec![
                            (Field::Name, text(&format!("Artist {}", i))),
                            (Field::Genres, text(if i % 2 == 0 { "rock,pop" } else { "jazz" })),
                            (Field::Popularity, num(i as f64 * 3.0)),
                            (Field::Followers, num(i as f64 * 1000.0)),
                        ]
                    })
                    .collect(),
            ),
            ..Snapshot::default()
        };
        let saved = Snapshot {
            store: store(
                RecordKind::SavedTracks,
                (0..30)
                    .map(|i| {
                        vec![
                            (Field::Name, text(&format!("Song {}", i))),
                            (Field::Artist, text(&format!("Band {}", i % 4))),
                            (Field::Popularity, num(i as f64 * 3.0)),
                        ]
                    })
                    .collect(),
            ),
            ..Snapshot::default()
        };

        for (snapshot, ids) in [
            (artists, vec![ChartId::PopularityDistribution, ChartId::TopGenres]),
            (saved, vec![ChartId::PopularityDistribution, ChartId::TopArtists]),
        ] {
            let mut vc = ViewController::new(snapshot, PageSize::Rows(25));
            let before: Vec<_> = ids.iter().map(|id| vc.charts().get(*id).cloned()).collect();
            assert!(before.iter().all(Option::is_some));

            vc.on_filter_changed(FilterCriteria::new().with_minimum(Field::Popularity, 60.0));
            assert_eq!(vc.filtered_keys().len(), 10);

            let after: Vec<_> = ids.iter().map(|id| vc.charts().get(*id).cloned()).collect();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn test_follow_page_links() {
        let mut vc = controller(400);
        // « 1 2 3 4 5 … 8 »
        let links = vc.view().links.clone().unwrap();
        assert_eq!(links.len(), 9);

        assert!(!vc.follow_link(0));
        assert!(!vc.follow_link(1));
        assert!(vc.follow_link(7));
        assert_eq!(vc.state().page_number, 8);
        assert!(!vc.follow_link(8));
        assert!(vc.follow_link(0));
        assert_eq!(vc.state().page_number, 7);
        assert!(!vc.follow_link(99));
    }
}
