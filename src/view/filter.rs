//! Filter engine: the logical AND of every active filter dimension.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::{Field, Record, RecordKey, RecordStore};

/// The active match constraints.
///
/// An empty `text`, an empty categorical value, or an absent dimension
/// matches everything for that dimension.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring over the kind's searchable fields.
    #[serde(default)]
    pub text: String,

    /// Exact equality per field. List fields match on any element.
    #[serde(default)]
    pub equals: BTreeMap<Field, String>,

    /// Numeric minimums per field, compared with `>=`.
    #[serde(default)]
    pub at_least: BTreeMap<Field, f64>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_equal(mut self, field: Field, value: impl Into<String>) -> Self {
        self.equals.insert(field, value.into());
        self
    }

    pub fn with_minimum(mut self, field: Field, minimum: f64) -> Self {
        self.at_least.insert(field, minimum);
        self
    }

    /// True when no dimension constrains anything.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
            && self.equals.values().all(String::is_empty)
            && self.at_least.is_empty()
    }

    /// Check one record against every dimension.
    pub fn matches(&self, record: &Record, searchable: &[Field]) -> bool {
        self.matches_text(record, searchable)
            && self.matches_categories(record)
            && self.matches_minimums(record)
    }

    fn matches_text(&self, record: &Record, searchable: &[Field]) -> bool {
        if self.text.is_empty() {
            return true;
        }
        let needle = self.text.to_lowercase();
        searchable
            .iter()
            .any(|field| record.text(*field).to_lowercase().contains(&needle))
    }

    fn matches_categories(&self, record: &Record) -> bool {
        self.equals
            .iter()
            .filter(|(_, wanted)| !wanted.is_empty())
            .all(|(field, wanted)| {
                if field.is_list() {
                    record.list(*field).contains(&wanted.as_str())
                } else {
                    record.text(*field) == *wanted
                }
            })
    }

    fn matches_minimums(&self, record: &Record) -> bool {
        self.at_least
            .iter()
            .all(|(field, minimum)| record.number_or_zero(*field) >= *minimum)
    }
}

/// Keys of the records matching `criteria`, in snapshot order.
pub fn apply(store: &RecordStore, criteria: &FilterCriteria) -> Vec<RecordKey> {
    let all = store.keys();
    if criteria.is_empty() {
        return all;
    }
    apply_to(store, &all, criteria)
}

/// Filter an arbitrary subset of keys, preserving its order.
pub fn apply_to(store: &RecordStore, keys: &[RecordKey], criteria: &FilterCriteria) -> Vec<RecordKey> {
    let searchable = store.kind().searchable_fields();
    store
        .resolve(keys)
        .filter(|record| criteria.matches(record, searchable))
        .map(|record| record.key)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{num, store, synthetic_tracks, text};
    use crate::data::{FieldValue, RecordKind};

    fn artists() -> RecordStore {
        store(
            RecordKind::Artists,
            vec![
                vec![
                    (Field::Name, text("Slowdive")),
                    (Field::Genres, FieldValue::List(vec!["shoegaze".into(), "dream pop".into()])),
                    (Field::Popularity, num(61.0)),
                    (Field::Followers, num(900_000.0)),
                ],
                vec![
                    (Field::Name, text("Ride")),
                    (Field::Genres, text("shoegaze,britpop")),
                    (Field::Popularity, num(48.0)),
                    (Field::Followers, text("many")),
                ],
                vec![
                    (Field::Name, text("Beach House")),
                    (Field::Genres, text("dream pop")),
                    (Field::Popularity, num(70.0)),
                    (Field::Followers, num(2_000_000.0)),
                ],
            ],
        )
    }

    #[test]
    fn test_empty_criteria_matches_all() {
        let store = artists();
        assert_eq!(apply(&store, &FilterCriteria::new()), store.keys());
        assert!(FilterCriteria::new().with_equal(Field::Genres, "").is_empty());
    }

    #[test]
    fn test_text_search_is_case_insensitive_over_searchable_fields() {
        let store = artists();
        let keys = apply(&store, &FilterCriteria::new().with_text("DREAM"));
        assert_eq!(keys, vec![RecordKey(0), RecordKey(2)]);

        // Popularity is not a searchable field
        assert!(apply(&store, &FilterCriteria::new().with_text("61")).is_empty());
    }

    #[test]
    fn test_categorical_list_membership() {
        let store = artists();
        let keys = apply(&store, &FilterCriteria::new().with_equal(Field::Genres, "shoegaze"));
        assert_eq!(keys, vec![RecordKey(0), RecordKey(1)]);

        // Exact equality, not substring
        assert!(apply(&store, &FilterCriteria::new().with_equal(Field::Genres, "shoe")).is_empty());
    }

    #[test]
    fn test_minimum_is_inclusive() {
        let store = artists();
        let keys = apply(&store, &FilterCriteria::new().with_minimum(Field::Popularity, 61.0));
        assert_eq!(keys, vec![RecordKey(0), RecordKey(2)]);
    }

    #[test]
    fn test_malformed_numbers_count_as_zero() {
        let store = artists();
        let zero = apply(&store, &FilterCriteria::new().with_minimum(Field::Followers, 0.0));
        assert_eq!(zero.len(), 3);

        let one = apply(&store, &FilterCriteria::new().with_minimum(Field::Followers, 1.0));
        assert_eq!(one, vec![RecordKey(0), RecordKey(2)]);
    }

    #[test]
    fn test_dimensions_combine_with_and() {
        let store = artists();
        let criteria = FilterCriteria::new()
            .with_equal(Field::Genres, "dream pop")
            .with_minimum(Field::Popularity, 65.0)
            .with_text("house");
        assert_eq!(apply(&store, &criteria), vec![RecordKey(2)]);
    }

    #[test]
    fn test_subset_and_idempotent() {
        let store = synthetic_tracks(120);
        let criteria = FilterCriteria::new()
            .with_text("track 0")
            .with_minimum(Field::Energy, 0.5)
            .with_equal(Field::Artist, "Artist 3");

        let once = apply(&store, &criteria);
        let twice = apply_to(&store, &once, &criteria);

        assert!(!once.is_empty());
        assert!(once.iter().all(|k| store.get(*k).is_some()));
        assert!(once.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_release_year_equality() {
        let store = store(
            RecordKind::SavedTracks,
            vec![
                vec![(Field::Name, text("A")), (Field::ReleaseDate, text("2001-02-03"))],
                vec![(Field::Name, text("B")), (Field::ReleaseDate, text("1999"))],
                vec![(Field::Name, text("C"))],
            ],
        );
        let keys = apply(&store, &FilterCriteria::new().with_equal(Field::ReleaseYear, "2001"));
        assert_eq!(keys, vec![RecordKey(0)]);
    }
}
