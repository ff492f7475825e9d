//! Filter control definitions per record kind: dropdown options and
//! slider scales, derived from the snapshot.

use std::collections::BTreeSet;

use super::aggregate::rank;
use crate::data::columns::format_compact;
use crate::data::{Field, RecordKind, RecordStore};

/// How a 0..=max slider position maps to a filter threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliderScale {
    /// The position is the threshold.
    Direct,
    /// Position / 100, for 0-1 audio features.
    Fraction,
    /// Percent of the largest value in the snapshot, floored.
    PercentOf(f64),
}

impl SliderScale {
    pub fn threshold(&self, position: u32) -> f64 {
        let position = position as f64;
        match self {
            Self::Direct => position,
            Self::Fraction => position / 100.0,
            Self::PercentOf(max) => (position / 100.0 * max).floor(),
        }
    }

    /// Live value shown beside the slider.
    pub fn display(&self, position: u32) -> String {
        match self {
            Self::Direct => position.to_string(),
            Self::Fraction => format!("{:.2}", self.threshold(position)),
            Self::PercentOf(_) => format_compact(self.threshold(position) as u64),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    /// Categorical dropdown; no selection means no constraint.
    Select {
        options: Vec<String>,
        placeholder: &'static str,
    },
    /// Numeric minimum slider over `0..=max`.
    Slider { max: u32, step: u32, scale: SliderScale },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterControl {
    pub field: Field,
    pub label: &'static str,
    pub kind: ControlKind,
}

impl FilterControl {
    fn select(field: Field, label: &'static str, placeholder: &'static str, options: Vec<String>) -> Self {
        Self {
            field,
            label,
            kind: ControlKind::Select {
                options,
                placeholder,
            },
        }
    }

    fn slider(field: Field, label: &'static str, scale: SliderScale) -> Self {
        Self {
            field,
            label,
            kind: ControlKind::Slider {
                max: 100,
                step: 5,
                scale,
            },
        }
    }
}

/// The filter controls for `store`'s kind, with options drawn from its records.
pub fn controls_for(store: &RecordStore) -> Vec<FilterControl> {
    match store.kind() {
        RecordKind::Artists => vec![
            FilterControl::select(
                Field::Genres,
                "Genre",
                "All Genres",
                alphabetical(store, Field::Genres),
            ),
            FilterControl::slider(Field::Popularity, "Min Popularity", SliderScale::Direct),
            FilterControl::slider(
                Field::Followers,
                "Min Followers",
                SliderScale::PercentOf(store.max_number(Field::Followers)),
            ),
        ],
        RecordKind::Tracks => vec![
            FilterControl::select(
                Field::Artist,
                "Artist",
                "All Artists",
                alphabetical(store, Field::Artist),
            ),
            FilterControl::select(
                Field::Album,
                "Album",
                "All Albums",
                alphabetical(store, Field::Album),
            ),
            FilterControl::slider(Field::Danceability, "Min Danceability", SliderScale::Fraction),
            FilterControl::slider(Field::Energy, "Min Energy", SliderScale::Fraction),
        ],
        RecordKind::SavedTracks => vec![
            FilterControl::select(
                Field::Artist,
                "Artist",
                "All Artists",
                by_frequency(store, Field::Artist),
            ),
            FilterControl::select(
                Field::Album,
                "Album",
                "All Albums",
                by_frequency(store, Field::Album),
            ),
            FilterControl::select(
                Field::ReleaseYear,
                "Year",
                "All Years",
                years_descending(store),
            ),
            FilterControl::slider(Field::Popularity, "Min Popularity", SliderScale::Direct),
        ],
    }
}

fn values(store: &RecordStore, field: Field) -> Vec<String> {
    store
        .records()
        .iter()
        .flat_map(|record| {
            if field.is_list() {
                record.list(field).into_iter().map(str::to_string).collect()
            } else {
                vec![record.text(field)]
            }
        })
        .filter(|value| !value.is_empty())
        .collect()
}

/// Distinct values in plain code-point order, so uppercase sorts first.
fn alphabetical(store: &RecordStore, field: Field) -> Vec<String> {
    let unique: BTreeSet<String> = values(store, field).into_iter().collect();
    unique.into_iter().collect()
}

fn by_frequency(store: &RecordStore, field: Field) -> Vec<String> {
    let all = values(store, field);
    rank(all.iter().map(String::as_str), usize::MAX)
        .into_iter()
        .map(|bucket| bucket.label)
        .collect()
}

fn years_descending(store: &RecordStore) -> Vec<String> {
    let years: BTreeSet<String> = values(store, Field::ReleaseYear).into_iter().collect();
    years.into_iter().rev().collect()
}
