//! Sort engine: single-column stable ordering of a key sequence.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::data::columns::Compare;
use crate::data::{Field, RecordKey, RecordKind, RecordStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn indicator(&self) -> &'static str {
        match self {
            Self::Ascending => "↑",
            Self::Descending => "↓",
        }
    }
}

/// The active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: Field,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(column: Field) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }

    /// First column of the kind's table, ascending.
    pub fn default_for(kind: RecordKind) -> Self {
        Self::ascending(kind.default_sort_column())
    }

    /// Spec after a sort request on `column`: the same column flips,
    /// a different one starts ascending.
    pub fn toggle(self, column: Field) -> Self {
        if self.column == column {
            Self {
                column,
                direction: self.direction.flip(),
            }
        } else {
            Self::ascending(column)
        }
    }
}

enum SortKey {
    Text(String),
    Number(f64),
}

impl SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            // Never mixed within one column
            _ => Ordering::Equal,
        }
    }
}

/// Order `keys` by `spec`. Ties keep their input order in both directions.
///
/// A column outside the kind's table leaves the order unchanged.
pub fn sort(store: &RecordStore, keys: &[RecordKey], spec: SortSpec) -> Vec<RecordKey> {
    let Some(column) = store.kind().column(spec.column) else {
        return keys.to_vec();
    };

    let mut decorated: Vec<(SortKey, RecordKey)> = store
        .resolve(keys)
        .map(|record| {
            let key = match column.compare {
                Compare::Text => SortKey::Text(record.text(column.field).to_lowercase()),
                Compare::Numeric => SortKey::Number(record.number_or_zero(column.field)),
            };
            (key, record.key)
        })
        .collect();

    // `sort_by` is stable; reversing the comparator keeps equal runs in place
    match spec.direction {
        SortDirection::Ascending => decorated.sort_by(|a, b| a.0.cmp(&b.0)),
        SortDirection::Descending => decorated.sort_by(|a, b| b.0.cmp(&a.0)),
    }

    decorated.into_iter().map(|(_, key)| key).collect()
}
