//! Snapshot record model.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a record: its zero-based position in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey(pub usize);

impl RecordKey {
    /// One-based position, as shown in the `#` column.
    pub fn position(self) -> usize {
        self.0 + 1
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.position())
    }
}

/// The kind of records a snapshot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    #[default]
    Artists,
    #[serde(alias = "audio_features", alias = "top_tracks")]
    Tracks,
    SavedTracks,
}

impl RecordKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Artists => "Artists",
            Self::Tracks => "Audio Features",
            Self::SavedTracks => "Saved Tracks",
        }
    }

    /// Plural noun used in the status line.
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Artists => "artists",
            Self::Tracks | Self::SavedTracks => "tracks",
        }
    }

    /// Singular noun used in the "please sync" hint.
    pub fn sync_noun(&self) -> &'static str {
        match self {
            Self::Artists => "artist",
            Self::Tracks => "track",
            Self::SavedTracks => "saved track",
        }
    }
}

/// A named record attribute.
///
/// `Position` and `ReleaseYear` are derived: the first from the record key,
/// the second from `ReleaseDate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Position,
    Name,
    Artist,
    Album,
    Genres,
    Popularity,
    Followers,
    Danceability,
    Energy,
    Valence,
    Tempo,
    Key,
    Source,
    Acousticness,
    Instrumentalness,
    Liveness,
    Speechiness,
    SavedAt,
    ReleaseDate,
    ReleaseYear,
    Duration,
}

impl Field {
    /// Resolve a snapshot attribute name.
    ///
    /// Accepts bare names (`energy`), page-attribute names (`data-energy`)
    /// and the aliases the page templates use (`track`, `saved-at`).
    pub fn from_attribute(name: &str) -> Option<Field> {
        let name = name.trim();
        let name = name.strip_prefix("data-").unwrap_or(name);
        let normalized = name.to_ascii_lowercase().replace('-', "_");

        let field = match normalized.as_str() {
            "name" | "track" | "title" => Self::Name,
            "artist" | "artists" => Self::Artist,
            "album" => Self::Album,
            "genres" | "genre" => Self::Genres,
            "popularity" => Self::Popularity,
            "followers" => Self::Followers,
            "danceability" => Self::Danceability,
            "energy" => Self::Energy,
            "valence" => Self::Valence,
            "tempo" => Self::Tempo,
            "key" => Self::Key,
            "source" | "data_source" => Self::Source,
            "acousticness" => Self::Acousticness,
            "instrumentalness" => Self::Instrumentalness,
            "liveness" => Self::Liveness,
            "speechiness" => Self::Speechiness,
            "saved_at" | "added_at" => Self::SavedAt,
            "release_date" => Self::ReleaseDate,
            "duration" | "duration_ms" => Self::Duration,
            _ => return None,
        };
        Some(field)
    }

    /// Fields holding a set of values rather than a scalar.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::Genres)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Position => "#",
            Self::Name => "Name",
            Self::Artist => "Artist",
            Self::Album => "Album",
            Self::Genres => "Genres",
            Self::Popularity => "Popularity",
            Self::Followers => "Followers",
            Self::Danceability => "Danceability",
            Self::Energy => "Energy",
            Self::Valence => "Valence",
            Self::Tempo => "Tempo",
            Self::Key => "Key",
            Self::Source => "Source",
            Self::Acousticness => "Acousticness",
            Self::Instrumentalness => "Instrumentalness",
            Self::Liveness => "Liveness",
            Self::Speechiness => "Speechiness",
            Self::SavedAt => "Saved",
            Self::ReleaseDate => "Released",
            Self::ReleaseYear => "Year",
            Self::Duration => "Duration",
        }
    }
}

/// A scalar attribute value as it arrived in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Convert a raw JSON attribute. `null` means the attribute is absent.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Text(b.to_string())),
            Value::Number(n) => Some(n.as_f64().map_or_else(|| Self::Text(n.to_string()), Self::Number)),
            Value::String(s) => Some(Self::Text(s)),
            Value::Array(items) => Some(Self::List(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        Value::Null => None,
                        other => Some(other.to_string()),
                    })
                    .collect(),
            )),
            Value::Object(_) => Some(Self::Text(value.to_string())),
        }
    }

    /// Numeric reading of the value; `None` when it is not a finite number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n).filter(|n| n.is_finite()),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Self::List(_) => None,
        }
    }

    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Number(n) => Cow::Owned(format_number(*n)),
            Self::Text(s) => Cow::Borrowed(s.as_str()),
            Self::List(items) => Cow::Owned(items.join(", ")),
        }
    }

    /// List reading of the value. Text is split on commas.
    pub fn as_list(&self) -> Vec<&str> {
        match self {
            Self::List(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect(),
            Self::Text(s) => s.split(',').map(str::trim).filter(|s| !s.is_empty()).collect(),
            Self::Number(_) => Vec::new(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One snapshot row.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub key: RecordKey,
    fields: BTreeMap<Field, FieldValue>,
}

impl Record {
    pub fn new(key: RecordKey, fields: BTreeMap<Field, FieldValue>) -> Self {
        Self { key, fields }
    }

    pub fn value(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    /// Display text of a field; empty when absent.
    pub fn text(&self, field: Field) -> String {
        match field {
            Field::Position => self.key.position().to_string(),
            Field::ReleaseYear => self.release_year().unwrap_or_default().into_owned(),
            _ => self
                .value(field)
                .map(|v| v.as_text().into_owned())
                .unwrap_or_default(),
        }
    }

    /// Numeric reading of a field; `None` for missing or malformed values.
    pub fn number(&self, field: Field) -> Option<f64> {
        match field {
            Field::Position => Some(self.key.position() as f64),
            Field::ReleaseYear => self.release_year().and_then(|y| y.parse().ok()),
            _ => self.value(field).and_then(FieldValue::as_number),
        }
    }

    /// Numeric reading used by filters and sorting: malformed counts as 0.
    pub fn number_or_zero(&self, field: Field) -> f64 {
        self.number(field).unwrap_or(0.0)
    }

    pub fn list(&self, field: Field) -> Vec<&str> {
        self.value(field).map(FieldValue::as_list).unwrap_or_default()
    }

    pub fn name(&self) -> String {
        self.text(Field::Name)
    }

    /// Year part of `release_date` (`"1999-04-01"` -> `"1999"`). A bare
    /// numeric date is taken as the year itself.
    pub fn release_year(&self) -> Option<Cow<'_, str>> {
        match self.value(Field::ReleaseDate)? {
            FieldValue::Text(s) => s
                .split('-')
                .next()
                .map(str::trim)
                .filter(|y| !y.is_empty())
                .map(Cow::Borrowed),
            FieldValue::Number(n) if n.is_finite() => Some(Cow::Owned((n.trunc() as i64).to_string())),
            _ => None,
        }
    }
}
