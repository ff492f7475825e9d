//! Per-kind column tables: which fields a table shows, how they sort and
//! how their cells are formatted.

use chrono::DateTime;

use super::models::{Field, Record, RecordKind};

/// How a column orders its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compare {
    /// Case-insensitive lexicographic.
    Text,
    /// Numeric, malformed values as 0.
    Numeric,
}

/// How a cell is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFormat {
    Text,
    Integer,
    Fraction,
    Tempo,
    Compact,
    Duration,
    Date,
}

/// A sortable table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub field: Field,
    pub title: &'static str,
    pub compare: Compare,
    pub format: CellFormat,
    /// Relative width weight.
    pub width: u16,
}

const fn text(field: Field, title: &'static str, width: u16) -> Column {
    Column {
        field,
        title,
        compare: Compare::Text,
        format: CellFormat::Text,
        width,
    }
}

const fn numeric(field: Field, title: &'static str, format: CellFormat, width: u16) -> Column {
    Column {
        field,
        title,
        compare: Compare::Numeric,
        format,
        width,
    }
}

const ARTIST_COLUMNS: &[Column] = &[
    text(Field::Name, "Name", 4),
    text(Field::Genres, "Genres", 5),
    numeric(Field::Popularity, "Popularity", CellFormat::Integer, 2),
    numeric(Field::Followers, "Followers", CellFormat::Compact, 2),
    numeric(Field::Position, "Pos", CellFormat::Integer, 1),
];

const TRACK_COLUMNS: &[Column] = &[
    text(Field::Name, "Track", 4),
    text(Field::Artist, "Artist", 3),
    text(Field::Album, "Album", 3),
    numeric(Field::Danceability, "Dance", CellFormat::Fraction, 1),
    numeric(Field::Energy, "Energy", CellFormat::Fraction, 1),
    numeric(Field::Valence, "Valence", CellFormat::Fraction, 1),
    numeric(Field::Tempo, "Tempo", CellFormat::Tempo, 1),
    text(Field::Key, "Key", 1),
    text(Field::Source, "Source", 2),
    numeric(Field::Position, "Pos", CellFormat::Integer, 1),
];

const SAVED_TRACK_COLUMNS: &[Column] = &[
    text(Field::Name, "Track", 4),
    text(Field::Artist, "Artist", 3),
    text(Field::Album, "Album", 3),
    numeric(Field::Popularity, "Popularity", CellFormat::Integer, 1),
    numeric(Field::Duration, "Duration", CellFormat::Duration, 1),
    Column {
        field: Field::SavedAt,
        title: "Saved",
        compare: Compare::Text,
        format: CellFormat::Date,
        width: 2,
    },
    numeric(Field::Position, "Pos", CellFormat::Integer, 1),
];

impl RecordKind {
    /// Column table, in display order. The first column is the default sort.
    pub fn columns(&self) -> &'static [Column] {
        match self {
            Self::Artists => ARTIST_COLUMNS,
            Self::Tracks => TRACK_COLUMNS,
            Self::SavedTracks => SAVED_TRACK_COLUMNS,
        }
    }

    pub fn column(&self, field: Field) -> Option<&'static Column> {
        self.columns().iter().find(|c| c.field == field)
    }

    pub fn default_sort_column(&self) -> Field {
        self.columns()[0].field
    }

    /// Fields the free-text search looks at.
    pub fn searchable_fields(&self) -> &'static [Field] {
        match self {
            Self::Artists => &[Field::Name, Field::Genres],
            Self::Tracks | Self::SavedTracks => &[Field::Name, Field::Artist, Field::Album],
        }
    }
}

impl Column {
    /// Render the cell for `record`. Missing numbers show as `-`.
    pub fn format_cell(&self, record: &Record) -> String {
        let number = || record.number(self.field);
        match self.format {
            CellFormat::Text => record.text(self.field),
            CellFormat::Integer => number().map_or_else(dash, |n| format!("{:.0}", n)),
            CellFormat::Fraction => number().map_or_else(dash, |n| format!("{:.2}", n)),
            CellFormat::Tempo => number().map_or_else(dash, |n| format!("{:.0}", n)),
            CellFormat::Compact => number().map_or_else(dash, |n| format_compact(n as u64)),
            CellFormat::Duration => number().map_or_else(dash, |n| format_duration_ms(n)),
            CellFormat::Date => format_date(&record.text(self.field)),
        }
    }
}

fn dash() -> String {
    String::from("-")
}

/// Compact count: `1.2M`, `3.4K`, `999`.
pub fn format_compact(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Milliseconds as `M:SS`.
pub fn format_duration_ms(ms: f64) -> String {
    let total_secs = (ms.max(0.0) / 1000.0).round() as u64;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// RFC 3339 timestamps shown as their date; anything else verbatim.
pub fn format_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(dt) => dt.format("%Y-%m-%d").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::models::{FieldValue, RecordKey};

    #[test]
    fn test_default_sort_is_first_column() {
        assert_eq!(RecordKind::Artists.default_sort_column(), Field::Name);
        assert_eq!(RecordKind::Tracks.default_sort_column(), Field::Name);
        assert_eq!(RecordKind::SavedTracks.default_sort_column(), Field::Name);
    }

    #[test]
    fn test_compact_counts() {
        assert_eq!(format_compact(999), "999");
        assert_eq!(format_compact(3_400), "3.4K");
        assert_eq!(format_compact(1_250_000), "1.2M");
    }

    #[test]
    fn test_cell_formats() {
        let mut fields = BTreeMap::new();
        fields.insert(Field::Duration, FieldValue::Number(185_000.0));
        fields.insert(Field::SavedAt, FieldValue::Text("2023-02-11T08:30:00Z".into()));
        fields.insert(Field::Energy, FieldValue::Text("loud".into()));
        let record = Record::new(RecordKey(0), fields);

        let duration = RecordKind::SavedTracks.column(Field::Duration).unwrap();
        assert_eq!(duration.format_cell(&record), "3:05");

        let saved = RecordKind::SavedTracks.column(Field::SavedAt).unwrap();
        assert_eq!(saved.format_cell(&record), "2023-02-11");

        let energy = RecordKind::Tracks.column(Field::Energy).unwrap();
        assert_eq!(energy.format_cell(&record), "-");
    }
}
