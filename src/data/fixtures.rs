//! Record builders shared by unit tests.

use super::models::{Field, FieldValue, Record, RecordKey, RecordKind};
use super::store::RecordStore;

pub fn num(value: f64) -> FieldValue {
    FieldValue::Number(value)
}

pub fn text(value: &str) -> FieldValue {
    FieldValue::Text(value.to_string())
}

pub fn store(kind: RecordKind, rows: Vec<Vec<(Field, FieldValue)>>) -> RecordStore {
    let records = rows
        .into_iter()
        .enumerate()
        .map(|(i, fields)| Record::new(RecordKey(i), fields.into_iter().collect()))
        .collect();
    RecordStore::new(kind, records)
}

/// `count` audio-feature tracks; track `i` has popularity `i % 100`.
pub fn synthetic_tracks(count: usize) -> RecordStore {
    let rows = (0..count)
        .map(|i| {
            vec![
                (Field::Name, text(&format!("Track {:03}", i))),
                (Field::Artist, text(&format!("Artist {}", i % 7))),
                (Field::Album, text(&format!("Album {}", i % 12))),
                (Field::Popularity, num((i % 100) as f64)),
                (Field::Danceability, num((i % 10) as f64 / 10.0)),
                (Field::Energy, num(((i + 3) % 10) as f64 / 10.0)),
                (Field::Valence, num(((i + 6) % 10) as f64 / 10.0)),
                (Field::Tempo, num(80.0 + (i % 60) as f64)),
                (Field::Source, text(if i % 4 == 0 { "csv" } else { "api" })),
            ]
        })
        .collect();
    store(RecordKind::Tracks, rows)
}
