//! Aggregator: chart-ready summaries of a record subset.

use std::collections::HashMap;

use crate::data::{Field, Record, RecordKey, RecordKind};

/// One histogram bucket or ranked category.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub label: String,
    pub count: u64,
}

/// Fixed-width histogram over `[0, buckets * width]`.
///
/// Values outside the range land in the nearest edge bucket.
pub fn histogram(values: impl IntoIterator<Item = f64>, buckets: usize, width: f64) -> Vec<Bucket> {
    let buckets = buckets.max(1);
    let mut counts = vec![0u64; buckets];

    for value in values {
        let index = (value / width).floor();
        let index = if index.is_nan() || index < 0.0 {
            0
        } else {
            (index as usize).min(buckets - 1)
        };
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let low = i as f64 * width;
            let high = if i + 1 == buckets {
                low + width
            } else {
                low + width - 1.0
            };
            Bucket {
                label: format!("{:.0}-{:.0}", low, high),
                count,
            }
        })
        .collect()
}

/// Occurrence counts, descending. Ties keep first-seen order.
pub fn rank<'a>(values: impl IntoIterator<Item = &'a str>, top_n: usize) -> Vec<Bucket> {
    let mut order: Vec<Bucket> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for value in values {
        match index.get(value) {
            Some(&i) => order[i].count += 1,
            None => {
                index.insert(value, order.len());
                order.push(Bucket {
                    label: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    order.sort_by(|a, b| b.count.cmp(&a.count));
    order.truncate(top_n);
    order
}

/// Mean of one numeric dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureAverage {
    pub field: Field,
    /// `None` when no record carries a valid number.
    pub mean: Option<f64>,
    pub samples: usize,
}

/// Mean per field over the records where that field is a valid number.
/// Invalid values are excluded rather than counted as zero.
pub fn averages(records: &[&Record], fields: &[Field]) -> Vec<FeatureAverage> {
    fields
        .iter()
        .map(|&field| {
            let (sum, samples) = records
                .iter()
                .filter_map(|r| r.number(field))
                .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
            FeatureAverage {
                field,
                mean: (samples > 0).then(|| sum / samples as f64),
                samples,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub key: RecordKey,
    pub x: f64,
    pub y: f64,
    pub name: String,
    /// Hover text, e.g. `Song by Band (E: 0.52, V: 0.31)`.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub x_field: Field,
    pub y_field: Field,
    pub points: Vec<ScatterPoint>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

/// Points for records where both dimensions are valid numbers.
pub fn scatter(records: &[&Record], x_field: Field, y_field: Field) -> ScatterSeries {
    let points: Vec<ScatterPoint> = records
        .iter()
        .filter_map(|record| {
            let x = record.number(x_field)?;
            let y = record.number(y_field)?;
            let name = record.name();
            let artist = record.text(Field::Artist);
            let who = if artist.is_empty() {
                name.clone()
            } else {
                format!("{} by {}", name, artist)
            };
            Some(ScatterPoint {
                key: record.key,
                x,
                y,
                label: format!("{} ({}, {})", who, axis_tag(x_field, x), axis_tag(y_field, y)),
                name,
            })
        })
        .collect();

    let x_bounds = axis_bounds(x_field, points.iter().map(|p| p.x));
    let y_bounds = axis_bounds(y_field, points.iter().map(|p| p.y));

    ScatterSeries {
        x_field,
        y_field,
        points,
        x_bounds,
        y_bounds,
    }
}

fn axis_tag(field: Field, value: f64) -> String {
    match field {
        Field::Energy => format!("E: {:.2}", value),
        Field::Valence => format!("V: {:.2}", value),
        Field::Danceability => format!("D: {:.2}", value),
        Field::Tempo => format!("T: {:.0} BPM", value),
        other => format!("{}: {:.2}", other.label(), value),
    }
}

fn axis_bounds(field: Field, values: impl Iterator<Item = f64>) -> [f64; 2] {
    if field != Field::Tempo {
        return [0.0, 1.0];
    }

    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() {
        return [60.0, 200.0];
    }

    let low = (min - 20.0).max(60.0);
    let high = (max + 20.0).min(200.0);
    if low < high {
        [low, high]
    } else {
        [min - 1.0, max + 1.0]
    }
}

/// Audio features shown in the profile chart.
pub const PROFILE_FIELDS: [Field; 7] = [
    Field::Danceability,
    Field::Energy,
    Field::Valence,
    Field::Acousticness,
    Field::Instrumentalness,
    Field::Liveness,
    Field::Speechiness,
];

/// Computed input for one chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Histogram(Vec<Bucket>),
    Ranking(Vec<Bucket>),
    Profile(Vec<FeatureAverage>),
    Scatter(ScatterSeries),
}

impl ChartData {
    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Histogram(buckets) => buckets.iter().all(|b| b.count == 0),
            Self::Ranking(buckets) => buckets.is_empty(),
            Self::Profile(averages) => averages.iter().all(|a| a.samples == 0),
            Self::Scatter(series) => series.points.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChartId {
    PopularityDistribution,
    TopGenres,
    TopArtists,
    FeatureProfile,
    EnergyValence,
    DanceabilityTempo,
    DataSources,
}

impl ChartId {
    /// Compute this chart's data from `records`.
    pub fn compute(&self, records: &[&Record]) -> ChartData {
        match self {
            Self::PopularityDistribution => ChartData::Histogram(histogram(
                records.iter().map(|r| r.number_or_zero(Field::Popularity)),
                10,
                10.0,
            )),
            Self::TopGenres => ChartData::Ranking(rank(
                records.iter().flat_map(|r| r.list(Field::Genres)),
                5,
            )),
            Self::TopArtists => {
                let artists: Vec<String> = records
                    .iter()
                    .map(|r| r.text(Field::Artist))
                    .filter(|a| !a.is_empty())
                    .collect();
                ChartData::Ranking(rank(artists.iter().map(String::as_str), 5))
            }
            Self::FeatureProfile => ChartData::Profile(averages(records, &PROFILE_FIELDS)),
            Self::EnergyValence => ChartData::Scatter(scatter(records, Field::Energy, Field::Valence)),
            Self::DanceabilityTempo => {
                ChartData::Scatter(scatter(records, Field::Danceability, Field::Tempo))
            }
            Self::DataSources => {
                let sources: Vec<String> = records
                    .iter()
                    .map(|r| r.text(Field::Source))
                    .map(|s| if s.is_empty() { String::from("unknown") } else { s })
                    .collect();
                ChartData::Ranking(rank(sources.iter().map(String::as_str), usize::MAX))
            }
        }
    }
}

/// Which record set a chart summarizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartScope {
    /// The whole snapshot, computed once at load.
    Snapshot,
    /// The filtered set, recomputed on every filter change.
    Filtered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSpec {
    pub id: ChartId,
    pub title: &'static str,
    pub scope: ChartScope,
}

const ARTIST_CHARTS: &[ChartSpec] = &[
    ChartSpec {
        id: ChartId::PopularityDistribution,
        title: "Popularity Distribution",
        scope: ChartScope::Snapshot,
    },
    ChartSpec {
        id: ChartId::TopGenres,
        title: "Top Genres",
        scope: ChartScope::Snapshot,
    },
];

const TRACK_CHARTS: &[ChartSpec] = &[
    ChartSpec {
        id: ChartId::FeatureProfile,
        title: "Audio Feature Profile",
        scope: ChartScope::Filtered,
    },
    ChartSpec {
        id: ChartId::EnergyValence,
        title: "Energy vs Valence",
        scope: ChartScope::Filtered,
    },
    ChartSpec {
        id: ChartId::DanceabilityTempo,
        title: "Danceability vs Tempo",
        scope: ChartScope::Filtered,
    },
    ChartSpec {
        id: ChartId::DataSources,
        title: "Data Sources",
        scope: ChartScope::Filtered,
    },
];

const SAVED_TRACK_CHARTS: &[ChartSpec] = &[
    ChartSpec {
        id: ChartId::PopularityDistribution,
        title: "Popularity Distribution",
        scope: ChartScope::Snapshot,
    },
    ChartSpec {
        id: ChartId::TopArtists,
        title: "Top Artists",
        scope: ChartScope::Snapshot,
    },
];

impl RecordKind {
    pub fn charts(&self) -> &'static [ChartSpec] {
        match self {
            Self::Artists => ARTIST_CHARTS,
            Self::Tracks => TRACK_CHARTS,
            Self::SavedTracks => SAVED_TRACK_CHARTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{num, store, synthetic_tracks, text};
    use crate::data::FieldValue;

    #[test]
    fn test_histogram_clamps_to_edges() {
        let buckets = histogram([0.0, 9.9, 10.0, 100.0, 150.0, -5.0], 10, 10.0);
        assert_eq!(buckets.len(), 10);
        assert_eq!(buckets[0].count, 3);
        assert_eq!(buckets[1].count, 1);
        assert_eq!(buckets[9].count, 2);
        assert_eq!(buckets[0].label, "0-9");
        assert_eq!(buckets[9].label, "90-100");
    }

    #[test]
    fn test_rank_ties_keep_first_seen() {
        let ranked = rank(["rock", "pop", "jazz", "pop", "jazz", "folk"], 3);
        let labels: Vec<&str> = ranked.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["pop", "jazz", "rock"]);
        assert_eq!(ranked[0].count, 2);
    }

    #[test]
    fn test_averages_exclude_invalid() {
        let store = store(
            RecordKind::Tracks,
            vec![
                vec![(Field::Energy, num(0.4))],
                vec![(Field::Energy, text("n/a"))],
                vec![(Field::Energy, num(0.8))],
            ],
        );
        let records: Vec<&Record> = store.records().iter().collect();
        let result = averages(&records, &[Field::Energy, Field::Liveness]);

        assert_eq!(result[0].samples, 2);
        assert!((result[0].mean.unwrap() - 0.6).abs() < 1e-9);
        assert_eq!(result[1].mean, None);
    }

    #[test]
    fn test_scatter_skips_non_numeric() {
        let store = store(
            RecordKind::Tracks,
            vec![
                vec![
                    (Field::Name, text("Song")),
                    (Field::Artist, text("Band")),
                    (Field::Energy, num(0.52)),
                    (Field::Valence, num(0.31)),
                ],
                vec![
                    (Field::Name, text("Broken")),
                    (Field::Energy, text("loud")),
                    (Field::Valence, num(0.5)),
                ],
            ],
        );
        let records: Vec<&Record> = store.records().iter().collect();
        let series = scatter(&records, Field::Energy, Field::Valence);

        assert_eq!(series.points.len(), 1);
        assert_eq!(series.points[0].label, "Song by Band (E: 0.52, V: 0.31)");
        assert_eq!(series.x_bounds, [0.0, 1.0]);
        assert_eq!(series.points[0].key, RecordKey(0));
    }

    #[test]
    fn test_tempo_bounds_and_tooltip() {
        let store = store(
            RecordKind::Tracks,
            vec![
                vec![
                    (Field::Name, text("Slow")),
                    (Field::Danceability, num(0.61)),
                    (Field::Tempo, num(120.0)),
                ],
                vec![
                    (Field::Name, text("Fast")),
                    (Field::Danceability, num(0.9)),
                    (Field::Tempo, FieldValue::Text("190".into())),
                ],
            ],
        );
        let records: Vec<&Record> = store.records().iter().collect();
        let series = scatter(&records, Field::Danceability, Field::Tempo);

        assert_eq!(series.y_bounds, [100.0, 200.0]);
        assert_eq!(series.points[0].label, "Slow (D: 0.61, T: 120 BPM)");
    }

    #[test]
    fn test_data_sources() {
        let store = synthetic_tracks(8);
        let records: Vec<&Record> = store.records().iter().collect();
        let ChartData::Ranking(sources) = ChartId::DataSources.compute(&records) else {
            panic!("expected a ranking");
        };
        assert_eq!(sources[0], Bucket { label: "api".into(), count: 6 });
        assert_eq!(sources[1], Bucket { label: "csv".into(), count: 2 });
    }

    #[test]
    fn test_chart_scopes() {
        assert!(RecordKind::Artists
            .charts()
            .iter()
            .all(|c| c.scope == ChartScope::Snapshot));
        assert!(RecordKind::Tracks
            .charts()
            .iter()
            .all(|c| c.scope == ChartScope::Filtered));
    }
}
