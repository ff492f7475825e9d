//! Snapshot data: records, column tables, detail payloads and loading.

pub mod columns;
pub mod detail;
pub mod models;
pub mod snapshot;
pub mod store;

pub use detail::{DetailPayload, DetailRegistry};
pub use models::{Field, FieldValue, Record, RecordKey, RecordKind};
pub use snapshot::{LoadProgress, Snapshot};
pub use store::RecordStore;

#[cfg(test)]
pub(crate) mod fixtures;
