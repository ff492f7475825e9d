//! The tabular view-model: filtering, sorting, pagination, chart
//! aggregation and the controller tying them together.

pub mod aggregate;
pub mod charts;
pub mod controller;
pub mod controls;
pub mod filter;
pub mod paginate;
pub mod sort;

pub use controller::ViewController;
pub use filter::FilterCriteria;
pub use paginate::{PageLink, PageSize};
