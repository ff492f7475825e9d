//! UI components module.

pub mod busy;
pub mod charts;
pub mod detail;
pub mod filters;
pub mod table;

pub use busy::{render_busy, BusyState};
pub use charts::render_charts;
pub use detail::render_detail;
pub use filters::{render_filters, FilterPanelState};
pub use table::{render_table, TablePanelState};
