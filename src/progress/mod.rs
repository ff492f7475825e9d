//! Progress polling for long-running server-side jobs.

pub mod api;
pub mod poller;

pub use api::{ProgressClient, ProgressUpdate};
pub use poller::PollHandle;
