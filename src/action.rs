//! Application actions/events that drive state changes.

use std::path::PathBuf;

use crate::data::{LoadProgress, Snapshot};
use crate::progress::ProgressUpdate;

/// Actions that can be dispatched to update application state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Application lifecycle
    Quit,
    Tick,
    Resize(u16, u16),

    // Snapshot loading
    LoadSnapshot(PathBuf),
    LoadProgress(LoadProgress),
    SnapshotLoaded(Box<Snapshot>),
    SnapshotFailed(String),

    // Datasets
    SelectDataset(usize),
    NextDataset,
    PrevDataset,

    // Row navigation
    NavigateUp,
    NavigateDown,

    // Sorting
    HeaderLeft,
    HeaderRight,
    SortByHeader,

    // Paging
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
    CyclePageSize,
    OpenPageJump,
    PageJumpInput(char),
    PageJumpBackspace,
    PageJumpSubmit,
    PageJumpCancel,
    LinkLeft,
    LinkRight,
    FollowLink,

    // Detail panels
    ToggleDetail,
    ToggleRawDetail,

    // Search
    OpenSearch,
    CloseSearch,
    SearchInput(char),
    SearchBackspace,
    SearchSubmit,

    // Filter panel
    ToggleFilters,
    FilterFocusNext,
    FilterFocusPrev,
    FilterIncrease,
    FilterDecrease,
    ResetFilters,

    // Charts
    ToggleCharts,

    // Job progress
    WatchJob(String),
    /// Job id and its latest report
    ProgressUpdated(String, ProgressUpdate),
    StopPolling,

    // Overlays
    ShowHelp,
    HideHelp,

    // Errors
    ClearError,

    // No-op
    None,
}
