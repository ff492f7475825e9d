//! Main application state and logic.

use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::action::Action;
use crate::config::Config;
use crate::data::{self, RecordKey, RecordKind, Snapshot};
use crate::progress::{poller, PollHandle, ProgressClient};
use crate::ui::{BusyState, FilterPanelState, TablePanelState};
use crate::view::controls::{controls_for, FilterControl};
use crate::view::{PageSize, ViewController};

/// One loaded snapshot with its view and panel state.
pub struct Dataset {
    pub controller: ViewController,
    pub controls: Vec<FilterControl>,
    pub filters: FilterPanelState,
    pub table: TablePanelState,
}

impl Dataset {
    pub fn new(snapshot: Snapshot, page_size: PageSize) -> Self {
        let controller = ViewController::new(snapshot, page_size);
        let controls = controls_for(controller.store());
        let filters = FilterPanelState::new(&controls);
        let mut table = TablePanelState::new();
        table.reset_selection(controller.view().rows.len());

        Self {
            controller,
            controls,
            filters,
            table,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.controller.kind()
    }

    /// Key of the row under the cursor.
    pub fn selected_key(&self) -> Option<RecordKey> {
        self.table
            .selected
            .and_then(|i| self.controller.view().rows.get(i))
            .map(|row| row.key)
    }

    /// Push the filter panel's criteria into the controller.
    fn apply_filters(&mut self) {
        let criteria = self.filters.criteria(&self.controls);
        self.controller.on_filter_changed(criteria);
        self.rendered();
    }

    /// The table body was replaced; move the cursor back to the top.
    fn rendered(&mut self) {
        self.table.reset_selection(self.controller.view().rows.len());
    }
}

/// Main application state.
pub struct App {
    /// Whether the app should quit
    pub should_quit: bool,

    /// Configuration
    pub config: Config,

    /// Loaded datasets, ordered by kind
    pub datasets: Vec<Dataset>,

    /// Index of the visible dataset
    pub active: usize,

    /// Busy indicator
    pub busy: BusyState,

    /// Running progress poller
    pub poller: Option<PollHandle>,

    /// Snapshot loads still in flight
    pub pending_loads: usize,

    /// Chart panel visible
    pub show_charts: bool,

    /// Help overlay visible
    pub show_help: bool,

    /// Error message to display
    pub error_message: Option<String>,

    /// Action sender for async operations
    pub action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    /// Create a new application instance.
    pub fn new(config: Config, action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            should_quit: false,
            show_charts: config.view.show_charts,
            config,
            datasets: Vec::new(),
            active: 0,
            busy: BusyState::new(),
            poller: None,
            pending_loads: 0,
            show_help: false,
            error_message: None,
            action_tx,
        }
    }

    /// Initialize the application.
    pub fn init(&mut self) -> Result<()> {
        if self.config.data.snapshots.is_empty() {
            info!("No snapshots configured");
        }

        for path in &self.config.data.snapshots {
            self.action_tx.send(Action::LoadSnapshot(path.clone()))?;
        }

        Ok(())
    }

    pub fn active_dataset(&self) -> Option<&Dataset> {
        self.datasets.get(self.active)
    }

    pub fn active_dataset_mut(&mut self) -> Option<&mut Dataset> {
        self.datasets.get_mut(self.active)
    }

    /// True while the search box is open on the active dataset.
    pub fn is_searching(&self) -> bool {
        self.active_dataset().is_some_and(|d| d.filters.is_searching())
    }

    /// True while a page number is being typed.
    pub fn is_jumping(&self) -> bool {
        self.active_dataset().is_some_and(|d| d.table.page_input.is_some())
    }

    pub fn filters_visible(&self) -> bool {
        self.active_dataset().is_some_and(|d| d.filters.visible)
    }

    /// Handle an action and update state.
    pub async fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => {
                if let Some(poller) = self.poller.take() {
                    poller.stop();
                    poller.join().await;
                }
                self.should_quit = true;
            }

            Action::Tick => {
                if self.poller.as_ref().is_some_and(PollHandle::is_finished) {
                    self.poller = None;
                    self.finish_busy();
                }
            }

            Action::Resize(_, _) => {}

            // Snapshot loading
            Action::LoadSnapshot(path) => {
                self.load_snapshot(path);
            }

            Action::LoadProgress(progress) => {
                self.busy.set_progress(progress.percent, progress.status);
            }

            Action::SnapshotLoaded(snapshot) => {
                self.pending_loads = self.pending_loads.saturating_sub(1);
                self.install_snapshot(*snapshot);
                self.finish_busy();
            }

            Action::SnapshotFailed(message) => {
                self.pending_loads = self.pending_loads.saturating_sub(1);
                self.error_message = Some(message);
                self.finish_busy();
            }

            // Datasets
            Action::SelectDataset(index) => {
                if index < self.datasets.len() {
                    self.active = index;
                }
            }

            Action::NextDataset => {
                if !self.datasets.is_empty() {
                    self.active = (self.active + 1) % self.datasets.len();
                }
            }

            Action::PrevDataset => {
                if !self.datasets.is_empty() {
                    self.active = (self.active + self.datasets.len() - 1) % self.datasets.len();
                }
            }

            // Row navigation
            Action::NavigateUp => {
                if let Some(dataset) = self.active_dataset_mut() {
                    let len = dataset.controller.view().rows.len();
                    dataset.table.select_previous(len);
                }
            }

            Action::NavigateDown => {
                if let Some(dataset) = self.active_dataset_mut() {
                    let len = dataset.controller.view().rows.len();
                    dataset.table.select_next(len);
                }
            }

            // Sorting
            Action::HeaderLeft => {
                if let Some(dataset) = self.active_dataset_mut() {
                    let columns = dataset.kind().columns().len();
                    dataset.table.header_left(columns);
                }
            }

            Action::HeaderRight => {
                if let Some(dataset) = self.active_dataset_mut() {
                    let columns = dataset.kind().columns().len();
                    dataset.table.header_right(columns);
                }
            }

            Action::SortByHeader => {
                if let Some(dataset) = self.active_dataset_mut() {
                    if let Some(column) = dataset.kind().columns().get(dataset.table.header) {
                        dataset.controller.on_sort_requested(column.field);
                        dataset.rendered();
                    }
                }
            }

            // Paging
            Action::NextPage => self.with_page(ViewController::next_page),
            Action::PreviousPage => self.with_page(ViewController::previous_page),
            Action::FirstPage => self.with_page(ViewController::first_page),
            Action::LastPage => self.with_page(ViewController::last_page),

            Action::CyclePageSize => {
                if let Some(dataset) = self.active_dataset_mut() {
                    let size = dataset.controller.state().page_size.next();
                    dataset.controller.on_page_size_changed(size);
                    dataset.rendered();
                }
            }

            Action::OpenPageJump => {
                if let Some(dataset) = self.active_dataset_mut() {
                    dataset.table.page_input = Some(String::new());
                }
            }

            Action::PageJumpInput(c) => {
                if let Some(input) = self.active_dataset_mut().and_then(|d| d.table.page_input.as_mut()) {
                    if c.is_ascii_digit() && input.len() < 6 {
                        input.push(c);
                    }
                }
            }

            Action::PageJumpBackspace => {
                if let Some(input) = self.active_dataset_mut().and_then(|d| d.table.page_input.as_mut()) {
                    input.pop();
                }
            }

            Action::PageJumpSubmit => {
                if let Some(dataset) = self.active_dataset_mut() {
                    let input = dataset.table.page_input.take().unwrap_or_default();
                    match input.parse::<usize>() {
                        Ok(page) => {
                            dataset.controller.on_page_requested(page);
                            dataset.rendered();
                        }
                        Err(_) => warn!("Ignoring page number {:?}", input),
                    }
                }
            }

            Action::PageJumpCancel => {
                if let Some(dataset) = self.active_dataset_mut() {
                    dataset.table.page_input = None;
                }
            }

            Action::LinkLeft => {
                if let Some(dataset) = self.active_dataset_mut() {
                    let len = dataset.controller.view().links.as_ref().map_or(0, Vec::len);
                    dataset.table.link_left(len);
                }
            }

            Action::LinkRight => {
                if let Some(dataset) = self.active_dataset_mut() {
                    let len = dataset.controller.view().links.as_ref().map_or(0, Vec::len);
                    dataset.table.link_right(len);
                }
            }

            Action::FollowLink => {
                if let Some(dataset) = self.active_dataset_mut() {
                    if dataset.controller.follow_link(dataset.table.link) {
                        dataset.rendered();
                    }
                }
            }

            // Detail panels
            Action::ToggleDetail => {
                if let Some(dataset) = self.active_dataset_mut() {
                    if let Some(slot) = dataset.table.selected {
                        dataset.controller.toggle_detail(slot);
                    }
                }
            }

            Action::ToggleRawDetail => {
                if let Some(dataset) = self.active_dataset_mut() {
                    if let Some(slot) = dataset.table.selected {
                        dataset.controller.toggle_raw(slot);
                    }
                }
            }

            // Search
            Action::OpenSearch => {
                if let Some(dataset) = self.active_dataset_mut() {
                    dataset.filters.open_search();
                }
            }

            Action::CloseSearch => {
                if let Some(dataset) = self.active_dataset_mut() {
                    dataset.filters.cancel_search();
                }
            }

            Action::SearchInput(c) => {
                if let Some(dataset) = self.active_dataset_mut() {
                    dataset.filters.input(c);
                }
            }

            Action::SearchBackspace => {
                if let Some(dataset) = self.active_dataset_mut() {
                    dataset.filters.backspace();
                }
            }

            Action::SearchSubmit => {
                if let Some(dataset) = self.active_dataset_mut() {
                    if dataset.filters.submit_search() {
                        dataset.apply_filters();
                    }
                }
            }

            // Filter panel
            Action::ToggleFilters => {
                if let Some(dataset) = self.active_dataset_mut() {
                    dataset.filters.visible = !dataset.filters.visible;
                }
            }

            Action::FilterFocusNext => {
                if let Some(dataset) = self.active_dataset_mut() {
                    dataset.filters.focus_next();
                }
            }

            Action::FilterFocusPrev => {
                if let Some(dataset) = self.active_dataset_mut() {
                    dataset.filters.focus_previous();
                }
            }

            Action::FilterIncrease => {
                if let Some(dataset) = self.active_dataset_mut() {
                    if dataset.filters.increase(&dataset.controls) {
                        dataset.apply_filters();
                    }
                }
            }

            Action::FilterDecrease => {
                if let Some(dataset) = self.active_dataset_mut() {
                    if dataset.filters.decrease(&dataset.controls) {
                        dataset.apply_filters();
                    }
                }
            }

            Action::ResetFilters => {
                if let Some(dataset) = self.active_dataset_mut() {
                    dataset.filters.reset(&dataset.controls);
                    dataset.table.header = 0;
                    let baseline = dataset.filters.criteria(&dataset.controls);
                    dataset.controller.on_reset(baseline);
                    dataset.rendered();
                }
            }

            // Charts
            Action::ToggleCharts => {
                self.show_charts = !self.show_charts;
            }

            // Job progress
            Action::WatchJob(job_id) => {
                self.watch_job(job_id);
            }

            Action::ProgressUpdated(job_id, update) => {
                // Reports from a stopped or replaced poller are stale
                if self.poller.as_ref().map(PollHandle::job_id) != Some(job_id.as_str()) {
                    debug!("Ignoring progress for inactive job {}", job_id);
                    return Ok(());
                }
                self.busy.set_progress(update.percent(), update.status.clone());
                if update.done {
                    info!("Job finished: {}", update.status);
                    self.poller = None;
                    self.finish_busy();
                }
            }

            Action::StopPolling => {
                self.stop_polling();
                self.finish_busy();
            }

            // Overlays
            Action::ShowHelp => {
                self.show_help = true;
            }

            Action::HideHelp => {
                self.show_help = false;
            }

            // Errors
            Action::ClearError => {
                self.error_message = None;
            }

            Action::None => {}
        }

        Ok(())
    }

    fn with_page(&mut self, step: fn(&mut ViewController)) {
        if let Some(dataset) = self.active_dataset_mut() {
            step(&mut dataset.controller);
            dataset.rendered();
        }
    }

    /// Read and prepare a snapshot in the background.
    fn load_snapshot(&mut self, path: PathBuf) {
        self.pending_loads += 1;
        self.busy
            .show("Loading data...", path.display().to_string(), true);

        let tx = self.action_tx.clone();
        let chunk_size = self.config.view.load_chunk_size;
        tokio::spawn(async move {
            let progress_tx = tx.clone();
            let result = data::snapshot::load(&path, chunk_size, move |progress| {
                let _ = progress_tx.send(Action::LoadProgress(progress));
            })
            .await;

            let action = match result {
                Ok(snapshot) => Action::SnapshotLoaded(Box::new(snapshot)),
                Err(e) => {
                    error!("Failed to load snapshot {}: {}", path.display(), e);
                    Action::SnapshotFailed(e.to_string())
                }
            };
            let _ = tx.send(action);
        });
    }

    /// Add a loaded snapshot, replacing any dataset of the same kind.
    fn install_snapshot(&mut self, snapshot: Snapshot) {
        let kind = snapshot.store.kind();
        let dataset = Dataset::new(snapshot, self.config.page_size());

        match self.datasets.iter().position(|d| d.kind() == kind) {
            Some(index) => self.datasets[index] = dataset,
            None => {
                self.datasets.push(dataset);
                self.datasets.sort_by_key(Dataset::kind);
            }
        }

        self.active = self
            .datasets
            .iter()
            .position(|d| d.kind() == kind)
            .unwrap_or_default();
    }

    /// Start polling a server-side job, replacing any running poller.
    fn watch_job(&mut self, job_id: String) {
        if !self.config.has_server() {
            self.error_message = Some(String::from(
                "No progress server configured. Set [server] url or pass --server.",
            ));
            return;
        }

        self.stop_polling();
        self.busy
            .show("Syncing data...", format!("Job {}", job_id), true);

        // Never let one request outlive a few poll intervals
        let timeout = self.config.poll_interval() * 5;
        let source = match ProgressClient::new(&self.config.server.url, timeout) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                error!("Failed to create progress client: {}", e);
                self.error_message = Some(e.to_string());
                self.finish_busy();
                return;
            }
        };

        let tx = self.action_tx.clone();
        let id = job_id.clone();
        let handle = poller::spawn(source, job_id, self.config.poll_interval(), move |update| {
            let _ = tx.send(Action::ProgressUpdated(id.clone(), update));
        });
        self.poller = Some(handle);
    }

    fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.take() {
            info!("Stopping progress polling for {}", poller.job_id());
            poller.stop();
        }
    }

    /// Hide the busy indicator once nothing is in flight.
    fn finish_busy(&mut self) {
        if self.pending_loads == 0 && self.poller.is_none() {
            self.busy.hide();
        }
    }
}
