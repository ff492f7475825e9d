//! spiffy-tui - A terminal explorer for Spotify library snapshots.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use tokio::sync::mpsc;

mod action;
mod app;
mod config;
mod data;
mod progress;
mod tui;
mod ui;
mod view;

use action::Action;
use app::App;
use config::Config;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "spiffy-tui")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Snapshot files to open (override the configured list)
    snapshots: Vec<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Progress server URL (overrides config)
    #[arg(short, long)]
    server: Option<String>,

    /// Watch the progress of a server-side sync job
    #[arg(short, long)]
    watch_job: Option<String>,

    /// Rows per page: 25, 50, 100 or 0 for all (overrides config)
    #[arg(short, long)]
    page_size: Option<usize>,
}

/// Log file location, shared with the panic report.
pub(crate) fn log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("spiffy-tui")
        .join("spiffy-tui.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install panic hooks
    tui::install_hooks()?;

    // Initialize logging
    let log_file = log_path();

    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_subscriber::fmt::layer()
        .with_writer(std::fs::File::create(&log_file)?)
        .with_ansi(false);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::sink) // Don't write to stdout in TUI mode
        .finish()
        .with(file_appender)
        .try_init()
        .ok();

    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_default(),
    };

    // Apply command-line overrides
    if !args.snapshots.is_empty() {
        config.data.snapshots = args.snapshots;
    }
    if let Some(server) = args.server {
        config.server.url = server;
    }
    if let Some(page_size) = args.page_size {
        config.view.page_size = page_size;
    }
    config.normalize();

    // Create action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    // Create application
    let mut app = App::new(config, action_tx.clone());

    // Initialize terminal
    let mut terminal = tui::init()?;

    // Initialize application
    app.init()?;
    if let Some(job_id) = args.watch_job {
        action_tx.send(Action::WatchJob(job_id))?;
    }

    // Main event loop
    let tick_rate = Duration::from_millis(100);

    loop {
        // Render UI
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        // Handle events with timeout
        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press {
                        let action = handle_key_event(key.code, key.modifiers, &app);
                        if action != Action::None {
                            action_tx.send(action)?;
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    let action = handle_mouse_event(mouse);
                    if action != Action::None {
                        action_tx.send(action)?;
                    }
                }
                Event::Resize(width, height) => {
                    action_tx.send(Action::Resize(width, height))?;
                }
                _ => {}
            }
        }

        // Send tick action
        action_tx.send(Action::Tick)?;

        // Process all pending actions
        while let Ok(action) = action_rx.try_recv() {
            app.handle_action(action).await?;
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    tui::restore()?;

    Ok(())
}

/// Map key events to actions.
fn handle_key_event(code: KeyCode, modifiers: KeyModifiers, app: &App) -> Action {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    // Busy overlay blocks everything but cancelling the watched job
    if app.busy.visible {
        return match code {
            KeyCode::Esc if app.poller.is_some() => Action::StopPolling,
            KeyCode::Char('q') => Action::Quit,
            _ => Action::None,
        };
    }

    // Text input modes
    if app.is_searching() {
        return handle_search_key(code);
    }

    if app.is_jumping() {
        return handle_page_jump_key(code);
    }

    // Handle help overlay
    if app.show_help {
        return match code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => Action::HideHelp,
            _ => Action::None,
        };
    }

    // Handle error popup
    if app.error_message.is_some() {
        return match code {
            KeyCode::Esc | KeyCode::Char('x') => Action::ClearError,
            KeyCode::Char('q') => Action::Quit,
            _ => Action::None,
        };
    }

    // Filter panel keys take precedence while it is open
    if app.filters_visible() {
        match code {
            KeyCode::Tab => return Action::FilterFocusNext,
            KeyCode::BackTab => return Action::FilterFocusPrev,
            KeyCode::Left | KeyCode::Char('h') => return Action::FilterDecrease,
            KeyCode::Right | KeyCode::Char('l') => return Action::FilterIncrease,
            KeyCode::Esc => return Action::ToggleFilters,
            _ => {}
        }
    }

    // Normal mode keys
    match code {
        KeyCode::Char('q') => Action::Quit,

        // Rows
        KeyCode::Up | KeyCode::Char('k') => Action::NavigateUp,
        KeyCode::Down | KeyCode::Char('j') => Action::NavigateDown,
        KeyCode::Enter => Action::ToggleDetail,
        KeyCode::Char('J') => Action::ToggleRawDetail,

        // Columns and sorting
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('<') => Action::HeaderLeft,
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('>') => Action::HeaderRight,
        KeyCode::Char('s') => Action::SortByHeader,

        // Pages
        KeyCode::Char('n') | KeyCode::PageDown => Action::NextPage,
        KeyCode::Char('p') | KeyCode::PageUp => Action::PreviousPage,
        KeyCode::Char('g') | KeyCode::Home => Action::FirstPage,
        KeyCode::Char('G') | KeyCode::End => Action::LastPage,
        KeyCode::Char(':') => Action::OpenPageJump,
        KeyCode::Char('z') => Action::CyclePageSize,
        KeyCode::Char('[') => Action::LinkLeft,
        KeyCode::Char(']') => Action::LinkRight,
        KeyCode::Char('o') => Action::FollowLink,

        // Datasets
        KeyCode::Char(c @ '1'..='3') => Action::SelectDataset(c as usize - '1' as usize),
        KeyCode::Tab => Action::NextDataset,
        KeyCode::BackTab => Action::PrevDataset,

        // Filters
        KeyCode::Char('/') => Action::OpenSearch,
        KeyCode::Char('f') => Action::ToggleFilters,
        KeyCode::Char('R') => Action::ResetFilters,

        // Charts
        KeyCode::Char('c') => Action::ToggleCharts,

        // Help
        KeyCode::Char('?') => Action::ShowHelp,

        // Clear error
        KeyCode::Char('x') => Action::ClearError,

        _ => Action::None,
    }
}

/// Handle key events while the search box is open.
fn handle_search_key(code: KeyCode) -> Action {
    match code {
        KeyCode::Esc => Action::CloseSearch,
        KeyCode::Enter => Action::SearchSubmit,
        KeyCode::Backspace => Action::SearchBackspace,
        KeyCode::Char(c) => Action::SearchInput(c),
        _ => Action::None,
    }
}

/// Handle key events while a page number is typed.
fn handle_page_jump_key(code: KeyCode) -> Action {
    match code {
        KeyCode::Esc => Action::PageJumpCancel,
        KeyCode::Enter => Action::PageJumpSubmit,
        KeyCode::Backspace => Action::PageJumpBackspace,
        KeyCode::Char(c) => Action::PageJumpInput(c),
        _ => Action::None,
    }
}

/// Handle mouse events.
fn handle_mouse_event(mouse: crossterm::event::MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollUp => Action::NavigateUp,
        MouseEventKind::ScrollDown => Action::NavigateDown,
        _ => Action::None,
    }
}

use tracing_subscriber::prelude::*;
