//! tickbox - a terminal to-do list client.
//!
//! Signs in against the to-do backend (cookie or bearer transport), restores
//! an existing session at start-up and gives a keyboard-driven list view.

mod app;
mod ui;
mod utils;

use std::io;
use std::panic;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tickbox_core::auth::TokenCache;
use tickbox_core::{spawn_bootstrap, ApiClient, Config, SessionStore, TodoStore, TransportMode};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE: &str = "tickbox.log";

/// Initialize the tracing subscriber. Logs go to a file in the cache
/// directory since stderr is hidden behind the alternate screen.
fn init_tracing(cache_dir: &Path) -> Result<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    std::fs::create_dir_all(cache_dir)?;
    let appender = tracing_appender::rolling::never(cache_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Ok(guard)
}

/// Leave raw mode and the alternate screen
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)
}

/// Put the terminal back before the default hook prints the panic message,
/// otherwise it is lost in the alternate screen.
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load()
        .unwrap_or_else(|e| {
            eprintln!("Warning: {:#}. Using default configuration.", e);
            Config::default()
        })
        .with_env_overrides()?;
    let cache_dir = config.cache_dir()?;

    let _log_guard = init_tracing(&cache_dir)?;
    info!(backend = %config.backend_url, transport = %config.transport, "tickbox starting");

    let tokens = match config.transport {
        TransportMode::Bearer => {
            let tokens = TokenCache::persistent(&cache_dir);
            match tokens.load() {
                Ok(true) => info!("Restored saved tokens"),
                Ok(false) => {}
                Err(e) => warn!(error = %e, "Ignoring unreadable token file"),
            }
            tokens
        }
        TransportMode::Cookie => TokenCache::in_memory(),
    };

    let api = ApiClient::new(
        &config.backend_url,
        config.transport,
        config.request_timeout(),
        tokens,
    )?;
    let session = Arc::new(SessionStore::new(api.clone()));
    let todos = Arc::new(TodoStore::new(api));

    let mut app = App::new(config, session.clone(), todos);
    spawn_bootstrap(session);

    // Setup terminal
    install_panic_hook();
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    restore_terminal()?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("tickbox shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Pick up store changes and finished background work
        app.sync();

        terminal.draw(|f| render(f, app))?;

        // Poll with a timeout so background updates keep drawing
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
