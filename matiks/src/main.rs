//! matiks - user activity and revenue dashboard
//!
//! Terminal UI for filtering a user-activity export and exploring its KPIs,
//! trends, breakdowns and churn insights.

mod app;
mod cli;
mod ui;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use matiks_core::Config;
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::app::App;

#[derive(Parser, Debug)]
#[command(name = "matiks")]
#[command(about = "Interactive user activity and revenue dashboard")]
#[command(version)]
struct Args {
    /// Dataset CSV (default: dataset.path from config)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Fixed reference time for inactivity (default: now)
    #[arg(long)]
    now: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging (to file, not stdout since we have a TUI)
    let _log_guard =
        matiks_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("matiks TUI starting up");

    let source = cli::dataset_path(args.data, &config);
    let fixed_now = cli::resolve_now(args.now.as_deref())?;

    // Load before touching the terminal so errors print normally
    let mut app = App::new(source, fixed_now, config.insights.clone())?;
    tracing::info!(
        path = %app.source().display(),
        records = app.loaded.dataset.len(),
        "Dashboard ready"
    );

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    tracing::info!("matiks TUI shutting down");

    result
}

/// Run the main application loop.
fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Poll counter for source change detection (every 10 ticks = ~1 second)
    let mut poll_counter = 0u32;

    loop {
        poll_counter += 1;
        if poll_counter >= 10 {
            poll_counter = 0;

            if app.check_for_updates() {
                if let Err(e) = app.reload() {
                    tracing::warn!(error = %e, "Automatic reload failed");
                    app.status = Some(format!("Reload failed: {e:#}"));
                }
            }
        }

        app.tick();

        // Render
        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle events
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
