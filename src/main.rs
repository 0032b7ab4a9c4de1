use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{stdout, Stdout},
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;

use tetris::{app::App, settings::Settings, ui};

/// How long to block on input while no gravity timer is scheduled
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Parser)]
#[command(name = "tetris", about = "Falling-block puzzle game for the terminal")]
struct Args {
    /// Settings file (defaults to $TETRIS_CONFIG or the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible piece sequence
    #[arg(long)]
    seed: Option<u64>,

    /// Gravity interval in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Log file path
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// ============================================================================
// Setup
// ============================================================================

fn init_logging(path: Option<PathBuf>) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let path = path.unwrap_or_else(|| std::env::temp_dir().join("tetris").join("tetris.log"));
    let dir = path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .context("log file path has no file name")?
        .to_owned();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log dir {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tetris=debug"));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    tracing::info!(log = %path.display(), "tetris starting up");
    Ok(guard)
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        settings.gameplay.seed = Some(seed);
    }
    if let Some(tick_ms) = args.tick_ms {
        settings.gameplay.tick_ms = tick_ms;
    }
    Ok(settings.sanitized())
}

// ============================================================================
// Main Loop
// ============================================================================

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    while !app.should_quit() {
        terminal.draw(|frame| ui::render(frame, &app.game, app.keymap()))?;

        let timeout = app.poll_timeout(Instant::now(), IDLE_POLL);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key, Instant::now());
            }
        }

        app.update(Instant::now());
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(args.log_file.clone())?;

    let settings = load_settings(&args)?;
    tracing::info!(
        rows = settings.gameplay.rows,
        cols = settings.gameplay.cols,
        tick_ms = settings.gameplay.tick_ms,
        seed = ?settings.gameplay.seed,
        "settings loaded"
    );
    let mut app = App::from_settings(&settings);

    enable_raw_mode().context("failed to enable raw mode")?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run(&mut terminal, &mut app);

    // Restore the terminal before reporting any loop error
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "event loop failed");
    }
    tracing::info!(score = app.game.score(), lines = app.game.lines(), "shutting down");
    result
}
