//! livescroll-news — a live-updating news viewer for the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  get()   ┌──────────┐  draw()  ┌──────────┐
//! │  Cache   │ ◄─────── │  app.rs  │ ───────► │  ui.rs   │
//! │ (thread) │          │ (state)  │          │ (render) │
//! └──────────┘          └──────────┘          └──────────┘
//!                            ▲
//!                            │ handle_key_event()
//!                       ┌──────────┐
//!                       │ input.rs │
//!                       └──────────┘
//! ```
//!
//! * **`livescroll_news`** (the library) — providers, caches and wiring.
//! * **`app`** — owns viewer state (current page, selection, status).
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations.
//! * **`main`** — parse args, set up logging and the terminal, run the loop.

mod app;
mod input;
mod ui;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use app::App;
use livescroll_news::config::Config;
use livescroll_news::{FeedKind, Feeds};

#[derive(Debug, Parser)]
#[command(version, about = "Live-scrolling Telegram / Discord news viewer")]
struct Args {
    /// Path to the JSON config file.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Which feed to display.
    #[arg(long, value_enum, default_value_t = FeedKind::Combined)]
    feed: FeedKind,

    /// Where to write logs; the terminal belongs to the UI.
    #[arg(long, default_value = "livescroll-news.log")]
    log_file: PathBuf,

    /// Items per page (1–100).
    #[arg(long, default_value_t = 10)]
    page_size: usize,
}

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the panic message is printed.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn load_config(path: &Path) -> Result<Config> {
    match Config::load(path) {
        Ok(config) => Ok(config),
        Err(e) if e.is_missing() => {
            warn!(path = %path.display(), "config not found, all feeds will be empty");
            Ok(Config::default())
        }
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let config = load_config(&args.config)?;
    let feeds = Feeds::from_config(&config.news)?;

    // Each cache fetches once here, so the first frame already has data.
    feeds.start()?;
    info!(feed = ?args.feed, "feeds started");

    let result = run(&feeds, &args);
    feeds.shutdown();
    result
}

fn run(feeds: &Feeds, args: &Args) -> Result<()> {
    install_panic_hook();

    let label = format!("{:?}", args.feed).to_lowercase();
    let mut app = App::new(feeds.reader(args.feed), label, args.page_size);
    let mut guard = TerminalGuard::new()?;

    // ~10 fps.  Each iteration re-reads the page from the cache, renders,
    // then waits up to one tick for input.
    let tick_rate = Duration::from_millis(100);

    loop {
        app.refresh();
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    Ok(())
}
