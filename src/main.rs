use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;

use quickpal::app::{run::run_loop, state::AppState};
use quickpal::bus::PageDirectory;
use quickpal::infrastructure::settings_file::FileSettingsStore;
use quickpal::infrastructure::sim::SimBrowser;
use quickpal::orchestrator::Orchestrator;

fn setup_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Logs go to a file; stdout belongs to the terminal UI.
fn init_logging() -> Result<()> {
    let path = std::env::temp_dir().join("quickpal.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quickpal=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file)
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_panic_hook();
    init_logging()?;

    // Wire the system up BEFORE terminal setup so a failure (e.g. an
    // unreadable settings file path) doesn't leave the terminal in raw mode.
    let settings = FileSettingsStore::open_default()?;
    let pages = PageDirectory::new();
    let sim = SimBrowser::new(pages.clone());
    sim.seed_tab("Quarterly Report - Google Docs", "https://docs.google.com/d/1");
    sim.seed_tab("GitHub - pull requests", "https://github.com/pulls");
    sim.seed_tab("Example Domain", "https://www.example.com/");
    sim.seed_tab("Settings", "browser://settings/");

    let runtime = Orchestrator::new(Arc::new(sim.clone()), Arc::new(settings), pages).spawn();
    sim.connect_runtime(runtime.clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = run_loop(&mut terminal, AppState::default(), sim, runtime).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}
