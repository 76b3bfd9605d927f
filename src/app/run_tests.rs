use super::*;
use crate::bus::PageDirectory;
use crate::domain::settings::{Settings, SettingsStore};
use crate::infrastructure::settings_file::FileSettingsStore;
use crate::orchestrator::Orchestrator;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use std::sync::Arc;

// Terminal-friendly bindings; the TestBackend has no Cmd key to press.
fn test_settings() -> Settings {
    Settings {
        tab_switcher_shortcut: "Ctrl+K".into(),
        command_palette_shortcut: "Ctrl+P".into(),
        blocked_sites: Vec::new(),
    }
}

struct Stack {
    sim: SimBrowser,
    events: mpsc::Sender<Result<Event, std::io::Error>>,
    task: tokio::task::JoinHandle<Result<()>>,
    _dir: tempfile::TempDir,
}

impl Stack {
    /// The whole system, end to end: real settings file, orchestrator task,
    /// simulated browser, and the demo loop drawing into a test backend.
    async fn start(settings: Settings) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::at(dir.path().join("settings.toml"));
        store.save(&settings).await.unwrap();

        let pages = PageDirectory::new();
        let sim = SimBrowser::new(pages.clone());
        sim.seed_tab("GitHub - pull requests", "https://github.com/pulls");
        sim.seed_tab("Quarterly Report - Google Docs", "https://docs.google.com/d/1");

        let runtime = Orchestrator::new(Arc::new(sim.clone()), Arc::new(store), pages)
            .with_probe_wait(Duration::from_millis(50))
            .spawn();
        sim.connect_runtime(runtime.clone());

        let (event_tx, event_rx) = mpsc::channel(100);
        let loop_sim = sim.clone();
        let task = tokio::spawn(async move {
            let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
            run_loop_with_events(&mut terminal, AppState::default(), loop_sim, runtime, event_rx)
                .await
        });

        Self {
            sim,
            events: event_tx,
            task,
            _dir: dir,
        }
    }

    async fn press(&self, code: KeyCode, modifiers: KeyModifiers) {
        self.events
            .send(Ok(Event::Key(KeyEvent::new(code, modifiers))))
            .await
            .unwrap();
    }

    async fn type_str(&self, text: &str) {
        for c in text.chars() {
            self.press(KeyCode::Char(c), KeyModifiers::NONE).await;
        }
    }

    async fn wait_until(&self, what: &str, pred: impl Fn(&SimBrowser) -> bool) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while !pred(&self.sim) {
            if tokio::time::Instant::now() >= deadline {
                panic!("timed out waiting for: {what}");
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

fn overlay_visible(sim: &SimBrowser) -> bool {
    sim.snapshot()
        .page
        .and_then(|p| p.overlay)
        .is_some_and(|o| o.visible)
}

fn overlay_gone(sim: &SimBrowser) -> bool {
    sim.snapshot().page.is_some_and(|p| p.overlay.is_none())
}

#[tokio::test]
async fn shortcut_opens_the_tab_switcher_and_escape_closes_it() {
    let stack = Stack::start(test_settings()).await;

    stack.press(KeyCode::Char('k'), KeyModifiers::CONTROL).await;
    stack
        .wait_until("tab switcher with both tabs listed", |sim| {
            sim.snapshot()
                .page
                .and_then(|p| p.overlay)
                .is_some_and(|o| {
                    o.visible
                        && o.mode == crate::domain::models::PaletteMode::TabSwitcher
                        && o.palette.rows.len() == 2
                })
        })
        .await;
    assert!(stack.sim.snapshot().page.unwrap().scroll_locked);

    stack.press(KeyCode::Esc, KeyModifiers::NONE).await;
    stack.wait_until("overlay removed after the fade", overlay_gone).await;
    assert!(!stack.sim.snapshot().page.unwrap().scroll_locked);
}

#[tokio::test]
async fn pressing_the_shortcut_again_toggles_the_palette_away() {
    let stack = Stack::start(test_settings()).await;

    stack.press(KeyCode::Char('k'), KeyModifiers::CONTROL).await;
    stack.wait_until("palette shown", overlay_visible).await;

    // The chord is observed by the page even while the palette input has
    // focus, so the same keystroke closes it.
    stack.press(KeyCode::Char('k'), KeyModifiers::CONTROL).await;
    stack
        .wait_until("palette hidden again", |sim| !overlay_visible(sim))
        .await;
}

#[tokio::test]
async fn typing_filters_and_enter_switches_the_active_tab() {
    let stack = Stack::start(test_settings()).await;
    assert_eq!(stack.sim.active_tab().unwrap().title, "GitHub - pull requests");

    stack.press(KeyCode::Char('k'), KeyModifiers::CONTROL).await;
    stack.wait_until("palette shown", overlay_visible).await;

    stack.type_str("docs").await;
    stack
        .wait_until("filtered down to the docs tab", |sim| {
            sim.snapshot()
                .page
                .and_then(|p| p.overlay)
                .is_some_and(|o| o.palette.rows.len() == 1 && o.palette.query == "docs")
        })
        .await;

    stack.press(KeyCode::Enter, KeyModifiers::NONE).await;
    stack
        .wait_until("active tab switched", |sim| {
            sim.active_tab()
                .is_some_and(|tab| tab.title.contains("Google Docs"))
        })
        .await;
    stack.wait_until("palette closed after the switch", overlay_gone).await;
}

#[tokio::test]
async fn blocked_sites_never_show_the_palette() {
    let stack = Stack::start(Settings {
        blocked_sites: vec!["github.com".into()],
        ..test_settings()
    })
    .await;

    stack.press(KeyCode::Char('k'), KeyModifiers::CONTROL).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(stack.sim.snapshot().page.unwrap().overlay.is_none());
}

#[tokio::test]
async fn reloaded_page_gets_a_fresh_agent_on_the_next_shortcut() {
    let stack = Stack::start(test_settings()).await;

    stack.press(KeyCode::Char('k'), KeyModifiers::CONTROL).await;
    stack.wait_until("palette shown", overlay_visible).await;
    stack.press(KeyCode::Esc, KeyModifiers::NONE).await;
    stack.wait_until("palette removed", overlay_gone).await;

    // Reload strands the injected agent; the next shortcut has to go
    // through the injection fallback.
    stack.press(KeyCode::Char('r'), KeyModifiers::CONTROL).await;
    stack.press(KeyCode::Char('k'), KeyModifiers::CONTROL).await;
    stack
        .wait_until("palette shown after re-injection", overlay_visible)
        .await;
}

#[tokio::test]
async fn toolbar_opens_the_general_command_palette() {
    let stack = Stack::start(test_settings()).await;

    stack.press(KeyCode::F(2), KeyModifiers::NONE).await;
    stack
        .wait_until("command catalog shown", |sim| {
            sim.snapshot()
                .page
                .and_then(|p| p.overlay)
                .is_some_and(|o| {
                    o.visible
                        && o.mode == crate::domain::models::PaletteMode::General
                        && o.palette.rows.len() == 5
                })
        })
        .await;
}

#[tokio::test]
async fn new_tab_command_creates_and_activates_a_tab() {
    let stack = Stack::start(test_settings()).await;

    stack.press(KeyCode::F(2), KeyModifiers::NONE).await;
    stack.wait_until("palette shown", overlay_visible).await;
    stack.type_str("new tab").await;
    stack
        .wait_until("narrowed to one command", |sim| {
            sim.snapshot()
                .page
                .and_then(|p| p.overlay)
                .is_some_and(|o| o.palette.rows.len() == 1)
        })
        .await;
    stack.press(KeyCode::Enter, KeyModifiers::NONE).await;

    stack
        .wait_until("new tab opened and active", |sim| {
            sim.active_tab()
                .is_some_and(|tab| tab.url == "browser://newtab/")
        })
        .await;
    assert_eq!(stack.sim.snapshot().tabs.len(), 3);
}

#[tokio::test]
async fn quit_key_ends_the_loop() {
    let stack = Stack::start(test_settings()).await;
    stack.press(KeyCode::Char('q'), KeyModifiers::CONTROL).await;
    let result = tokio::time::timeout(Duration::from_secs(2), stack.task)
        .await
        .expect("loop should exit")
        .unwrap();
    assert!(result.is_ok());
}
