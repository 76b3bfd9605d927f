use super::*;
use crate::domain::browser::MockBrowserHost;
use crate::domain::models::WindowId;
use crate::domain::settings::{MockSettingsStore, Settings};
use mockall::Sequence;
use std::sync::Mutex;

fn tab(id: u32, url: &str) -> TabInfo {
    TabInfo {
        id: TabId(id),
        window: WindowId(1),
        title: format!("tab {id}"),
        url: url.to_string(),
        fav_icon_url: None,
    }
}

fn default_settings_store() -> MockSettingsStore {
    let mut store = MockSettingsStore::new();
    store.expect_load().returning(|| Ok(Settings::default()));
    store
}

/// Registers a scripted in-tab agent and returns the log of everything the
/// orchestrator sent it.
fn recording_agent(
    pages: &PageDirectory,
    tab: TabId,
    visible: bool,
) -> Arc<Mutex<Vec<AgentRequest>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&log);
    let (tx, mut rx) = mpsc::channel::<crate::bus::AgentEnvelope>(8);
    pages.register(tab, tx);
    tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            seen.lock().unwrap().push(envelope.request.clone());
            let response = match envelope.request {
                AgentRequest::IsAlive => AgentResponse::Ready {
                    visible,
                    mode: PaletteMode::General,
                },
                _ => AgentResponse::Ack("ok"),
            };
            let _ = envelope.reply.send(response);
        }
    });
    log
}

fn spawn_orchestrator(host: MockBrowserHost, settings: MockSettingsStore) -> (RuntimeHandle, PageDirectory) {
    let pages = PageDirectory::new();
    let handle = Orchestrator::new(Arc::new(host), Arc::new(settings), pages.clone())
        .with_probe_wait(Duration::from_millis(50))
        .spawn();
    (handle, pages)
}

#[tokio::test]
async fn unbound_chord_is_no_match() {
    let host = MockBrowserHost::new();
    let (handle, _pages) = spawn_orchestrator(host, default_settings_store());

    let status = handle
        .execute_shortcut("Cmd+J".into(), tab(1, "https://example.com/"))
        .await
        .unwrap();
    assert_eq!(status, ShortcutStatus::NoMatch);
}

#[tokio::test]
async fn chord_matching_ignores_case_and_modifier_order() {
    let host = MockBrowserHost::new();
    let (handle, pages) = spawn_orchestrator(host, default_settings_store());
    let log = recording_agent(&pages, TabId(1), false);

    // Default binding is "Cmd+Shift+P"; the relayed form differs in both
    // order and case but must still resolve.
    let status = handle
        .execute_shortcut("shift+cmd+p".into(), tab(1, "https://example.com/"))
        .await
        .unwrap();
    assert_eq!(status, ShortcutStatus::Executed);
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            AgentRequest::IsAlive,
            AgentRequest::TogglePalette {
                mode: PaletteMode::General
            },
        ]
    );
}

#[tokio::test]
async fn blocked_site_short_circuits_before_any_page_message() {
    let mut host = MockBrowserHost::new();
    host.expect_inject_agent().times(0);
    let mut settings = MockSettingsStore::new();
    settings.expect_load().returning(|| {
        Ok(Settings {
            blocked_sites: vec!["example.com".into()],
            ..Settings::default()
        })
    });
    let (handle, pages) = spawn_orchestrator(host, settings);
    let log = recording_agent(&pages, TabId(1), false);

    let status = handle
        .execute_shortcut("Cmd+K".into(), tab(1, "https://www.example.com/page"))
        .await
        .unwrap();
    assert_eq!(status, ShortcutStatus::Blocked);
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_blocked_site_patterns_match_nothing() {
    let host = MockBrowserHost::new();
    let mut settings = MockSettingsStore::new();
    settings.expect_load().returning(|| {
        Ok(Settings {
            blocked_sites: vec!["".into(), "   ".into()],
            ..Settings::default()
        })
    });
    let (handle, pages) = spawn_orchestrator(host, settings);
    let log = recording_agent(&pages, TabId(1), false);

    let status = handle
        .execute_shortcut("Cmd+K".into(), tab(1, "https://example.com/"))
        .await
        .unwrap();
    assert_eq!(status, ShortcutStatus::Executed);
    assert!(!log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn live_agent_gets_a_toggle_and_no_injection() {
    let mut host = MockBrowserHost::new();
    host.expect_inject_agent().times(0);
    let (handle, pages) = spawn_orchestrator(host, default_settings_store());
    let log = recording_agent(&pages, TabId(2), true);

    let status = handle
        .execute_shortcut("Cmd+K".into(), tab(2, "https://docs.google.com/d/1"))
        .await
        .unwrap();
    assert_eq!(status, ShortcutStatus::Executed);
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            AgentRequest::IsAlive,
            AgentRequest::TogglePalette {
                mode: PaletteMode::TabSwitcher
            },
        ]
    );
}

#[tokio::test]
async fn silent_tab_is_injected_exactly_once_then_initialized() {
    let pages = PageDirectory::new();
    let injected: Arc<Mutex<Option<Arc<Mutex<Vec<AgentRequest>>>>>> =
        Arc::new(Mutex::new(None));

    let mut host = MockBrowserHost::new();
    let pages_for_inject = pages.clone();
    let injected_slot = Arc::clone(&injected);
    host.expect_inject_agent()
        .times(1)
        .returning(move |target| {
            let log = recording_agent(&pages_for_inject, target.id, false);
            *injected_slot.lock().unwrap() = Some(log);
            Ok(())
        });

    let handle = Orchestrator::new(
        Arc::new(host),
        Arc::new(default_settings_store()),
        pages.clone(),
    )
    .with_probe_wait(Duration::from_millis(50))
    .spawn();

    let status = handle
        .execute_shortcut("Cmd+K".into(), tab(3, "https://example.com/"))
        .await
        .unwrap();
    assert_eq!(status, ShortcutStatus::Executed);

    let log = injected.lock().unwrap().clone().unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec![AgentRequest::InitPalette {
            mode: PaletteMode::TabSwitcher
        }]
    );
}

#[tokio::test]
async fn restricted_page_injection_refusal_still_counts_as_handled() {
    let mut host = MockBrowserHost::new();
    host.expect_inject_agent().times(1).returning(|target| {
        Err(InjectError::RestrictedUrl(target.url.clone()))
    });
    let (handle, _pages) = spawn_orchestrator(host, default_settings_store());

    let status = handle
        .execute_shortcut("Cmd+K".into(), tab(4, "browser://settings/"))
        .await
        .unwrap();
    assert_eq!(status, ShortcutStatus::Executed);
}

#[tokio::test]
async fn settings_are_read_live_on_every_dispatch() {
    let host = MockBrowserHost::new();
    let mut settings = MockSettingsStore::new();
    let mut seq = Sequence::new();
    settings
        .expect_load()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(Settings::default()));
    settings
        .expect_load()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| {
            Ok(Settings {
                tab_switcher_shortcut: "Ctrl+Space".into(),
                ..Settings::default()
            })
        });
    let (handle, pages) = spawn_orchestrator(host, settings);
    let _log = recording_agent(&pages, TabId(5), false);

    // Bound under the defaults, unbound after the store changes.
    let first = handle
        .execute_shortcut("Cmd+K".into(), tab(5, "https://example.com/"))
        .await
        .unwrap();
    assert_eq!(first, ShortcutStatus::Executed);

    let second = handle
        .execute_shortcut("Cmd+K".into(), tab(5, "https://example.com/"))
        .await
        .unwrap();
    assert_eq!(second, ShortcutStatus::NoMatch);
}

#[tokio::test]
async fn settings_load_failure_reports_an_error_status() {
    let host = MockBrowserHost::new();
    let mut settings = MockSettingsStore::new();
    settings
        .expect_load()
        .returning(|| Err(anyhow::anyhow!("disk on fire")));
    let (handle, _pages) = spawn_orchestrator(host, settings);

    let status = handle
        .execute_shortcut("Cmd+K".into(), tab(6, "https://example.com/"))
        .await
        .unwrap();
    assert!(matches!(status, ShortcutStatus::Error(msg) if msg.contains("disk on fire")));
}

#[tokio::test]
async fn tab_query_fills_in_missing_favicons_for_http_pages() {
    let mut host = MockBrowserHost::new();
    host.expect_query_tabs().returning(|| {
        Ok(vec![
            TabInfo {
                fav_icon_url: Some("https://example.com/favicon.ico".into()),
                ..tab(1, "https://example.com/")
            },
            tab(2, "https://docs.google.com/d/1"),
            tab(3, "browser://history/"),
        ])
    });
    let (handle, _pages) = spawn_orchestrator(host, default_settings_store());

    let hits = handle.query_tabs().await.unwrap();
    assert_eq!(
        hits[0].fav_icon_url.as_deref(),
        Some("https://example.com/favicon.ico")
    );
    let synthesized = hits[1].fav_icon_url.as_deref().unwrap();
    assert!(synthesized.starts_with("https://www.google.com/s2/favicons"));
    assert!(synthesized.contains("docs.google.com"));
    assert_eq!(hits[2].fav_icon_url, None);
}

#[tokio::test]
async fn switch_activates_tab_then_focuses_its_window() {
    let mut host = MockBrowserHost::new();
    let mut seq = Sequence::new();
    host.expect_activate_tab()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(WindowId(9)));
    host.expect_focus_window()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|window| *window == WindowId(9))
        .returning(|_| Ok(()));
    let (handle, _pages) = spawn_orchestrator(host, default_settings_store());

    assert!(handle.switch_to_tab(TabId(8)).await.unwrap());
}

#[tokio::test]
async fn switch_to_closed_tab_reports_failure() {
    let mut host = MockBrowserHost::new();
    host.expect_activate_tab()
        .returning(|tab| Err(anyhow::anyhow!("no tab with id {tab}")));
    let (handle, _pages) = spawn_orchestrator(host, default_settings_store());

    assert!(!handle.switch_to_tab(TabId(404)).await.unwrap());
}

#[tokio::test]
async fn focus_refusal_does_not_fail_the_switch() {
    let mut host = MockBrowserHost::new();
    host.expect_activate_tab().returning(|_| Ok(WindowId(1)));
    host.expect_focus_window()
        .returning(|_| Err(anyhow::anyhow!("window manager said no")));
    let (handle, _pages) = spawn_orchestrator(host, default_settings_store());

    assert!(handle.switch_to_tab(TabId(1)).await.unwrap());
}

#[tokio::test]
async fn general_commands_open_their_internal_pages() {
    use crate::domain::models::CommandAction;

    let opened = Arc::new(Mutex::new(Vec::new()));
    let mut host = MockBrowserHost::new();
    let sink = Arc::clone(&opened);
    host.expect_create_tab().times(3).returning(move |url| {
        sink.lock().unwrap().push(url);
        Ok(TabId(99))
    });
    let (handle, _pages) = spawn_orchestrator(host, default_settings_store());

    assert!(handle.perform_general(CommandAction::ShowBookmarks).await.unwrap());
    assert!(handle.perform_general(CommandAction::ShowHistory).await.unwrap());
    assert!(handle.perform_general(CommandAction::OpenNewTab).await.unwrap());
    assert_eq!(
        *opened.lock().unwrap(),
        vec![
            Some("browser://bookmarks/".to_string()),
            Some("browser://history/".to_string()),
            None,
        ]
    );
}

#[tokio::test]
async fn devtools_is_not_a_privileged_call() {
    use crate::domain::models::CommandAction;

    // No host expectations at all; reaching the mailbox would panic.
    let host = MockBrowserHost::new();
    let (handle, _pages) = spawn_orchestrator(host, default_settings_store());

    assert!(!handle.perform_general(CommandAction::OpenDevTools).await.unwrap());
}

#[tokio::test]
async fn close_palette_forwards_a_remove_to_the_tab() {
    let host = MockBrowserHost::new();
    let (handle, pages) = spawn_orchestrator(host, default_settings_store());
    let log = recording_agent(&pages, TabId(11), true);

    let response = handle
        .request(RuntimeRequest::ClosePalette { tab: TabId(11) })
        .await
        .unwrap();
    assert_eq!(
        response,
        RuntimeResponse::Done {
            success: true,
            error: None
        }
    );
    assert_eq!(*log.lock().unwrap(), vec![AgentRequest::RemovePalette]);
}

#[tokio::test]
async fn shortcut_round_trip_through_a_real_settings_file() {
    use crate::infrastructure::settings_file::FileSettingsStore;

    let dir = tempfile::tempdir().unwrap();
    let store = FileSettingsStore::at(dir.path().join("settings.toml"));
    store
        .save(&Settings {
            tab_switcher_shortcut: "Ctrl+K".into(),
            ..Settings::default()
        })
        .await
        .unwrap();

    let pages = PageDirectory::new();
    let log = recording_agent(&pages, TabId(1), false);
    let handle = Orchestrator::new(
        Arc::new(MockBrowserHost::new()),
        Arc::new(store),
        pages.clone(),
    )
    .with_probe_wait(Duration::from_millis(50))
    .spawn();

    let status = handle
        .execute_shortcut("ctrl+k".into(), tab(1, "https://example.com/"))
        .await
        .unwrap();
    assert_eq!(status, ShortcutStatus::Executed);
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            AgentRequest::IsAlive,
            AgentRequest::TogglePalette {
                mode: PaletteMode::TabSwitcher
            },
        ]
    );
}
