//! Full navigation scenarios against the in-memory host.

use async_trait::async_trait;
use nexora_views::host::memory::{AudioEvent, MemoryHost};
use nexora_views::{
    FetchError, FragmentFetcher, GAME_LOADER_FILE, GameStateManager, MemoryStore, Navigation,
    RenderTarget, ScriptError, ScriptRunner, ScriptTag, ViewName, ViewRouter,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

struct StubFetcher {
    pages: HashMap<String, String>,
    calls: Rc<RefCell<Vec<String>>>,
}

#[async_trait(?Send)]
impl FragmentFetcher for StubFetcher {
    async fn fetch_fragment(&self, file: &str) -> Result<String, FetchError> {
        self.calls.borrow_mut().push(file.to_string());
        self.pages
            .get(file)
            .cloned()
            .ok_or_else(|| FetchError::new(file, "not found"))
    }
}

#[derive(Default)]
struct RecordingRunner {
    ran: Rc<RefCell<Vec<String>>>,
}

#[async_trait(?Send)]
impl ScriptRunner for RecordingRunner {
    async fn run_external(&self, script: &ScriptTag) -> Result<(), ScriptError> {
        self.ran.borrow_mut().push(script.label().to_string());
        Ok(())
    }

    fn run_inline(&self, script: &ScriptTag) -> Result<(), ScriptError> {
        self.ran.borrow_mut().push(script.text.trim().to_string());
        Ok(())
    }
}

fn page(title: &str, css: &str, body: &str) -> String {
    format!(
        "<html><head><link rel=\"stylesheet\" href=\"{css}\"><title>{title}</title></head>\
         <body>{body}<script src=\"/js/{title}.js\"></script></body></html>"
    )
}

struct Fixture {
    router: ViewRouter<MemoryHost, StubFetcher, RecordingRunner>,
    calls: Rc<RefCell<Vec<String>>>,
    ran: Rc<RefCell<Vec<String>>>,
}

fn fixture() -> Fixture {
    let mut pages = HashMap::new();
    pages.insert(
        "home.html".to_string(),
        page("home", "/css/home.css", "<h1>Welcome</h1>"),
    );
    pages.insert(
        "games.html".to_string(),
        page("games", "/css/games.css", "<div id=\"games\"></div>"),
    );
    pages.insert(
        "gameloader.html".to_string(),
        page(
            "gameloader",
            "/css/gameloader.css",
            "<iframe src=\"/play/slope\"></iframe>",
        ),
    );

    let calls = Rc::new(RefCell::new(Vec::new()));
    let ran = Rc::new(RefCell::new(Vec::new()));
    let fetcher = StubFetcher {
        pages,
        calls: Rc::clone(&calls),
    };
    let runner = RecordingRunner {
        ran: Rc::clone(&ran),
    };
    let game_state =
        GameStateManager::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()));
    let mut router = ViewRouter::new(MemoryHost::new(), fetcher, runner, game_state);
    router.register_persistent(GAME_LOADER_FILE);
    Fixture { router, calls, ran }
}

fn fetches_of(calls: &Rc<RefCell<Vec<String>>>, file: &str) -> usize {
    calls.borrow().iter().filter(|c| c.as_str() == file).count()
}

#[tokio::test]
async fn non_persistent_views_always_refetch() {
    let mut fx = fixture();
    assert_eq!(fx.router.navigate("home.html").await, Navigation::Loaded);
    assert_eq!(fx.router.navigate("games.html").await, Navigation::Loaded);
    assert_eq!(fx.router.navigate("home.html").await, Navigation::Loaded);
    assert_eq!(fetches_of(&fx.calls, "home.html"), 2);
}

#[tokio::test]
async fn navigation_injects_body_and_runs_scripts() {
    let mut fx = fixture();
    fx.router.navigate("games.html").await;
    let host = fx.router.host();
    assert!(host.main_html().contains("id=\"games\""));
    assert!(!host.main_html().contains("<script"));
    assert_eq!(host.body_class(), Some("view-games"));
    assert_eq!(*fx.ran.borrow(), vec!["/js/games.js".to_string()]);
}

#[tokio::test]
async fn persistent_view_round_trip_restores_identical_content() {
    let mut fx = fixture();
    let loader = ViewName::from_file(GAME_LOADER_FILE);

    fx.router.navigate("games.html").await;
    assert_eq!(fx.router.navigate(GAME_LOADER_FILE).await, Navigation::Loaded);

    let host = fx.router.host();
    assert!(!host.main_visible());
    assert!(host.stash_visible(&loader));
    assert!(!host.is_loading(&RenderTarget::Stash(loader.clone())));
    let stashed = host.stash_html(&loader).unwrap().to_string();
    assert!(stashed.contains("/play/slope"));
    let handles_before = host.asset_handles_for(&loader);

    // Navigate away: the loader is hidden and muted, not torn down.
    fx.router.navigate("home.html").await;
    let host = fx.router.host();
    assert!(host.main_visible());
    assert!(!host.stash_visible(&loader));
    assert!(host.stash_audio_suspended(&loader));

    // Return: restored from the stash with zero network calls.
    assert_eq!(
        fx.router.navigate(GAME_LOADER_FILE).await,
        Navigation::Restored
    );
    let host = fx.router.host();
    assert_eq!(fetches_of(&fx.calls, GAME_LOADER_FILE), 1);
    assert_eq!(host.stash_html(&loader).unwrap(), stashed);
    assert!(!host.stash_audio_suspended(&loader));
    assert_eq!(host.asset_handles_for(&loader), handles_before);
    assert!(
        host.audio_events
            .contains(&AudioEvent::Resumed(loader.clone()))
    );
}

#[tokio::test]
async fn liveness_tag_follows_mount_state() {
    use nexora_views::DomLiveness;
    let mut fx = fixture();
    fx.router.navigate(GAME_LOADER_FILE).await;
    assert_eq!(
        fx.router.game_state().dom_liveness(),
        Some(DomLiveness::Active)
    );
    fx.router.navigate("home.html").await;
    assert_eq!(
        fx.router.game_state().dom_liveness(),
        Some(DomLiveness::Dormant)
    );
    fx.router.navigate(GAME_LOADER_FILE).await;
    assert_eq!(
        fx.router.game_state().dom_liveness(),
        Some(DomLiveness::Active)
    );
}

#[tokio::test]
async fn destroyed_view_is_fetched_fresh() {
    let mut fx = fixture();
    let loader = ViewName::from_file(GAME_LOADER_FILE);

    fx.router.navigate(GAME_LOADER_FILE).await;
    fx.router.navigate("home.html").await;
    fx.router.destroy_view(GAME_LOADER_FILE);

    let host = fx.router.host();
    assert!(!host.has_stash(&loader));
    assert_eq!(host.asset_count_for(&loader), 0);
    assert!(!fx.router.game_state().has_dom());

    assert_eq!(fx.router.navigate(GAME_LOADER_FILE).await, Navigation::Loaded);
    assert_eq!(fetches_of(&fx.calls, GAME_LOADER_FILE), 2);
}

#[tokio::test]
async fn asset_ownership_ends_with_the_view() {
    let mut fx = fixture();
    let games = ViewName::from_file("games.html");
    fx.router.navigate("games.html").await;
    assert_eq!(fx.router.host().asset_count_for(&games), 1);

    fx.router.navigate("home.html").await;
    let host = fx.router.host();
    assert_eq!(host.asset_count_for(&games), 0);
    assert_eq!(host.asset_count_for(&ViewName::from_file("home.html")), 1);
}

#[tokio::test]
async fn fetch_failure_renders_error_view() {
    let mut fx = fixture();
    assert_eq!(fx.router.navigate("missing.html").await, Navigation::Failed);
    let host = fx.router.host();
    assert!(host.main_visible());
    assert!(host.main_html().contains("Failed to load missing.html"));
    assert_eq!(host.body_class(), Some("view-error"));
    assert_eq!(host.total_asset_count(), 0);
}

#[tokio::test]
async fn cleanup_hooks_run_once_on_next_navigation() {
    let mut fx = fixture();
    fx.router.navigate("games.html").await;

    let ran = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&ran);
    fx.router
        .register_cleanup("games.html", Box::new(move || *counter.borrow_mut() += 1));

    fx.router.navigate("home.html").await;
    assert_eq!(*ran.borrow(), 1);
    fx.router.navigate("games.html").await;
    assert_eq!(*ran.borrow(), 1);
}

#[tokio::test]
async fn restore_disarms_autoplay() {
    let mut fx = fixture();
    fx.router.navigate(GAME_LOADER_FILE).await;
    fx.router.navigate("home.html").await;
    fx.router.game_state_mut().set_autoplay(true);

    fx.router.navigate(GAME_LOADER_FILE).await;
    assert!(!fx.router.game_state_mut().take_autoplay());
}

#[tokio::test]
async fn destroy_game_session_clears_everything() {
    let mut fx = fixture();
    fx.router.navigate(GAME_LOADER_FILE).await;
    fx.router
        .game_state_mut()
        .save_state(serde_json::json!({"id": "slope"}), 42);

    fx.router.destroy_game_session();

    let loader = ViewName::from_file(GAME_LOADER_FILE);
    assert!(!fx.router.host().has_stash(&loader));
    assert!(fx.router.host().main_visible());
    assert!(!fx.router.game_state().has_active_game());
    assert!(!fx.router.game_state().has_dom());
}
