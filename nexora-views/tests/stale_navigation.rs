//! A fetch that resolves after a newer navigation began must be discarded.

use async_trait::async_trait;
use nexora_views::host::memory::MemoryHost;
use nexora_views::{
    FetchError, FragmentFetcher, GameStateManager, MemoryStore, NavSequence, Navigation,
    RenderTarget, ScriptError, ScriptRunner, ScriptTag, ViewName, ViewRouter,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Simulates a competing navigation starting while the fetch is in flight by
/// bumping the router's navigation sequence before resolving.
struct RacingFetcher {
    seq: Rc<RefCell<Option<NavSequence>>>,
}

#[async_trait(?Send)]
impl FragmentFetcher for RacingFetcher {
    async fn fetch_fragment(&self, file: &str) -> Result<String, FetchError> {
        if let Some(seq) = self.seq.borrow_mut().take() {
            seq.begin();
        }
        Ok(format!("<body><p>{file}</p></body>"))
    }
}

struct NoopRunner;

#[async_trait(?Send)]
impl ScriptRunner for NoopRunner {
    async fn run_external(&self, _script: &ScriptTag) -> Result<(), ScriptError> {
        Ok(())
    }

    fn run_inline(&self, _script: &ScriptTag) -> Result<(), ScriptError> {
        Ok(())
    }
}

#[tokio::test]
async fn superseded_fetch_never_touches_the_container() {
    let seq_slot = Rc::new(RefCell::new(None));
    let fetcher = RacingFetcher {
        seq: Rc::clone(&seq_slot),
    };
    let game_state =
        GameStateManager::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()));
    let mut router = ViewRouter::new(MemoryHost::new(), fetcher, NoopRunner, game_state);
    *seq_slot.borrow_mut() = Some(router.sequence());

    assert_eq!(
        router.navigate("games.html").await,
        Navigation::Superseded
    );
    let host = router.host();
    assert_eq!(host.main_html(), "");
    assert_eq!(
        host.asset_count_for(&ViewName::from_file("games.html")),
        0
    );
    assert_ne!(host.body_class(), Some("view-games"));
    assert!(!host.is_loading(&RenderTarget::Main));
}

#[tokio::test]
async fn newer_route_lands_after_superseding_a_slow_fetch() {
    let seq_slot = Rc::new(RefCell::new(None));
    let fetcher = RacingFetcher {
        seq: Rc::clone(&seq_slot),
    };
    let game_state =
        GameStateManager::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()));
    let mut router = ViewRouter::new(MemoryHost::new(), fetcher, NoopRunner, game_state);
    *seq_slot.borrow_mut() = Some(router.sequence());

    // The slower navigation is discarded, then the request that superseded
    // it goes through and renders its own content.
    assert_eq!(router.navigate("games.html").await, Navigation::Superseded);
    assert_eq!(router.navigate("movies.html").await, Navigation::Loaded);
    let host = router.host();
    assert!(host.main_html().contains("movies.html"));
    assert!(!host.main_html().contains("games.html"));
    assert_eq!(host.body_class(), Some("view-movies"));
}

#[tokio::test]
async fn uncontested_navigation_still_lands() {
    let seq_slot = Rc::new(RefCell::new(None));
    let fetcher = RacingFetcher {
        seq: Rc::clone(&seq_slot),
    };
    let game_state =
        GameStateManager::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()));
    let mut router = ViewRouter::new(MemoryHost::new(), fetcher, NoopRunner, game_state);

    assert_eq!(router.navigate("games.html").await, Navigation::Loaded);
    assert!(router.host().main_html().contains("games.html"));
}
