//! Navigation orchestration.
//!
//! `navigate` drives the whole view lifecycle: cleanup hooks for the view
//! being left, the persistent fast path (re-show a stashed view with zero
//! network), fragment fetch, head asset injection, body injection with
//! scripts stripped, and ordered script replay.
//!
//! Concurrency: the engine is single-threaded and event-loop driven. Within
//! one `navigate` call the steps run in order; across calls, each navigation
//! takes a token from a shared monotonically increasing sequence and any
//! result arriving after a newer token was issued is discarded, so a slow
//! fetch can never overwrite a faster, later navigation.

use crate::FragmentFetcher;
use crate::assets::AssetManager;
use crate::fragment::ParsedFragment;
use crate::game_state::GameStateManager;
use crate::host::{RenderTarget, ViewHost};
use crate::persistent::PersistentViewStore;
use crate::scripts::{ScriptLoader, ScriptRunner};
use crate::view::ViewName;
use std::cell::Cell;
use std::rc::Rc;

/// The one view the site keeps alive across navigation.
pub const GAME_LOADER_FILE: &str = "gameloader.html";

/// Shared navigation sequence. Cloning hands out another handle to the same
/// counter; bumping it invalidates every in-flight navigation.
#[derive(Debug, Clone, Default)]
pub struct NavSequence(Rc<Cell<u64>>);

impl NavSequence {
    /// Start a navigation, superseding all earlier ones. Returns the new
    /// navigation's token.
    pub fn begin(&self) -> u64 {
        let token = self.0.get() + 1;
        self.0.set(token);
        token
    }

    #[must_use]
    pub fn is_current(&self, token: u64) -> bool {
        self.0.get() == token
    }
}

/// How a `navigate` call concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Fetched fresh and displayed.
    Loaded,
    /// Re-shown from a persistent stash; no network.
    Restored,
    /// A newer navigation started before this one finished; its result was
    /// discarded.
    Superseded,
    /// The fragment fetch failed; the generic error view was rendered.
    Failed,
}

/// Teardown callback a view registers before being navigated away from
/// (cancel timers, close sockets). Hooks run once, at the start of the next
/// navigation, and are then dropped.
pub type CleanupHook = Box<dyn FnOnce()>;

/// The view router. Owns the host adapter, the persistent registry, the
/// asset tracker, and the game session flags; everything reachable from one
/// place rather than module-level globals, so tests construct isolated
/// routers freely.
pub struct ViewRouter<H, F, R>
where
    H: ViewHost,
    F: FragmentFetcher,
    R: ScriptRunner,
{
    host: H,
    fetcher: F,
    scripts: ScriptLoader<R>,
    persistent: PersistentViewStore,
    assets: AssetManager,
    game_state: GameStateManager,
    cleanups: Vec<(String, CleanupHook)>,
    seq: NavSequence,
}

impl<H, F, R> ViewRouter<H, F, R>
where
    H: ViewHost,
    F: FragmentFetcher,
    R: ScriptRunner,
{
    pub fn new(host: H, fetcher: F, runner: R, game_state: GameStateManager) -> Self {
        Self {
            host,
            fetcher,
            scripts: ScriptLoader::new(runner),
            persistent: PersistentViewStore::new(),
            assets: AssetManager::new(),
            game_state,
            cleanups: Vec::new(),
            seq: NavSequence::default(),
        }
    }

    /// Mark a view file as persistent: its content survives navigation away.
    pub fn register_persistent(&mut self, file: &str) {
        self.persistent.register(file);
    }

    /// Register a teardown hook for the view currently displayed. All
    /// pending hooks run at the start of the next navigation.
    pub fn register_cleanup(&mut self, owner: &str, hook: CleanupHook) {
        self.cleanups.push((owner.to_string(), hook));
    }

    /// A handle to the navigation sequence, for embedders that need to
    /// invalidate in-flight navigations.
    #[must_use]
    pub fn sequence(&self) -> NavSequence {
        self.seq.clone()
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn persistent(&self) -> &PersistentViewStore {
        &self.persistent
    }

    #[must_use]
    pub fn game_state(&self) -> &GameStateManager {
        &self.game_state
    }

    pub fn game_state_mut(&mut self) -> &mut GameStateManager {
        &mut self.game_state
    }

    /// Navigate to a view: restore it from its stash if persistent and
    /// stashed, otherwise fetch and display it.
    pub async fn navigate(&mut self, file: &str) -> Navigation {
        let token = self.seq.begin();
        self.run_cleanup_hooks();

        let view = ViewName::from_file(file);
        let is_persistent = self.persistent.is_persistent(file);

        if is_persistent {
            // Hide and mute every other persistent stash first.
            for other in self.persistent.others(file) {
                let other_view = ViewName::from_file(&other);
                self.host.suspend_stash_audio(&other_view);
                self.host.hide_stash(&other_view);
            }

            if self.host.stash_has_content(&view) {
                return self.restore_from_stash(file, &view);
            }
        } else {
            self.leave_persistent_views();
            self.host.show_main();
        }

        // The previous non-persistent view's stylesheets go before the new
        // fragment arrives.
        self.assets.clear_current(&mut self.host);

        let target = if is_persistent {
            // The stash has to exist before the loading marker can go on it.
            self.persistent.ensure_stash(&mut self.host, file);
            RenderTarget::Stash(view.clone())
        } else {
            RenderTarget::Main
        };
        self.host.set_loading(&target, true);

        let html = match self.fetcher.fetch_fragment(file).await {
            Ok(html) => html,
            Err(err) => {
                log::error!("{err}");
                self.assets.clear_current(&mut self.host);
                self.host.set_loading(&target, false);
                self.render_error(file);
                return Navigation::Failed;
            }
        };
        if !self.seq.is_current(token) {
            // A faster navigation won; this fragment is stale.
            self.host.set_loading(&target, false);
            return Navigation::Superseded;
        }

        let fragment = ParsedFragment::parse(&html);
        let handles = AssetManager::inject(&mut self.host, &view, &fragment.assets);
        if is_persistent {
            self.persistent.add_assets(file, &handles);
        } else {
            self.assets.set_current(handles.clone());
        }

        if is_persistent {
            self.host.set_html(&target, &fragment.body_html);
            self.host.show_stash(&view);
            self.host.hide_main();
            self.persistent.mark_mounted(file);
            self.game_state.mark_dom_active();
        } else {
            self.host.set_html(&target, &fragment.body_html);
        }
        self.host.set_active_view_class(&view);

        self.host.assets_settled(&handles).await;
        self.host.set_loading(&target, false);

        if !self.seq.is_current(token) {
            return Navigation::Superseded;
        }
        self.scripts.run(&fragment.scripts).await;
        Navigation::Loaded
    }

    /// Tear a persistent view down: stash, assets, and game DOM flags, as
    /// one operation from the caller's perspective.
    pub fn destroy_view(&mut self, file: &str) {
        self.persistent.destroy(&mut self.host, file);
        self.game_state.clear_dom_state();
        self.game_state.set_autoplay(false);
    }

    /// End the game session entirely: destroy the loader view, forget the
    /// play record and current-game selection, and re-show the main
    /// container.
    pub fn destroy_game_session(&mut self) {
        self.destroy_view(GAME_LOADER_FILE);
        self.game_state.clear_state();
        self.game_state.clear_current_game();
        self.host.show_main();
    }

    /// Clear session flags when the page is being left.
    pub fn clear_session_on_unload(&mut self) {
        self.game_state.clear_state();
        self.game_state.clear_dom_state();
        self.game_state.clear_current_game();
    }

    fn restore_from_stash(&mut self, file: &str, view: &ViewName) -> Navigation {
        let target = RenderTarget::Stash(view.clone());
        self.host.hide_main();
        self.host.set_loading(&target, true);
        self.host.show_stash(view);
        self.host.resume_stash_audio(view);
        self.host.set_active_view_class(view);
        self.persistent.mark_mounted(file);
        self.game_state.mark_dom_active();
        // Restores never autoplay; the one-shot flag only fires on fresh mounts.
        self.game_state.set_autoplay(false);
        self.host.set_loading(&target, false);
        Navigation::Restored
    }

    /// Hide (and mute) every persistent stash before showing a
    /// non-persistent view.
    fn leave_persistent_views(&mut self) {
        let had_live = self.persistent.active().is_some();
        for file in self.persistent.files() {
            let view = ViewName::from_file(&file);
            self.host.suspend_stash_audio(&view);
            self.host.hide_stash(&view);
        }
        self.persistent.deactivate_all();
        if had_live {
            // The subtree is still alive, just detached.
            self.game_state.mark_dom_dormant();
        }
    }

    fn run_cleanup_hooks(&mut self) {
        for (owner, hook) in self.cleanups.drain(..) {
            log::debug!("running cleanup hook for {owner}");
            hook();
        }
    }

    fn render_error(&mut self, file: &str) {
        self.host.show_main();
        self.host.set_active_view_class(&ViewName::from_file("error"));
        self.host.set_html(
            &RenderTarget::Main,
            &format!("<h1 class=\"site-title\">Error</h1>\n<p>Failed to load {file}.</p>"),
        );
    }
}
