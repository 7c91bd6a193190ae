//! Application bootstrap and navigation wiring.
//!
//! Builds the router against the real DOM, drives it from history state,
//! `[data-route]` click delegation and `popstate`, and exposes the handful
//! of entry points dynamically loaded view scripts call back into
//! (`navigate`, `destroyGameSession`, the game state flags).

use crate::dom;
use crate::fetcher::BrowserFetcher;
use crate::host::DomHost;
use crate::runner::DomScriptRunner;
use crate::storage::BrowserStorage;
use nexora_views::{GAME_LOADER_FILE, GameStateManager, NavSequence, Route, StorageError, ViewRouter};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, UrlSearchParams};

type Router = ViewRouter<DomHost, BrowserFetcher, DomScriptRunner>;

/// Single-slot queue of the most recent navigation request. A burst of
/// requests collapses to the last one; whoever holds the router drains it.
#[derive(Clone, Default)]
struct NavQueue(Rc<RefCell<Option<Route>>>);

impl NavQueue {
    fn push(&self, route: Route) {
        *self.0.borrow_mut() = Some(route);
    }

    fn take(&self) -> Option<Route> {
        self.0.borrow_mut().take()
    }
}

/// The router plus the handles that must stay reachable while a navigation
/// holds the router borrowed across its fetch.
#[derive(Clone)]
struct AppHandle {
    router: Rc<RefCell<Router>>,
    seq: NavSequence,
    queue: NavQueue,
}

thread_local! {
    static APP: RefCell<Option<AppHandle>> = const { RefCell::new(None) };
}

/// Boot the application: bind the router to the page shell and wire up
/// navigation sources.
///
/// # Errors
/// Returns an error if the page shell is missing required elements or
/// browser storage is unavailable.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let app = build_app()?;
    APP.with(|slot| *slot.borrow_mut() = Some(app.clone()));

    wire_click_delegation(&app)?;
    wire_popstate(&app)?;
    wire_unload()?;
    dispatch_initial_route(&app);
    Ok(())
}

fn build_app() -> Result<AppHandle, JsValue> {
    let host = DomHost::new()?;
    let local = BrowserStorage::local().map_err(storage_to_js)?;
    let session = BrowserStorage::session().map_err(storage_to_js)?;
    let game_state = GameStateManager::new(Box::new(local), Box::new(session));

    let mut router = ViewRouter::new(host, BrowserFetcher::new(), DomScriptRunner, game_state);
    router.register_persistent(GAME_LOADER_FILE);
    let seq = router.sequence();
    Ok(AppHandle {
        router: Rc::new(RefCell::new(router)),
        seq,
        queue: NavQueue::default(),
    })
}

fn storage_to_js(err: StorageError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Navigate to a route, optionally pushing a history entry first.
///
/// Requests never get lost: the route lands in the queue, and if a previous
/// navigation still holds the router across its fetch, bumping the sequence
/// makes it return `Superseded` at its next await point, after which the
/// task holding the borrow drains the queue.
fn navigate_to(app: &AppHandle, route: Route, push: bool) {
    app.seq.begin();
    if push {
        if let Ok(history) = dom::window().history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(route.as_path()));
        }
    }
    app.queue.push(route);

    let app = app.clone();
    spawn_local(async move {
        let Ok(mut guard) = app.router.try_borrow_mut() else {
            // The task already driving the router picks the request up.
            return;
        };
        while let Some(next) = app.queue.take() {
            let outcome = guard.navigate(next.view_file()).await;
            log::debug!("navigated to {}: {outcome:?}", next.as_path());
        }
    });
}

fn wire_click_delegation(app: &AppHandle) -> Result<(), JsValue> {
    let app = app.clone();
    let closure = Closure::wrap(Box::new(move |event: web_sys::MouseEvent| {
        let Some(target) = event.target() else {
            return;
        };
        let Ok(element) = target.dyn_into::<Element>() else {
            return;
        };
        let Ok(Some(link)) = element.closest("[data-route]") else {
            return;
        };
        event.prevent_default();
        let Some(path) = link.get_attribute("data-route") else {
            return;
        };
        let route = Route::from_path(&path).unwrap_or(Route::Home);
        navigate_to(&app, route, true);
    }) as Box<dyn FnMut(web_sys::MouseEvent)>);
    dom::document().add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn wire_popstate(app: &AppHandle) -> Result<(), JsValue> {
    let app = app.clone();
    let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
        let path = dom::window()
            .location()
            .pathname()
            .unwrap_or_else(|_| "/".to_string());
        let route = Route::from_path(&path).unwrap_or(Route::Home);
        navigate_to(&app, route, false);
    }) as Box<dyn FnMut(web_sys::Event)>);
    dom::window().add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn wire_unload() -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
        // Game sessions do not survive leaving the site.
        with_router(|router| router.clear_session_on_unload());
    }) as Box<dyn FnMut(web_sys::Event)>);
    dom::window()
        .add_event_listener_with_callback("beforeunload", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn dispatch_initial_route(app: &AppHandle) {
    let location = dom::window().location();
    let search = location.search().unwrap_or_default();
    if let Some(route) = redirect_route(&search) {
        navigate_to(app, route, false);
        return;
    }
    let path = location.pathname().unwrap_or_else(|_| "/".to_string());
    navigate_to(app, Route::from_path(&path).unwrap_or(Route::Home), false);
}

/// Disguise pages bounce back with `?route=/games`; honor the target and
/// scrub the marker from the address bar.
fn redirect_route(search: &str) -> Option<Route> {
    let params = UrlSearchParams::new_with_str(search).ok()?;
    let target = params.get("route")?;
    params.delete("route");
    let route = Route::from_path(&target).unwrap_or(Route::Home);

    let remaining = String::from(params.to_string());
    let clean_url = if remaining.is_empty() {
        route.as_path().to_string()
    } else {
        format!("{}?{remaining}", route.as_path())
    };
    if let Ok(history) = dom::window().history() {
        let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(&clean_url));
    }
    Some(route)
}

fn with_router(f: impl FnOnce(&mut Router)) {
    APP.with(|slot| {
        if let Some(app) = slot.borrow().as_ref() {
            if let Ok(mut guard) = app.router.try_borrow_mut() {
                f(&mut guard);
            }
        }
    });
}

/// Programmatic navigation for dynamically loaded view scripts.
#[wasm_bindgen(js_name = navigate)]
pub fn navigate(path: &str) {
    let route = Route::from_path(path).unwrap_or(Route::Home);
    APP.with(|slot| {
        if let Some(app) = slot.borrow().as_ref() {
            navigate_to(app, route, true);
        }
    });
}

/// Tear down the game loader and forget the play session.
#[wasm_bindgen(js_name = destroyGameSession)]
pub fn destroy_game_session() {
    with_router(|router| router.destroy_game_session());
}

/// Record that a game started playing.
#[wasm_bindgen(js_name = saveGameState)]
pub fn save_game_state(game: JsValue) {
    let payload = js_sys::JSON::stringify(&game)
        .ok()
        .map(String::from)
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or(serde_json::Value::Null);
    #[allow(clippy::cast_possible_truncation)]
    let timestamp = js_sys::Date::now() as i64;
    with_router(move |router| router.game_state_mut().save_state(payload, timestamp));
}

/// Keep the play record but mark it no longer playing.
#[wasm_bindgen(js_name = pauseGameState)]
pub fn pause_game_state() {
    with_router(|router| router.game_state_mut().pause_state());
}

/// Whether a game is currently marked as playing.
#[wasm_bindgen(js_name = hasActiveGame)]
pub fn has_active_game() -> bool {
    let mut active = false;
    with_router(|router| active = router.game_state().has_active_game());
    active
}

/// Arm or disarm the one-shot autoplay flag.
#[wasm_bindgen(js_name = setAutoplay)]
pub fn set_autoplay(should_autoplay: bool) {
    with_router(|router| router.game_state_mut().set_autoplay(should_autoplay));
}

/// Check and consume the autoplay flag.
#[wasm_bindgen(js_name = shouldAutoplay)]
pub fn should_autoplay() -> bool {
    let mut armed = false;
    with_router(|router| armed = router.game_state_mut().take_autoplay());
    armed
}
