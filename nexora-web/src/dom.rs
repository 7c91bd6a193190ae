use js_sys::{Function, Promise};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Response, Storage, Window};

/// Retrieve the global `window` object.
///
/// # Panics
/// Panics if executed outside of a browser context where `window` is unavailable.
#[must_use]
pub fn window() -> Window {
    web_sys::window().expect("`window` should be available in web context")
}

/// Retrieve the document object for DOM interactions.
///
/// # Panics
/// Panics when the document cannot be accessed from the current browser window.
#[must_use]
pub fn document() -> Document {
    window()
        .document()
        .expect("`document` should exist in browser context")
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Perform a fetch request and return the browser `Response`.
///
/// # Errors
/// Returns an error if the fetch request fails or the response cannot be converted to `Response`.
#[allow(clippy::future_not_send)] // Wasm futures rely on `JsFuture`, which is not `Send`.
pub async fn fetch_response(url: &str) -> Result<Response, JsValue> {
    let resp_value = JsFuture::from(window().fetch_with_str(url)).await?;
    resp_value.dyn_into::<Response>()
}

/// Fetch a URL and return the response body as text.
///
/// # Errors
/// Returns an error if the fetch fails or the body cannot be read as text.
#[allow(clippy::future_not_send)]
pub async fn fetch_text(url: &str) -> Result<String, JsValue> {
    let response = fetch_response(url).await?;
    let text = JsFuture::from(response.text()?).await?;
    text.as_string()
        .ok_or_else(|| JsValue::from_str("response body was not text"))
}

/// Access the browser `localStorage` handle.
///
/// # Errors
/// Returns an error if the browser window cannot be accessed or `localStorage` is unavailable.
pub fn local_storage() -> Result<Storage, JsValue> {
    window()
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("localStorage unavailable"))
}

/// Access the browser `sessionStorage` handle.
///
/// # Errors
/// Returns an error if the browser window cannot be accessed or `sessionStorage` is unavailable.
pub fn session_storage() -> Result<Storage, JsValue> {
    window()
        .session_storage()?
        .ok_or_else(|| JsValue::from_str("sessionStorage unavailable"))
}

/// A promise that resolves when `target` fires `load` or `error`, or after
/// `timeout_ms` elapses, whichever comes first.
///
/// # Errors
/// Returns an error if the listeners or the timer cannot be installed.
pub fn settled_promise(target: &web_sys::EventTarget, timeout_ms: i32) -> Result<Promise, JsValue> {
    let mut resolve_slot: Option<Function> = None;
    let promise = Promise::new(&mut |resolve, _reject| {
        resolve_slot = Some(resolve);
    });
    let resolve =
        resolve_slot.ok_or_else(|| JsValue::from_str("resolve function should be set"))?;

    let listener = Closure::wrap(Box::new({
        let resolve = resolve.clone();
        move || {
            let _ = resolve.call0(&JsValue::UNDEFINED);
        }
    }) as Box<dyn FnMut()>);
    target.add_event_listener_with_callback("load", listener.as_ref().unchecked_ref())?;
    target.add_event_listener_with_callback("error", listener.as_ref().unchecked_ref())?;

    // The timer always fires: it resolves late waiters and tears down the
    // event listener, so nothing outlives the timeout.
    let timer = Closure::once({
        let target = target.clone();
        move || {
            let _ = target
                .remove_event_listener_with_callback("load", listener.as_ref().unchecked_ref());
            let _ = target
                .remove_event_listener_with_callback("error", listener.as_ref().unchecked_ref());
            drop(listener);
            let _ = resolve.call0(&JsValue::UNDEFINED);
        }
    });
    let _ = window().set_timeout_with_callback_and_timeout_and_arguments_0(
        timer.as_ref().unchecked_ref(),
        timeout_ms,
    )?;
    timer.forget();

    Ok(promise)
}
