//! Iframe audio suspension for hidden game views.
//!
//! Hiding a stash does not stop the game inside its iframe from playing
//! sound. For same-origin iframes we fake a `visibilitychange` (so the
//! game's own pause logic kicks in), suspend any audio contexts the game
//! exposed, and pause playing media elements, remembering which ones to
//! resume. Cross-origin iframes cannot be reached; that is expected and
//! not an error.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Event, HtmlIFrameElement, HtmlMediaElement};

const WAS_PLAYING_ATTR: &str = "data-was-playing";

pub fn suspend_iframe_audio(iframe: &HtmlIFrameElement) {
    if let Err(err) = signal_visibility(iframe, false) {
        log::debug!("cannot suspend iframe audio (cross-origin): {err:?}");
    }
}

pub fn resume_iframe_audio(iframe: &HtmlIFrameElement) {
    if let Err(err) = signal_visibility(iframe, true) {
        log::debug!("cannot resume iframe audio (cross-origin): {err:?}");
    }
}

fn signal_visibility(iframe: &HtmlIFrameElement, visible: bool) -> Result<(), JsValue> {
    let document = iframe
        .content_document()
        .ok_or_else(|| JsValue::from_str("no same-origin document"))?;

    // Make the iframe's document report the new visibility before the event
    // fires, so handlers reading `document.hidden` see a consistent state.
    define_value(
        document.unchecked_ref(),
        "hidden",
        &JsValue::from_bool(!visible),
    )?;
    define_value(
        document.unchecked_ref(),
        "visibilityState",
        &JsValue::from_str(if visible { "visible" } else { "hidden" }),
    )?;
    document.dispatch_event(&Event::new("visibilitychange")?)?;

    toggle_audio_contexts(iframe, visible)?;
    toggle_media(&document, visible)?;
    Ok(())
}

fn define_value(target: &js_sys::Object, name: &str, value: &JsValue) -> Result<(), JsValue> {
    let descriptor = js_sys::Object::new();
    js_sys::Reflect::set(&descriptor, &JsValue::from_str("value"), value)?;
    js_sys::Reflect::set(&descriptor, &JsValue::from_str("writable"), &JsValue::TRUE)?;
    js_sys::Reflect::set(&descriptor, &JsValue::from_str("configurable"), &JsValue::TRUE)?;
    js_sys::Object::define_property(target, &JsValue::from_str(name), &descriptor);
    Ok(())
}

/// Games register their audio contexts on `window._audioContexts`; suspend
/// or resume whichever ones are in the opposite state.
fn toggle_audio_contexts(iframe: &HtmlIFrameElement, visible: bool) -> Result<(), JsValue> {
    let Some(window) = iframe.content_window() else {
        return Ok(());
    };
    let contexts = js_sys::Reflect::get(window.as_ref(), &JsValue::from_str("_audioContexts"))?;
    let Some(contexts) = contexts.dyn_ref::<js_sys::Array>() else {
        return Ok(());
    };

    let (from_state, method) = if visible {
        ("suspended", "resume")
    } else {
        ("running", "suspend")
    };
    for context in contexts.iter() {
        let state = js_sys::Reflect::get(&context, &JsValue::from_str("state"))?;
        if state.as_string().as_deref() != Some(from_state) {
            continue;
        }
        let func = js_sys::Reflect::get(&context, &JsValue::from_str(method))?;
        if let Some(func) = func.dyn_ref::<js_sys::Function>() {
            let _ = func.call0(&context);
        }
    }
    Ok(())
}

fn toggle_media(document: &Document, visible: bool) -> Result<(), JsValue> {
    let media = document.query_selector_all("audio, video")?;
    for index in 0..media.length() {
        let Some(node) = media.get(index) else {
            continue;
        };
        let Ok(element) = node.dyn_into::<HtmlMediaElement>() else {
            continue;
        };
        if visible {
            if element.get_attribute(WAS_PLAYING_ATTR).as_deref() == Some("true") {
                let _ = element.play();
                let _ = element.remove_attribute(WAS_PLAYING_ATTR);
            }
        } else if !element.paused() {
            let _ = element.set_attribute(WAS_PLAYING_ATTR, "true");
            element.pause()?;
        }
    }
    Ok(())
}
