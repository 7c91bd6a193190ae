//! Script execution by appending real `<script>` elements.
//!
//! External scripts resolve on their `load`/`error` events; inline scripts
//! execute synchronously when appended. Attributes from the original tag are
//! copied over, and ordered execution is requested (`async = false`) unless
//! the original tag was `async`/`defer`/module.

use crate::dom;
use async_trait::async_trait;
use futures::channel::oneshot;
use nexora_views::{ScriptError, ScriptRunner, ScriptTag};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::HtmlScriptElement;

pub struct DomScriptRunner;

impl DomScriptRunner {
    fn build_element(script: &ScriptTag) -> Result<HtmlScriptElement, ScriptError> {
        let document = dom::document();
        let element = document
            .create_element("script")
            .map_err(|err| ScriptError::new(script.label(), dom::js_error_message(&err)))?;
        let element: HtmlScriptElement = element
            .dyn_into()
            .map_err(|_| ScriptError::new(script.label(), "not a script element"))?;
        for attr in &script.attrs {
            let _ = element.set_attribute(&attr.name, &attr.value);
        }
        Ok(element)
    }

    fn append(element: &HtmlScriptElement, script: &ScriptTag) -> Result<(), ScriptError> {
        let body = dom::document()
            .body()
            .ok_or_else(|| ScriptError::new(script.label(), "document has no body"))?;
        body.append_child(element)
            .map(|_| ())
            .map_err(|err| ScriptError::new(script.label(), dom::js_error_message(&err)))
    }
}

#[async_trait(?Send)]
impl ScriptRunner for DomScriptRunner {
    async fn run_external(&self, script: &ScriptTag) -> Result<(), ScriptError> {
        let element = Self::build_element(script)?;
        if !script.is_async() {
            element.set_async(false);
        }

        let (sender, receiver) = oneshot::channel::<bool>();
        let slot = Rc::new(RefCell::new(Some(sender)));

        let on_load = Closure::wrap(Box::new({
            let slot = Rc::clone(&slot);
            move || {
                if let Some(sender) = slot.borrow_mut().take() {
                    let _ = sender.send(true);
                }
            }
        }) as Box<dyn FnMut()>);
        let on_error = Closure::wrap(Box::new({
            let slot = Rc::clone(&slot);
            move || {
                if let Some(sender) = slot.borrow_mut().take() {
                    let _ = sender.send(false);
                }
            }
        }) as Box<dyn FnMut()>);

        element
            .add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())
            .map_err(|err| ScriptError::new(script.label(), dom::js_error_message(&err)))?;
        element
            .add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())
            .map_err(|err| ScriptError::new(script.label(), dom::js_error_message(&err)))?;

        Self::append(&element, script)?;

        // The closures stay owned by this future until the script settles;
        // detaching here frees them instead of leaking one pair per script.
        let result = receiver.await;
        let _ = element.remove_event_listener_with_callback("load", on_load.as_ref().unchecked_ref());
        let _ =
            element.remove_event_listener_with_callback("error", on_error.as_ref().unchecked_ref());

        match result {
            Ok(true) => Ok(()),
            Ok(false) => Err(ScriptError::new(script.label(), "load event errored")),
            Err(_) => Err(ScriptError::new(script.label(), "load signal dropped")),
        }
    }

    fn run_inline(&self, script: &ScriptTag) -> Result<(), ScriptError> {
        let element = Self::build_element(script)?;
        element.set_text_content(Some(&script.text));
        Self::append(&element, script)
    }
}
