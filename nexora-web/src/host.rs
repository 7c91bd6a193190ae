//! `ViewHost` over the real document.
//!
//! The main container is the `#app` element inside the page shell; each
//! persistent view gets a `stash-<name>` div appended to the `.page-frame`
//! wrapper (body if absent). Injected head assets are tagged with a
//! `data-view-asset` attribute naming their owning view, same as the rest of
//! the site expects.

use crate::audio;
use crate::dom;
use async_trait::async_trait;
use nexora_views::{AssetHandle, HeadAsset, RenderTarget, ViewHost, ViewName};
use std::collections::HashMap;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlElement};

/// How long to wait for an injected stylesheet before showing content
/// anyway. Purely anti-flash-of-unstyled-content; never correctness.
const CSS_SETTLE_TIMEOUT_MS: i32 = 100;

const LOADING_CLASS: &str = "view-loading";
const VIEW_CLASS_PREFIX: &str = "view-";
const ASSET_ATTR: &str = "data-view-asset";

pub struct DomHost {
    document: Document,
    main: HtmlElement,
    stashes: HashMap<ViewName, HtmlElement>,
    assets: HashMap<AssetHandle, Element>,
    next_handle: AssetHandle,
}

impl DomHost {
    /// Bind to the page shell.
    ///
    /// # Errors
    /// Returns an error if the `#app` container is missing from the document.
    pub fn new() -> Result<Self, JsValue> {
        let document = dom::document();
        let main = document
            .get_element_by_id("app")
            .ok_or_else(|| JsValue::from_str("missing #app container"))?
            .dyn_into::<HtmlElement>()?;
        Ok(Self {
            document,
            main,
            stashes: HashMap::new(),
            assets: HashMap::new(),
            next_handle: 0,
        })
    }

    fn container(&self, target: &RenderTarget) -> Option<&HtmlElement> {
        match target {
            RenderTarget::Main => Some(&self.main),
            RenderTarget::Stash(view) => self.stashes.get(view),
        }
    }

    fn set_style(element: &HtmlElement, property: &str, value: &str) {
        if let Err(err) = element.style().set_property(property, value) {
            log::debug!("could not set {property}: {err:?}");
        }
    }

    fn stash_frame(&self) -> Element {
        self.document
            .query_selector(".page-frame")
            .ok()
            .flatten()
            .or_else(|| self.document.body().map(Element::from))
            .unwrap_or_else(|| self.main.clone().into())
    }

    fn each_stash_iframe(&self, view: &ViewName, f: impl Fn(&web_sys::HtmlIFrameElement)) {
        let Some(stash) = self.stashes.get(view) else {
            return;
        };
        let Ok(iframes) = stash.query_selector_all("iframe") else {
            return;
        };
        for index in 0..iframes.length() {
            if let Some(node) = iframes.get(index) {
                if let Ok(iframe) = node.dyn_into::<web_sys::HtmlIFrameElement>() {
                    f(&iframe);
                }
            }
        }
    }
}

#[async_trait(?Send)]
impl ViewHost for DomHost {
    fn show_main(&mut self) {
        Self::set_style(&self.main, "display", "block");
    }

    fn hide_main(&mut self) {
        Self::set_style(&self.main, "display", "none");
    }

    fn set_html(&mut self, target: &RenderTarget, html: &str) {
        if let Some(container) = self.container(target) {
            container.set_inner_html(html);
        }
    }

    fn ensure_stash(&mut self, view: &ViewName) {
        if self.stashes.contains_key(view) {
            return;
        }
        let Ok(element) = self.document.create_element("div") else {
            return;
        };
        let Ok(stash) = element.dyn_into::<HtmlElement>() else {
            return;
        };
        stash.set_id(&view.stash_id());
        stash.set_class_name("main-content");
        // Full-viewport overlay so the stashed view renders exactly where
        // the main container would.
        Self::set_style(&stash, "position", "fixed");
        Self::set_style(&stash, "top", "0");
        Self::set_style(&stash, "left", "0");
        Self::set_style(&stash, "right", "0");
        Self::set_style(&stash, "bottom", "0");
        Self::set_style(&stash, "width", "100%");
        Self::set_style(&stash, "height", "100%");
        Self::set_style(&stash, "overflow", "auto");
        Self::set_style(&stash, "z-index", "1");
        if let Err(err) = self.stash_frame().append_child(&stash) {
            log::debug!("could not attach stash container: {err:?}");
        }
        self.stashes.insert(view.clone(), stash);
    }

    fn remove_stash(&mut self, view: &ViewName) {
        if let Some(stash) = self.stashes.remove(view) {
            stash.set_inner_html("");
            stash.remove();
        }
    }

    fn stash_has_content(&self, view: &ViewName) -> bool {
        self.stashes.get(view).is_some_and(|s| s.has_child_nodes())
    }

    fn show_stash(&mut self, view: &ViewName) {
        if let Some(stash) = self.stashes.get(view) {
            Self::set_style(stash, "display", "block");
            Self::set_style(stash, "visibility", "visible");
            Self::set_style(stash, "pointer-events", "auto");
            let _ = stash.remove_attribute("aria-hidden");
        }
    }

    fn hide_stash(&mut self, view: &ViewName) {
        if let Some(stash) = self.stashes.get(view) {
            Self::set_style(stash, "display", "none");
            Self::set_style(stash, "visibility", "hidden");
            Self::set_style(stash, "pointer-events", "none");
            let _ = stash.set_attribute("aria-hidden", "true");
        }
    }

    fn move_main_into_stash(&mut self, view: &ViewName) {
        self.ensure_stash(view);
        let Some(stash) = self.stashes.get(view) else {
            return;
        };
        while let Some(child) = self.main.first_child() {
            if stash.append_child(&child).is_err() {
                break;
            }
        }
    }

    fn move_stash_into_main(&mut self, view: &ViewName) {
        self.main.set_inner_html("");
        let Some(stash) = self.stashes.get(view) else {
            return;
        };
        while let Some(child) = stash.first_child() {
            if self.main.append_child(&child).is_err() {
                break;
            }
        }
    }

    fn suspend_stash_audio(&mut self, view: &ViewName) {
        self.each_stash_iframe(view, audio::suspend_iframe_audio);
    }

    fn resume_stash_audio(&mut self, view: &ViewName) {
        self.each_stash_iframe(view, audio::resume_iframe_audio);
    }

    fn inject_asset(&mut self, owner: &ViewName, asset: &HeadAsset) -> AssetHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        let Some(head) = self.document.head() else {
            return handle;
        };
        let element = match asset {
            HeadAsset::Link { attrs, .. } => {
                let Ok(link) = self.document.create_element("link") else {
                    return handle;
                };
                for attr in attrs {
                    let _ = link.set_attribute(&attr.name, &attr.value);
                }
                link
            }
            HeadAsset::Style { css } => {
                let Ok(style) = self.document.create_element("style") else {
                    return handle;
                };
                style.set_text_content(Some(css));
                style
            }
        };
        let _ = element.set_attribute(ASSET_ATTR, owner.as_str());
        if head.append_child(&element).is_ok() {
            self.assets.insert(handle, element);
        }
        handle
    }

    fn remove_asset(&mut self, handle: AssetHandle) {
        if let Some(element) = self.assets.remove(&handle) {
            element.remove();
        }
    }

    fn has_untracked_link(&self, href: &str) -> bool {
        let Some(head) = self.document.head() else {
            return false;
        };
        let selector = format!("link[href=\"{href}\"]");
        head.query_selector(&selector)
            .ok()
            .flatten()
            .is_some_and(|link| link.get_attribute(ASSET_ATTR).is_none())
    }

    fn set_active_view_class(&mut self, view: &ViewName) {
        let Some(body) = self.document.body() else {
            return;
        };
        let class_list = body.class_list();
        let mut stale = Vec::new();
        for index in 0..class_list.length() {
            if let Some(class) = class_list.item(index) {
                if class.starts_with(VIEW_CLASS_PREFIX) {
                    stale.push(class);
                }
            }
        }
        for class in stale {
            let _ = class_list.remove_1(&class);
        }
        let _ = class_list.add_1(&view.body_class());
    }

    fn set_loading(&mut self, target: &RenderTarget, loading: bool) {
        if let Some(container) = self.container(target) {
            let class_list = container.class_list();
            let _ = if loading {
                class_list.add_1(LOADING_CLASS)
            } else {
                class_list.remove_1(LOADING_CLASS)
            };
        }
    }

    async fn assets_settled(&mut self, handles: &[AssetHandle]) {
        // Install every listener and timer up front so the stylesheets
        // settle in parallel, then wait on each in turn.
        let mut pending = Vec::new();
        for handle in handles {
            let Some(element) = self.assets.get(handle) else {
                continue;
            };
            if element.tag_name() != "LINK" {
                continue;
            }
            let target = element.unchecked_ref::<web_sys::EventTarget>();
            if let Ok(promise) = dom::settled_promise(target, CSS_SETTLE_TIMEOUT_MS) {
                pending.push(promise);
            }
        }
        for promise in pending {
            let _ = JsFuture::from(promise).await;
        }
    }
}
