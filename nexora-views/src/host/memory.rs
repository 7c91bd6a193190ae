//! Headless [`ViewHost`] backed by plain structs.
//!
//! Containers are strings of markup, stashes are entries in a map, and audio
//! signals are recorded as events. Engine tests drive complete navigation
//! scenarios against this host without a browser.

use super::{AssetHandle, RenderTarget, ViewHost};
use crate::fragment::HeadAsset;
use crate::view::ViewName;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Default)]
struct MemoryStash {
    html: String,
    visible: bool,
    audio_suspended: bool,
}

/// A head asset held by the memory host.
#[derive(Debug, Clone)]
pub struct InjectedAsset {
    pub owner: ViewName,
    pub asset: HeadAsset,
}

/// Audio signals observed by the host, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    Suspended(ViewName),
    Resumed(ViewName),
}

/// In-memory rendering host.
#[derive(Debug, Default)]
pub struct MemoryHost {
    main_html: String,
    main_visible: bool,
    stashes: HashMap<ViewName, MemoryStash>,
    assets: BTreeMap<AssetHandle, InjectedAsset>,
    next_handle: AssetHandle,
    /// Hrefs of page-level stylesheets that predate any view navigation.
    page_links: HashSet<String>,
    body_class: Option<String>,
    loading: HashSet<String>,
    pub audio_events: Vec<AudioEvent>,
}

impl MemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self {
            main_visible: true,
            ..Self::default()
        }
    }

    /// Seed a page-level stylesheet, as if the shell document linked it.
    pub fn add_page_link(&mut self, href: &str) {
        self.page_links.insert(href.to_string());
    }

    #[must_use]
    pub fn main_html(&self) -> &str {
        &self.main_html
    }

    #[must_use]
    pub fn main_visible(&self) -> bool {
        self.main_visible
    }

    #[must_use]
    pub fn has_stash(&self, view: &ViewName) -> bool {
        self.stashes.contains_key(view)
    }

    #[must_use]
    pub fn stash_html(&self, view: &ViewName) -> Option<&str> {
        self.stashes.get(view).map(|s| s.html.as_str())
    }

    #[must_use]
    pub fn stash_visible(&self, view: &ViewName) -> bool {
        self.stashes.get(view).is_some_and(|s| s.visible)
    }

    #[must_use]
    pub fn stash_audio_suspended(&self, view: &ViewName) -> bool {
        self.stashes.get(view).is_some_and(|s| s.audio_suspended)
    }

    #[must_use]
    pub fn asset_count_for(&self, view: &ViewName) -> usize {
        self.assets.values().filter(|a| &a.owner == view).count()
    }

    /// Handles of the assets currently owned by a view, in injection order.
    #[must_use]
    pub fn asset_handles_for(&self, view: &ViewName) -> Vec<AssetHandle> {
        self.assets
            .iter()
            .filter(|(_, a)| &a.owner == view)
            .map(|(h, _)| *h)
            .collect()
    }

    #[must_use]
    pub fn total_asset_count(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn body_class(&self) -> Option<&str> {
        self.body_class.as_deref()
    }

    #[must_use]
    pub fn is_loading(&self, target: &RenderTarget) -> bool {
        self.loading.contains(&target_key(target))
    }

    fn tracked_link(&self, href: &str) -> bool {
        self.assets
            .values()
            .any(|a| a.asset.href() == Some(href))
    }
}

fn target_key(target: &RenderTarget) -> String {
    match target {
        RenderTarget::Main => "main".to_string(),
        RenderTarget::Stash(view) => view.stash_id(),
    }
}

#[async_trait(?Send)]
impl ViewHost for MemoryHost {
    fn show_main(&mut self) {
        self.main_visible = true;
    }

    fn hide_main(&mut self) {
        self.main_visible = false;
    }

    fn set_html(&mut self, target: &RenderTarget, html: &str) {
        match target {
            RenderTarget::Main => self.main_html = html.to_string(),
            RenderTarget::Stash(view) => {
                let stash = self.stashes.entry(view.clone()).or_default();
                stash.html = html.to_string();
            }
        }
    }

    fn ensure_stash(&mut self, view: &ViewName) {
        self.stashes.entry(view.clone()).or_default();
    }

    fn remove_stash(&mut self, view: &ViewName) {
        self.stashes.remove(view);
    }

    fn stash_has_content(&self, view: &ViewName) -> bool {
        self.stashes.get(view).is_some_and(|s| !s.html.is_empty())
    }

    fn show_stash(&mut self, view: &ViewName) {
        if let Some(stash) = self.stashes.get_mut(view) {
            stash.visible = true;
        }
    }

    fn hide_stash(&mut self, view: &ViewName) {
        if let Some(stash) = self.stashes.get_mut(view) {
            stash.visible = false;
        }
    }

    fn move_main_into_stash(&mut self, view: &ViewName) {
        let html = std::mem::take(&mut self.main_html);
        let stash = self.stashes.entry(view.clone()).or_default();
        stash.html = html;
    }

    fn move_stash_into_main(&mut self, view: &ViewName) {
        self.main_html.clear();
        if let Some(stash) = self.stashes.get_mut(view) {
            self.main_html = std::mem::take(&mut stash.html);
        }
    }

    fn suspend_stash_audio(&mut self, view: &ViewName) {
        if let Some(stash) = self.stashes.get_mut(view) {
            stash.audio_suspended = true;
        }
        self.audio_events.push(AudioEvent::Suspended(view.clone()));
    }

    fn resume_stash_audio(&mut self, view: &ViewName) {
        if let Some(stash) = self.stashes.get_mut(view) {
            stash.audio_suspended = false;
        }
        self.audio_events.push(AudioEvent::Resumed(view.clone()));
    }

    fn inject_asset(&mut self, owner: &ViewName, asset: &HeadAsset) -> AssetHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.assets.insert(
            handle,
            InjectedAsset {
                owner: owner.clone(),
                asset: asset.clone(),
            },
        );
        handle
    }

    fn remove_asset(&mut self, handle: AssetHandle) {
        self.assets.remove(&handle);
    }

    fn has_untracked_link(&self, href: &str) -> bool {
        self.page_links.contains(href) && !self.tracked_link(href)
    }

    fn set_active_view_class(&mut self, view: &ViewName) {
        self.body_class = Some(view.body_class());
    }

    fn set_loading(&mut self, target: &RenderTarget, loading: bool) {
        let key = target_key(target);
        if loading {
            self.loading.insert(key);
        } else {
            self.loading.remove(&key);
        }
    }

    async fn assets_settled(&mut self, _handles: &[AssetHandle]) {
        // Memory assets settle instantly.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(file: &str) -> ViewName {
        ViewName::from_file(file)
    }

    #[test]
    fn stash_visibility_and_content() {
        let mut host = MemoryHost::new();
        let loader = view("gameloader.html");
        host.ensure_stash(&loader);
        assert!(!host.stash_has_content(&loader));
        host.set_html(&RenderTarget::Stash(loader.clone()), "<iframe></iframe>");
        assert!(host.stash_has_content(&loader));
        host.show_stash(&loader);
        assert!(host.stash_visible(&loader));
    }

    #[test]
    fn moving_children_between_main_and_stash() {
        let mut host = MemoryHost::new();
        let loader = view("gameloader.html");
        host.set_html(&RenderTarget::Main, "<div>game</div>");
        host.move_main_into_stash(&loader);
        assert_eq!(host.main_html(), "");
        assert_eq!(host.stash_html(&loader), Some("<div>game</div>"));
        host.move_stash_into_main(&loader);
        assert_eq!(host.main_html(), "<div>game</div>");
        assert_eq!(host.stash_html(&loader), Some(""));
    }

    #[test]
    fn untracked_link_detection_ignores_view_assets() {
        use crate::fragment::HeadAsset;
        let mut host = MemoryHost::new();
        host.add_page_link("/css/site.css");
        assert!(host.has_untracked_link("/css/site.css"));

        let games = view("games.html");
        host.inject_asset(
            &games,
            &HeadAsset::Link {
                href: "/css/games.css".to_string(),
                attrs: vec![],
            },
        );
        assert!(!host.has_untracked_link("/css/games.css"));
    }

    #[test]
    fn audio_signals_are_recorded() {
        let mut host = MemoryHost::new();
        let loader = view("gameloader.html");
        host.ensure_stash(&loader);
        host.suspend_stash_audio(&loader);
        host.resume_stash_audio(&loader);
        assert_eq!(
            host.audio_events,
            vec![
                AudioEvent::Suspended(loader.clone()),
                AudioEvent::Resumed(loader)
            ]
        );
    }
}
