//! Head asset tracking.
//!
//! Every `<link>`/`<style>` injected for a view is tagged with that view and
//! tracked by handle, so navigating away can remove exactly the nodes the
//! view added. Without this the document head accumulates one stylesheet set
//! per navigation for the lifetime of the page.

use crate::fragment::HeadAsset;
use crate::host::{AssetHandle, ViewHost};
use crate::view::ViewName;

/// Tracks the assets owned by the currently displayed non-persistent view.
/// Persistent views keep their own handle lists in the persistent store.
#[derive(Debug, Default)]
pub struct AssetManager {
    current: Vec<AssetHandle>,
}

impl AssetManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a fragment's head assets on behalf of `owner`.
    ///
    /// Links whose href already exists in the head as a page-level (non
    /// view-owned) stylesheet are skipped so shared stylesheets are not
    /// loaded twice.
    pub fn inject<H: ViewHost + ?Sized>(
        host: &mut H,
        owner: &ViewName,
        assets: &[HeadAsset],
    ) -> Vec<AssetHandle> {
        let mut handles = Vec::with_capacity(assets.len());
        for asset in assets {
            if let Some(href) = asset.href() {
                if host.has_untracked_link(href) {
                    continue;
                }
            }
            handles.push(host.inject_asset(owner, asset));
        }
        handles
    }

    /// Record the handles owned by the newly displayed non-persistent view.
    pub fn set_current(&mut self, handles: Vec<AssetHandle>) {
        self.current = handles;
    }

    /// Remove the previous non-persistent view's assets from the head.
    pub fn clear_current<H: ViewHost + ?Sized>(&mut self, host: &mut H) {
        remove_all(host, &mut self.current);
    }

    #[must_use]
    pub fn current_count(&self) -> usize {
        self.current.len()
    }
}

/// Remove every handle in the list from the host and clear the list, so a
/// second call is a no-op rather than a double removal.
pub fn remove_all<H: ViewHost + ?Sized>(host: &mut H, handles: &mut Vec<AssetHandle>) {
    for handle in handles.drain(..) {
        host.remove_asset(handle);
    }
}
