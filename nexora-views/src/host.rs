//! Rendering adapter seam.
//!
//! The engine treats view content as data and issues mount/unmount commands
//! through [`ViewHost`]; it never owns a DOM node. The browser adapter backs
//! this with the real document, while [`memory::MemoryHost`] keeps everything
//! in plain structs so the full navigation lifecycle runs headless.

pub mod memory;

use crate::fragment::HeadAsset;
use crate::view::ViewName;
use async_trait::async_trait;

/// Opaque handle to a head asset the host has injected. Handles stay valid
/// until [`ViewHost::remove_asset`] is called with them, and each handle is
/// removed at most once.
pub type AssetHandle = u64;

/// Which container a render operation addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTarget {
    /// The single visible main container.
    Main,
    /// A persistent view's stash container.
    Stash(ViewName),
}

/// Host-side effects the router needs: container visibility, stash
/// containers, head assets, loading markers, and iframe audio signals.
///
/// Stash containers are genuinely detached while hidden: the host must
/// guarantee hidden stash content neither repaints nor intercepts input.
#[async_trait(?Send)]
pub trait ViewHost {
    fn show_main(&mut self);
    fn hide_main(&mut self);

    /// Replace a container's children with the given markup.
    fn set_html(&mut self, target: &RenderTarget, html: &str);

    /// Create the view's stash container if it does not exist yet.
    fn ensure_stash(&mut self, view: &ViewName);

    /// Remove the view's stash container and its content entirely.
    fn remove_stash(&mut self, view: &ViewName);

    fn stash_has_content(&self, view: &ViewName) -> bool;

    fn show_stash(&mut self, view: &ViewName);
    fn hide_stash(&mut self, view: &ViewName);

    /// Move the main container's children into the view's stash.
    fn move_main_into_stash(&mut self, view: &ViewName);

    /// Clear the main container and move the stash's children into it.
    fn move_stash_into_main(&mut self, view: &ViewName);

    /// Signal any iframes inside the stash to pause playback.
    fn suspend_stash_audio(&mut self, view: &ViewName);

    /// Signal any iframes inside the stash to resume playback.
    fn resume_stash_audio(&mut self, view: &ViewName);

    /// Inject a head asset tagged with its owning view.
    fn inject_asset(&mut self, owner: &ViewName, asset: &HeadAsset) -> AssetHandle;

    /// Remove a previously injected asset. Unknown handles are ignored.
    fn remove_asset(&mut self, handle: AssetHandle);

    /// Whether an equally-hrefed link already exists in the head *without*
    /// being tracked as a view asset. Such links are page-level and must not
    /// be duplicated.
    fn has_untracked_link(&self, href: &str) -> bool;

    /// Swap the `view-<name>` marker class on the document body.
    fn set_active_view_class(&mut self, view: &ViewName);

    /// Toggle the transient loading marker on a container. Cosmetic only;
    /// never affects correctness.
    fn set_loading(&mut self, target: &RenderTarget, loading: bool);

    /// Wait until the given injected stylesheets have loaded or errored, or
    /// a short host-defined timeout has elapsed.
    async fn assets_settled(&mut self, handles: &[AssetHandle]);
}
