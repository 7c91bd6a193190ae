//! Persistent view registry.
//!
//! Views registered here (currently just the game loader) keep their content
//! alive across navigation: instead of being thrown away, their subtree
//! lives in a detached stash container owned by the host. Detached content
//! neither repaints nor runs layout, which is the whole point of stashing
//! rather than merely hiding.

use crate::assets::remove_all;
use crate::host::{AssetHandle, RenderTarget, ViewHost};
use crate::view::{MountState, ViewName};
use std::collections::HashMap;

/// Book-keeping for one persistent view.
#[derive(Debug)]
pub struct PersistentEntry {
    pub view: ViewName,
    pub state: MountState,
    /// Head assets this view owns; removed exactly once on destroy.
    pub assets: Vec<AssetHandle>,
}

impl PersistentEntry {
    fn new(view: ViewName) -> Self {
        Self {
            view,
            // Nothing exists until the first mount.
            state: MountState::Destroyed,
            assets: Vec::new(),
        }
    }
}

/// Registry of persistent views, keyed by view file name.
///
/// Invariant: at most one persistent view is live at a time; the rest are
/// fully detached in their stashes.
#[derive(Debug, Default)]
pub struct PersistentViewStore {
    entries: HashMap<String, PersistentEntry>,
    active: Option<String>,
}

impl PersistentViewStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view file as persistent. Registering twice is a no-op.
    pub fn register(&mut self, file: &str) {
        self.entries
            .entry(file.to_string())
            .or_insert_with(|| PersistentEntry::new(ViewName::from_file(file)));
    }

    #[must_use]
    pub fn is_persistent(&self, file: &str) -> bool {
        self.entries.contains_key(file)
    }

    #[must_use]
    pub fn get(&self, file: &str) -> Option<&PersistentEntry> {
        self.entries.get(file)
    }

    /// The file name of the currently live persistent view, if any.
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Registered view files other than `file`.
    #[must_use]
    pub fn others(&self, file: &str) -> Vec<String> {
        self.entries
            .keys()
            .filter(|k| k.as_str() != file)
            .cloned()
            .collect()
    }

    /// All registered view files.
    #[must_use]
    pub fn files(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Current mount state of a registered view.
    #[must_use]
    pub fn mount_state(&self, file: &str) -> Option<MountState> {
        self.entries.get(file).map(|entry| entry.state)
    }

    /// Lazily create the view's stash container.
    pub fn ensure_stash<H: ViewHost + ?Sized>(&mut self, host: &mut H, file: &str) {
        if let Some(entry) = self.entries.get(file) {
            host.ensure_stash(&entry.view);
        }
    }

    /// Record head asset handles as owned by a persistent view.
    pub fn add_assets(&mut self, file: &str, handles: &[AssetHandle]) {
        if let Some(entry) = self.entries.get_mut(file) {
            entry.assets.extend_from_slice(handles);
        }
    }

    /// Mark a view as the live persistent view. Every other entry becomes
    /// unmounted, preserving the at-most-one-live invariant.
    pub fn mark_mounted(&mut self, file: &str) {
        for (key, entry) in &mut self.entries {
            if key == file {
                entry.state = MountState::Mounted;
            } else if entry.state == MountState::Mounted {
                entry.state = MountState::Stashed;
            }
        }
        if self.entries.contains_key(file) {
            self.active = Some(file.to_string());
        }
    }

    /// Mark every live persistent view as detached, e.g. when a
    /// non-persistent view takes over the main container.
    pub fn deactivate_all(&mut self) {
        for entry in self.entries.values_mut() {
            if entry.state == MountState::Mounted {
                entry.state = MountState::Stashed;
            }
        }
        self.active = None;
    }

    /// Detach a mounted view's children from the main container into its
    /// stash. Does nothing if the view is not currently mounted.
    pub fn stash<H: ViewHost + ?Sized>(&mut self, host: &mut H, file: &str) {
        let Some(entry) = self.entries.get_mut(file) else {
            return;
        };
        if entry.state != MountState::Mounted {
            return;
        }
        host.ensure_stash(&entry.view);
        host.move_main_into_stash(&entry.view);
        entry.state = MountState::Stashed;
        if self.active.as_deref() == Some(file) {
            self.active = None;
        }
    }

    /// Reattach a stashed view's children under the main container. Returns
    /// whether restoration happened; an empty or missing stash restores
    /// nothing.
    pub fn restore<H: ViewHost + ?Sized>(&mut self, host: &mut H, file: &str) -> bool {
        let Some(entry) = self.entries.get(file) else {
            return false;
        };
        if !host.stash_has_content(&entry.view) {
            return false;
        }
        let view = entry.view.clone();
        host.move_stash_into_main(&view);
        self.mark_mounted(file);
        true
    }

    /// Tear a persistent view down completely: stash container, owned
    /// assets, and mount state all go, in one call.
    pub fn destroy<H: ViewHost + ?Sized>(&mut self, host: &mut H, file: &str) {
        let Some(entry) = self.entries.get_mut(file) else {
            return;
        };
        if entry.state == MountState::Mounted && self.active.as_deref() == Some(file) {
            host.set_html(&RenderTarget::Main, "");
            self.active = None;
        }
        entry.state = MountState::Destroyed;
        host.remove_stash(&entry.view);
        remove_all(host, &mut entry.assets);
    }
}
