//! Nexora View Engine
//!
//! Platform-agnostic view lifecycle logic for the Nexora single-page site:
//! routing between fragment-backed views, head asset ownership, the
//! persistent game loader stash, browser-equivalent script ordering, and the
//! game session flags. Everything platform-specific (DOM, fetch, storage)
//! sits behind traits, so the engine runs headless.

pub mod assets;
pub mod error;
pub mod fragment;
pub mod game_state;
pub mod host;
pub mod persistent;
pub mod router;
pub mod routes;
pub mod scripts;
pub mod storage;
pub mod view;

// Re-export commonly used types
pub use assets::AssetManager;
pub use error::{FetchError, ScriptError, StorageError};
pub use fragment::{Attribute, HeadAsset, ParsedFragment, ScriptTag};
pub use game_state::{
    AUTOPLAY_KEY, CURRENT_GAME_KEY, DOM_STATE_KEY, DomLiveness, GAME_STATE_KEY, GameSession,
    GameStateManager,
};
pub use host::{AssetHandle, RenderTarget, ViewHost};
pub use persistent::{PersistentEntry, PersistentViewStore};
pub use router::{CleanupHook, GAME_LOADER_FILE, NavSequence, Navigation, ViewRouter};
pub use routes::Route;
pub use scripts::{ScriptLoader, ScriptRunner};
pub use storage::{KeyValueStore, MemoryStore};
pub use view::{MountState, ViewName};

use async_trait::async_trait;

/// Trait for fetching view fragments over the network.
/// Platform-specific implementations should provide this.
#[async_trait(?Send)]
pub trait FragmentFetcher {
    /// Fetch the HTML document backing a view file.
    ///
    /// # Errors
    ///
    /// Returns an error if the fragment cannot be retrieved.
    async fn fetch_fragment(&self, file: &str) -> Result<String, FetchError>;
}
