//! Browser adapter for the Nexora view engine.
//!
//! Implements the engine's host, fetcher, runner and storage seams against
//! the real DOM via `web-sys`, and boots the application from
//! [`app::start`].

pub mod app;
pub mod audio;
pub mod dom;
pub mod fetcher;
pub mod host;
pub mod runner;
pub mod storage;

pub use fetcher::BrowserFetcher;
pub use host::DomHost;
pub use runner::DomScriptRunner;
pub use storage::BrowserStorage;
