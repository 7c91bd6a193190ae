//! Error taxonomy for the view engine.
//!
//! Every failure mode here degrades gracefully: fetch failures render the
//! error view, script failures leave the view partially broken but never
//! abort navigation, and storage failures make the owning feature
//! unavailable. Nothing in this module is fatal to the application.

/// A view fragment could not be fetched.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to fetch view fragment '{path}': {message}")]
pub struct FetchError {
    pub path: String,
    pub message: String,
}

impl FetchError {
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A single script failed to load or execute.
#[derive(Debug, Clone, thiserror::Error)]
#[error("script '{src}' failed: {message}")]
pub struct ScriptError {
    /// The script's `src`, or `<inline>` for inline scripts.
    pub src: String,
    pub message: String,
}

impl ScriptError {
    #[must_use]
    pub fn new(src: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            message: message.into(),
        }
    }
}

/// A storage tier rejected a read or write.
#[derive(Debug, Clone, thiserror::Error)]
#[error("storage unavailable: {0}")]
pub struct StorageError(pub String);

impl StorageError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
