//! Fragment fetching over the browser `fetch` API.

use crate::dom;
use async_trait::async_trait;
use nexora_views::{FetchError, FragmentFetcher};

/// Fetches view fragments by relative path (`GET /<file>`).
pub struct BrowserFetcher {
    base: String,
}

impl BrowserFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base("/")
    }

    /// Use a custom base path, e.g. when the site is served from a CDN
    /// subdirectory.
    #[must_use]
    pub fn with_base(base: &str) -> Self {
        Self {
            base: base.to_string(),
        }
    }
}

impl Default for BrowserFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn fragment_url(base: &str, file: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{file}")
    } else {
        format!("{base}/{file}")
    }
}

#[async_trait(?Send)]
impl FragmentFetcher for BrowserFetcher {
    async fn fetch_fragment(&self, file: &str) -> Result<String, FetchError> {
        let url = fragment_url(&self.base, file);
        dom::fetch_text(&url)
            .await
            .map_err(|err| FetchError::new(file, dom::js_error_message(&err)))
    }
}
