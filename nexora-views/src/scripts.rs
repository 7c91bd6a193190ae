//! Ordered script execution for injected fragments.
//!
//! Injecting fetched markup does not execute its `<script>` tags, so the
//! router strips them and replays them here with the ordering a browser
//! would have given the original document: external scripts load in
//! parallel, and inline scripts run in document order only after every
//! external script has finished loading and executing.
//!
//! A script that fails to load is logged and skipped; the view may render
//! partially broken, but navigation is never aborted.

use crate::error::ScriptError;
use crate::fragment::ScriptTag;
use async_trait::async_trait;
use futures::future::join_all;

/// Executes individual scripts. Platform implementations append real
/// `<script>` elements; test runners record what ran.
#[async_trait(?Send)]
pub trait ScriptRunner {
    /// Load and execute an external script, resolving once it has finished
    /// (or failed).
    async fn run_external(&self, script: &ScriptTag) -> Result<(), ScriptError>;

    /// Execute an inline script.
    fn run_inline(&self, script: &ScriptTag) -> Result<(), ScriptError>;
}

/// Replays a fragment's scripts through a [`ScriptRunner`].
pub struct ScriptLoader<R: ScriptRunner> {
    runner: R,
}

impl<R: ScriptRunner> ScriptLoader<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run a fragment's scripts: externals in parallel first, then inline
    /// scripts sequentially in document order. Individual failures are
    /// logged and do not stop the remaining scripts.
    pub async fn run(&self, scripts: &[ScriptTag]) {
        let externals: Vec<&ScriptTag> = scripts.iter().filter(|s| s.is_external()).collect();
        let results = join_all(
            externals
                .iter()
                .map(|script| self.runner.run_external(script)),
        )
        .await;
        for (script, result) in externals.iter().zip(results) {
            if let Err(err) = result {
                log::error!("script failed to load: {} ({err})", script.label());
            }
        }

        for script in scripts.iter().filter(|s| !s.is_external()) {
            if let Err(err) = self.runner.run_inline(script) {
                log::error!("inline script failed: {err}");
            }
        }
    }
}
