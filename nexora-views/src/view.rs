//! View identity and mount lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized name of a view, derived from its fragment file name.
///
/// `gameloader.html` becomes `gameloader`; anything that is not
/// ASCII-alphanumeric or `-` is replaced with `-` so the name is safe to use
/// as a CSS class suffix or element id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewName(String);

impl ViewName {
    /// Derive a normalized view name from a fragment file name.
    #[must_use]
    pub fn from_file(file: &str) -> Self {
        let stem = file
            .len()
            .checked_sub(5)
            .and_then(|idx| {
                file.get(idx..)
                    .filter(|tail| tail.eq_ignore_ascii_case(".html"))
                    .map(|_| &file[..idx])
            })
            .unwrap_or(file);
        let normalized: String = stem
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        if normalized.is_empty() {
            Self("default".to_string())
        } else {
            Self(normalized)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// CSS class applied to the body while this view is active.
    #[must_use]
    pub fn body_class(&self) -> String {
        format!("view-{}", self.0)
    }

    /// Element id of this view's stash container.
    #[must_use]
    pub fn stash_id(&self) -> String {
        format!("stash-{}", self.0)
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a view's content currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountState {
    /// Attached under the visible container.
    Mounted,
    /// Detached into the view's stash container.
    Stashed,
    /// Torn down; nothing to restore.
    Destroyed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_html_extension_case_insensitively() {
        assert_eq!(ViewName::from_file("home.html").as_str(), "home");
        assert_eq!(ViewName::from_file("GAMES.HTML").as_str(), "GAMES");
        assert_eq!(ViewName::from_file("gameloader.html").as_str(), "gameloader");
    }

    #[test]
    fn replaces_unsafe_characters() {
        assert_eq!(ViewName::from_file("a/b c.html").as_str(), "a-b-c");
        assert_eq!(ViewName::from_file("first_time.html").as_str(), "first-time");
    }

    #[test]
    fn empty_name_falls_back_to_default() {
        assert_eq!(ViewName::from_file("").as_str(), "default");
        assert_eq!(ViewName::from_file(".html").as_str(), "default");
    }

    #[test]
    fn derived_identifiers() {
        let view = ViewName::from_file("movies.html");
        assert_eq!(view.body_class(), "view-movies");
        assert_eq!(view.stash_id(), "stash-movies");
    }
}
