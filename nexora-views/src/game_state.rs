//! Game session flags.
//!
//! Three small records drive the "continue playing" behavior: a
//! play-in-progress record in the persistent tier, a one-shot autoplay flag
//! in the session tier, and a DOM-liveness tag recording whether the game
//! loader's subtree is currently alive (mounted or stashed).
//!
//! Storage failures are never surfaced: a disabled or full storage tier just
//! makes the feature unavailable.

use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const GAME_STATE_KEY: &str = "nexora_gameInProgress";
pub const AUTOPLAY_KEY: &str = "nexora_autoplayGame";
pub const DOM_STATE_KEY: &str = "nexora_gameDomState";
pub const CURRENT_GAME_KEY: &str = "currentGame";

/// The persisted play-in-progress record. Field names match the stored JSON
/// format used by the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    /// Opaque game payload; the engine never interprets it.
    pub game: serde_json::Value,
    /// Milliseconds since the epoch at the time the game started.
    pub timestamp: i64,
    #[serde(rename = "isPlaying")]
    pub is_playing: bool,
}

/// Whether the game loader's subtree currently exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomLiveness {
    /// Mounted and visible.
    Active,
    /// Alive but stashed.
    Dormant,
}

impl DomLiveness {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Dormant => "dormant",
        }
    }
}

impl FromStr for DomLiveness {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "dormant" => Ok(Self::Dormant),
            _ => Err(()),
        }
    }
}

/// Owns the game session flags across two storage tiers: the
/// play-in-progress record survives reloads (persistent tier), while the
/// autoplay flag and liveness tag are scoped to the browsing session.
pub struct GameStateManager {
    local: Box<dyn KeyValueStore>,
    session: Box<dyn KeyValueStore>,
}

impl GameStateManager {
    pub fn new(local: Box<dyn KeyValueStore>, session: Box<dyn KeyValueStore>) -> Self {
        Self { local, session }
    }

    /// Record that a game started playing.
    pub fn save_state(&mut self, game: serde_json::Value, timestamp: i64) {
        let record = GameSession {
            game,
            timestamp,
            is_playing: true,
        };
        match serde_json::to_string(&record) {
            Ok(json) => {
                if let Err(err) = self.local.set(GAME_STATE_KEY, &json) {
                    log::warn!("game state unavailable: {err}");
                }
            }
            Err(err) => log::warn!("could not serialize game state: {err}"),
        }
    }

    /// The saved play record, if present and well-formed.
    #[must_use]
    pub fn state(&self) -> Option<GameSession> {
        let raw = self.local.get(GAME_STATE_KEY).ok().flatten()?;
        serde_json::from_str(&raw).ok()
    }

    #[must_use]
    pub fn has_active_game(&self) -> bool {
        self.state().is_some_and(|s| s.is_playing)
    }

    /// Forget the play record entirely (user closed or finished the game).
    pub fn clear_state(&mut self) {
        if let Err(err) = self.local.remove(GAME_STATE_KEY) {
            log::warn!("game state unavailable: {err}");
        }
    }

    /// Keep the record but mark it no longer playing, so a later visit can
    /// still offer to resume.
    pub fn pause_state(&mut self) {
        let Some(mut record) = self.state() else {
            return;
        };
        record.is_playing = false;
        if let Ok(json) = serde_json::to_string(&record) {
            if let Err(err) = self.local.set(GAME_STATE_KEY, &json) {
                log::warn!("game state unavailable: {err}");
            }
        }
    }

    /// Arm or disarm the one-shot autoplay flag.
    pub fn set_autoplay(&mut self, should_autoplay: bool) {
        let result = if should_autoplay {
            self.session.set(AUTOPLAY_KEY, "true")
        } else {
            self.session.remove(AUTOPLAY_KEY)
        };
        if let Err(err) = result {
            log::warn!("autoplay flag unavailable: {err}");
        }
    }

    /// Check and consume the autoplay flag. The flag is a one-shot signal:
    /// reading it true always clears it.
    pub fn take_autoplay(&mut self) -> bool {
        let armed = self
            .session
            .get(AUTOPLAY_KEY)
            .ok()
            .flatten()
            .as_deref()
            == Some("true");
        if armed {
            if let Err(err) = self.session.remove(AUTOPLAY_KEY) {
                log::warn!("autoplay flag unavailable: {err}");
            }
        }
        armed
    }

    pub fn mark_dom_active(&mut self) {
        self.write_liveness(Some(DomLiveness::Active));
    }

    pub fn mark_dom_dormant(&mut self) {
        self.write_liveness(Some(DomLiveness::Dormant));
    }

    pub fn clear_dom_state(&mut self) {
        self.write_liveness(None);
    }

    #[must_use]
    pub fn dom_liveness(&self) -> Option<DomLiveness> {
        self.session
            .get(DOM_STATE_KEY)
            .ok()
            .flatten()
            .and_then(|raw| raw.parse().ok())
    }

    /// Whether the game subtree exists at all, mounted or stashed.
    #[must_use]
    pub fn has_dom(&self) -> bool {
        self.dom_liveness().is_some()
    }

    /// Drop the session's current-game selection.
    pub fn clear_current_game(&mut self) {
        if let Err(err) = self.session.remove(CURRENT_GAME_KEY) {
            log::warn!("current game key unavailable: {err}");
        }
    }

    fn write_liveness(&mut self, liveness: Option<DomLiveness>) {
        let result = match liveness {
            Some(tag) => self.session.set(DOM_STATE_KEY, tag.as_str()),
            None => self.session.remove(DOM_STATE_KEY),
        };
        if let Err(err) = result {
            log::warn!("dom liveness tag unavailable: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn manager() -> GameStateManager {
        GameStateManager::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()))
    }

    #[test]
    fn save_and_read_play_record() {
        let mut gs = manager();
        gs.save_state(json!({"id": "slope"}), 1_700_000_000_000);
        let record = gs.state().unwrap();
        assert!(record.is_playing);
        assert_eq!(record.game["id"], "slope");
        assert!(gs.has_active_game());
    }

    #[test]
    fn pause_keeps_record_but_stops_playing() {
        let mut gs = manager();
        gs.save_state(json!("tetris"), 1);
        gs.pause_state();
        assert!(!gs.has_active_game());
        assert!(gs.state().is_some());
    }

    #[test]
    fn autoplay_flag_is_consumed_on_read() {
        let mut gs = manager();
        gs.set_autoplay(true);
        assert!(gs.take_autoplay());
        assert!(!gs.take_autoplay());
    }

    #[test]
    fn liveness_tag_round_trips() {
        let mut gs = manager();
        assert!(!gs.has_dom());
        gs.mark_dom_active();
        assert_eq!(gs.dom_liveness(), Some(DomLiveness::Active));
        gs.mark_dom_dormant();
        assert_eq!(gs.dom_liveness(), Some(DomLiveness::Dormant));
        gs.clear_dom_state();
        assert!(!gs.has_dom());
    }

    #[test]
    fn malformed_record_reads_as_absent() {
        let mut local = MemoryStore::new();
        local.set(GAME_STATE_KEY, "{not json").unwrap();
        let gs = GameStateManager::new(Box::new(local), Box::new(MemoryStore::new()));
        assert!(gs.state().is_none());
        assert!(!gs.has_active_game());
    }

    #[test]
    fn storage_failure_degrades_silently() {
        let mut local = MemoryStore::new();
        local.fail = true;
        let mut session = MemoryStore::new();
        session.fail = true;
        let mut gs = GameStateManager::new(Box::new(local), Box::new(session));
        gs.save_state(json!(1), 0);
        gs.set_autoplay(true);
        assert!(!gs.take_autoplay());
        assert!(gs.state().is_none());
        gs.clear_state();
        gs.clear_dom_state();
    }
}
