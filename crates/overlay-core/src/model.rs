//! Data model shared by the state, the gateway, and both delivery paths.
//!
//! All types here are plain serializable values. The wire shapes match
//! what browser clients already parse:
//!
//! - [`OverlayState`] serializes as `{"overlays": {...}, "active": "name"}`
//! - [`PushMessage`] serializes as `{"type": "...", "payload": ...}`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Monotonic state version. Starts at 0, advances by exactly 1 per mutation.
pub type Version = u64;

// ---------------------------------------------------------------------------
// Overlay state
// ---------------------------------------------------------------------------

/// Mapping from overlay name to its enabled flag.
///
/// In [`ToggleMode::Exclusive`] the `active` field names the single
/// overlay that is currently on. In [`ToggleMode::Independent`] it is
/// always `None` and is omitted from the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayState {
    /// Enabled flag per overlay name.
    pub overlays: BTreeMap<String, bool>,
    /// The exclusively active overlay, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
}

impl OverlayState {
    /// Whether the named overlay is currently on. Unknown names are off.
    pub fn is_on(&self, name: &str) -> bool {
        self.overlays.get(name).copied().unwrap_or(false)
    }

    /// Apply one toggle according to `mode`.
    ///
    /// Exclusive: turning `name` on switches every other key off and makes
    /// `name` the active overlay; turning it off clears `active` only if it
    /// pointed at `name`. Independent: only `overlays[name]` changes.
    pub(crate) fn apply(&mut self, mode: ToggleMode, name: &str, on: bool) {
        match mode {
            ToggleMode::Independent => {
                self.overlays.insert(name.to_owned(), on);
            }
            ToggleMode::Exclusive if on => {
                for (key, flag) in &mut self.overlays {
                    *flag = key == name;
                }
                self.overlays.insert(name.to_owned(), true);
                self.active = Some(name.to_owned());
            }
            ToggleMode::Exclusive => {
                self.overlays.insert(name.to_owned(), false);
                if self.active.as_deref() == Some(name) {
                    self.active = None;
                }
            }
        }
    }
}

/// An immutable `(version, state)` pair.
///
/// Snapshots are published whole, so any two readers holding the same
/// version hold identical state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Version identifying this snapshot.
    pub version: Version,
    /// Overlay state at this version.
    pub state: OverlayState,
}

// ---------------------------------------------------------------------------
// Toggle policy
// ---------------------------------------------------------------------------

/// How a toggle interacts with the other overlays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleMode {
    /// Enabling one overlay forces every other overlay off.
    #[default]
    Exclusive,
    /// Each overlay is toggled on its own.
    Independent,
}

impl std::str::FromStr for ToggleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exclusive" => Ok(Self::Exclusive),
            "independent" => Ok(Self::Independent),
            other => Err(format!("unknown toggle mode `{other}`")),
        }
    }
}

// ---------------------------------------------------------------------------
// Mutations and push messages
// ---------------------------------------------------------------------------

/// Record of one applied toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    /// The overlay that was toggled.
    pub name: String,
    /// The requested flag.
    pub on: bool,
    /// The version the mutation produced.
    pub version: Version,
}

/// Payload of an `overlay` push message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayChange {
    /// The overlay that was toggled.
    pub name: String,
    /// The requested flag.
    pub on: bool,
}

/// A message pushed to connected observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum PushMessage {
    /// Full state, sent once when an observer connects.
    State(OverlayState),
    /// A single toggle, sent on every mutation.
    Overlay(OverlayChange),
}

impl From<&Mutation> for PushMessage {
    fn from(mutation: &Mutation) -> Self {
        Self::Overlay(OverlayChange {
            name: mutation.name.clone(),
            on: mutation.on,
        })
    }
}

/// Identifier of one connected push observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObserverId(pub Uuid);

impl ObserverId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
