//! Player preferences
//!
//! Persisted separately from the high scores. Key identifiers are
//! `KeyboardEvent.code` values.

use serde::{Deserialize, Serialize};

use crate::error::ArcadeError;
use crate::persistence::KeyValueStore;
use crate::platform::Action;

fn codes(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

/// Key identifiers per action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub fire: Vec<String>,
    pub pause: Vec<String>,
    pub confirm: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: codes(&["ArrowLeft", "KeyA"]),
            right: codes(&["ArrowRight", "KeyD"]),
            up: codes(&["ArrowUp", "KeyW"]),
            down: codes(&["ArrowDown", "KeyS"]),
            fire: codes(&["Space"]),
            pause: codes(&["KeyP", "Escape"]),
            confirm: codes(&["Enter"]),
        }
    }
}

impl KeyBindings {
    /// Action bound to a key identifier; the first matching action wins
    pub fn action_for(&self, code: &str) -> Option<Action> {
        [
            (Action::Left, &self.left),
            (Action::Right, &self.right),
            (Action::Up, &self.up),
            (Action::Down, &self.down),
            (Action::Fire, &self.fire),
            (Action::Pause, &self.pause),
            (Action::Confirm, &self.confirm),
        ]
        .into_iter()
        .find(|(_, ids)| ids.iter().any(|id| id == code))
        .map(|(action, _)| action)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bindings: KeyBindings,

    /// Pause the running round when the window loses focus
    pub pause_on_blur: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bindings: KeyBindings::default(),
            pause_on_blur: true,
            show_fps: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "arcade_sim_settings";

    /// Load settings, falling back to defaults on any failure
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match Self::try_load(store) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(err) => {
                log::warn!("Settings unreadable, using defaults: {}", err);
                Self::default()
            }
        }
    }

    fn try_load(store: &dyn KeyValueStore) -> Result<Option<Self>, ArcadeError> {
        match store.get_item(Self::STORAGE_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), ArcadeError> {
        let json = serde_json::to_string(self)?;
        store.set_item(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
