//! Keyboard input sampling
//!
//! Key events arrive asynchronously from the host and only ever touch the
//! held-key table here. The simulation reads a [`TickInput`] snapshot once per
//! tick and never sees the table itself.

use std::collections::HashSet;

use crate::settings::KeyBindings;
use crate::sim::TickInput;

/// Logical action bound to one or more key identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Fire,
    Pause,
    Confirm,
}

/// Held-key table plus the one-shot pause request
#[derive(Debug, Clone)]
pub struct InputSampler {
    bindings: KeyBindings,
    /// Key identifiers currently held down
    held: HashSet<String>,
    /// Pause pressed since the last sample
    pending_pause: bool,
}

impl InputSampler {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: HashSet::new(),
            pending_pause: false,
        }
    }

    /// Record a key press
    ///
    /// Returns the bound action on the initial press. Auto-repeat presses of a
    /// key already held and unbound identifiers return `None`.
    pub fn key_down(&mut self, code: &str) -> Option<Action> {
        let action = self.bindings.action_for(code)?;
        if !self.held.insert(code.to_string()) {
            return None;
        }
        if action == Action::Pause {
            self.pending_pause = true;
        }
        Some(action)
    }

    /// Record a key release; unknown identifiers are ignored
    pub fn key_up(&mut self, code: &str) {
        self.held.remove(code);
    }

    /// Drop every held key (focus loss: key-up events will not arrive)
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Request a pause toggle on the next sample, as if the pause key was pressed
    pub fn request_pause(&mut self) {
        self.pending_pause = true;
    }

    /// True while any key bound to `action` is held
    pub fn is_held(&self, action: Action) -> bool {
        self.held
            .iter()
            .any(|code| self.bindings.action_for(code) == Some(action))
    }

    /// Snapshot the held state for one tick and consume the pause request
    pub fn sample(&mut self, now_ms: f64) -> TickInput {
        TickInput {
            left: self.is_held(Action::Left),
            right: self.is_held(Action::Right),
            fire: self.is_held(Action::Fire),
            pause: std::mem::take(&mut self.pending_pause),
            now_ms,
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Swap bindings; held keys are released so nothing stays stuck
    pub fn set_bindings(&mut self, bindings: KeyBindings) {
        self.bindings = bindings;
        self.held.clear();
    }
}

impl Default for InputSampler {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}
