//! Effects produced by state transitions

use super::state::{
    ConversationFormState, ProfileEntry, RoomOptions, BOT_LAYER, FORM_KEYS, STATE_VERSION,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// State writes to perform once a turn's drafts are final
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Store the menu path
    PersistPath { path: Vec<usize> },

    /// Replace every form key with this state
    PersistFormState { state: ConversationFormState },

    /// Remove every form key
    ClearFormState,

    /// Upsert one collected answer in the user profile
    SaveProfileEntry { entry: ProfileEntry },
}

impl Effect {
    pub fn persist_path(path: &[usize]) -> Self {
        Effect::PersistPath {
            path: path.to_vec(),
        }
    }

    pub fn persist_form(state: &ConversationFormState) -> Self {
        Effect::PersistFormState {
            state: state.clone(),
        }
    }
}

/// Field-level update of the room options map.
///
/// Applied to a freshly read map so keys written by anyone else survive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsPatch {
    updates: BTreeMap<String, Option<Value>>,
}

impl OptionsPatch {
    pub fn set(&mut self, key: &str, value: Value) {
        self.updates.insert(key.to_string(), Some(value));
    }

    pub fn remove(&mut self, key: &str) {
        self.updates.insert(key.to_string(), None);
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Patch that drops every key the bot owns
    pub fn clear_bot_state() -> Self {
        let mut patch = Self::default();
        patch.remove(BOT_LAYER);
        for key in FORM_KEYS {
            patch.remove(key);
        }
        patch
    }

    /// Collect the options writes of a turn. Later effects win per key;
    /// profile writes are not options writes and are skipped.
    pub fn from_effects(effects: &[Effect]) -> Self {
        let mut patch = Self::default();
        for effect in effects {
            match effect {
                Effect::PersistPath { path } => patch.set(BOT_LAYER, Value::from(path.clone())),
                Effect::PersistFormState { state } => {
                    for (key, value) in state.to_fields() {
                        match value {
                            Some(value) => patch.set(key, value),
                            None => patch.remove(key),
                        }
                    }
                }
                Effect::ClearFormState => {
                    for key in FORM_KEYS {
                        patch.remove(key);
                    }
                }
                Effect::SaveProfileEntry { .. } => {}
            }
        }
        patch
    }

    /// Apply to `options` and bump the state version
    pub fn apply(&self, options: &mut RoomOptions) {
        for (key, value) in &self.updates {
            match value {
                Some(value) => {
                    options.insert(key.clone(), value.clone());
                }
                None => {
                    options.remove(key);
                }
            }
        }
        let version = options
            .get(STATE_VERSION)
            .and_then(Value::as_u64)
            .unwrap_or(0);
        options.insert(STATE_VERSION.to_string(), Value::from(version + 1));
    }
}
