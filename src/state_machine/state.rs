//! Conversation state types
//!
//! The platform stores conversation state in an opaque JSON options map on
//! the room. These types are the typed view the engine works with.

use crate::layer::Form;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Raw room options as stored by the platform
pub type RoomOptions = Map<String, Value>;

// Room option keys owned by the bot
pub const BOT_LAYER: &str = "bot_layer";
pub const FORMS_LAYER_INDEX: &str = "forms_layer_index";
pub const NESTED_FORM_KEYS: &str = "nested_form_keys";
pub const FORM_CONFIRMING: &str = "form_confirming";
pub const FORM_EDITING: &str = "form_editing";
pub const FORM_ON_EDIT_INDEX: &str = "form_on_edit_index";
pub const STATE_VERSION: &str = "bot_state_version";

pub const FORM_KEYS: [&str; 5] = [
    FORMS_LAYER_INDEX,
    NESTED_FORM_KEYS,
    FORM_CONFIRMING,
    FORM_EDITING,
    FORM_ON_EDIT_INDEX,
];

// ============================================================================
// Drafts
// ============================================================================

/// What the caller does after sending a draft
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Routing {
    #[default]
    Continue,
    Resolve,
    Handover {
        division: Option<String>,
    },
}

impl Routing {
    /// Handover to a division; an empty name means any agent
    pub fn handover(division: &str) -> Self {
        Routing::Handover {
            division: (!division.is_empty()).then(|| division.to_string()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Routing::Continue => "continue",
            Routing::Resolve => "resolve",
            Routing::Handover { .. } => "handover",
        }
    }
}

/// One outbound message and the routing that follows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub routing: Routing,
}

impl Draft {
    pub fn say(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            routing: Routing::Continue,
        }
    }

    pub fn with_routing(mut self, routing: Routing) -> Self {
        self.routing = routing;
        self
    }

    /// Turn a list of texts into drafts where only the last one carries `routing`
    pub fn sequence(texts: impl IntoIterator<Item = String>, routing: &Routing) -> Vec<Draft> {
        let mut drafts: Vec<Draft> = texts.into_iter().map(Draft::say).collect();
        if let Some(last) = drafts.last_mut() {
            last.routing = routing.clone();
        }
        drafts
    }
}

// ============================================================================
// Phases
// ============================================================================

/// Where a traversal result sits in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalPhase {
    /// Empty path, the root menu
    Root,
    /// An inner menu waiting for a selection
    Menu,
    /// Handover, resolve or form node; stops traversal
    Terminal,
}

/// Where a conversation is inside a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    /// No step stored yet
    Start,
    /// Waiting for the answer to step `index`
    Answering { index: usize },
    /// Every step answered, waiting for a confirmation option
    Confirming,
    /// Edit list shown, waiting for the step to change
    SelectingEdit,
    /// Waiting for the new answer to step `index`
    Editing { index: usize },
}

// ============================================================================
// Stored state
// ============================================================================

/// Form progress stored on the room
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationFormState {
    pub forms_layer_index: Option<usize>,
    /// Nested-question pointer per form, keyed by `Form::nested_key`
    pub nested_form_keys: BTreeMap<String, usize>,
    pub form_confirming: bool,
    pub form_editing: bool,
    pub form_on_edit_index: Option<usize>,
}

impl ConversationFormState {
    pub fn phase(&self) -> FormPhase {
        match (self.forms_layer_index, self.form_on_edit_index) {
            (None, _) => FormPhase::Start,
            (Some(_), Some(index)) => FormPhase::Editing { index },
            (Some(_), None) if self.form_editing => FormPhase::SelectingEdit,
            (Some(_), None) if self.form_confirming => FormPhase::Confirming,
            (Some(index), None) => FormPhase::Answering { index },
        }
    }

    pub fn in_progress(&self) -> bool {
        self.forms_layer_index.is_some()
    }

    pub fn nested_pointer(&self, form: &Form) -> usize {
        self.nested_form_keys
            .get(&form.nested_key())
            .copied()
            .unwrap_or(0)
    }

    fn from_options(options: &RoomOptions) -> Self {
        Self {
            forms_layer_index: options.get(FORMS_LAYER_INDEX).and_then(decode),
            nested_form_keys: options
                .get(NESTED_FORM_KEYS)
                .and_then(decode)
                .unwrap_or_default(),
            form_confirming: options
                .get(FORM_CONFIRMING)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            form_editing: options
                .get(FORM_EDITING)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            form_on_edit_index: options.get(FORM_ON_EDIT_INDEX).and_then(decode),
        }
    }

    /// Stored value for every form key; `None` means the key is removed
    pub fn to_fields(&self) -> Vec<(&'static str, Option<Value>)> {
        vec![
            (FORMS_LAYER_INDEX, self.forms_layer_index.map(Value::from)),
            (
                NESTED_FORM_KEYS,
                (!self.nested_form_keys.is_empty()).then(|| {
                    Value::Object(
                        self.nested_form_keys
                            .iter()
                            .map(|(k, v)| (k.clone(), Value::from(*v)))
                            .collect(),
                    )
                }),
            ),
            (FORM_CONFIRMING, self.form_confirming.then_some(Value::Bool(true))),
            (FORM_EDITING, self.form_editing.then_some(Value::Bool(true))),
            (FORM_ON_EDIT_INDEX, self.form_on_edit_index.map(Value::from)),
        ]
    }
}

/// Typed view of the bot's keys in the room options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    /// `None` until the conversation has been greeted
    pub path: Option<Vec<usize>>,
    pub form: ConversationFormState,
    pub version: u64,
}

impl ConversationState {
    /// Decode the bot's keys, ignoring everything else in the map.
    /// Malformed values read as absent.
    pub fn from_options(options: &RoomOptions) -> Self {
        Self {
            path: options.get(BOT_LAYER).and_then(decode),
            form: ConversationFormState::from_options(options),
            version: options
                .get(STATE_VERSION)
                .and_then(Value::as_u64)
                .unwrap_or(0),
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: &Value) -> Option<T> {
    serde_json::from_value(value.clone()).ok()
}

// ============================================================================
// Profile
// ============================================================================

/// One collected answer in the room's user properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub key: String,
    pub value: String,
}

impl ProfileEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Replace the value for an existing key, or append
pub fn upsert_profile(entries: &mut Vec<ProfileEntry>, entry: ProfileEntry) {
    match entries.iter_mut().find(|e| e.key == entry.key) {
        Some(existing) => existing.value = entry.value,
        None => entries.push(entry),
    }
}
