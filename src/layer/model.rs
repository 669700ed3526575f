//! Layer tree types
//!
//! Field names follow the JSON format operators upload. Every field is
//! optional in the document; `null` collections are read as empty.

use crate::state_machine::Routing;
use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One node of the menu tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerNode {
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub options: Vec<LayerNode>,
    pub handover: bool,
    /// Treat the next reply as free text and continue with the first option
    pub input: bool,
    pub resolve: bool,
    /// Target division for a handover; empty means any agent
    #[serde(deserialize_with = "null_as_default")]
    pub division: String,
    pub add_additional_information: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub additional_information: AdditionalInformation,
    /// Sent as separate messages in place of `message` when non-empty
    #[serde(deserialize_with = "null_as_default")]
    pub messages: Vec<String>,
}

impl LayerNode {
    /// Nodes that stop traversal before the next reply is consumed
    pub fn is_terminal(&self) -> bool {
        self.handover || self.resolve || self.add_additional_information
    }

    /// Child at a 1-based option index
    pub fn child(&self, index: usize) -> Option<&LayerNode> {
        index.checked_sub(1).and_then(|i| self.options.get(i))
    }

    /// Routing decision the caller acts on for this node's last draft.
    /// Handover wins over resolve.
    pub fn routing(&self) -> Routing {
        if self.handover {
            Routing::handover(&self.division)
        } else if self.resolve {
            Routing::Resolve
        } else {
            Routing::Continue
        }
    }

    /// Texts this node sends: each of `messages`, or the single `message`
    pub fn texts(&self) -> Vec<String> {
        if self.messages.is_empty() {
            vec![self.message.clone()]
        } else {
            self.messages.clone()
        }
    }

    /// Check the structural invariants of the whole tree.
    ///
    /// Returns a description of the first violation, naming the offending
    /// node by its 1-based path.
    pub fn validate(&self) -> Result<(), String> {
        let mut stack: Vec<(Vec<usize>, &LayerNode)> = vec![(Vec::new(), self)];

        while let Some((path, node)) = stack.pop() {
            if node.input && node.options.is_empty() {
                return Err(format!(
                    "node at {path:?} accepts free input but has no options"
                ));
            }
            if node.add_additional_information && node.additional_information.forms.is_empty() {
                return Err(format!(
                    "node at {path:?} requests additional information but defines no forms"
                ));
            }
            for (i, child) in node.options.iter().enumerate() {
                let mut child_path = path.clone();
                child_path.push(i + 1);
                stack.push((child_path, child));
            }
        }

        Ok(())
    }
}

/// Multi-step form attached to a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalInformation {
    #[serde(deserialize_with = "null_as_default")]
    pub instruction: String,
    #[serde(deserialize_with = "null_as_default")]
    pub forms: Vec<Form>,
    #[serde(deserialize_with = "null_as_default")]
    pub forms_confirmation: FormsConfirmation,
}

/// One step of the form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Form {
    #[serde(deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    /// Alternate label shown next to `key` in the confirmation summary
    #[serde(deserialize_with = "null_as_default")]
    pub eng_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub questions: Vec<NestedQuestion>,
    #[serde(deserialize_with = "null_as_default")]
    pub answers: Vec<Answer>,
    /// 0-based indices of forms whose nested question depends on this answer
    #[serde(deserialize_with = "null_as_default")]
    pub required_by: Vec<usize>,
}

impl Form {
    /// Key under which the nested-question pointer of this form is stored
    pub fn nested_key(&self) -> String {
        format!("{}_question_index", self.key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NestedQuestion {
    #[serde(deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(deserialize_with = "null_as_default")]
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Answer {
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
}

/// Position of `reply` among enumerated answers. An empty list accepts anything.
pub(crate) fn match_answer(answers: &[Answer], reply: &str) -> Result<Option<usize>, ()> {
    if answers.is_empty() {
        return Ok(None);
    }
    let reply = reply.trim();
    answers
        .iter()
        .position(|a| a.value == reply)
        .map(Some)
        .ok_or(())
}

/// Summary shown once every form step is answered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfirmation {
    /// Template with one `%s` slot for the collected answers
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub options: Vec<ConfirmationOption>,
    #[serde(deserialize_with = "null_as_default")]
    pub additional_messages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationOption {
    pub confirmed: bool,
    pub reset: bool,
    pub edit: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
}
