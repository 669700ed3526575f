//! Form collection
//!
//! Multi-step structured data collection attached to a layer node. The
//! transition table:
//!
//! | phase           | reply                      | next phase              |
//! |-----------------|----------------------------|-------------------------|
//! | `Start`         | anything                   | `Answering { 0 }`       |
//! | `Answering { i }` | valid answer, more steps | `Answering { i + 1 }`   |
//! | `Answering { i }` | valid answer, last step  | `Confirming`            |
//! | `Confirming`    | confirmed option           | cleared, handover       |
//! | `Confirming`    | reset option               | `Answering { 0 }`       |
//! | `Confirming`    | edit option                | `SelectingEdit`         |
//! | `SelectingEdit` | valid step number          | `Editing { n }`         |
//! | `Editing { n }` | valid answer               | `Confirming`            |
//!
//! Invalid replies leave the state untouched and return an error carrying
//! the prompt to repeat.

use super::effect::Effect;
use super::state::{upsert_profile, ConversationFormState, Draft, FormPhase, ProfileEntry, Routing};
use super::traversal::parse_index;
use crate::layer::{match_answer, AdditionalInformation, Form, LayerNode};
use thiserror::Error;

/// Result of a form transition
#[derive(Debug)]
pub struct FormTransition {
    pub new_state: ConversationFormState,
    pub drafts: Vec<Draft>,
    pub effects: Vec<Effect>,
}

impl FormTransition {
    pub fn new(state: ConversationFormState) -> Self {
        Self {
            new_state: state,
            drafts: vec![],
            effects: vec![],
        }
    }

    pub fn with_draft(mut self, draft: Draft) -> Self {
        self.drafts.push(draft);
        self
    }

    /// Add a plain draft unless the text is empty
    pub fn say(self, text: &str) -> Self {
        if text.is_empty() {
            self
        } else {
            self.with_draft(Draft::say(text))
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Persist `new_state` as the stored form state
    fn persisted(self) -> Self {
        let effect = Effect::persist_form(&self.new_state);
        self.with_effect(effect)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Answer {reply:?} is not one of the accepted values")]
    InvalidAnswer { reply: String, reprompt: String },
    #[error("Invalid confirmation option {reply:?}")]
    InvalidConfirmation { reply: String, reprompt: String },
    #[error("Invalid form step selection {reply:?}")]
    InvalidSelection { reply: String, reprompt: String },
    #[error("Form step {index} does not exist")]
    MissingStep { index: usize },
}

impl FormError {
    /// Prompt to show again for recoverable errors
    pub fn reprompt(&self) -> Option<&str> {
        match self {
            FormError::InvalidAnswer { reprompt, .. }
            | FormError::InvalidConfirmation { reprompt, .. }
            | FormError::InvalidSelection { reprompt, .. } => Some(reprompt),
            FormError::MissingStep { .. } => None,
        }
    }
}

/// Advance the form attached to `node` with `reply`.
///
/// `profile` is the room's stored answers before this turn; answers given
/// in this turn are merged in before the confirmation is rendered.
pub fn transition(
    node: &LayerNode,
    state: &ConversationFormState,
    reply: &str,
    profile: &[ProfileEntry],
) -> Result<FormTransition, FormError> {
    let info = &node.additional_information;

    match state.phase() {
        FormPhase::Start => start(info),
        FormPhase::Answering { index } => answer(info, state, index, reply, profile),
        FormPhase::Confirming => confirm(node, state, reply, profile),
        FormPhase::SelectingEdit => select_edit(info, state, reply),
        FormPhase::Editing { index } => edit(info, state, index, reply, profile),
    }
}

fn start(info: &AdditionalInformation) -> Result<FormTransition, FormError> {
    let first = info.forms.first().ok_or(FormError::MissingStep { index: 0 })?;
    let state = ConversationFormState {
        forms_layer_index: Some(0),
        ..Default::default()
    };
    let question = prompt(first, &state);

    Ok(FormTransition::new(state)
        .say(&info.instruction)
        .with_draft(Draft::say(question))
        .persisted())
}

fn answer(
    info: &AdditionalInformation,
    state: &ConversationFormState,
    index: usize,
    reply: &str,
    profile: &[ProfileEntry],
) -> Result<FormTransition, FormError> {
    let ongoing = info.forms.get(index).ok_or(FormError::MissingStep { index })?;
    let branch = accept(ongoing, state, reply)?;
    let entry = ProfileEntry::new(&ongoing.key, reply.trim());
    let mut new_state = state.clone();

    let next = index + 1;
    let Some(next_form) = info.forms.get(next) else {
        new_state.form_confirming = true;
        let summary = render_confirmation(info, &merged(profile, &entry));
        return Ok(FormTransition::new(new_state)
            .with_draft(Draft::say(summary))
            .with_effect(Effect::SaveProfileEntry { entry })
            .persisted());
    };

    if !next_form.questions.is_empty() {
        for &sibling in &ongoing.required_by {
            if let Some(form) = info.forms.get(sibling) {
                new_state.nested_form_keys.insert(form.nested_key(), branch);
            }
        }
    }
    new_state.forms_layer_index = Some(next);
    let question = prompt(next_form, &new_state);

    Ok(FormTransition::new(new_state)
        .with_draft(Draft::say(question))
        .with_effect(Effect::SaveProfileEntry { entry })
        .persisted())
}

fn confirm(
    node: &LayerNode,
    state: &ConversationFormState,
    reply: &str,
    profile: &[ProfileEntry],
) -> Result<FormTransition, FormError> {
    let info = &node.additional_information;
    let confirmation = &info.forms_confirmation;

    let Some(option) = parse_index(reply).and_then(|i| confirmation.options.get(i - 1)) else {
        return Err(FormError::InvalidConfirmation {
            reply: reply.to_string(),
            reprompt: render_confirmation(info, profile),
        });
    };

    if option.confirmed {
        let mut texts = confirmation.additional_messages.clone();
        if texts.is_empty() {
            texts.push(option.message.clone());
        }
        let routing = Routing::handover(&node.division);
        let mut result = FormTransition::new(ConversationFormState::default());
        result.drafts = Draft::sequence(texts, &routing);
        return Ok(result.with_effect(Effect::ClearFormState));
    }

    if option.reset {
        let first = info.forms.first().ok_or(FormError::MissingStep { index: 0 })?;
        let new_state = ConversationFormState {
            forms_layer_index: Some(0),
            ..Default::default()
        };
        let question = prompt(first, &new_state);
        return Ok(FormTransition::new(new_state)
            .say(&option.message)
            .with_draft(Draft::say(question))
            .persisted());
    }

    if option.edit {
        let new_state = ConversationFormState {
            form_editing: true,
            ..state.clone()
        };
        return Ok(FormTransition::new(new_state)
            .say(&option.message)
            .with_draft(Draft::say(edit_menu(info)))
            .persisted());
    }

    Ok(FormTransition::new(state.clone())
        .say(&option.message)
        .with_draft(Draft::say(render_confirmation(info, profile))))
}

fn select_edit(
    info: &AdditionalInformation,
    state: &ConversationFormState,
    reply: &str,
) -> Result<FormTransition, FormError> {
    let Some(index) = parse_index(reply).map(|i| i - 1).filter(|&i| i < info.forms.len()) else {
        return Err(FormError::InvalidSelection {
            reply: reply.to_string(),
            reprompt: edit_menu(info),
        });
    };

    let new_state = ConversationFormState {
        form_editing: false,
        form_on_edit_index: Some(index),
        ..state.clone()
    };
    let question = prompt(&info.forms[index], &new_state);

    Ok(FormTransition::new(new_state)
        .with_draft(Draft::say(question))
        .persisted())
}

fn edit(
    info: &AdditionalInformation,
    state: &ConversationFormState,
    index: usize,
    reply: &str,
    profile: &[ProfileEntry],
) -> Result<FormTransition, FormError> {
    let form = info.forms.get(index).ok_or(FormError::MissingStep { index })?;
    accept(form, state, reply)?;
    let entry = ProfileEntry::new(&form.key, reply.trim());

    let new_state = ConversationFormState {
        form_on_edit_index: None,
        form_confirming: true,
        ..state.clone()
    };
    let summary = render_confirmation(info, &merged(profile, &entry));

    Ok(FormTransition::new(new_state)
        .with_draft(Draft::say(summary))
        .with_effect(Effect::SaveProfileEntry { entry })
        .persisted())
}

/// Validate a reply against a step. Returns the chosen branch: the position
/// of the matched answer, or 0 for free text.
fn accept(form: &Form, state: &ConversationFormState, reply: &str) -> Result<usize, FormError> {
    let rejected = |reprompt: &str| FormError::InvalidAnswer {
        reply: reply.to_string(),
        reprompt: reprompt.to_string(),
    };

    let flat = match_answer(&form.answers, reply).map_err(|()| rejected(&form.question))?;

    let nested = match form.questions.get(state.nested_pointer(form)) {
        Some(nested) => {
            match_answer(&nested.answers, reply).map_err(|()| rejected(&nested.question))?
        }
        None => None,
    };

    Ok(flat.or(nested).unwrap_or(0))
}

/// Question to ask for a step: the nested question its pointer selects, or
/// the flat question
fn prompt(form: &Form, state: &ConversationFormState) -> String {
    form.questions
        .get(state.nested_pointer(form))
        .map_or_else(|| form.question.clone(), |q| q.question.clone())
}

fn edit_menu(info: &AdditionalInformation) -> String {
    info.forms
        .iter()
        .enumerate()
        .map(|(i, form)| {
            let label = if form.question.is_empty() {
                &form.key
            } else {
                &form.question
            };
            format!("{}. {label}", i + 1)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn merged(profile: &[ProfileEntry], entry: &ProfileEntry) -> Vec<ProfileEntry> {
    let mut entries = profile.to_vec();
    upsert_profile(&mut entries, entry.clone());
    entries
}

/// Render the confirmation summary.
///
/// One `key: value` line per answered step in form order; steps with an
/// `eng_key` get a second line under that label and a blank line after.
/// The summary replaces the template's `%s`, or follows the template when
/// it has no slot.
pub fn render_confirmation(info: &AdditionalInformation, profile: &[ProfileEntry]) -> String {
    let mut summary = String::new();
    for form in &info.forms {
        for entry in profile.iter().filter(|e| e.key == form.key) {
            if form.eng_key.is_empty() {
                summary.push_str(&format!("{}: {}\n", entry.key, entry.value));
            } else {
                summary.push_str(&format!(
                    "{}: {}\n{}: {}\n\n",
                    entry.key, entry.value, form.eng_key, entry.value
                ));
            }
        }
    }

    let template = &info.forms_confirmation.message;
    if template.contains("%s") {
        template.replacen("%s", &summary, 1)
    } else if template.is_empty() {
        summary
    } else {
        format!("{template}\n{summary}")
    }
}
