//! Draft composer
//!
//! Turns an inbound message into drafts and effects. Reads from the
//! platform but never writes; writes happen in the dispatcher once the
//! drafts are final.

use super::{BotRuntime, InboundMessage, LayerSource, Platform, RouterError, Turn};
use crate::layer::LayerNode;
use crate::office_hours::WeeklySchedule;
use crate::state_machine::form::{self, FormError};
use crate::state_machine::traversal::descend;
use crate::state_machine::{
    resolve_next, ConversationFormState, ConversationState, Draft, Effect, Routing,
    TraversalError,
};

impl<P: Platform, L: LayerSource> BotRuntime<P, L> {
    /// Decide what the bot says for `inbound`
    pub async fn determine(&self, inbound: &InboundMessage) -> Result<Turn, RouterError> {
        if self.config.routing.office_hours_enabled && !self.office_open().await? {
            tracing::info!(room_id = %inbound.room_id, "Outside office hours");
            let mut turn = Turn::new(inbound, 0);
            turn.drafts.push(
                Draft::say(&self.config.wording.out_of_office).with_routing(Routing::Resolve),
            );
            return Ok(turn);
        }

        let root = self.layers.load(inbound.channel_id).await?;
        let options = self.platform.room_options(&inbound.room_id).await?;
        let state = ConversationState::from_options(&options);
        let mut turn = Turn::new(inbound, state.version);

        let Some(path) = state.path else {
            tracing::info!(room_id = %inbound.room_id, "New conversation");
            turn.effects.push(Effect::persist_path(&[]));
            turn.drafts = Draft::sequence(root.texts(), &Routing::Continue);
            return Ok(turn);
        };

        let commands = &self.config.commands;
        let text = inbound.text.as_str();

        if path.is_empty() && commands.is_direct_to_agent(text) {
            turn.drafts.push(
                Draft::say(&self.config.wording.waiting_agent)
                    .with_routing(Routing::Handover { division: None }),
            );
            return Ok(turn);
        }

        if !path.is_empty() && commands.is_reset(text) {
            let mut kept = commands.reset_path(&path);
            let node = match descend(&root, &kept) {
                Ok(node) => node,
                Err(e) => {
                    tracing::warn!(room_id = %inbound.room_id, error = %e, "Reset target is stale, restarting");
                    kept.clear();
                    &root
                }
            };
            tracing::info!(room_id = %inbound.room_id, ?path, ?kept, "Layer reset");
            turn.effects.push(Effect::ClearFormState);
            turn.effects.push(Effect::persist_path(&kept));
            turn.drafts = Draft::sequence(node.texts(), &Routing::Continue);
            return Ok(turn);
        }

        let resolution = match resolve_next(&root, &path, text, commands) {
            Ok(resolution) => resolution,
            Err(TraversalError::InvalidSelection { input, prompt }) => {
                tracing::debug!(room_id = %inbound.room_id, ?path, input = %input, "Invalid selection");
                turn.drafts = self.reprompt(&prompt);
                return Ok(turn);
            }
            Err(e @ TraversalError::StalePath { .. }) => {
                tracing::warn!(room_id = %inbound.room_id, error = %e, "Stored path is stale, restarting");
                turn.effects.push(Effect::ClearFormState);
                turn.effects.push(Effect::persist_path(&[]));
                turn.drafts = Draft::sequence(root.texts(), &Routing::Continue);
                return Ok(turn);
            }
        };

        let node = resolution.node;
        let in_form = state.form.in_progress();
        let stays_in_form = in_form && node.add_additional_information && resolution.path == path;
        if !stays_in_form {
            turn.effects.push(Effect::persist_path(&resolution.path));
        }
        if in_form && !stays_in_form {
            turn.effects.push(Effect::ClearFormState);
        }

        tracing::debug!(
            room_id = %inbound.room_id,
            path = ?resolution.path,
            phase = ?resolution.phase(),
            "Resolved node"
        );

        if node.add_additional_information {
            let form_state = if stays_in_form {
                state.form
            } else {
                ConversationFormState::default()
            };
            self.collect_form(&mut turn, node, &form_state).await?;
        } else {
            turn.drafts = Draft::sequence(node.texts(), &node.routing());
        }

        Ok(turn)
    }

    async fn office_open(&self) -> Result<bool, RouterError> {
        let hours = self.platform.office_hours().await?;
        match WeeklySchedule::try_from(&hours) {
            Ok(schedule) => Ok(schedule.is_open((self.clock)())),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed office hours");
                Ok(true)
            }
        }
    }

    async fn collect_form(
        &self,
        turn: &mut Turn,
        node: &LayerNode,
        state: &ConversationFormState,
    ) -> Result<(), RouterError> {
        let profile = self.platform.profile(&turn.inbound.room_id).await?;

        match form::transition(node, state, &turn.inbound.text, &profile) {
            Ok(result) => {
                turn.drafts.extend(result.drafts);
                turn.effects.extend(result.effects);
                Ok(())
            }
            Err(e @ FormError::MissingStep { .. }) => Err(e.into()),
            Err(e) => {
                tracing::debug!(room_id = %turn.inbound.room_id, error = %e, "Form reply rejected");
                if let Some(prompt) = e.reprompt() {
                    turn.drafts = self.reprompt(prompt);
                }
                Ok(())
            }
        }
    }

    /// Fallback wording (when configured) followed by the prompt to answer
    fn reprompt(&self, prompt: &str) -> Vec<Draft> {
        [self.config.wording.fallback.as_str(), prompt]
            .into_iter()
            .filter(|text| !text.is_empty())
            .map(Draft::say)
            .collect()
    }
}
