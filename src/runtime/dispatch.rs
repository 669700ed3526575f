//! Turn dispatcher
//!
//! Applies a turn's effects, then carries out its drafts in order.

use super::{BotRuntime, LayerSource, Platform, RouterError, Turn};
use crate::agent::select_agent;
use crate::state_machine::{upsert_profile, ConversationState, Draft, Effect, OptionsPatch, Routing};
use rand::rngs::StdRng;
use rand::SeedableRng;

impl<P: Platform, L: LayerSource> BotRuntime<P, L> {
    /// Write the turn's effects.
    ///
    /// Profile entries are stored before the options patch advances the
    /// conversation.
    /// Options are merged field by field into a fresh read so keys written
    /// by anyone else survive. There is no lock; a moved version is logged.
    pub(crate) async fn apply_effects(&self, turn: &Turn) -> Result<(), RouterError> {
        let room_id = turn.inbound.room_id.as_str();

        let entries: Vec<_> = turn
            .effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::SaveProfileEntry { entry } => Some(entry.clone()),
                _ => None,
            })
            .collect();
        if !entries.is_empty() {
            let mut profile = self.platform.profile(room_id).await?;
            for entry in entries {
                upsert_profile(&mut profile, entry);
            }
            self.platform.save_profile(room_id, &profile).await?;
        }

        let patch = OptionsPatch::from_effects(&turn.effects);
        if !patch.is_empty() {
            let mut options = self.platform.room_options(room_id).await?;
            let current = ConversationState::from_options(&options).version;
            if current != turn.read_version {
                tracing::warn!(
                    room_id,
                    read_version = turn.read_version,
                    current_version = current,
                    "Room state changed during the turn"
                );
            }
            patch.apply(&mut options);
            self.platform.update_room_options(room_id, &options).await?;
        }

        Ok(())
    }

    pub(crate) async fn dispatch(&self, turn: &Turn) -> Result<(), RouterError> {
        for draft in &turn.drafts {
            self.dispatch_draft(turn, draft).await?;
        }
        Ok(())
    }

    async fn dispatch_draft(&self, turn: &Turn, draft: &Draft) -> Result<(), RouterError> {
        let room_id = turn.inbound.room_id.as_str();

        if !draft.text.is_empty() {
            self.platform.send_message(room_id, &draft.text).await?;
        }

        match &draft.routing {
            Routing::Continue => Ok(()),
            Routing::Resolve => self.resolve(turn).await,
            Routing::Handover { division } => self.handover(turn, division.as_deref()).await,
        }
    }

    async fn resolve(&self, turn: &Turn) -> Result<(), RouterError> {
        let room_id = turn.inbound.room_id.as_str();
        self.clear_bot_state(room_id).await?;

        if let Some(tag) = &self.config.routing.auto_resolve_tag {
            self.platform.tag_room(room_id, tag).await?;
        }

        self.platform
            .resolve(room_id, &turn.inbound.message_id)
            .await?;
        tracing::info!(room_id, "Conversation resolved");
        Ok(())
    }

    /// Hand the room to an agent. The agent is chosen before anything
    /// changes, so a failed selection leaves the bot in charge.
    async fn handover(&self, turn: &Turn, division: Option<&str>) -> Result<(), RouterError> {
        let room_id = turn.inbound.room_id.as_str();
        let mut rng = StdRng::from_entropy();
        let agent = select_agent(
            &self.platform,
            turn.inbound.channel_id,
            division,
            &self.config.routing.pool_division,
            &mut rng,
        )
        .await?;

        self.platform.toggle_bot(room_id, false).await?;
        self.clear_bot_state(room_id).await?;
        self.platform.assign_agent(room_id, agent.id).await?;

        tracing::info!(room_id, agent_id = agent.id, ?division, "Conversation handed over");
        Ok(())
    }

    async fn clear_bot_state(&self, room_id: &str) -> Result<(), RouterError> {
        let mut options = self.platform.room_options(room_id).await?;
        OptionsPatch::clear_bot_state().apply(&mut options);
        self.platform.update_room_options(room_id, &options).await?;
        Ok(())
    }
}
