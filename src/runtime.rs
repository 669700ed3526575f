//! Runtime for handling webhook turns
//!
//! One inbound message is one turn: the composer decides the drafts and
//! state writes, then the dispatcher applies the writes and carries out the
//! drafts against the platform.

mod composer;
mod dispatch;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use traits::*;

use crate::agent::AgentError;
use crate::config::RouterConfig;
use crate::layer::{LayerError, LayerStore};
use crate::platform::{MultichannelClient, PlatformError};
use crate::state_machine::form::FormError;
use crate::state_machine::{Draft, Effect};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Type alias for production runtime with concrete implementations
pub type ProductionRuntime = BotRuntime<Arc<MultichannelClient>, LayerStore>;

/// Source of the current time
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// A decoded inbound chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub room_id: String,
    pub channel_id: i64,
    /// Platform id of the message; the last message id when resolving
    pub message_id: String,
    pub text: String,
}

/// Everything decided for one inbound message
#[derive(Debug, Clone)]
pub struct Turn {
    pub inbound: InboundMessage,
    pub drafts: Vec<Draft>,
    pub effects: Vec<Effect>,
    /// `bot_state_version` seen when the turn was decided
    pub read_version: u64,
}

impl Turn {
    fn new(inbound: &InboundMessage, read_version: u64) -> Self {
        Self {
            inbound: inbound.clone(),
            drafts: vec![],
            effects: vec![],
            read_version,
        }
    }
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Layer(#[from] LayerError),
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error(transparent)]
    Form(#[from] FormError),
}

/// Entry point the HTTP layer drives
#[async_trait]
pub trait TurnHandler: Send + Sync {
    async fn handle(&self, inbound: InboundMessage) -> Result<Turn, RouterError>;
}

/// Bot runtime over a platform and a layer source
pub struct BotRuntime<P, L> {
    platform: P,
    layers: L,
    config: Arc<RouterConfig>,
    clock: Clock,
}

impl<P: Platform, L: LayerSource> BotRuntime<P, L> {
    pub fn new(platform: P, layers: L, config: Arc<RouterConfig>) -> Self {
        Self {
            platform,
            layers,
            config,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Decide, persist, then dispatch one turn.
    ///
    /// When the layer tree cannot be loaded the user gets the apology wording
    /// and the error is returned.
    pub async fn run_turn(&self, inbound: &InboundMessage) -> Result<Turn, RouterError> {
        let turn = match self.determine(inbound).await {
            Ok(turn) => turn,
            Err(RouterError::Layer(e)) => {
                tracing::error!(
                    room_id = %inbound.room_id,
                    channel_id = inbound.channel_id,
                    error = %e,
                    "Failed to load layer tree"
                );
                self.apologize(&inbound.room_id).await;
                return Err(RouterError::Layer(e));
            }
            Err(e) => return Err(e),
        };

        self.apply_effects(&turn).await?;
        self.dispatch(&turn).await?;

        tracing::info!(
            room_id = %inbound.room_id,
            channel_id = inbound.channel_id,
            drafts = turn.drafts.len(),
            routing = turn.drafts.last().map_or("none", |d| d.routing.as_str()),
            "Turn handled"
        );
        Ok(turn)
    }

    async fn apologize(&self, room_id: &str) {
        let wording = &self.config.wording.error;
        if wording.is_empty() {
            return;
        }
        if let Err(e) = self.platform.send_message(room_id, wording).await {
            tracing::warn!(room_id, error = %e, "Failed to send apology");
        }
    }
}

#[async_trait]
impl<P: Platform, L: LayerSource> TurnHandler for BotRuntime<P, L> {
    async fn handle(&self, inbound: InboundMessage) -> Result<Turn, RouterError> {
        self.run_turn(&inbound).await
    }
}
