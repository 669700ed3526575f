//! Agent selection for handover
//!
//! Picks a human agent for a conversation: a random available agent from
//! the target division (or everyone), falling back to the pool division
//! where availability is not required.

use crate::platform::PlatformError;
use crate::runtime::AgentDirectory;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const AGENT_TYPE: &str = "agent";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Agent {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_available: bool,
    /// "agent", "supervisor", "admin"
    pub type_as_string: String,
    pub user_channels: Vec<ChannelRef>,
}

impl Agent {
    fn serves(&self, channel_id: i64) -> bool {
        self.type_as_string == AGENT_TYPE && self.user_channels.iter().any(|c| c.id == channel_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Division {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("No agent available for channel {channel_id} (division: {division:?})")]
    NoAgentAvailable {
        channel_id: i64,
        division: Option<String>,
    },
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Random available agent serving the channel
pub fn pick_available<'a, R: Rng + ?Sized>(
    candidates: &'a [Agent],
    channel_id: i64,
    rng: &mut R,
) -> Option<&'a Agent> {
    let online: Vec<&Agent> = candidates
        .iter()
        .filter(|a| a.is_available && a.serves(channel_id))
        .collect();
    online.choose(rng).copied()
}

/// Random pool agent serving the channel, available or not
pub fn pick_pool<'a, R: Rng + ?Sized>(
    pool: &'a [Agent],
    channel_id: i64,
    rng: &mut R,
) -> Option<&'a Agent> {
    let members: Vec<&Agent> = pool.iter().filter(|a| a.serves(channel_id)).collect();
    members.choose(rng).copied()
}

/// Choose the agent a conversation is handed to.
///
/// `division` narrows the candidates to that division's members; an unknown
/// name leaves no candidates, so the pool decides.
pub async fn select_agent<D, R>(
    directory: &D,
    channel_id: i64,
    division: Option<&str>,
    pool_division: &str,
    rng: &mut R,
) -> Result<Agent, AgentError>
where
    D: AgentDirectory + ?Sized,
    R: Rng + Send + ?Sized,
{
    let candidates = match division {
        Some(name) => members_of(directory, name).await?,
        None => directory.agents().await?,
    };
    if let Some(agent) = pick_available(&candidates, channel_id, rng) {
        tracing::info!(agent_id = agent.id, channel_id, ?division, "Selected available agent");
        return Ok(agent.clone());
    }

    let pool = if pool_division.is_empty() {
        vec![]
    } else {
        members_of(directory, pool_division).await?
    };
    if let Some(agent) = pick_pool(&pool, channel_id, rng) {
        tracing::info!(agent_id = agent.id, channel_id, pool = pool_division, "Selected pool agent");
        return Ok(agent.clone());
    }

    Err(AgentError::NoAgentAvailable {
        channel_id,
        division: division.map(str::to_string),
    })
}

async fn members_of<D: AgentDirectory + ?Sized>(
    directory: &D,
    division_name: &str,
) -> Result<Vec<Agent>, PlatformError> {
    let divisions = directory.divisions().await?;
    match divisions.iter().find(|d| d.name == division_name) {
        Some(division) => directory.agents_by_division(division.id).await,
        None => {
            tracing::warn!(division = division_name, "Division not found");
            Ok(vec![])
        }
    }
}
