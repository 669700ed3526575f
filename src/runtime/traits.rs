//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the bot runtime with mock implementations.

use crate::agent::{Agent, Division};
use crate::layer::{LayerError, LayerNode, LayerStore};
use crate::office_hours::OfficeHours;
use crate::platform::PlatformError;
use crate::state_machine::{ProfileEntry, RoomOptions};
use async_trait::async_trait;
use std::sync::Arc;

/// Source of a channel's layer tree
#[async_trait]
pub trait LayerSource: Send + Sync {
    async fn load(&self, channel_id: i64) -> Result<LayerNode, LayerError>;
}

/// Room options, where conversation state lives
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn room_options(&self, room_id: &str) -> Result<RoomOptions, PlatformError>;

    /// Replace the whole options map
    async fn update_room_options(
        &self,
        room_id: &str,
        options: &RoomOptions,
    ) -> Result<(), PlatformError>;
}

/// Answers collected by forms
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn profile(&self, room_id: &str) -> Result<Vec<ProfileEntry>, PlatformError>;

    /// Replace the whole list
    async fn save_profile(&self, room_id: &str, entries: &[ProfileEntry])
        -> Result<(), PlatformError>;
}

/// Outbound actions on a room
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, room_id: &str, text: &str) -> Result<(), PlatformError>;

    async fn resolve(&self, room_id: &str, last_message_id: &str) -> Result<(), PlatformError>;

    async fn tag_room(&self, room_id: &str, tag: &str) -> Result<(), PlatformError>;

    async fn toggle_bot(&self, room_id: &str, active: bool) -> Result<(), PlatformError>;

    async fn assign_agent(&self, room_id: &str, agent_id: i64) -> Result<(), PlatformError>;
}

/// Agents and divisions
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    async fn agents(&self) -> Result<Vec<Agent>, PlatformError>;

    async fn divisions(&self) -> Result<Vec<Division>, PlatformError>;

    async fn agents_by_division(&self, division_id: i64) -> Result<Vec<Agent>, PlatformError>;
}

#[async_trait]
pub trait OfficeHoursSource: Send + Sync {
    async fn office_hours(&self) -> Result<OfficeHours, PlatformError>;
}

/// Combined platform trait for convenience
pub trait Platform: RoomStore + ProfileStore + Messenger + AgentDirectory + OfficeHoursSource {}
impl<T: RoomStore + ProfileStore + Messenger + AgentDirectory + OfficeHoursSource> Platform for T {}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: LayerSource + ?Sized> LayerSource for Arc<T> {
    async fn load(&self, channel_id: i64) -> Result<LayerNode, LayerError> {
        (**self).load(channel_id).await
    }
}

#[async_trait]
impl<T: RoomStore + ?Sized> RoomStore for Arc<T> {
    async fn room_options(&self, room_id: &str) -> Result<RoomOptions, PlatformError> {
        (**self).room_options(room_id).await
    }

    async fn update_room_options(
        &self,
        room_id: &str,
        options: &RoomOptions,
    ) -> Result<(), PlatformError> {
        (**self).update_room_options(room_id, options).await
    }
}

#[async_trait]
impl<T: ProfileStore + ?Sized> ProfileStore for Arc<T> {
    async fn profile(&self, room_id: &str) -> Result<Vec<ProfileEntry>, PlatformError> {
        (**self).profile(room_id).await
    }

    async fn save_profile(
        &self,
        room_id: &str,
        entries: &[ProfileEntry],
    ) -> Result<(), PlatformError> {
        (**self).save_profile(room_id, entries).await
    }
}

#[async_trait]
impl<T: Messenger + ?Sized> Messenger for Arc<T> {
    async fn send_message(&self, room_id: &str, text: &str) -> Result<(), PlatformError> {
        (**self).send_message(room_id, text).await
    }

    async fn resolve(&self, room_id: &str, last_message_id: &str) -> Result<(), PlatformError> {
        (**self).resolve(room_id, last_message_id).await
    }

    async fn tag_room(&self, room_id: &str, tag: &str) -> Result<(), PlatformError> {
        (**self).tag_room(room_id, tag).await
    }

    async fn toggle_bot(&self, room_id: &str, active: bool) -> Result<(), PlatformError> {
        (**self).toggle_bot(room_id, active).await
    }

    async fn assign_agent(&self, room_id: &str, agent_id: i64) -> Result<(), PlatformError> {
        (**self).assign_agent(room_id, agent_id).await
    }
}

#[async_trait]
impl<T: AgentDirectory + ?Sized> AgentDirectory for Arc<T> {
    async fn agents(&self) -> Result<Vec<Agent>, PlatformError> {
        (**self).agents().await
    }

    async fn divisions(&self) -> Result<Vec<Division>, PlatformError> {
        (**self).divisions().await
    }

    async fn agents_by_division(&self, division_id: i64) -> Result<Vec<Agent>, PlatformError> {
        (**self).agents_by_division(division_id).await
    }
}

#[async_trait]
impl<T: OfficeHoursSource + ?Sized> OfficeHoursSource for Arc<T> {
    async fn office_hours(&self) -> Result<OfficeHours, PlatformError> {
        (**self).office_hours().await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

#[async_trait]
impl LayerSource for LayerStore {
    async fn load(&self, channel_id: i64) -> Result<LayerNode, LayerError> {
        LayerStore::load(self, channel_id).await
    }
}
