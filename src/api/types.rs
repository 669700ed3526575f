//! API request and response types

use crate::runtime::InboundMessage;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Webhook body posted by the platform for every customer message
#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    pub payload: WebhookPayload,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub from: WebhookSender,
    pub message: WebhookMessage,
    pub room: WebhookRoom,
    #[serde(default, rename = "type")]
    pub event_type: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WebhookSender {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct WebhookMessage {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub id_str: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "type")]
    pub message_type: String,
}

#[derive(Debug, Deserialize)]
pub struct WebhookRoom {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// JSON object encoded as a string
    #[serde(default)]
    pub options: String,
}

/// The part of the room options the router needs
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RoomChannelOptions {
    channel: String,
    channel_details: ChannelDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChannelDetails {
    channel_id: i64,
}

/// Platform ids arrive as numbers or strings depending on the event
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

#[derive(Debug, Error)]
pub enum InboundError {
    #[error("Webhook has no room id")]
    MissingRoom,
    #[error("Room options are not valid JSON: {0}")]
    InvalidRoomOptions(#[source] serde_json::Error),
    #[error("Room options carry no channel id")]
    MissingChannel,
}

impl TryFrom<WebhookRequest> for InboundMessage {
    type Error = InboundError;

    fn try_from(request: WebhookRequest) -> Result<Self, Self::Error> {
        let WebhookPayload {
            from,
            message,
            room,
            event_type,
        } = request.payload;
        if room.id.trim().is_empty() {
            return Err(InboundError::MissingRoom);
        }

        let options: RoomChannelOptions = if room.options.trim().is_empty() {
            RoomChannelOptions::default()
        } else {
            serde_json::from_str(&room.options).map_err(InboundError::InvalidRoomOptions)?
        };
        let channel_id = options.channel_details.channel_id;
        if channel_id == 0 {
            return Err(InboundError::MissingChannel);
        }
        tracing::debug!(
            room_id = %room.id,
            channel = %options.channel,
            channel_id,
            sender = %from.id,
            event = %event_type,
            message_type = %message.message_type,
            "Decoded webhook"
        );

        let message_id = if message.id_str.is_empty() {
            message.id
        } else {
            message.id_str
        };

        Ok(InboundMessage {
            room_id: room.id,
            channel_id,
            message_id,
            text: message.text,
        })
    }
}

/// Response for a handled webhook
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub drafts: usize,
    pub routing: &'static str,
}

/// Response for a stored layer tree
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub path: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
