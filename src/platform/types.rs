//! Wire types for the messaging platform

use crate::agent::{Agent, Division};
use crate::office_hours::OfficeHours;
use crate::state_machine::ProfileEntry;
use serde::{Deserialize, Serialize};

// ============================================================================
// Chat SDK
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RoomsInfoResponse {
    pub results: RoomsInfoResults,
}

#[derive(Debug, Deserialize)]
pub struct RoomsInfoResults {
    #[serde(default)]
    pub rooms: Vec<RoomInfo>,
}

#[derive(Debug, Deserialize)]
pub struct RoomInfo {
    #[serde(default)]
    pub room_id: String,
    /// JSON object encoded as a string
    #[serde(default)]
    pub room_options: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateRoomRequest<'a> {
    pub room_id: &'a str,
    pub room_options: String,
}

// ============================================================================
// Multichannel
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BotMessageRequest<'a> {
    pub sender_email: &'a str,
    pub message: &'a str,
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub room_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct MarkResolvedRequest<'a> {
    pub room_id: &'a str,
    pub last_comment_id: &'a str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserProperties {
    #[serde(default)]
    pub user_properties: Vec<ProfileEntry>,
}

#[derive(Debug, Deserialize)]
pub struct UserInfoResponse {
    pub data: UserInfoData,
}

#[derive(Debug, Deserialize)]
pub struct UserInfoData {
    #[serde(default)]
    pub extras: Option<UserProperties>,
}

#[derive(Debug, Deserialize)]
pub struct AgentsResponse {
    pub data: AgentsData,
}

#[derive(Debug, Deserialize)]
pub struct AgentsData {
    #[serde(default)]
    pub agents: Vec<Agent>,
}

/// Envelope for endpoints that return a bare list under `data`
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

pub type DivisionsResponse = ListResponse<Division>;
pub type AgentsByDivisionResponse = ListResponse<Agent>;

#[derive(Debug, Deserialize)]
pub struct OfficeHoursResponse {
    pub data: OfficeHours,
}
