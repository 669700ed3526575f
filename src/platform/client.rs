//! reqwest implementation of the platform seams

use super::types::*;
use super::PlatformError;
use crate::agent::{Agent, Division};
use crate::config::PlatformConfig;
use crate::office_hours::OfficeHours;
use crate::runtime::{AgentDirectory, Messenger, OfficeHoursSource, ProfileStore, RoomStore};
use crate::state_machine::{ProfileEntry, RoomOptions};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Instant;

const PAGE_LIMIT: &str = "100";

/// Client for the chat SDK and multichannel APIs
#[derive(Clone)]
pub struct MultichannelClient {
    client: Client,
    config: PlatformConfig,
}

impl MultichannelClient {
    pub fn new(config: PlatformConfig, client: Client) -> Self {
        Self { client, config }
    }

    fn sdk(&self, path: &str) -> String {
        format!("{}{path}", self.config.sdk_url)
    }

    fn qismo(&self, path: &str) -> String {
        format!("{}{path}", self.config.qismo_url)
    }

    /// Chat SDK credentials
    fn with_sdk_auth(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("QISCUS-SDK-APP-ID", &self.config.app_id)
            .header("QISCUS-SDK-SECRET", &self.config.secret)
    }

    /// Admin token used by the read endpoints
    fn with_token(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", &self.config.token)
            .header("Qiscus-App-Id", &self.config.app_id)
    }

    /// App secret used by the write endpoints
    fn with_secret(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Qiscus-App-Id", &self.config.app_id)
            .header("Qiscus-Secret-Key", &self.config.secret)
    }

    /// Text message posted as the bot
    fn bot_message(&self, room_id: &str, text: &str) -> RequestBuilder {
        let payload = BotMessageRequest {
            sender_email: &self.config.admin_email,
            message: text,
            message_type: "text",
            room_id,
        };
        self.client
            .post(self.qismo(&format!("/{}/bot", self.config.app_id)))
            .header("QISCUS_SDK_SECRET", &self.config.secret)
            .json(&payload)
    }

    /// Send a request and return the body of a successful response.
    ///
    /// Every call is logged with its method, URL, status and duration.
    async fn execute(&self, request: RequestBuilder) -> Result<String, PlatformError> {
        let request = request
            .build()
            .map_err(|e| PlatformError::invalid_request(format!("Failed to build request: {e}")))?;
        let method = request.method().clone();
        let url = request.url().clone();
        let start = Instant::now();

        let response = self.client.execute(request).await.map_err(|e| {
            tracing::error!(%method, %url, error = %e, "Platform request failed");
            if e.is_timeout() {
                PlatformError::network(format!("Request timeout: {e}"))
            } else if e.is_connect() {
                PlatformError::network(format!("Connection failed: {e}"))
            } else {
                PlatformError::unknown(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlatformError::network(format!("Failed to read response: {e}")))?;

        tracing::info!(
            %method,
            %url,
            status = status.as_u16(),
            duration_ms = %start.elapsed().as_millis(),
            "Platform request completed"
        );

        if !status.is_success() {
            let error = PlatformError::from_status(status, &body);
            tracing::warn!(
                %url,
                kind = ?error.kind,
                retryable = error.kind.is_retryable(),
                body = %body,
                "Platform returned an error"
            );
            return Err(error);
        }
        Ok(body)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, PlatformError> {
        let body = self.execute(request).await?;
        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, PlatformError> {
    serde_json::from_str(body)
        .map_err(|e| PlatformError::decode(format!("Failed to parse response: {e} - body: {body}")))
}

/// Options of the requested room from a rooms-info response
fn find_room_options(rooms: Vec<RoomInfo>, room_id: &str) -> Result<RoomOptions, PlatformError> {
    let room = rooms
        .into_iter()
        .find(|room| room.room_id == room_id)
        .ok_or_else(|| PlatformError::not_found(format!("Room {room_id} not found")))?;
    parse_room_options(&room.room_options)
}

/// Room options arrive as a JSON object encoded in a string; empty means none
fn parse_room_options(raw: &str) -> Result<RoomOptions, PlatformError> {
    if raw.trim().is_empty() {
        return Ok(RoomOptions::new());
    }
    decode(raw)
}

#[async_trait]
impl RoomStore for MultichannelClient {
    async fn room_options(&self, room_id: &str) -> Result<RoomOptions, PlatformError> {
        let request = self
            .with_sdk_auth(self.client.get(self.sdk("/rest/get_rooms_info")))
            .query(&[("room_ids[]", room_id)]);
        let info: RoomsInfoResponse = self.fetch(request).await?;
        find_room_options(info.results.rooms, room_id)
    }

    async fn update_room_options(
        &self,
        room_id: &str,
        options: &RoomOptions,
    ) -> Result<(), PlatformError> {
        let payload = UpdateRoomRequest {
            room_id,
            room_options: serde_json::to_string(options)
                .map_err(|e| PlatformError::invalid_request(e.to_string()))?,
        };
        let request = self
            .with_sdk_auth(self.client.post(self.sdk("/rest/update_room")))
            .json(&payload);
        self.execute(request).await.map(|_| ())
    }
}

#[async_trait]
impl ProfileStore for MultichannelClient {
    async fn profile(&self, room_id: &str) -> Result<Vec<ProfileEntry>, PlatformError> {
        let url = self.qismo(&format!("/api/v1/qiscus/room/{room_id}/user_info"));
        let request = self.with_token(self.client.get(url));
        let info: UserInfoResponse = self.fetch(request).await?;
        Ok(info
            .data
            .extras
            .map(|extras| extras.user_properties)
            .unwrap_or_default())
    }

    async fn save_profile(
        &self,
        room_id: &str,
        entries: &[ProfileEntry],
    ) -> Result<(), PlatformError> {
        let url = self.qismo(&format!("/api/v1/qiscus/room/{room_id}/user_info"));
        let payload = UserProperties {
            user_properties: entries.to_vec(),
        };
        let request = self.with_secret(self.client.post(url)).json(&payload);
        self.execute(request).await.map(|_| ())
    }
}

#[async_trait]
impl Messenger for MultichannelClient {
    async fn send_message(&self, room_id: &str, text: &str) -> Result<(), PlatformError> {
        let request = self.bot_message(room_id, text);
        self.execute(request).await.map(|_| ())
    }

    async fn resolve(&self, room_id: &str, last_message_id: &str) -> Result<(), PlatformError> {
        let payload = MarkResolvedRequest {
            room_id,
            last_comment_id: last_message_id,
        };
        let request = self
            .with_secret(self.client.post(self.qismo("/api/v1/admin/service/mark_as_resolved")))
            .json(&payload);
        self.execute(request).await.map(|_| ())
    }

    async fn tag_room(&self, room_id: &str, tag: &str) -> Result<(), PlatformError> {
        let request = self
            .with_token(self.client.post(self.qismo("/api/v1/room_tag/create")))
            .form(&[("room_id", room_id), ("tag", tag)]);
        self.execute(request).await.map(|_| ())
    }

    async fn toggle_bot(&self, room_id: &str, active: bool) -> Result<(), PlatformError> {
        let url = self.qismo(&format!("/bot/{room_id}/activate"));
        let request = self
            .client
            .post(url)
            .header("Authorization", &self.config.token)
            .form(&[("is_active", active.to_string())]);
        self.execute(request).await.map(|_| ())
    }

    async fn assign_agent(&self, room_id: &str, agent_id: i64) -> Result<(), PlatformError> {
        let request = self
            .with_secret(self.client.post(self.qismo("/api/v1/admin/service/assign_agent")))
            .form(&[("agent_id", agent_id.to_string()), ("room_id", room_id.to_string())]);
        self.execute(request).await.map(|_| ())
    }
}

#[async_trait]
impl AgentDirectory for MultichannelClient {
    async fn agents(&self) -> Result<Vec<Agent>, PlatformError> {
        let request = self
            .with_token(self.client.get(self.qismo("/api/v2/admin/agents")))
            .query(&[("limit", PAGE_LIMIT)]);
        let response: AgentsResponse = self.fetch(request).await?;
        Ok(response.data.agents)
    }

    async fn divisions(&self) -> Result<Vec<Division>, PlatformError> {
        let request = self
            .with_token(self.client.get(self.qismo("/api/v2/divisions")))
            .query(&[("limit", PAGE_LIMIT)]);
        let response: DivisionsResponse = self.fetch(request).await?;
        Ok(response.data)
    }

    async fn agents_by_division(&self, division_id: i64) -> Result<Vec<Agent>, PlatformError> {
        let request = self
            .with_token(self.client.get(self.qismo("/api/v2/admin/agents/by_division")))
            .query(&[
                ("limit", PAGE_LIMIT.to_string()),
                ("division_ids[]", division_id.to_string()),
            ]);
        let response: AgentsByDivisionResponse = self.fetch(request).await?;
        Ok(response.data)
    }
}

#[async_trait]
impl OfficeHoursSource for MultichannelClient {
    async fn office_hours(&self) -> Result<OfficeHours, PlatformError> {
        let request = self.with_token(self.client.get(self.qismo("/api/v1/admin/office_hours")));
        let response: OfficeHoursResponse = self.fetch(request).await?;
        Ok(response.data)
    }
}
