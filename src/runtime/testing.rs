//! Mock implementations for testing
//!
//! These mocks enable end-to-end turn testing without real I/O.

use super::traits::*;
use crate::agent::{Agent, Division};
use crate::layer::{LayerError, LayerNode};
use crate::office_hours::OfficeHours;
use crate::platform::PlatformError;
use crate::state_machine::{ProfileEntry, RoomOptions};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

// ============================================================================
// Mock Platform
// ============================================================================

/// Outbound platform call recorded by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Sent { room_id: String, text: String },
    Resolved { room_id: String, last_message_id: String },
    Tagged { room_id: String, tag: String },
    BotToggled { room_id: String, active: bool },
    Assigned { room_id: String, agent_id: i64 },
}

/// In-memory platform: rooms, profiles, agents and office hours
#[allow(dead_code)]
#[derive(Default)]
pub struct MockPlatform {
    rooms: Mutex<HashMap<String, RoomOptions>>,
    profiles: Mutex<HashMap<String, Vec<ProfileEntry>>>,
    actions: Mutex<Vec<Action>>,
    agents: Vec<Agent>,
    divisions: Vec<(Division, Vec<Agent>)>,
    office_hours: OfficeHours,
    fail_profile_save: bool,
}

#[allow(dead_code)]
impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agents(mut self, agents: Vec<Agent>) -> Self {
        self.agents = agents;
        self
    }

    pub fn with_division(mut self, division: Division, members: Vec<Agent>) -> Self {
        self.divisions.push((division, members));
        self
    }

    pub fn with_office_hours(mut self, hours: OfficeHours) -> Self {
        self.office_hours = hours;
        self
    }

    /// Make every profile write fail with a server error
    pub fn failing_profile_save(mut self) -> Self {
        self.fail_profile_save = true;
        self
    }

    /// Seed a room's options from a JSON object
    pub fn with_room(self, room_id: &str, options: Value) -> Self {
        let options = options.as_object().cloned().unwrap_or_default();
        self.rooms
            .lock()
            .unwrap()
            .insert(room_id.to_string(), options);
        self
    }

    pub fn with_profile(self, room_id: &str, entries: Vec<ProfileEntry>) -> Self {
        self.profiles
            .lock()
            .unwrap()
            .insert(room_id.to_string(), entries);
        self
    }

    pub fn options(&self, room_id: &str) -> RoomOptions {
        self.rooms
            .lock()
            .unwrap()
            .get(room_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn stored_profile(&self, room_id: &str) -> Vec<ProfileEntry> {
        self.profiles
            .lock()
            .unwrap()
            .get(room_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    /// Texts sent to a room, in order
    pub fn sent(&self, room_id: &str) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|action| match action {
                Action::Sent { room_id: r, text } if r == room_id => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn clear_actions(&self) {
        self.actions.lock().unwrap().clear();
    }

    fn record(&self, action: Action) {
        self.actions.lock().unwrap().push(action);
    }
}

#[async_trait]
impl RoomStore for MockPlatform {
    async fn room_options(&self, room_id: &str) -> Result<RoomOptions, PlatformError> {
        Ok(self.options(room_id))
    }

    async fn update_room_options(
        &self,
        room_id: &str,
        options: &RoomOptions,
    ) -> Result<(), PlatformError> {
        self.rooms
            .lock()
            .unwrap()
            .insert(room_id.to_string(), options.clone());
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MockPlatform {
    async fn profile(&self, room_id: &str) -> Result<Vec<ProfileEntry>, PlatformError> {
        Ok(self.stored_profile(room_id))
    }

    async fn save_profile(
        &self,
        room_id: &str,
        entries: &[ProfileEntry],
    ) -> Result<(), PlatformError> {
        if self.fail_profile_save {
            return Err(PlatformError::server_error("user_info unavailable"));
        }
        self.profiles
            .lock()
            .unwrap()
            .insert(room_id.to_string(), entries.to_vec());
        Ok(())
    }
}

#[async_trait]
impl Messenger for MockPlatform {
    async fn send_message(&self, room_id: &str, text: &str) -> Result<(), PlatformError> {
        self.record(Action::Sent {
            room_id: room_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn resolve(&self, room_id: &str, last_message_id: &str) -> Result<(), PlatformError> {
        self.record(Action::Resolved {
            room_id: room_id.to_string(),
            last_message_id: last_message_id.to_string(),
        });
        Ok(())
    }

    async fn tag_room(&self, room_id: &str, tag: &str) -> Result<(), PlatformError> {
        self.record(Action::Tagged {
            room_id: room_id.to_string(),
            tag: tag.to_string(),
        });
        Ok(())
    }

    async fn toggle_bot(&self, room_id: &str, active: bool) -> Result<(), PlatformError> {
        self.record(Action::BotToggled {
            room_id: room_id.to_string(),
            active,
        });
        Ok(())
    }

    async fn assign_agent(&self, room_id: &str, agent_id: i64) -> Result<(), PlatformError> {
        self.record(Action::Assigned {
            room_id: room_id.to_string(),
            agent_id,
        });
        Ok(())
    }
}

#[async_trait]
impl AgentDirectory for MockPlatform {
    async fn agents(&self) -> Result<Vec<Agent>, PlatformError> {
        Ok(self.agents.clone())
    }

    async fn divisions(&self) -> Result<Vec<Division>, PlatformError> {
        Ok(self.divisions.iter().map(|(d, _)| d.clone()).collect())
    }

    async fn agents_by_division(&self, division_id: i64) -> Result<Vec<Agent>, PlatformError> {
        Ok(self
            .divisions
            .iter()
            .find(|(d, _)| d.id == division_id)
            .map(|(_, members)| members.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl OfficeHoursSource for MockPlatform {
    async fn office_hours(&self) -> Result<OfficeHours, PlatformError> {
        Ok(self.office_hours.clone())
    }
}

// ============================================================================
// Mock Layer Source
// ============================================================================

/// Serves one tree for every channel, or fails when there is none
pub struct StaticLayers {
    root: Option<LayerNode>,
}

impl StaticLayers {
    pub fn new(root: LayerNode) -> Self {
        Self { root: Some(root) }
    }

    pub fn missing() -> Self {
        Self { root: None }
    }
}

#[async_trait]
impl LayerSource for StaticLayers {
    async fn load(&self, channel_id: i64) -> Result<LayerNode, LayerError> {
        self.root.clone().ok_or_else(|| LayerError::ConfigNotFound {
            location: format!("mock/{channel_id}.json"),
        })
    }
}

// ============================================================================
// Turn tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentError, ChannelRef};
    use crate::config::{RouterConfig, RoutingConfig, Wording};
    use crate::layer::{AdditionalInformation, ConfirmationOption, Form, FormsConfirmation};
    use crate::office_hours::OfficeHourEntry;
    use crate::runtime::{BotRuntime, InboundMessage, RouterError, Turn};
    use crate::state_machine::{NavigationCommands, Routing};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::sync::Arc;

    const ROOM: &str = "room-1";
    const CHANNEL: i64 = 10;

    fn leaf(message: &str) -> LayerNode {
        LayerNode {
            message: message.to_string(),
            ..Default::default()
        }
    }

    fn tree() -> LayerNode {
        LayerNode {
            message: "Welcome! 1. Billing 2. Register 3. Agent 4. Bye".to_string(),
            options: vec![
                LayerNode {
                    message: "Billing: 1. Invoice 2. Refund 3. Other".to_string(),
                    options: vec![leaf("Invoice sent"), leaf("Refund started"), leaf("Other")],
                    ..Default::default()
                },
                LayerNode {
                    message: "Registration".to_string(),
                    add_additional_information: true,
                    division: "Sales".to_string(),
                    additional_information: AdditionalInformation {
                        instruction: "Please answer two questions".to_string(),
                        forms: vec![
                            Form {
                                key: "Name".to_string(),
                                question: "What is your name?".to_string(),
                                ..Default::default()
                            },
                            Form {
                                key: "City".to_string(),
                                question: "Which city?".to_string(),
                                ..Default::default()
                            },
                        ],
                        forms_confirmation: FormsConfirmation {
                            message: "Please confirm:\n%s1. Yes".to_string(),
                            options: vec![ConfirmationOption {
                                confirmed: true,
                                ..Default::default()
                            }],
                            additional_messages: vec![
                                "Thanks, an agent will contact you".to_string()
                            ],
                        },
                    },
                    ..Default::default()
                },
                LayerNode {
                    message: "Connecting you to an agent".to_string(),
                    handover: true,
                    ..Default::default()
                },
                LayerNode {
                    messages: vec!["Goodbye".to_string(), "See you".to_string()],
                    resolve: true,
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    fn config() -> RouterConfig {
        RouterConfig {
            commands: NavigationCommands {
                previous: Some("0".to_string()),
                reset: Some("#".to_string()),
                direct_to_agent: Some("*".to_string()),
                reset_prefix_len: 0,
            },
            wording: Wording {
                fallback: "Sorry, please pick a listed option".to_string(),
                out_of_office: "We are closed".to_string(),
                waiting_agent: "Please wait for an agent".to_string(),
                error: "Something went wrong".to_string(),
            },
            routing: RoutingConfig {
                pool_division: "Pool".to_string(),
                auto_resolve_tag: Some("bot-resolved".to_string()),
                office_hours_enabled: false,
            },
            ..Default::default()
        }
    }

    fn agent(id: i64) -> Agent {
        Agent {
            id,
            name: format!("agent-{id}"),
            is_available: true,
            type_as_string: "agent".to_string(),
            user_channels: vec![ChannelRef { id: CHANNEL }],
            ..Default::default()
        }
    }

    fn platform() -> MockPlatform {
        MockPlatform::new()
            .with_agents(vec![agent(42)])
            .with_division(
                Division {
                    id: 2,
                    name: "Sales".to_string(),
                },
                vec![agent(7)],
            )
    }

    fn runtime(
        platform: Arc<MockPlatform>,
        config: RouterConfig,
    ) -> BotRuntime<Arc<MockPlatform>, StaticLayers> {
        BotRuntime::new(platform, StaticLayers::new(tree()), Arc::new(config))
    }

    fn inbound(text: &str) -> InboundMessage {
        InboundMessage {
            room_id: ROOM.to_string(),
            channel_id: CHANNEL,
            message_id: "9001".to_string(),
            text: text.to_string(),
        }
    }

    async fn say(
        runtime: &BotRuntime<Arc<MockPlatform>, StaticLayers>,
        text: &str,
    ) -> Result<Turn, RouterError> {
        runtime.run_turn(&inbound(text)).await
    }

    #[tokio::test]
    async fn test_new_conversation_gets_root_menu() {
        let platform = Arc::new(platform().with_room(ROOM, json!({ "channel": "wa" })));
        let runtime = runtime(platform.clone(), config());

        say(&runtime, "hello").await.unwrap();

        assert_eq!(
            platform.sent(ROOM),
            vec!["Welcome! 1. Billing 2. Register 3. Agent 4. Bye"]
        );
        let options = platform.options(ROOM);
        assert_eq!(options["bot_layer"], json!([]));
        assert_eq!(options["channel"], json!("wa"));
        assert_eq!(options["bot_state_version"], json!(1));
    }

    #[tokio::test]
    async fn test_root_selection() {
        let platform = Arc::new(platform().with_room(ROOM, json!({ "bot_layer": [] })));
        let runtime = runtime(platform.clone(), config());

        let turn = say(&runtime, "1").await.unwrap();

        assert_eq!(turn.drafts.len(), 1);
        assert_eq!(turn.drafts[0].routing, Routing::Continue);
        assert_eq!(
            platform.sent(ROOM),
            vec!["Billing: 1. Invoice 2. Refund 3. Other"]
        );
        assert_eq!(platform.options(ROOM)["bot_layer"], json!([1]));
    }

    #[tokio::test]
    async fn test_failed_profile_write_keeps_form_position() {
        let platform = Arc::new(
            platform()
                .failing_profile_save()
                .with_room(ROOM, json!({ "bot_layer": [2], "forms_layer_index": 0 })),
        );
        let runtime = runtime(platform.clone(), config());

        let result = say(&runtime, "Ana").await;

        assert!(matches!(result, Err(RouterError::Platform(_))));
        assert!(platform.sent(ROOM).is_empty());
        assert!(platform.stored_profile(ROOM).is_empty());
        let options = platform.options(ROOM);
        assert_eq!(options["forms_layer_index"], json!(0));
        assert!(options.get("bot_state_version").is_none());
    }

    #[tokio::test]
    async fn test_invalid_selection_reprompts_without_writes() {
        let platform = Arc::new(
            platform().with_room(ROOM, json!({ "bot_layer": [1], "bot_state_version": 3 })),
        );
        let runtime = runtime(platform.clone(), config());

        let turn = say(&runtime, "5").await.unwrap();

        assert!(turn.effects.is_empty());
        assert_eq!(
            platform.sent(ROOM),
            vec![
                "Sorry, please pick a listed option",
                "Billing: 1. Invoice 2. Refund 3. Other"
            ]
        );
        let options = platform.options(ROOM);
        assert_eq!(options["bot_layer"], json!([1]));
        assert_eq!(options["bot_state_version"], json!(3));
    }

    #[tokio::test]
    async fn test_form_collection_to_handover() {
        let platform = Arc::new(platform().with_room(ROOM, json!({ "bot_layer": [] })));
        let runtime = runtime(platform.clone(), config());

        say(&runtime, "2").await.unwrap();
        assert_eq!(
            platform.sent(ROOM),
            vec!["Please answer two questions", "What is your name?"]
        );
        let options = platform.options(ROOM);
        assert_eq!(options["bot_layer"], json!([2]));
        assert_eq!(options["forms_layer_index"], json!(0));

        platform.clear_actions();
        say(&runtime, "Ana").await.unwrap();
        assert_eq!(platform.sent(ROOM), vec!["Which city?"]);
        assert_eq!(platform.options(ROOM)["forms_layer_index"], json!(1));
        assert_eq!(
            platform.stored_profile(ROOM),
            vec![ProfileEntry::new("Name", "Ana")]
        );

        platform.clear_actions();
        say(&runtime, "Bandung").await.unwrap();
        assert_eq!(
            platform.sent(ROOM),
            vec!["Please confirm:\nName: Ana\nCity: Bandung\n1. Yes"]
        );
        assert_eq!(platform.options(ROOM)["form_confirming"], json!(true));

        platform.clear_actions();
        let turn = say(&runtime, "1").await.unwrap();
        assert_eq!(turn.drafts.len(), 1);
        assert_eq!(
            turn.drafts[0].routing,
            Routing::Handover {
                division: Some("Sales".to_string())
            }
        );
        assert_eq!(
            platform.actions(),
            vec![
                Action::Sent {
                    room_id: ROOM.to_string(),
                    text: "Thanks, an agent will contact you".to_string()
                },
                Action::BotToggled {
                    room_id: ROOM.to_string(),
                    active: false
                },
                Action::Assigned {
                    room_id: ROOM.to_string(),
                    agent_id: 7
                },
            ]
        );
        let options = platform.options(ROOM);
        assert!(!options.contains_key("bot_layer"));
        assert!(!options.contains_key("forms_layer_index"));
        assert!(!options.contains_key("form_confirming"));
    }

    #[tokio::test]
    async fn test_invalid_form_answer_keeps_step() {
        let mut layers = tree();
        layers.options[1].additional_information.forms[0].answers = vec![
            crate::layer::Answer {
                value: "Ana".to_string(),
            },
        ];
        let platform = Arc::new(platform().with_room(
            ROOM,
            json!({ "bot_layer": [2], "forms_layer_index": 0 }),
        ));
        let runtime = BotRuntime::new(platform.clone(), StaticLayers::new(layers), Arc::new(config()));

        let turn = say(&runtime, "Budi").await.unwrap();

        assert!(turn.effects.is_empty());
        assert_eq!(
            platform.sent(ROOM),
            vec!["Sorry, please pick a listed option", "What is your name?"]
        );
        assert_eq!(platform.options(ROOM)["forms_layer_index"], json!(0));
    }

    #[tokio::test]
    async fn test_resolve_node_sends_all_messages_then_resolves() {
        let platform = Arc::new(platform().with_room(ROOM, json!({ "bot_layer": [] })));
        let runtime = runtime(platform.clone(), config());

        let turn = say(&runtime, "4").await.unwrap();

        assert_eq!(turn.drafts[0].routing, Routing::Continue);
        assert_eq!(turn.drafts[1].routing, Routing::Resolve);
        assert_eq!(
            platform.actions(),
            vec![
                Action::Sent {
                    room_id: ROOM.to_string(),
                    text: "Goodbye".to_string()
                },
                Action::Sent {
                    room_id: ROOM.to_string(),
                    text: "See you".to_string()
                },
                Action::Tagged {
                    room_id: ROOM.to_string(),
                    tag: "bot-resolved".to_string()
                },
                Action::Resolved {
                    room_id: ROOM.to_string(),
                    last_message_id: "9001".to_string()
                },
            ]
        );
        assert!(!platform.options(ROOM).contains_key("bot_layer"));
    }

    #[tokio::test]
    async fn test_out_of_office_resolves_before_loading_layers() {
        let platform = Arc::new(
            platform()
                .with_room(ROOM, json!({ "bot_layer": [] }))
                .with_office_hours(OfficeHours {
                    timezone: "+00:00".to_string(),
                    office_hours: vec![OfficeHourEntry {
                        day: 1,
                        starttime: "09:00".to_string(),
                        endtime: "17:00".to_string(),
                    }],
                }),
        );
        let mut config = config();
        config.routing.office_hours_enabled = true;
        config.routing.auto_resolve_tag = None;
        let runtime = BotRuntime::new(platform.clone(), StaticLayers::missing(), Arc::new(config))
            .with_clock(Arc::new(|| Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap()));

        say(&runtime, "1").await.unwrap();

        assert_eq!(
            platform.actions(),
            vec![
                Action::Sent {
                    room_id: ROOM.to_string(),
                    text: "We are closed".to_string()
                },
                Action::Resolved {
                    room_id: ROOM.to_string(),
                    last_message_id: "9001".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_open_office_continues_to_menu() {
        let platform = Arc::new(
            platform()
                .with_room(ROOM, json!({ "bot_layer": [] }))
                .with_office_hours(OfficeHours {
                    timezone: "+00:00".to_string(),
                    office_hours: vec![OfficeHourEntry {
                        day: 0,
                        starttime: "00:00".to_string(),
                        endtime: "23:59".to_string(),
                    }],
                }),
        );
        let mut config = config();
        config.routing.office_hours_enabled = true;
        let runtime = runtime(platform.clone(), config)
            .with_clock(Arc::new(|| Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap()));

        say(&runtime, "1").await.unwrap();
        assert_eq!(
            platform.sent(ROOM),
            vec!["Billing: 1. Invoice 2. Refund 3. Other"]
        );
    }

    #[tokio::test]
    async fn test_direct_to_agent_from_root() {
        let platform = Arc::new(platform().with_room(ROOM, json!({ "bot_layer": [] })));
        let runtime = runtime(platform.clone(), config());

        say(&runtime, "*").await.unwrap();

        let actions = platform.actions();
        assert_eq!(
            actions[0],
            Action::Sent {
                room_id: ROOM.to_string(),
                text: "Please wait for an agent".to_string()
            }
        );
        assert!(actions.contains(&Action::Assigned {
            room_id: ROOM.to_string(),
            agent_id: 42
        }));
    }

    #[tokio::test]
    async fn test_no_agent_leaves_bot_in_charge() {
        let platform = Arc::new(MockPlatform::new().with_room(ROOM, json!({ "bot_layer": [] })));
        let runtime = runtime(platform.clone(), config());

        let err = say(&runtime, "3").await.unwrap_err();

        assert!(matches!(
            err,
            RouterError::Agent(AgentError::NoAgentAvailable { .. })
        ));
        assert!(!platform
            .actions()
            .iter()
            .any(|a| matches!(a, Action::BotToggled { .. } | Action::Assigned { .. })));
        assert_eq!(platform.options(ROOM)["bot_layer"], json!([3]));
    }

    #[tokio::test]
    async fn test_missing_layer_sends_apology() {
        let platform = Arc::new(MockPlatform::new().with_room(ROOM, json!({ "bot_layer": [] })));
        let runtime = BotRuntime::new(
            platform.clone(),
            StaticLayers::missing(),
            Arc::new(config()),
        );

        let err = say(&runtime, "1").await.unwrap_err();

        assert!(matches!(err, RouterError::Layer(LayerError::ConfigNotFound { .. })));
        assert_eq!(platform.sent(ROOM), vec!["Something went wrong"]);
        assert_eq!(platform.options(ROOM)["bot_layer"], json!([]));
    }

    #[tokio::test]
    async fn test_previous_goes_up_one_level() {
        let platform = Arc::new(platform().with_room(ROOM, json!({ "bot_layer": [1] })));
        let runtime = runtime(platform.clone(), config());

        say(&runtime, "0").await.unwrap();

        assert_eq!(
            platform.sent(ROOM),
            vec!["Welcome! 1. Billing 2. Register 3. Agent 4. Bye"]
        );
        assert_eq!(platform.options(ROOM)["bot_layer"], json!([]));
    }

    #[tokio::test]
    async fn test_stale_path_restarts_at_root() {
        let platform = Arc::new(platform().with_room(ROOM, json!({ "bot_layer": [9, 1] })));
        let runtime = runtime(platform.clone(), config());

        say(&runtime, "1").await.unwrap();

        assert_eq!(
            platform.sent(ROOM),
            vec!["Welcome! 1. Billing 2. Register 3. Agent 4. Bye"]
        );
        assert_eq!(platform.options(ROOM)["bot_layer"], json!([]));
    }

    #[tokio::test]
    async fn test_reset_command_leaves_form() {
        let platform = Arc::new(platform().with_room(
            ROOM,
            json!({ "bot_layer": [2], "forms_layer_index": 1, "source": "web" }),
        ));
        let runtime = runtime(platform.clone(), config());

        say(&runtime, "#").await.unwrap();

        assert_eq!(
            platform.sent(ROOM),
            vec!["Welcome! 1. Billing 2. Register 3. Agent 4. Bye"]
        );
        let options = platform.options(ROOM);
        assert_eq!(options["bot_layer"], json!([]));
        assert!(!options.contains_key("forms_layer_index"));
        assert_eq!(options["source"], json!("web"));
    }

    #[tokio::test]
    async fn test_reset_to_stale_prefix_restarts_at_root() {
        let platform = Arc::new(platform().with_room(ROOM, json!({ "bot_layer": [9, 1] })));
        let mut config = config();
        config.commands.reset_prefix_len = 1;
        let runtime = runtime(platform.clone(), config);

        say(&runtime, "#").await.unwrap();

        assert_eq!(
            platform.sent(ROOM),
            vec!["Welcome! 1. Billing 2. Register 3. Agent 4. Bye"]
        );
        assert_eq!(platform.options(ROOM)["bot_layer"], json!([]));
    }

    #[tokio::test]
    async fn test_reset_keeps_configured_prefix() {
        let platform = Arc::new(platform().with_room(ROOM, json!({ "bot_layer": [1, 2] })));
        let mut config = config();
        config.commands.reset_prefix_len = 1;
        let runtime = runtime(platform.clone(), config);

        say(&runtime, "#").await.unwrap();

        assert_eq!(
            platform.sent(ROOM),
            vec!["Billing: 1. Invoice 2. Refund 3. Other"]
        );
        assert_eq!(platform.options(ROOM)["bot_layer"], json!([1]));
    }

    #[tokio::test]
    async fn test_previous_out_of_form_clears_form_state() {
        let platform = Arc::new(platform().with_room(
            ROOM,
            json!({ "bot_layer": [2], "forms_layer_index": 1 }),
        ));
        let runtime = runtime(platform.clone(), config());

        say(&runtime, "0").await.unwrap();

        let options = platform.options(ROOM);
        assert_eq!(options["bot_layer"], json!([]));
        assert!(!options.contains_key("forms_layer_index"));
    }
}
