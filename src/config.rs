//! Runtime configuration
//!
//! Everything is read from the environment once at startup. A `.env` file is
//! loaded into the environment by `main` before this runs.

use crate::state_machine::NavigationCommands;
use std::collections::HashMap;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LAYER_DIR: &str = "./layer";
const CHANNEL_LAYER_URL_SUFFIX: &str = "_LAYER_URL";

/// Credentials and base URLs for the messaging platform
#[derive(Debug, Clone, Default)]
pub struct PlatformConfig {
    pub app_id: String,
    pub admin_email: String,
    pub secret: String,
    pub token: String,
    /// Chat SDK base URL (room info and room updates)
    pub sdk_url: String,
    /// Multichannel API base URL (bot messages, agents, resolve)
    pub qismo_url: String,
}

/// Where layer trees come from
#[derive(Debug, Clone, Default)]
pub struct LayerConfig {
    pub dir: PathBuf,
    /// One tree for every channel
    pub all_in_one: bool,
    pub shared_url: Option<String>,
    /// Per-channel URLs from `<channel>_LAYER_URL`
    pub channel_urls: HashMap<i64, String>,
}

/// Fixed texts the bot sends outside of any layer tree
#[derive(Debug, Clone, Default)]
pub struct Wording {
    /// Sent before re-prompting after an invalid reply
    pub fallback: String,
    pub out_of_office: String,
    pub waiting_agent: String,
    /// Apology when the layer tree cannot be loaded
    pub error: String,
}

/// Handover and resolve behaviour
#[derive(Debug, Clone, Default)]
pub struct RoutingConfig {
    /// Division whose members take conversations nobody else can
    pub pool_division: String,
    /// Tag added to rooms the bot resolves
    pub auto_resolve_tag: Option<String>,
    pub office_hours_enabled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RouterConfig {
    pub port: u16,
    pub platform: PlatformConfig,
    pub commands: NavigationCommands,
    pub wording: Wording,
    pub routing: RoutingConfig,
    pub layers: LayerConfig,
}

impl RouterConfig {
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build from an explicit set of variables
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        let get = |key: &str| vars.get(key).cloned().filter(|v| !v.is_empty());
        let flag = |key: &str| get(key).is_some_and(|v| parse_flag(&v));

        let port = get("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let platform = PlatformConfig {
            app_id: get("MULTICHANNEL_APP_ID").unwrap_or_default(),
            admin_email: get("MULTICHANNEL_ADMIN_EMAIL").unwrap_or_default(),
            secret: get("MULTICHANNEL_SECRET").unwrap_or_default(),
            token: get("MULTICHANNEL_TOKEN").unwrap_or_default(),
            sdk_url: trim_url(get("SDK_URL")),
            qismo_url: trim_url(get("QISMO_BASE_URL")),
        };

        let commands = NavigationCommands {
            previous: get("RETURN_PREVIOUS_LAYER_KEYPAD"),
            reset: get("RESET_LAYER_KEYPAD"),
            direct_to_agent: get("DIRECT_TO_AGENT_KEYPAD"),
            reset_prefix_len: get("RESET_LAST_INDEX")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        };

        let wording = Wording {
            fallback: get("FALLBACK_MESSAGE").unwrap_or_default(),
            out_of_office: get("OUT_OF_OFFICE_MESSAGE").unwrap_or_default(),
            waiting_agent: get("WAITING_AGENT_MESSAGE").unwrap_or_default(),
            error: get("ERROR_MESSAGE").unwrap_or_default(),
        };

        let routing = RoutingConfig {
            pool_division: get("POOL_AGENT_DIVISION").unwrap_or_default(),
            auto_resolve_tag: get("AUTO_RESOLVE_TAG").filter(|_| flag("ENABLE_AUTO_RESOLVE_TAG")),
            office_hours_enabled: flag("ENABLE_OFFICE_HOURS"),
        };

        let channel_urls = vars
            .iter()
            .filter(|(_, url)| !url.is_empty())
            .filter_map(|(key, url)| {
                let channel = key.strip_suffix(CHANNEL_LAYER_URL_SUFFIX)?.parse().ok()?;
                Some((channel, url.clone()))
            })
            .collect();

        let layers = LayerConfig {
            dir: get("LAYER_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LAYER_DIR)),
            all_in_one: flag("ALL_IN_ONE_JSON_ROUTE"),
            shared_url: get("LAYER_URL"),
            channel_urls,
        };

        Self {
            port,
            platform,
            commands,
            wording,
            routing,
            layers,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn trim_url(url: Option<String>) -> String {
    url.map(|u| u.trim_end_matches('/').to_string())
        .unwrap_or_default()
}
