//! Messaging platform client
//!
//! HTTP access to the chat SDK (room options) and the multichannel API
//! (bot messages, resolve, tags, agents, office hours, user properties).

mod client;
mod error;
mod types;

pub use client::MultichannelClient;
pub use error::{PlatformError, PlatformErrorKind};
