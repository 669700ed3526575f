//! Menu ("layer") trees
//!
//! The tree model that drives the bot, and the store that loads a channel's
//! tree from a local file or a remote URL.

mod model;
mod store;

pub use model::{
    AdditionalInformation, Answer, ConfirmationOption, Form, FormsConfirmation, LayerNode,
    NestedQuestion,
};
pub(crate) use model::match_answer;
pub use store::LayerStore;

use thiserror::Error;

/// Errors raised while locating, reading or validating a layer tree
#[derive(Debug, Error)]
pub enum LayerError {
    #[error("Layer config not found at {location}")]
    ConfigNotFound { location: String },
    #[error("Layer config at {location} is invalid: {reason}")]
    ConfigInvalid { location: String, reason: String },
    #[error("Failed to fetch layer config from {location}: {source}")]
    Fetch {
        location: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Layer storage error at {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },
}

impl LayerError {
    pub fn invalid(location: impl ToString, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            location: location.to_string(),
            reason: reason.into(),
        }
    }
}
