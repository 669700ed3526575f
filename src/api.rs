//! HTTP API for the bot router
//!
//! The platform's message webhook, layer uploads and a version probe.

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::layer::LayerStore;
use crate::runtime::TurnHandler;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<dyn TurnHandler>,
    pub layers: Arc<LayerStore>,
}

impl AppState {
    pub fn new(runtime: Arc<dyn TurnHandler>, layers: LayerStore) -> Self {
        Self {
            runtime,
            layers: Arc::new(layers),
        }
    }
}
