use std::sync::Arc;

use crate::config::Config;
use crate::inference::InferenceService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup, never mutated afterwards.
    pub model: Arc<InferenceService>,
    pub config: Config,
}
