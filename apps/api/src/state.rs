use std::sync::Arc;

use crate::config::Config;
use crate::review::invoker::ReviewModel;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; requests never write to it.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable model backend. Default: `LlmClient`.
    pub reviewer: Arc<dyn ReviewModel>,
    pub config: Config,
}
