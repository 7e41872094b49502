use std::sync::Arc;

use crate::interview::session::SessionStore;
use crate::llm_client::CompletionClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    /// Completion backend. `LlmClient` in production, a scripted client in tests.
    pub llm: Arc<dyn CompletionClient>,
}
