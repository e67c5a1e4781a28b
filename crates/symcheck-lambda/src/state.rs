use std::sync::Arc;

use symcheck_bedrock::orchestrate::Orchestrator;

/// Shared application state, injected into all route handlers via Axum state.
///
/// Holds only configuration; nothing here is mutated by requests.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}
