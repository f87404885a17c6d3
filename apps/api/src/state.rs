use std::sync::Arc;

use crate::archive::ResumeArchive;
use crate::config::Config;
use crate::scoring::gateway::ScoringGateway;
use crate::store::CandidateStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres in production, in-memory in tests.
    pub store: Arc<dyn CandidateStore>,
    pub gateway: ScoringGateway,
    pub archive: Arc<dyn ResumeArchive>,
    pub config: Config,
}
