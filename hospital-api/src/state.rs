use cohort_finder::PatientCohortFinder;
use hospital_agents::llm::{LlmClient, LlmConfig};
use hospital_agents::AgentStorage;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Shared by every worker; cloned per request through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub connection: Arc<Mutex<Connection>>,
    pub storage: Arc<dyn AgentStorage>,
    pub finder: Arc<PatientCohortFinder>,
    /// `None` when no API key is configured; LLM-backed endpoints answer 400
    pub llm_client: Option<Arc<dyn LlmClient>>,
    pub llm_config: LlmConfig,
}
