pub mod schema;
pub mod sqlite_storage;

pub use sqlite_storage::SqliteAgentStorage;

use async_trait::async_trait;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Option<i64>,
    pub agent_type: String,
    pub model: String,
    pub objective: String,
    pub context_data: Option<String>,
    pub status: String,
    pub result: Option<String>,
    pub started_at: Option<i64>,
    pub ended_at: Option<i64>,
}

impl Session {
    pub fn running(agent_type: &str, model: &str, objective: impl Into<String>) -> Self {
        Self {
            id: None,
            agent_type: agent_type.to_string(),
            model: model.to_string(),
            objective: objective.into(),
            context_data: None,
            status: "running".to_string(),
            result: None,
            started_at: None,
            ended_at: None,
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context_data = Some(context.to_string());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Option<i64>,
    pub session_id: i64,
    pub role: String,
    pub content: String,
    pub created_at: Option<i64>,
}

impl Message {
    pub fn new(session_id: i64, role: &str, content: impl Into<String>) -> Self {
        Self {
            id: None,
            session_id,
            role: role.to_string(),
            content: content.into(),
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: Option<i64>,
    pub session_id: i64,
    pub tool_call_id: String,
    pub tool_name: String,
    pub tool_input: String,
    pub tool_output: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
}

#[async_trait]
pub trait AgentStorage: Send + Sync {
    async fn create_session(&self, session: Session) -> Result<i64>;
    async fn get_session(&self, session_id: i64) -> Result<Option<Session>>;
    async fn finish_session(&self, session_id: i64, status: &str, result: Option<String>)
        -> Result<()>;

    async fn create_message(&self, message: Message) -> Result<i64>;
    async fn get_messages(&self, session_id: i64) -> Result<Vec<Message>>;

    async fn create_tool_call(&self, tool_call: ToolCall) -> Result<i64>;
    async fn update_tool_call(&self, tool_call: ToolCall) -> Result<()>;
    async fn get_tool_calls(&self, session_id: i64) -> Result<Vec<ToolCall>>;
}

/// Marks the session completed or failed depending on `outcome`, then
/// hands `outcome` back. A storage failure while recording is only logged.
pub async fn record_outcome<T>(
    storage: &dyn AgentStorage,
    session_id: i64,
    outcome: Result<T>,
    describe: impl FnOnce(&T) -> String,
) -> Result<T> {
    let (status, result) = match &outcome {
        Ok(value) => ("completed", describe(value)),
        Err(err) => ("failed", err.to_string()),
    };

    if let Err(e) = storage
        .finish_session(session_id, status, Some(result))
        .await
    {
        tracing::warn!("Failed to record session {} as {}: {}", session_id, status, e);
    }

    outcome
}
