use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Agent run with its transcript, as returned by the sessions endpoint
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct SessionResponse {
    pub id: i64,
    pub agent_name: String,
    pub model: String,
    pub objective: String,
    pub status: String, // 'running', 'completed', 'failed'
    pub result: Option<String>,
    pub messages: Vec<SessionMessage>,
    pub tool_calls: Vec<SessionToolCall>,
    pub started_at: i64,
    pub ended_at: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct SessionMessage {
    pub role: String, // 'user', 'assistant', 'system', 'tool'
    pub content: String,
    pub created_at: i64,
}

#[derive(Debug, Serialize, Deserialize, TS)]
pub struct SessionToolCall {
    pub tool_name: String,
    /// Raw JSON arguments as sent by the model
    pub request: String,
    pub response: Option<String>,
    pub status: String, // 'pending', 'completed', 'failed'
    pub error_details: Option<String>,
}
