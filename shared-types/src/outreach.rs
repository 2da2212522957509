use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A drafted outreach email for a single patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct OutreachEmail {
    pub patient_id: String,
    pub full_name: String,
    pub email: Option<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreateOutreachRunRequest {
    /// Target cohort in plain language, e.g. "Find patients for colonoscopy screening"
    pub objective: String,
}

#[derive(Debug, Serialize, TS)]
pub struct OutreachRunResponse {
    pub session_id: i64,
    pub status: String,
    pub criteria: Option<String>,
    pub emails: Vec<OutreachEmail>,
}
