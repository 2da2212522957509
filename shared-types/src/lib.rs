use serde::{Deserialize, Serialize};

pub mod cohort;
pub mod outreach;
pub mod patient;
pub mod session;

pub use cohort::CohortOutcome;
pub use outreach::{CreateOutreachRunRequest, OutreachEmail, OutreachRunResponse};
pub use patient::{AgeRange, CohortSearchRequest, InvalidAgeRange, PatientSummary};
pub use session::{SessionMessage, SessionResponse, SessionToolCall};

/// Error response for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
